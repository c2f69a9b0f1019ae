//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::schema::Config;
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;

/// Thread-safe configuration cache using arc-swap for lock-free reads.
#[derive(Debug)]
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Creates a new configuration cache with the given initial configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Gets the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Replaces the configuration atomically.
    pub fn update(&self, config: Config) {
        self.config.store(Arc::new(config));
    }

    /// Applies `change` to a copy of the current configuration and swaps it in.
    ///
    /// Concurrent modifications are retried so none is lost.
    pub fn modify<F>(&self, change: F) -> Arc<Config>
    where
        F: Fn(&mut Config),
    {
        self.config.rcu(|current| {
            let mut next = Config::clone(current);
            change(&mut next);
            next
        });
        debug!("Configuration updated at runtime");
        self.get()
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
