//! Admin detection and admin-only command gating.

use gembot_common::UserId;
use gembot_config::PermissionsConfig;
use std::collections::HashSet;
use tracing::debug;

/// Commands only admins may run.
pub const ADMIN_ONLY_COMMANDS: [&str; 3] = ["temperature", "reset_all", "stats"];

/// Identity of whoever invoked a command, as seen at invocation time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Caller {
    /// Discord user id
    pub user_id: UserId,
    /// Names of the caller's guild roles; empty outside guilds
    pub role_names: Vec<String>,
    /// Whether the caller holds the guild administrator permission
    pub administrator: bool,
}

impl Caller {
    /// A caller with no roles or elevated permissions.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// Set role names.
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_names = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Set the administrator flag.
    pub fn with_administrator(mut self, administrator: bool) -> Self {
        self.administrator = administrator;
        self
    }
}

/// Resolves whether a caller is an admin.
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    admin_role_names: HashSet<String>,
    admin_user_ids: HashSet<UserId>,
}

impl PermissionResolver {
    /// Create a resolver from explicit lists.
    pub fn new<R, U>(admin_role_names: R, admin_user_ids: U) -> Self
    where
        R: IntoIterator<Item = String>,
        U: IntoIterator<Item = UserId>,
    {
        Self {
            admin_role_names: admin_role_names.into_iter().collect(),
            admin_user_ids: admin_user_ids.into_iter().collect(),
        }
    }

    /// Create a resolver from configuration.
    pub fn from_config(config: &PermissionsConfig) -> Self {
        Self::new(
            config.admin_role_names.iter().cloned(),
            config.admin_user_ids.iter().copied(),
        )
    }

    /// Administrator flag, allow-listed id, or an admin role name. Any one is enough.
    pub fn is_admin(&self, caller: &Caller) -> bool {
        if caller.administrator {
            debug!("User {} has the administrator permission", caller.user_id);
            return true;
        }
        if self.admin_user_ids.contains(&caller.user_id) {
            debug!("User {} is configured as administrator", caller.user_id);
            return true;
        }
        if let Some(role) = caller
            .role_names
            .iter()
            .find(|role| self.admin_role_names.contains(role.as_str()))
        {
            debug!("User {} has admin role {}", caller.user_id, role);
            return true;
        }
        false
    }

    /// Whether `command` is reserved for admins.
    pub fn is_admin_only(command: &str) -> bool {
        ADMIN_ONLY_COMMANDS.contains(&command)
    }

    /// Admin-only commands need [`is_admin`](Self::is_admin); everything else is open.
    pub fn can_use_command(&self, caller: &Caller, command: &str) -> bool {
        !Self::is_admin_only(command) || self.is_admin(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PermissionResolver {
        PermissionResolver::from_config(&PermissionsConfig {
            admin_role_names: vec!["Admin".to_string(), "Bot Admin".to_string()],
            admin_user_ids: vec![UserId(42)],
        })
    }

    #[test]
    fn test_plain_member_is_not_admin() {
        let caller = Caller::new(UserId(1)).with_roles(["Member", "admin"]);
        assert!(!resolver().is_admin(&caller));
    }

    #[test]
    fn test_each_condition_grants_admin() {
        let resolver = resolver();
        assert!(resolver.is_admin(&Caller::new(UserId(1)).with_administrator(true)));
        assert!(resolver.is_admin(&Caller::new(UserId(42))));
        assert!(resolver.is_admin(&Caller::new(UserId(1)).with_roles(["Member", "Bot Admin"])));
    }

    #[test]
    fn test_admin_only_commands() {
        let resolver = resolver();
        let member = Caller::new(UserId(1));
        let admin = Caller::new(UserId(42));

        for command in ADMIN_ONLY_COMMANDS {
            assert!(!resolver.can_use_command(&member, command));
            assert!(resolver.can_use_command(&admin, command));
        }
        assert!(resolver.can_use_command(&member, "gemini"));
        assert!(resolver.can_use_command(&member, "reset"));
    }
}
