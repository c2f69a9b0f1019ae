//! Builds the gate's view of whoever invoked a command.

use crate::framework::Context;
use gembot_common::UserId;
use gembot_gate::Caller;
use poise::serenity_prelude as serenity;

/// Identity, role names and administrator flag of the invoking user.
///
/// Outside a guild only the user id is known.
pub async fn caller_of(ctx: Context<'_>) -> Caller {
    let caller = Caller::new(UserId(ctx.author().id.get()));

    let Some(member) = ctx.author_member().await else {
        return caller;
    };

    // Guild cache guards are not Send; keep them inside this match.
    let (role_names, administrator) = match ctx.guild() {
        Some(guild) => (
            role_names_in(&guild.roles, &member.roles),
            guild.member_permissions(&member).administrator(),
        ),
        None => (
            Vec::new(),
            member
                .permissions
                .is_some_and(|permissions| permissions.administrator()),
        ),
    };

    caller
        .with_roles(role_names)
        .with_administrator(administrator)
}

fn role_names_in<S: std::hash::BuildHasher>(
    guild_roles: &std::collections::HashMap<serenity::RoleId, serenity::Role, S>,
    member_roles: &[serenity::RoleId],
) -> Vec<String> {
    member_roles
        .iter()
        .filter_map(|id| guild_roles.get(id).map(|role| role.name.clone()))
        .collect()
}
