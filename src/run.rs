mod cli;
mod tui;

use anyhow::Result;

use crate::db::Database;
use crate::models::User;

pub(crate) use cli::as_cli;
pub(crate) use tui::as_tui;

/// The user commands act for: an explicit email if one was given, otherwise
/// the first registered user.
pub(crate) fn resolve_owner(db: &Database, email: Option<&str>) -> Result<(i64, User)> {
    let user = match email {
        Some(email) => db
            .get_user_by_email(email)?
            .ok_or_else(|| anyhow::anyhow!("No user with email '{email}'. Add one with: fintrack user add <name> <email>"))?,
        None => db
            .get_users()?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No users found. Add one with: fintrack user add <name> <email>"))?,
    };
    let id = user
        .id
        .ok_or_else(|| anyhow::anyhow!("User has no ID"))?;
    Ok((id, user))
}
