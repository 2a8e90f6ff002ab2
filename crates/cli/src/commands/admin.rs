use anyhow::Result;
use planbot_core::UserId;
use planbot_service::Settings;

use crate::open_storage;

pub(crate) fn run_reset(settings: &Settings, user: i64) -> Result<()> {
    let storage = open_storage(settings)?;
    let removed = storage.reset_owner(UserId(user))?;
    tracing::info!(user, removed, "User data reset");
    println!("Removed {removed} records of user {user}");
    storage.close()?;
    Ok(())
}

pub(crate) fn run_export(settings: &Settings, user: i64) -> Result<()> {
    let storage = open_storage(settings)?;
    let export = storage.export(UserId(user))?;
    println!("{}", serde_json::to_string_pretty(&export)?);
    storage.close()?;
    Ok(())
}
