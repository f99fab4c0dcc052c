mod analytics;
mod config;
mod db;
mod import;
mod logging;
mod models;
mod run;
mod ui;

use anyhow::Result;

use crate::logging::LogTarget;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::from_env()?;

    let target = if args.len() > 1 {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    logging::init(target, &config.log_path)?;

    let mut db = db::Database::open(&config.db_path)?;
    ensure_default_user(&db)?;

    match args.len() {
        1 => run::as_tui(&mut db, &config),
        2.. => run::as_cli(&args, &mut db, &config),
        _ => {
            eprintln!("Usage: fintrack [command]");
            Ok(())
        }
    }
}

fn ensure_default_user(db: &db::Database) -> Result<()> {
    if db.get_users()?.is_empty() {
        let user = models::User::new("Default", "default@fintrack.local")?;
        let id = db.insert_user(&user)?;
        tracing::info!(id, "created default user");
    }
    Ok(())
}
