//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a bookmark database (file path argument, in-memory otherwise).
//! - Write logs under `BOOKMARKS_LOG_DIR` when that variable is set.
//! - Print core version, schema version and pending reminder count.

use bookmark_core::db::migrations::current_user_version;
use bookmark_core::db::{open_db, open_db_in_memory};
use bookmark_core::{default_log_level, init_logging};
use bookmark_core::{BookmarkRepository, SqliteBookmarkRepository};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "BOOKMARKS_LOG_DIR";

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bookmark_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        init_logging(default_log_level(), &log_dir)?;
    }

    let conn = match db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteBookmarkRepository::new(&conn);

    println!("bookmark_core version={}", bookmark_core::core_version());
    println!("schema_version={}", current_user_version(&conn)?);
    println!("pending_reminders={}", repo.count_pending_reminders()?);
    log::debug!(
        "event=cli_report module=cli status=ok mode={}",
        if db_path.is_some() { "file" } else { "memory" }
    );
    Ok(())
}
