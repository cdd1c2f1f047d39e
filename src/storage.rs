use crate::errors::AppError;
use crate::logbook::LogBook;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const LOGS_FILE: &str = "inventory_logs.json";
pub const USER_FILE: &str = "active_user";

/// The two independently persisted blobs.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub logs: PathBuf,
    pub user: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            logs: dir.join(LOGS_FILE),
            user: dir.join(USER_FILE),
        }
    }
}

/// Missing or unreadable data falls back to the baseline seed.
pub async fn load_logs(path: &Path) -> LogBook {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(book) => book,
            Err(err) => {
                error!("failed to parse log file {}, using baseline: {err}", path.display());
                LogBook::baseline()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => LogBook::baseline(),
        Err(err) => {
            error!("failed to read log file {}, using baseline: {err}", path.display());
            LogBook::baseline()
        }
    }
}

pub async fn persist_logs(path: &Path, book: &LogBook) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(book).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

pub async fn load_user(path: &Path) -> Option<String> {
    match fs::read_to_string(path).await {
        Ok(name) => Some(name),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            warn!("failed to read session file {}: {err}", path.display());
            None
        }
    }
}

/// Writes the display name, or removes the file when logged out.
pub async fn persist_user(path: &Path, user: Option<&str>) -> Result<(), AppError> {
    match user {
        Some(name) => fs::write(path, name).await.map_err(AppError::internal),
        None => match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::internal(err)),
        },
    }
}
