mod repository;

pub use repository::Storage;

use std::path::PathBuf;

/// DB パス: CA_DB_PATH があればそれ、なければローカルデータディレクトリ配下
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("CA_DB_PATH") {
        return PathBuf::from(path);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("collector-admin")
        .join("collector-admin.db")
}
