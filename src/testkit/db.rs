//! Temporary SQLite databases.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::adapter::outbound::sqlite::database::connection::{
    create_pool, run_migrations, DbPool,
};

/// Migrated SQLite database backed by a temp file.
///
/// Every pooled connection to `:memory:` sees its own empty database, so
/// tests that share data across connections need a real file.
pub struct TempDb {
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create(name: &str) -> Self {
        let path = Self::path_for(name);
        let url = format!("sqlite://{}", path.display());
        let pool = create_pool(&url).expect("create sqlite pool");
        run_migrations(&pool).expect("run migrations");
        Self { path, pool }
    }

    /// A fresh temp path that no database occupies yet.
    pub fn path_for(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        path.push(format!("pointkeeper-{name}-{nanos}.db"));
        path
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
        for suffix in ["-wal", "-shm"] {
            let mut sidecar = self.path.clone().into_os_string();
            sidecar.push(suffix);
            let _ = std::fs::remove_file(sidecar);
        }
    }
}
