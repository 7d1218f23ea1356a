//! Shared application state handed to every handler.

use std::path::Path;

use tracing::warn;

use crate::assets::StaticFiles;
use crate::auth::AccessGuard;
use crate::config::Config;
use crate::error::Error;
use crate::store::RecordStore;

pub struct AppState {
    pub store: RecordStore,
    pub guard: AccessGuard,
    pub assets: StaticFiles,
}

impl AppState {
    pub fn new(store: RecordStore, guard: AccessGuard, assets: StaticFiles) -> Self {
        Self { store, guard, assets }
    }

    /// Builds the state from the parsed configuration.
    ///
    /// Fails if the public directory does not exist.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let assets = StaticFiles::new(&config.public_dir).map_err(|source| Error::PublicDir {
            path: config.public_dir.display().to_string(),
            source,
        })?;

        if is_inside(&config.data_file, assets.root()) {
            warn!(
                data_file = %config.data_file.display(),
                "record file is inside the public directory and can be downloaded without credentials"
            );
        }

        Ok(Self::new(
            RecordStore::new(&config.data_file),
            AccessGuard::new(&config.admin_user, &config.admin_pass),
            assets,
        ))
    }
}

/// Whether `file` (which may not exist yet) would land under `dir`.
fn is_inside(file: &Path, dir: &Path) -> bool {
    let parent = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::canonicalize(parent).is_ok_and(|p| p.starts_with(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_data_file_under_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        std::fs::create_dir(&public).unwrap();
        let root = std::fs::canonicalize(&public).unwrap();

        assert!(is_inside(&public.join("registro.json"), &root));
        assert!(!is_inside(&dir.path().join("registro.json"), &root));
    }
}
