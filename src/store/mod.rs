// src/store/mod.rs
pub mod columnar;
pub mod normalized;
pub mod observations;

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

pub use columnar::write_normalized_parquet;
pub use normalized::{read_normalized_csv, write_normalized_csv};
pub use observations::read_observations;

/// Write through a hidden sibling `.name.tmp`, then rename over `path`.
///
/// A failed write never leaves a half-written file at `path`.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let tmp_path = tmp_sibling(path);
    let file = File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;

    if let Err(e) = write(file) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.context(format!("writing {}", path.display())));
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
