//! Implementation of `stencil init`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::core::manifest::{generate_default_manifest, MANIFEST_NAME};
use crate::util::fs::{ensure_dir, write_string};

/// Write a starter `Stencil.toml` into `dir`.
///
/// `module` is the module generated files are compiled into.
pub fn init_manifest(dir: &Path, module: &str) -> Result<PathBuf> {
    let manifest_path = dir.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_NAME, dir.display());
    }

    ensure_dir(dir)?;
    write_string(&manifest_path, &generate_default_manifest(module))?;

    tracing::info!("Created {}", manifest_path.display());
    Ok(manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Manifest;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_loadable_manifest() {
        let tmp = TempDir::new().unwrap();
        let path = init_manifest(tmp.path(), "crate::page").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.generator.module.as_deref(), Some("crate::page"));
        assert_eq!(manifest.targets.len(), 1);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let tmp = TempDir::new().unwrap();
        init_manifest(tmp.path(), "crate").unwrap();
        let err = init_manifest(tmp.path(), "crate").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
