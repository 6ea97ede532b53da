use anyhow::{anyhow, Result};
use log::debug;
use std::path::{Path, PathBuf};

/// Per-user fallback location for `tags.json`, `aliases.json` and `output.json`.
pub fn user_data_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
        Ok(base.join("pagemark"))
    }

    #[cfg(not(windows))]
    {
        // ~/.local/share/pagemark on macOS too
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join(".local").join("share").join("pagemark"))
    }
}

/// Pick the data directory: the `--data-dir` flag, then the configured
/// directory when it exists, then the per-user directory.
pub fn resolve_data_dir(flag: Option<&str>, configured: &str) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(PathBuf::from(dir));
    }
    if Path::new(configured).is_dir() {
        return Ok(PathBuf::from(configured));
    }
    debug!("Configured data directory {} not found, using the per-user one", configured);
    user_data_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_wins() {
        let dir = resolve_data_dir(Some("/tmp/pagemark-flag"), ".").unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/pagemark-flag"));
    }

    #[test]
    fn test_existing_configured_dir_is_used() {
        let configured = std::env::temp_dir();
        let dir = resolve_data_dir(None, configured.to_str().unwrap()).unwrap();
        assert_eq!(dir, configured);
    }

    #[test]
    fn test_missing_configured_dir_falls_back() {
        let dir = resolve_data_dir(None, "/nonexistent/pagemark-assets").unwrap();
        assert!(dir.ends_with("pagemark"));
    }
}
