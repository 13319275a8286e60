use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

/// Resolve the tool's home directory.
///
/// - `Some(path)`: `~` is expanded, relative paths are joined onto the current directory.
/// - `None`: `<platform base>/<default_subdir>`, where the base is `%APPDATA%` on
///   Windows and `$HOME` elsewhere.
///
/// The directory is created when `create` is set.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let path = match configured {
        Some(raw) => expand_tilde(raw.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_relative() {
        std::env::current_dir()
            .context("cannot determine current directory")?
            .join(path)
    } else {
        path
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("cannot create home_dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return user_home();
    }
    match raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        Some(rest) => Ok(user_home()?.join(rest)),
        None => Ok(PathBuf::from(raw)),
    }
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine the user's home directory"))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Result<PathBuf> {
    dirs::config_dir().ok_or_else(|| anyhow!("cannot determine %APPDATA%"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Result<PathBuf> {
    user_home()
}
