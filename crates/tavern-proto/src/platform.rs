use std::path::PathBuf;

/// HTTP port used when neither the config nor `PORT` sets one.
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Environment variable that overrides the configured HTTP port.
pub const PORT_ENV: &str = "PORT";

pub fn data_dir() -> PathBuf {
    // Logs live under ~/.local/share/tavern on every unix, macOS included
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("tavern")
    }
    #[cfg(windows)]
    {
        // On Windows, check for portable data directory in executable directory first
        if let Some(dir) = exe_dir() {
            let portable_data = dir.join("data");
            if portable_data.exists() {
                return portable_data;
            }
        }

        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tavern")
    }
}

pub fn config_dir() -> PathBuf {
    // Portable installs keep config.toml beside the executable
    #[cfg(windows)]
    {
        if let Some(dir) = exe_dir() {
            if dir.join("config.toml").exists() {
                return dir;
            }
        }
    }

    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("tavern")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tavern")
    }
}

/// Directory containing the running executable, if it can be resolved.
pub fn exe_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|p| p.to_path_buf())
}

/// Look for `name` beside the executable, falling back to `default`.
///
/// Used for the `music/` and `public/` folders so that an unpacked release
/// (binary + folders side by side) works without any config.
pub fn beside_exe_or(name: &str, default: PathBuf) -> PathBuf {
    if let Some(dir) = exe_dir() {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return candidate;
        }
    }
    default
}

/// Port from the `PORT` environment variable, when set and valid.
pub fn port_from_env() -> Option<u16> {
    std::env::var(PORT_ENV).ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_are_namespaced() {
        assert!(data_dir().ends_with("tavern"));
        assert!(config_dir().ends_with("tavern"));
    }

    #[test]
    fn test_beside_exe_falls_back() {
        let fallback = PathBuf::from("/nonexistent/tavern-music");
        assert_eq!(
            beside_exe_or("definitely-not-a-folder-xyz", fallback.clone()),
            fallback
        );
    }
}
