use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::highlight::HighlightTheme;

/// Flags that can be persisted in a config file as well as given on the
/// command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub standalone: bool,
    pub safe: bool,
    pub no_highlight: bool,
    pub perf: bool,
    pub theme: Option<HighlightTheme>,
}

impl ConfigFlags {
    /// Merge `other` on top of `self`: booleans are OR-ed, options from
    /// `other` win when set.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            standalone: self.standalone || other.standalone,
            safe: self.safe || other.safe,
            no_highlight: self.no_highlight || other.no_highlight,
            perf: self.perf || other.perf,
            theme: other.theme.or(self.theme),
        }
    }

    pub fn theme(&self) -> HighlightTheme {
        self.theme.unwrap_or_default()
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("markpad")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markpadrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# markpad defaults (saved with --save)".to_string()];
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.standalone {
        lines.push("--standalone".to_string());
    }
    if flags.safe {
        lines.push("--safe".to_string());
    }
    if flags.no_highlight {
        lines.push("--no-highlight".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme_name(theme)));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list; everything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--watch" | "-w" => flags.watch = true,
            "--standalone" => flags.standalone = true,
            "--safe" => flags.safe = true,
            "--no-highlight" => flags.no_highlight = true,
            "--perf" => flags.perf = true,
            "--theme" => {
                if let Some(next) = tokens.get(i + 1) {
                    flags.theme = parse_theme(next);
                    i += 1;
                }
            }
            _ => {
                if let Some(value) = token.strip_prefix("--theme=") {
                    flags.theme = parse_theme(value);
                }
            }
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<HighlightTheme> {
    match s {
        "light" => Some(HighlightTheme::Light),
        "dark" => Some(HighlightTheme::Dark),
        _ => None,
    }
}

const fn theme_name(theme: HighlightTheme) -> &'static str {
    match theme {
        HighlightTheme::Light => "light",
        HighlightTheme::Dark => "dark",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "markpad".to_string(),
            "render".to_string(),
            "--watch".to_string(),
            "--standalone".to_string(),
            "--theme".to_string(),
            "dark".to_string(),
            "--no-highlight".to_string(),
            "README.md".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.standalone);
        assert!(flags.no_highlight);
        assert!(!flags.safe);
        assert_eq!(flags.theme, Some(HighlightTheme::Dark));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unknown_theme() {
        let args = vec!["--theme=sepia".to_string()];
        assert_eq!(parse_flag_tokens(&args).theme, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(HighlightTheme::Light),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            safe: true,
            theme: Some(HighlightTheme::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.safe);
        assert_eq!(merged.theme(), HighlightTheme::Dark);
    }

    #[test]
    fn test_theme_defaults_to_light() {
        assert_eq!(ConfigFlags::default().theme(), HighlightTheme::Light);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            watch: true,
            standalone: true,
            safe: true,
            no_highlight: true,
            perf: true,
            theme: Some(HighlightTheme::Dark),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
