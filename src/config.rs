//! Saved command-line defaults.
//!
//! Defaults live in a plain file of flags, one or more per line, `#` starting
//! a comment. A global file is merged with a local `.sloteditrc`, and flags on
//! the command line win over both.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::slot::Dialect;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectMode {
    Expression,
    Type,
}

impl From<DialectMode> for Dialect {
    fn from(mode: DialectMode) -> Self {
        match mode {
            DialectMode::Expression => Self::Expression,
            DialectMode::Type => Self::Type,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub dialect: Option<DialectMode>,
    pub target: bool,
    pub json: bool,
    pub perf: bool,
    pub edit_log: Option<PathBuf>,
    pub range_function: Option<String>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches accumulate, options in `other`
    /// replace those in `self`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            dialect: other.dialect.or(self.dialect),
            target: self.target || other.target,
            json: self.json || other.json,
            perf: self.perf || other.perf,
            edit_log: other.edit_log.clone().or_else(|| self.edit_log.clone()),
            range_function: other
                .range_function
                .clone()
                .or_else(|| self.range_function.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("slotedit").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("slotedit")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("slotedit").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("slotedit")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".sloteditrc")
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
    let mut lines = vec!["# slotedit defaults (saved with --save)".to_string()];
    if let Some(dialect) = flags.dialect {
        let name = match dialect {
            DialectMode::Expression => "expression",
            DialectMode::Type => "type",
        };
        lines.push(format!("--dialect {name}"));
    }
    if flags.target {
        lines.push("--target".to_string());
    }
    if flags.json {
        lines.push("--json".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.edit_log {
        lines.push(format!("--edit-log {}", path.display()));
    }
    if let Some(name) = &flags.range_function {
        lines.push(format!("--range-function {name}"));
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

/// Pick the flags this module knows out of an argument list, ignoring
/// everything else.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) if name.starts_with("--") => (name, Some(value)),
            _ => (token, None),
        };
        let mut value = || {
            inline.map(ToOwned::to_owned).or_else(|| {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            })
        };
        match name {
            "--target" => flags.target = true,
            "--json" => flags.json = true,
            "--perf" => flags.perf = true,
            "--dialect" => flags.dialect = value().as_deref().and_then(parse_dialect),
            "--edit-log" => flags.edit_log = value().map(PathBuf::from),
            "--range-function" => flags.range_function = value(),
            _ => {}
        }
        i += 1;
    }
    flags
}

fn parse_dialect(s: &str) -> Option<DialectMode> {
    match s {
        "expression" => Some(DialectMode::Expression),
        "type" => Some(DialectMode::Type),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&args(&[
            "slotedit",
            "--target",
            "--dialect",
            "type",
            "--edit-log=edits.log",
            "--range-function",
            "Ranges.of",
            "script.txt",
        ]));
        assert!(flags.target);
        assert!(!flags.json);
        assert_eq!(flags.dialect, Some(DialectMode::Type));
        assert_eq!(flags.edit_log, Some(PathBuf::from("edits.log")));
        assert_eq!(flags.range_function.as_deref(), Some("Ranges.of"));
    }

    #[test]
    fn test_unknown_dialect_is_ignored() {
        let flags = parse_flag_tokens(&args(&["--dialect=lisp"]));
        assert_eq!(flags.dialect, None);
    }

    #[test]
    fn test_trailing_option_without_value() {
        let flags = parse_flag_tokens(&args(&["--json", "--edit-log"]));
        assert!(flags.json);
        assert_eq!(flags.edit_log, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            json: true,
            dialect: Some(DialectMode::Type),
            range_function: Some("a.range".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            target: true,
            dialect: Some(DialectMode::Expression),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.json);
        assert!(merged.target);
        assert_eq!(merged.dialect, Some(DialectMode::Expression));
        assert_eq!(merged.range_function.as_deref(), Some("a.range"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            dialect: Some(DialectMode::Type),
            target: true,
            json: true,
            perf: true,
            edit_log: Some(PathBuf::from("edits.log")),
            range_function: Some("Ranges.of".to_string()),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_dialect_mode_converts() {
        assert_eq!(Dialect::from(DialectMode::Type), Dialect::Type);
        assert_eq!(Dialect::from(DialectMode::Expression), Dialect::Expression);
    }
}
