//! Shell detection and environment export rendering.
//!
//! Exports always point through each candidate's `current` link, so switching
//! versions takes effect without re-evaluating the exports.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::Sdk;
use crate::store::VersionStore;

/// Supported shell types for environment integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    /// Bash shell
    #[default]
    Bash,
    /// Z shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell/pwsh
    #[serde(rename = "powershell")]
    PowerShell,
}

impl Shell {
    /// Detect shell from an explicit name or `$SHELL`
    pub fn detect(target: Option<&str>) -> Self {
        if let Some(t) = target.filter(|t| !t.is_empty()) {
            return Self::parse(t);
        }

        if let Ok(shell) = std::env::var("SHELL") {
            if shell.contains("fish") {
                return Shell::Fish;
            } else if shell.contains("zsh") {
                return Shell::Zsh;
            } else if shell.contains("bash") {
                return Shell::Bash;
            }
        }

        Shell::Bash
    }

    /// Parse shell from string
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "zsh" => Shell::Zsh,
            "fish" => Shell::Fish,
            "powershell" | "pwsh" => Shell::PowerShell,
            _ => Shell::Bash,
        }
    }

    /// Get the name of the shell
    pub fn name(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
            Shell::Fish => "fish",
            Shell::PowerShell => "powershell",
        }
    }

    /// Render `exports` as a script to be evaluated by this shell.
    ///
    /// Nothing in use renders as an empty string.
    #[must_use]
    pub fn render(&self, exports: &Exports) -> String {
        if exports.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        let paths: Vec<String> = exports
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();

        match self {
            Shell::Bash | Shell::Zsh => {
                let joined: Vec<String> = paths.iter().map(|p| posix_escape(p)).collect();
                let _ = writeln!(out, "export PATH=\"{}:$PATH\"", joined.join(":"));
                for (name, value) in &exports.vars {
                    let value = posix_escape(&value.display().to_string());
                    let _ = writeln!(out, "export {name}=\"{value}\"");
                }
            }
            Shell::Fish => {
                let joined: Vec<String> = paths.iter().map(|p| fish_quote(p)).collect();
                let _ = writeln!(out, "set -gx PATH {} $PATH", joined.join(" "));
                for (name, value) in &exports.vars {
                    let value = fish_quote(&value.display().to_string());
                    let _ = writeln!(out, "set -gx {name} {value}");
                }
            }
            Shell::PowerShell => {
                let joined: Vec<String> = paths.iter().map(|p| pwsh_quote(p)).collect();
                let _ = writeln!(
                    out,
                    "$env:PATH = @({}, $env:PATH) -join [IO.Path]::PathSeparator",
                    joined.join(", ")
                );
                for (name, value) in &exports.vars {
                    let value = pwsh_quote(&value.display().to_string());
                    let _ = writeln!(out, "$env:{name} = {value}");
                }
            }
        }
        out
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Environment changes that put every current version on the path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exports {
    /// `bin` directories to prepend to `PATH`, in candidate order.
    pub paths: Vec<PathBuf>,
    /// `<CANDIDATE>_HOME` variables.
    pub vars: Vec<(String, PathBuf)>,
}

impl Exports {
    /// Collect exports for every candidate with a current version.
    #[must_use]
    pub fn from_store(store: &VersionStore) -> Self {
        Self::for_sdks(store, &store.current_sdks())
    }

    /// Collect exports for the given targets.
    #[must_use]
    pub fn for_sdks(store: &VersionStore, sdks: &[Sdk]) -> Self {
        let mut exports = Self::default();
        for sdk in sdks {
            let Ok(home) = store.current_link(&sdk.candidate) else {
                continue;
            };
            exports.paths.push(home.join("bin"));
            exports.vars.push((home_var(&sdk.candidate), home));
        }
        exports
    }

    /// Whether there is nothing to export.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.vars.is_empty()
    }
}

/// Name of the home variable of `candidate`, e.g. `JAVA_HOME`.
#[must_use]
pub fn home_var(candidate: &str) -> String {
    let name: String = candidate
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{name}_HOME")
}

fn posix_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn fish_quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn pwsh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
