//! Config file loading and setting resolution.
//!
//! Settings come from, in order: command-line flags, their environment
//! variables, the config file, built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ocean_api::{ClientConfig, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::{Cli, Format};
use crate::error::CliError;

/// Context name that means "use `access-token`".
const DEFAULT_CONTEXT: &str = "default";

/// Contents of `config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConfigFile {
    /// Token of the default context.
    pub access_token: Option<String>,
    /// API endpoint.
    pub api_url: Option<String>,
    /// Default output format.
    pub output: Option<Format>,
    /// Active context.
    pub context: Option<String>,
    /// Tokens by context name.
    pub auth_contexts: BTreeMap<String, String>,
}

impl ConfigFile {
    /// `<config dir>/oceanctl/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("oceanctl").join("config.yaml"))
    }

    /// Load `explicit`, or the default file if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or any file cannot
    /// be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match Self::default_path() {
            Some(path) => match Self::read(&path) {
                Err(CliError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no config file");
                    Ok(Self::default())
                }
                other => other,
            },
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .map_err(|e| CliError::Config(format!("reading {}: {e}", path.display())))
    }
}

/// Resolved global settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Access token, if any source had one.
    pub access_token: Option<String>,
    /// API endpoint.
    pub api_url: String,
    /// Output format.
    pub output: Format,
    /// Log every request.
    pub trace: bool,
}

impl Settings {
    /// Merge flags (already merged with their environment variables by clap)
    /// over the config file.
    ///
    /// # Errors
    ///
    /// Returns an error when the selected context has no token.
    pub fn resolve(cli: &Cli, file: &ConfigFile) -> Result<Self, CliError> {
        let access_token = match cli.access_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => Some(token.to_string()),
            None => context_token(cli.context.as_deref().or(file.context.as_deref()), file)?,
        };
        Ok(Self {
            access_token,
            api_url: cli
                .api_url
                .clone()
                .or_else(|| file.api_url.clone())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            output: cli.output.or(file.output).unwrap_or_default(),
            trace: cli.trace,
        })
    }

    /// API client configuration.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            access_token: self.access_token.clone(),
            trace: self.trace,
            ..ClientConfig::default()
        }
    }
}

fn context_token(context: Option<&str>, file: &ConfigFile) -> Result<Option<String>, CliError> {
    match context {
        None | Some(DEFAULT_CONTEXT) => Ok(file.access_token.clone()),
        Some(name) => file
            .auth_contexts
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| CliError::Config(format!("context \"{name}\" not found in auth-contexts"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["oceanctl"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["apps", "list"]);
        Cli::try_parse_from(argv).expect("parse")
    }

    fn file() -> ConfigFile {
        serde_yaml::from_str(
            "access-token: file-token\n\
             api-url: https://file.example/\n\
             output: json\n\
             auth-contexts:\n  staging: staging-token\n",
        )
        .expect("yaml")
    }

    #[test]
    fn test_flags_win_over_file() {
        let settings = Settings::resolve(
            &cli(&["-t", "flag-token", "-u", "http://flag.example/", "-o", "yaml"]),
            &file(),
        )
        .expect("resolve");
        assert_eq!(settings.access_token.as_deref(), Some("flag-token"));
        assert_eq!(settings.api_url, "http://flag.example/");
        assert_eq!(settings.output, Format::Yaml);
    }

    #[test]
    fn test_file_fills_gaps() {
        let settings = Settings::resolve(&cli(&[]), &file()).expect("resolve");
        assert_eq!(settings.access_token.as_deref(), Some("file-token"));
        assert_eq!(settings.api_url, "https://file.example/");
        assert_eq!(settings.output, Format::Json);
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::resolve(&cli(&[]), &ConfigFile::default()).expect("resolve");
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.output, Format::Text);
    }

    #[test]
    fn test_context_selects_token() {
        let settings = Settings::resolve(&cli(&["--context", "staging"]), &file()).expect("resolve");
        assert_eq!(settings.access_token.as_deref(), Some("staging-token"));

        let err = Settings::resolve(&cli(&["--context", "prod"]), &file()).expect_err("unknown");
        assert_eq!(
            err.to_string(),
            "configuration error: context \"prod\" not found in auth-contexts"
        );
    }

    #[test]
    fn test_load_explicit_file() {
        let mut tmp = tempfile::NamedTempFile::new().expect("tmp");
        writeln!(tmp, "access-token: from-disk").expect("write");
        let loaded = ConfigFile::load(Some(tmp.path())).expect("load");
        assert_eq!(loaded.access_token.as_deref(), Some("from-disk"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().expect("dir");
        let err = ConfigFile::load(Some(&dir.path().join("nope.yaml"))).expect_err("missing");
        assert!(matches!(err, CliError::Io(_)));
    }
}
