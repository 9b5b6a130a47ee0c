//! `apps dev config`: per-project settings for local development.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::cli::DevConfigCommands;
use crate::error::CliError;

/// Settings file used when `--dev-config` is not given, relative to the
/// working directory.
pub const DEFAULT_DEV_CONFIG: &str = ".do/dev-config.yaml";

/// Dev config command executor.
pub struct DevConfigCommand {
    path: PathBuf,
}

impl DevConfigCommand {
    /// Create a command for `path`, or the default file.
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_DEV_CONFIG)),
        }
    }

    /// Settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Execute a dev config subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if a pair is malformed or the file cannot be read or
    /// written.
    pub fn execute<W: Write>(&self, writer: &mut W, command: &DevConfigCommands) -> Result<(), CliError> {
        match command {
            DevConfigCommands::Set { pairs } => {
                if pairs.is_empty() {
                    return Err(CliError::missing_args("apps.dev.config.set"));
                }
                let mut config = self.load()?;
                for pair in pairs {
                    let (key, value) = pair
                        .split_once('=')
                        .ok_or_else(|| CliError::InvalidArgument(format!("\"{pair}\" is not KEY=VALUE")))?;
                    set_path(&mut config, key, Value::String(value.to_string()))?;
                }
                self.save(&config)?;
            }
            DevConfigCommands::Unset { keys } => {
                if keys.is_empty() {
                    return Err(CliError::missing_args("apps.dev.config.unset"));
                }
                let mut config = self.load()?;
                for key in keys {
                    unset_path(&mut config, key);
                }
                self.save(&config)?;
            }
            DevConfigCommands::Get => {
                let config = self.load()?;
                serde_yaml::to_writer(&mut *writer, &config)?;
            }
        }
        Ok(())
    }

    fn load(&self) -> Result<Mapping, CliError> {
        if !self.path.exists() {
            return Ok(Mapping::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, config: &Mapping) -> Result<(), CliError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        debug!(path = %self.path.display(), "dev config saved");
        Ok(())
    }
}

/// Dotted keys address nested mappings.
fn set_path(config: &mut Mapping, key: &str, value: Value) -> Result<(), CliError> {
    let mut parts = key.split('.').peekable();
    let mut current = config;
    while let Some(part) = parts.next() {
        if part.is_empty() {
            return Err(CliError::InvalidArgument(format!("invalid key \"{key}\"")));
        }
        let name = Value::String(part.to_string());
        if parts.peek().is_none() {
            current.insert(name, value);
            return Ok(());
        }
        let entry = current
            .entry(name)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !entry.is_mapping() {
            *entry = Value::Mapping(Mapping::new());
        }
        current = match entry {
            Value::Mapping(map) => map,
            _ => return Err(CliError::InvalidArgument(format!("invalid key \"{key}\""))),
        };
    }
    Ok(())
}

fn unset_path(config: &mut Mapping, key: &str) {
    match key.split_once('.') {
        Some((head, rest)) => {
            if let Some(Value::Mapping(child)) = config.get_mut(head) {
                unset_path(child, rest);
                if child.is_empty() {
                    config.remove(head);
                }
            }
        }
        None => {
            config.remove(key);
        }
    }
}
