//! Credential references in `config.toml`.
//!
//! The clist username and API key and the Google client id and secret may
//! name where the value lives instead of holding it:
//!
//! - `env::VAR` reads `$VAR`
//! - `pass::entry` takes the first line of `pass show entry`
//! - anything else is the value itself

use std::process::Command;

use thiserror::Error;

/// A reference that could not be resolved.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("failed to run `pass show {entry}`: {source}")]
    PassSpawn {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pass show {entry}` failed ({status}): {stderr}")]
    PassFailed {
        entry: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("`pass show {0}` printed nothing")]
    PassEmpty(String),
}

/// Resolves `value`, expanding `env::` and `pass::` references.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(var) = value.strip_prefix("env::") {
        return std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()));
    }
    if let Some(entry) = value.strip_prefix("pass::") {
        return from_pass(entry);
    }
    Ok(value.to_string())
}

fn from_pass(entry: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .args(["show", entry])
        .output()
        .map_err(|source| SecretError::PassSpawn {
            entry: entry.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            entry: entry.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| SecretError::PassEmpty(entry.to_string()))
}
