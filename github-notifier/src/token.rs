use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::AppError;

/// Resolves the API token from an environment variable, falling back to a file.
///
/// Nothing is cached; every call re-reads both sources.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    env_var: String,
    fallback: PathBuf,
}

impl TokenProvider {
    pub fn new(env_var: impl Into<String>, fallback: impl Into<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            fallback: fallback.into(),
        }
    }

    pub fn resolve(&self) -> Result<String, AppError> {
        if let Ok(token) = std::env::var(&self.env_var)
            && !token.is_empty()
        {
            debug!(source = %self.env_var, "token resolved from environment");
            return Ok(token);
        }

        let raw = std::fs::read_to_string(&self.fallback).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::NotFound => "file not found".to_string(),
                _ => e.to_string(),
            };
            self.missing(reason)
        })?;
        // editors leave a trailing newline; anything else is passed through verbatim
        let token = raw.trim_end_matches(['\r', '\n']);
        if token.trim().is_empty() {
            return Err(self.missing("file is empty".to_string()));
        }
        debug!(source = %self.fallback.display(), "token resolved from file");
        Ok(token.to_string())
    }

    fn missing(&self, reason: String) -> AppError {
        AppError::CredentialMissing {
            path: self.fallback.clone(),
            reason,
        }
    }
}
