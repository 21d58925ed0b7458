use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("could not read credentials file: {0}")]
    Io(#[from] io::Error),
    #[error("credentials file is not valid: {0}")]
    Format(#[from] serde_json::Error),
}

/// Site login. `Debug` never shows the password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(rename = "Username", alias = "username")]
    pub username: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Load `{"Username": ..., "Password": ...}` from a JSON file.
pub fn load_credentials(path: &Path) -> Result<Credentials, CredentialsError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
