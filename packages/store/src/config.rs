//! # Application configuration: `accounts.toml`
//!
//! Every tunable constant used by the record store and the validators lives in
//! one TOML document (filename: [`AccountsConfig::filename`] = `"accounts.toml"`).
//! Callers build an [`AccountsConfig`] once at start-up and hand the relevant
//! sections to [`crate::RecordStore`] and to the `api` crate's validator.
//!
//! ## Structure
//!
//! ```toml
//! [storage]
//! users_key = "users"
//! current_user_key = "current_user"
//! purged_usernames = ["admin"]
//!
//! [validation.password]
//! min_length = 8
//! max_length = 128
//! symbols = "@$!%*?&"
//!
//! [validation.username]
//! min_length = 3
//! max_length = 20
//! reserved = ["admin", "administrator", "root", "system", "test"]
//!
//! [validation.phone]
//! length = 10
//! prefixes = ["03", "05", "07", "08", "09"]
//!
//! [avatar]
//! max_bytes = 5242880
//! ```
//!
//! ## Types
//!
//! | Struct | Purpose |
//! |--------|---------|
//! | [`AccountsConfig`] | Top-level document with TOML (de)serialisation and file loading. |
//! | [`StorageConfig`] | Key names for the two persisted values, plus usernames purged on start-up. |
//! | [`ValidationConfig`] | Length limits, allowed symbols, reserved usernames and phone prefixes. |
//! | [`AvatarConfig`] | Size ceiling and accepted MIME types for avatar data URLs. |
//!
//! All structs derive `Default` with the production values, and every field is
//! `#[serde(default)]`, so a missing or partial file behaves like the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `accounts.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub avatar: AvatarConfig,
}

/// Where the record store keeps its two values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key holding the JSON array of users.
    pub users_key: String,
    /// Key holding the session pointer (`"null"` or a user id).
    pub current_user_key: String,
    /// Usernames (exact match) removed from the collection when the store opens.
    pub purged_usernames: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_key: "users".to_string(),
            current_user_key: "current_user".to_string(),
            purged_usernames: vec!["admin".to_string()],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub password: PasswordRules,
    pub username: UsernameRules,
    pub email: EmailRules,
    pub name: NameRules,
    pub phone: PhoneRules,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRules {
    pub min_length: usize,
    pub max_length: usize,
    /// At least one of these characters must appear in a password.
    pub symbols: String,
}

impl Default for PasswordRules {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            symbols: "@$!%*?&".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsernameRules {
    pub min_length: usize,
    pub max_length: usize,
    /// Compared against the lowercased username.
    pub reserved: Vec<String>,
}

impl Default for UsernameRules {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 20,
            reserved: ["admin", "administrator", "root", "system", "test"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRules {
    pub max_length: usize,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self { max_length: 254 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRules {
    pub min_length: usize,
    pub max_length: usize,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            min_length: 2,
            max_length: 50,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneRules {
    /// Exact number of digits after normalisation.
    pub length: usize,
    /// Accepted two-digit prefixes.
    pub prefixes: Vec<String>,
}

impl Default for PhoneRules {
    fn default() -> Self {
        Self {
            length: 10,
            prefixes: ["03", "05", "07", "08", "09"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarConfig {
    /// Maximum decoded image size in bytes.
    pub max_bytes: usize,
    pub allowed_types: Vec<String>,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            allowed_types: [
                "image/jpeg",
                "image/jpg",
                "image/png",
                "image/gif",
                "image/webp",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Errors from [`AccountsConfig::load`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl AccountsConfig {
    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "accounts.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::from_toml(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
