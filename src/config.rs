// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Storykeep-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Storykeep and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor settings loaded from a JSON file.

use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_SLUG_MAX_LEN: usize = 50;
const MIN_SLUG_MAX_LEN: usize = 8;
const MAX_DEBOUNCE_MS: u64 = 60_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Settle delay for coalesced form writes.
    pub debounce_ms: u64,
    pub slug_max_len: usize,
    /// Responsive prefix emitted for tablet classes in auto mode.
    pub tablet_prefix: String,
    pub desktop_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            slug_max_len: DEFAULT_SLUG_MAX_LEN,
            tablet_prefix: "md".to_owned(),
            desktop_prefix: "xl".to_owned(),
        }
    }
}

impl EditorConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => Self::from_json_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tablet_prefix.trim().is_empty() || self.desktop_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid("responsive prefixes must not be empty".to_owned()));
        }
        if self.tablet_prefix == self.desktop_prefix {
            return Err(ConfigError::Invalid(format!(
                "tablet and desktop prefixes must differ (both '{}')",
                self.tablet_prefix
            )));
        }
        if self.slug_max_len < MIN_SLUG_MAX_LEN {
            return Err(ConfigError::Invalid(format!(
                "slugMaxLen must be at least {MIN_SLUG_MAX_LEN} (got {})",
                self.slug_max_len
            )));
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "debounceMs must be at most {MAX_DEBOUNCE_MS} (got {})",
                self.debounce_ms
            )));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
