// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tunables for segmentation, link composition and navigation highlighting.
//!
//! Stored as JSON with every field optional; durations are milliseconds.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::retry::RetryPolicy;

pub const DEFAULT_PARTIAL_LINK_BODY: &str = "Partial link (to be completed)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnchorConfig {
    pub segmenter: SegmenterConfig,
    pub linking: LinkingConfig,
    pub highlight: HighlightConfig,
}

impl AnchorConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u64); 8] = [
            ("segmenter.long_prefix_chars", self.segmenter.long_prefix_chars as u64),
            ("segmenter.short_prefix_chars", self.segmenter.short_prefix_chars as u64),
            ("segmenter.suffix_chars", self.segmenter.suffix_chars as u64),
            ("segmenter.window_chars", self.segmenter.window_chars as u64),
            ("highlight.target_retry_attempts", u64::from(self.highlight.target_retry_attempts)),
            ("highlight.markup_retry_attempts", u64::from(self.highlight.markup_retry_attempts)),
            ("highlight.target_retry_base_ms", self.highlight.target_retry_base_ms),
            ("highlight.markup_retry_base_ms", self.highlight.markup_retry_base_ms),
        ];
        if let Some((field, _)) = checks.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { field });
        }
        if self.highlight.flash_class.is_empty() {
            return Err(ConfigError::EmptyClass { field: "highlight.flash_class" });
        }
        if self.highlight.segment_class.is_empty() {
            return Err(ConfigError::EmptyClass { field: "highlight.segment_class" });
        }
        Ok(())
    }
}

/// Probe sizes for the drift fallback chain, in chars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SegmenterConfig {
    pub long_prefix_chars: usize,
    pub short_prefix_chars: usize,
    pub suffix_chars: usize,
    pub window_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            long_prefix_chars: 50,
            short_prefix_chars: 20,
            suffix_chars: 50,
            window_chars: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkingConfig {
    pub allow_same_document_linking: bool,
    pub duplicate_window_ms: u64,
    pub partial_body: String,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            allow_same_document_linking: true,
            duplicate_window_ms: 500,
            partial_body: DEFAULT_PARTIAL_LINK_BODY.to_owned(),
        }
    }
}

impl LinkingConfig {
    pub fn duplicate_window(&self) -> Duration {
        Duration::from_millis(self.duplicate_window_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub target_retry_base_ms: u64,
    pub target_retry_attempts: u32,
    pub markup_retry_base_ms: u64,
    pub markup_retry_attempts: u32,
    pub stagger_ms: u64,
    pub flash_duration_ms: u64,
    pub flash_class: SmolStr,
    pub segment_class: SmolStr,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            target_retry_base_ms: 500,
            target_retry_attempts: 5,
            markup_retry_base_ms: 200,
            markup_retry_attempts: 10,
            stagger_ms: 120,
            flash_duration_ms: 3000,
            flash_class: SmolStr::new_static("link-flash"),
            segment_class: SmolStr::new_static("linked-text"),
        }
    }
}

impl HighlightConfig {
    /// Policy for waiting until targets can be located with a valid range.
    pub fn target_retry(&self) -> RetryPolicy {
        RetryPolicy::linear(
            Duration::from_millis(self.target_retry_base_ms),
            self.target_retry_attempts,
        )
    }

    /// Policy for waiting until an element's highlight sub-spans are rendered.
    pub fn markup_retry(&self) -> RetryPolicy {
        RetryPolicy::linear(
            Duration::from_millis(self.markup_retry_base_ms),
            self.markup_retry_attempts,
        )
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Zero { field: &'static str },
    EmptyClass { field: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid config json: {err}"),
            Self::Zero { field } => write!(f, "config field {field} must be greater than zero"),
            Self::EmptyClass { field } => write!(f, "config field {field} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}
