// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Anchorlink and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{ElementId, IdError};

/// Collection segment every element reference starts with.
pub const ELEMENT_URI_PREFIX: &str = "DocumentElements";

/// Stable reference to one document element.
///
/// Canonical format: `DocumentElements/<element_id>`. Persisted data also carries a
/// `/DocumentElements/<element_id>` spelling, which parses to the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUri {
    element_id: ElementId,
}

impl SourceUri {
    pub fn new(element_id: ElementId) -> Self {
        Self { element_id }
    }

    pub fn element_id(&self) -> ElementId {
        self.element_id
    }

    pub fn parse(input: &str) -> Result<Self, ParseSourceUriError> {
        let rest = normalize(input.trim())
            .strip_prefix(ELEMENT_URI_PREFIX)
            .ok_or(ParseSourceUriError::MissingPrefix)?;
        let raw_id = rest.strip_prefix('/').ok_or(ParseSourceUriError::MissingElementId)?;
        if raw_id.is_empty() {
            return Err(ParseSourceUriError::MissingElementId);
        }
        let element_id =
            raw_id.parse::<ElementId>().map_err(ParseSourceUriError::InvalidElementId)?;
        Ok(Self { element_id })
    }

    /// Canonical form first, then the leading-slash form.
    pub fn spellings(&self) -> [String; 2] {
        let canonical = self.to_string();
        let slashed = format!("/{canonical}");
        [canonical, slashed]
    }
}

/// Strips a single leading slash; persisted URIs use both spellings.
pub fn normalize(uri: &str) -> &str {
    uri.strip_prefix('/').unwrap_or(uri)
}

/// Both accepted spellings of `uri`, starting with `uri` itself.
pub fn alternate_spellings(uri: &str) -> [String; 2] {
    let normalized = normalize(uri);
    if normalized.len() == uri.len() {
        [uri.to_owned(), format!("/{uri}")]
    } else {
        [uri.to_owned(), normalized.to_owned()]
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ELEMENT_URI_PREFIX}/{}", self.element_id)
    }
}

impl FromStr for SourceUri {
    type Err = ParseSourceUriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ElementId> for SourceUri {
    fn from(element_id: ElementId) -> Self {
        Self::new(element_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseSourceUriError {
    MissingPrefix,
    MissingElementId,
    InvalidElementId(IdError),
}

impl fmt::Display for ParseSourceUriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => write!(f, "source uri must start with '{ELEMENT_URI_PREFIX}/'"),
            Self::MissingElementId => f.write_str("source uri is missing element id"),
            Self::InvalidElementId(err) => write!(f, "invalid element id: {err}"),
        }
    }
}

impl std::error::Error for ParseSourceUriError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidElementId(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{alternate_spellings, ParseSourceUriError, SourceUri};
    use crate::model::ElementId;

    #[test]
    fn parses_both_spellings_to_the_canonical_form() {
        for s in ["DocumentElements/17", "/DocumentElements/17", " DocumentElements/17 "] {
            let parsed: SourceUri = s.parse().expect("parse");
            assert_eq!(parsed.element_id(), ElementId::new(17));
            assert_eq!(parsed.to_string(), "DocumentElements/17");
        }
    }

    #[test]
    fn spellings_cover_leading_slash_variant() {
        let uri = SourceUri::new(ElementId::new(3));
        assert_eq!(
            uri.spellings(),
            ["DocumentElements/3".to_owned(), "/DocumentElements/3".to_owned()]
        );
        assert_eq!(
            alternate_spellings("/DocumentElements/3"),
            ["/DocumentElements/3".to_owned(), "DocumentElements/3".to_owned()]
        );
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "Documents/3".parse::<SourceUri>().unwrap_err();
        assert_eq!(err, ParseSourceUriError::MissingPrefix);
    }

    #[test]
    fn rejects_missing_element_id() {
        let err = "DocumentElements/".parse::<SourceUri>().unwrap_err();
        assert_eq!(err, ParseSourceUriError::MissingElementId);

        let err = "DocumentElements".parse::<SourceUri>().unwrap_err();
        assert_eq!(err, ParseSourceUriError::MissingElementId);
    }

    #[test]
    fn rejects_non_numeric_element_id() {
        let err = "DocumentElements/abc".parse::<SourceUri>().unwrap_err();
        assert!(matches!(err, ParseSourceUriError::InvalidElementId(_)));
    }
}
