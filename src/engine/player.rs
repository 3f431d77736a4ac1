//! Player names as accepted at round start.

use std::fmt;

use serde::Serialize;

use crate::error::RoundError;

/// Longest accepted name, in characters.
pub const MAX_NAME_LEN: usize = 16;

/// A trimmed name of 1-16 characters from `[A-Za-z0-9_ ]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    /// Validate a raw name.
    ///
    /// Surrounding whitespace is trimmed first. Anything else that fails the
    /// length or charset rule is a [`RoundError::PreconditionFailed`].
    pub fn parse(raw: &str) -> Result<Self, RoundError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(RoundError::PreconditionFailed {
                reason: "player name is empty".to_string(),
            });
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(RoundError::PreconditionFailed {
                reason: format!("player name is longer than {} characters", MAX_NAME_LEN),
            });
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == ' '))
        {
            return Err(RoundError::PreconditionFailed {
                reason: format!("player name contains invalid character {:?}", bad),
            });
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
