//! Identity wrappers for harvest targets.

use super::error::HarvestError;

/// Organization name wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationName(String);

impl OrganizationName {
    /// Validates that the organization name is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Configuration`] when the supplied string is
    /// blank.
    pub fn new(value: impl AsRef<str>) -> Result<Self, HarvestError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HarvestError::Configuration {
                message: "organization name must not be empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the organization name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::MissingToken`] when the supplied string is
    /// blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, HarvestError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HarvestError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}
