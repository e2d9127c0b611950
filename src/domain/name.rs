// Copyright (c) 2025 - Cowboy AI, Inc.
//! Domain Name Value Object with DNS Validation Invariants

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Domain name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainNameError {
    #[error("Domain name is empty")]
    Empty,

    #[error("Domain name exceeds maximum length of 253 characters: {0}")]
    TooLong(usize),

    #[error("Domain name needs at least two labels: {0}")]
    SingleLabel(String),

    #[error("Empty label in domain name: {0}")]
    EmptyLabel(String),

    #[error("Label exceeds maximum length of 63 characters: {0}")]
    LabelTooLong(String),

    #[error("Invalid character in domain name: {0}")]
    InvalidCharacter(char),

    #[error("Label cannot start or end with hyphen: {0}")]
    InvalidLabelFormat(String),

    #[error("Top-level label cannot be all numeric: {0}")]
    NumericTopLevel(String),
}

/// Fully qualified, canonical domain name
///
/// Invariants:
/// - Lower-case
/// - Total length ≤ 253 characters, at least two labels
/// - Each label 1..=63 characters of `[a-z0-9-]`, no leading/trailing hyphen
/// - Top-level label is not all numeric
///
/// ```rust
/// use cim_cf_domain::domain::DomainName;
///
/// let name = DomainName::new("Dev.Example.com").unwrap();
/// assert_eq!(name.as_str(), "dev.example.com");
/// assert_eq!(name.split_first(), ("dev", "example.com"));
///
/// assert!(DomainName::new("localhost").is_err());
/// assert!(DomainName::new("-bad.example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DomainName(String);

impl DomainName {
    /// Maximum total length (RFC 1123)
    pub const MAX_LENGTH: usize = 253;

    /// Maximum length for a single label (RFC 1123)
    pub const MAX_LABEL_LENGTH: usize = 63;

    /// Validate and canonicalize a fully qualified name
    pub fn new(name: impl Into<String>) -> Result<Self, DomainNameError> {
        let name = name.into().trim().to_ascii_lowercase();

        if name.is_empty() {
            return Err(DomainNameError::Empty);
        }
        if name.len() > Self::MAX_LENGTH {
            return Err(DomainNameError::TooLong(name.len()));
        }

        let labels: Vec<&str> = name.split('.').collect();
        if labels.len() < 2 {
            return Err(DomainNameError::SingleLabel(name));
        }
        for label in &labels {
            Self::validate_label(label, &name)?;
        }

        // Safe: at least two labels checked above
        let tld = labels[labels.len() - 1];
        if tld.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainNameError::NumericTopLevel(tld.to_string()));
        }

        Ok(Self(name))
    }

    /// Join a sub-domain onto a parent domain and validate the result
    pub fn join(sub_domain: &str, domain: &str) -> Result<Self, DomainNameError> {
        let sub_domain = sub_domain.trim();
        let domain = domain.trim();
        if sub_domain.is_empty() {
            return Err(DomainNameError::EmptyLabel(format!(".{}", domain)));
        }
        Self::new(format!("{}.{}", sub_domain, domain))
    }

    fn validate_label(label: &str, name: &str) -> Result<(), DomainNameError> {
        if label.is_empty() {
            return Err(DomainNameError::EmptyLabel(name.to_string()));
        }
        if label.len() > Self::MAX_LABEL_LENGTH {
            return Err(DomainNameError::LabelTooLong(label.to_string()));
        }
        if let Some(ch) = label
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && *ch != '-')
        {
            return Err(DomainNameError::InvalidCharacter(ch));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(DomainNameError::InvalidLabelFormat(label.to_string()));
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split at the first dot into `(sub_domain, domain)`
    pub fn split_first(&self) -> (&str, &str) {
        // Invariant: at least two labels, so a dot is always present
        self.0.split_once('.').unwrap_or((self.0.as_str(), ""))
    }

    /// Whether `sub_domain` + "." + `domain` spells this name
    pub fn is_joined_from(&self, sub_domain: &str, domain: &str) -> bool {
        self.0.len() == sub_domain.len() + 1 + domain.len()
            && self.0.starts_with(&sub_domain.to_ascii_lowercase())
            && self.0.ends_with(&domain.to_ascii_lowercase())
            && self.0.as_bytes()[sub_domain.len()] == b'.'
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DomainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for DomainName {
    type Error = DomainNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DomainName> for String {
    fn from(name: DomainName) -> Self {
        name.0
    }
}
