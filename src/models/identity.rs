use serde::{Deserialize, Serialize};

/// A developer identity as reported by the source system
///
/// The email is optional: commits always carry one, but API-sourced records
/// (pull requests, reviews) frequently only expose a display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Display name (login or full name)
    pub name: String,

    /// Email address, when the source exposes it
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity with both name and email
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: Some(email.into()),
        }
    }

    /// Create an identity from a display name only
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    /// Normalized aggregation key for this identity
    ///
    /// Lowercased email when present, lowercased display name otherwise.
    /// The fallback order is a documented ambiguity: two contributors sharing
    /// a display name with no email set are conflated, and the same
    /// contributor appearing once with an email and once without is split.
    /// The data does not allow resolving either case.
    pub fn normalized_key(&self) -> String {
        match &self.email {
            Some(email) if !email.trim().is_empty() => email.trim().to_lowercase(),
            _ => self.name.trim().to_lowercase(),
        }
    }
}
