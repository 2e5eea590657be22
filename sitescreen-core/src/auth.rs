//! Access gate checked before any provider call is made.
//!
//! Verification sits behind [`CredentialVerifier`] so a deployment can back
//! it with a real identity service. [`CredentialTable`] is the simple
//! configuration-loaded implementation used by the command line tool.

use std::collections::BTreeMap;

use log::{info, warn};
use thiserror::Error;

/// Outcome of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The credentials identify a known user.
    Granted,
    /// The credentials were rejected.
    Denied,
}

/// Errors raised by the [`AccessGate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The username or password was not recognised.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// A guarded operation was attempted before logging in.
    #[error("login required before running an analysis")]
    NotLoggedIn,
}

/// Check a username and password.
pub trait CredentialVerifier {
    /// Decide whether `username` may log in with `password`.
    fn verify(&self, username: &str, password: &str) -> AccessDecision;
}

/// Username to password table.
///
/// # Examples
/// ```
/// use sitescreen_core::{AccessDecision, CredentialTable, CredentialVerifier};
///
/// let table = CredentialTable::default().with_user("surveyor", "s3cret");
/// assert_eq!(table.verify("surveyor", "s3cret"), AccessDecision::Granted);
/// assert_eq!(table.verify("surveyor", "guess"), AccessDecision::Denied);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CredentialTable {
    users: BTreeMap<String, String>,
}

impl CredentialTable {
    /// Add or replace a user.
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Report whether the table has no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl<U, P> FromIterator<(U, P)> for CredentialTable
where
    U: Into<String>,
    P: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (U, P)>>(iter: I) -> Self {
        Self {
            users: iter
                .into_iter()
                .map(|(username, password)| (username.into(), password.into()))
                .collect(),
        }
    }
}

impl CredentialVerifier for CredentialTable {
    fn verify(&self, username: &str, password: &str) -> AccessDecision {
        let known = !username.is_empty()
            && self
                .users
                .get(username)
                .is_some_and(|expected| expected == password);
        if known {
            AccessDecision::Granted
        } else {
            AccessDecision::Denied
        }
    }
}

/// Session-scoped login state.
///
/// # Examples
/// ```
/// use sitescreen_core::{AccessError, AccessGate, CredentialTable};
///
/// let mut gate = AccessGate::new(CredentialTable::default().with_user("admin", "pw"));
/// assert_eq!(gate.require_login(), Err(AccessError::NotLoggedIn));
/// gate.login("admin", "pw")?;
/// assert!(gate.require_login().is_ok());
/// # Ok::<(), AccessError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate<V> {
    verifier: V,
    user: Option<String>,
}

impl<V: CredentialVerifier> AccessGate<V> {
    /// Create a gate with nobody logged in.
    pub const fn new(verifier: V) -> Self {
        Self {
            verifier,
            user: None,
        }
    }

    /// Log `username` in.
    ///
    /// A failed attempt leaves any previous login in place.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidCredentials`] when the verifier denies
    /// access.
    pub fn login(&mut self, username: &str, password: &str) -> Result<(), AccessError> {
        match self.verifier.verify(username, password) {
            AccessDecision::Granted => {
                info!("user '{username}' logged in");
                self.user = Some(username.to_owned());
                Ok(())
            }
            AccessDecision::Denied => {
                warn!("rejected login for '{username}'");
                Err(AccessError::InvalidCredentials)
            }
        }
    }

    /// Log the current user out.
    pub fn logout(&mut self) {
        self.user = None;
    }

    /// The logged-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Fail unless a user is logged in.
    ///
    /// # Errors
    /// Returns [`AccessError::NotLoggedIn`] before a successful login.
    pub const fn require_login(&self) -> Result<(), AccessError> {
        if self.user.is_some() {
            Ok(())
        } else {
            Err(AccessError::NotLoggedIn)
        }
    }
}
