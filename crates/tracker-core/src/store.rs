//! In-memory token store.
//!
//! [`MemoryTokenStore`] is the [`TokenAuthorizer`] used when tokens are
//! provisioned statically through configuration. Reads take a shared lock and
//! never wait on each other.

use crate::capability::{BoxFuture, TokenAuthorizer};
use crate::error::AuthorizerError;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Set of authorized tracking tokens held in memory.
///
/// # Example
///
/// ```
/// use tracker_core::MemoryTokenStore;
///
/// let store = MemoryTokenStore::from_tokens(["site-a", "site-b"]);
/// assert!(store.contains("site-a"));
///
/// store.revoke("site-a");
/// assert!(!store.contains("site-a"));
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<HashSet<String>>,
}

impl MemoryTokenStore {
    /// Creates an empty store. Every token is unauthorized.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given tokens.
    ///
    /// Empty strings are skipped.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let tokens = tokens
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.is_empty())
            .collect();
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    /// Authorizes a token. Returns false if it was already present.
    pub fn insert(&self, token: impl Into<String>) -> bool {
        self.tokens.write().insert(token.into())
    }

    /// Revokes a token. Returns false if it was not present.
    pub fn revoke(&self, token: &str) -> bool {
        self.tokens.write().remove(token)
    }

    /// Returns true if the token is authorized.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.read().contains(token)
    }

    /// Returns the number of authorized tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    /// Returns true if no token is authorized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

impl TokenAuthorizer for MemoryTokenStore {
    fn is_token_authorized<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<bool, AuthorizerError>> {
        Box::pin(async move { Ok(self.contains(token)) })
    }
}
