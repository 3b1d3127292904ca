//! Credentials passed to adapters and the request executor.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};

/// Credential entry that vendors accept as a query parameter.
pub const API_TOKEN: &str = "api_token";

/// Credential entry holding an OAuth/private-app bearer token.
pub const ACCESS_TOKEN: &str = "access_token";

/// Named secrets (`access_token`, `api_token`, ...).
///
/// Implements `Debug` manually so values never reach logs.
#[derive(Clone, Default)]
pub struct Credentials(BTreeMap<String, SecretString>);

impl Credentials {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials holding a single entry.
    #[must_use]
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut credentials = Self::new();
        credentials.insert(key, value);
        credentials
    }

    /// Parse `key=value,key2=value2`.
    ///
    /// Pairs without `=` are skipped; keys and values are trimmed.
    #[must_use]
    pub fn parse_pairs(input: &str) -> Self {
        input
            .split(',')
            .filter_map(|pair| pair.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0
            .insert(key.into(), SecretString::from(value.into()));
    }

    /// The secret value for `key`, exposed.
    #[must_use]
    pub fn expose(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(ExposeSecret::expose_secret)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Credentials
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut credentials = Self::new();
        for (key, value) in iter {
            credentials.insert(key, value);
        }
        credentials
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for key in self.0.keys() {
            map.entry(key, &"[REDACTED]");
        }
        map.finish()
    }
}
