//! # Parameter Store
//!
//! [`Params`] is the "currently selected values" half of faceted navigation:
//! an ordered list of `key=value` pairs, exactly as they appear in a URL query
//! string. Repeated keys are allowed and keep their order, which is how
//! many-valued filters store several active selections.
//!
//! ## Immutability
//!
//! Every mutator (`with_set`, `with_added`, `with_removed`, `without`) returns a
//! new store. A single request builds one `Params` from its query string and
//! derives one store per choice link from it, so "select" and "remove" links
//! never alias each other.
//!
//! ## Wire Format
//!
//! `application/x-www-form-urlencoded`, percent-encoded through
//! [`url::form_urlencoded`]. `decode(encode(s)) == s` holds for every store.
//!
//! ```text
//! status=open&tags=3&tags=7&published__year=2010
//! ```

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string. A leading `?` is accepted.
    ///
    /// Decoding never fails: malformed escapes are decoded lossily and any key
    /// no filter knows about is kept but ignored.
    pub fn decode(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: form_urlencoded::parse(raw.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    /// All values stored under `key`, in order.
    pub fn get(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Store with `key` holding exactly `value`.
    ///
    /// The pair takes the position of the first existing occurrence of `key`
    /// (or goes last), so links keep a stable parameter order.
    pub fn with_set(&self, key: &str, value: impl Into<String>) -> Self {
        let mut value = Some(value.into());
        let mut pairs = Vec::with_capacity(self.pairs.len() + 1);
        for (k, v) in &self.pairs {
            if k != key {
                pairs.push((k.clone(), v.clone()));
            } else if let Some(value) = value.take() {
                pairs.push((k.clone(), value));
            }
        }
        if let Some(value) = value {
            pairs.push((key.to_string(), value));
        }
        Self { pairs }
    }

    /// Store with `value` appended under `key` unless the pair already exists.
    pub fn with_added(&self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        if !self.pairs.iter().any(|(k, v)| k == key && *v == value) {
            next.pairs.push((key.to_string(), value));
        }
        next
    }

    /// Store without the `key=value` pair.
    pub fn with_removed(&self, key: &str, value: &str) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, v)| !(k == key && v == value))
                .cloned()
                .collect(),
        }
    }

    /// Store without any value for `key`.
    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Params {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::decode(s))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
