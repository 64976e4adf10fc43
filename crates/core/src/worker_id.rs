// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identifier.
//!
//! Format is `wkr-{nanoid}` with a 19 character random suffix: 23
//! characters total, which fits `SmolStr` inline capacity. Ids are
//! generated once at worker startup and never reused.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a worker instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub SmolStr);

impl WorkerId {
    pub const PREFIX: &'static str = "wkr-";

    /// Generate a new random id with the type prefix.
    pub fn generate() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    /// Create an id from an existing string (parsing/deserialization).
    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id suffix without the `wkr-` prefix.
    pub fn suffix(&self) -> &str {
        self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0)
    }

    /// Suffix truncated to at most `n` characters, for log/table display.
    pub fn short(&self, n: usize) -> &str {
        let suffix = self.suffix();
        let end = std::cmp::min(n, suffix.len());
        &suffix[..end]
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(s: &str) -> Self {
        Self::from_string(s)
    }
}

impl From<String> for WorkerId {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl AsRef<str> for WorkerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for WorkerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WorkerId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for WorkerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "worker_id_tests.rs"]
mod tests;
