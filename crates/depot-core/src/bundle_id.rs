//! Bundle identifier validation.
//!
//! A bundle identifier has exactly three dot-separated parts:
//! `com.<owner>.<app>`, where owner and app are one or more of `[A-Za-z0-9-]`.
//!
//! ```
//! use depot_core::validate_bundle_id;
//!
//! assert!(validate_bundle_id("com.alice.todo"));
//! assert!(!validate_bundle_id("com.alice"));
//! assert!(!validate_bundle_id("org.alice.todo"));
//! assert!(!validate_bundle_id("com.alice.todo.extra"));
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Denial;

const BUNDLE_ID_PATTERN: &str = r"^com\.[A-Za-z0-9-]+\.[A-Za-z0-9-]+$";

fn bundle_id_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(BUNDLE_ID_PATTERN).unwrap())
}

/// Whether `id` has the `com.<owner>.<app>` shape.
pub fn validate_bundle_id(id: &str) -> bool {
    bundle_id_regex().is_match(id)
}

/// Outcome of the reserved namespace lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceCheck {
    /// Identifier is outside every reserved namespace.
    Open,

    /// Identifier starts with a reserved prefix. Still admitted.
    Reserved { prefix: String },
}

impl NamespaceCheck {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved { .. })
    }
}

/// Look up `id` against the reserved namespaces.
///
/// Plain prefix match, so `com.relayer.app` falls under `com.relay`.
/// Reserved identifiers are not rejected; there is no submitter identity to
/// check ownership against.
pub fn namespace_check(id: &str, reserved_prefixes: &[String]) -> NamespaceCheck {
    reserved_prefixes
        .iter()
        .find(|prefix| id.starts_with(prefix.as_str()))
        .map_or(NamespaceCheck::Open, |prefix| NamespaceCheck::Reserved {
            prefix: prefix.clone(),
        })
}

/// A validated bundle identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BundleId(String);

impl BundleId {
    /// Parse and validate an identifier.
    pub fn parse(id: &str) -> Result<Self, Denial> {
        if validate_bundle_id(id) {
            Ok(Self(id.to_string()))
        } else {
            Err(Denial::InvalidBundleId {
                bundle_id: id.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Owner segment (`alice` in `com.alice.todo`).
    pub fn owner(&self) -> &str {
        self.0.split('.').nth(1).unwrap_or_default()
    }

    /// App segment (`todo` in `com.alice.todo`).
    pub fn app(&self) -> &str {
        self.0.split('.').nth(2).unwrap_or_default()
    }
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BundleId {
    type Err = Denial;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for BundleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
