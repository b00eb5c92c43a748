//! Content signatures for captured notice markup.
//!
//! Expectations store a base64 SHA-256 of the notice markup instead of the
//! markup itself. Identical markup always yields the same signature and any
//! byte-level change yields a different one.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::engine::Detection;

/// Base64-encoded SHA-256 digest of notice markup (44 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentSignature(String);

impl ContentSignature {
    /// Computes the signature of `markup`.
    #[must_use]
    pub fn of(markup: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(markup.as_bytes());
        Self(STANDARD.encode(hasher.finalize()))
    }

    /// The encoded digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for ContentSignature {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ContentSignature {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A detection reduced to the values expectations are compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalResult {
    /// Signature of the notice markup; `None` when nothing was identified.
    pub signature: Option<ContentSignature>,
    /// Hideable element range of the notice, if any.
    pub hideable_element_range: Option<u32>,
    /// Scroll-blocking verdict, passed through unchanged.
    pub scroll_blocked: bool,
}

/// Reduces a detection to its comparable form.
#[must_use]
pub fn canonicalize(detection: &Detection) -> CanonicalResult {
    CanonicalResult {
        signature: detection
            .notice
            .as_ref()
            .map(|notice| ContentSignature::of(&notice.markup_inner)),
        hideable_element_range: detection
            .notice
            .as_ref()
            .map(|notice| notice.hideable_element_range),
        scroll_blocked: detection.scroll_blocked,
    }
}
