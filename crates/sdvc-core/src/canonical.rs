//! # Canonical Serialization
//!
//! `CanonicalBytes` is the byte sequence every proof in the engine is
//! computed over. Issuers sign it, verifiers rebuild it from the received
//! JSON and check the signature against it.
//!
//! ## Security Invariant
//!
//! The inner buffer is private and the only constructor runs the full
//! pipeline: float rejection, then RFC 8785 (JCS) serialization with sorted
//! keys and compact separators. A function that needs signable bytes takes
//! `&CanonicalBytes`, so there is no way to hand it a pretty-printed or
//! insertion-ordered rendering by mistake.
//!
//! Floats are rejected rather than normalized: two JSON libraries may print
//! the same `f64` differently, and a verifier on another stack would then
//! fail to reproduce the signed bytes.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization of a float-free value.
///
/// # Invariants
///
/// - The only constructors are [`CanonicalBytes::new()`] and
///   [`CanonicalBytes::from_value()`].
/// - No number in the encoded document is a float (`1.0` included).
/// - Object keys are sorted, separators are compact (RFC 8785).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains a
    /// float, or `SerializationFailed` if serde cannot render it.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        Self::from_value(value)
    }

    /// Canonicalize an already-parsed JSON tree.
    ///
    /// Verifiers use this directly on the received document so that the
    /// bytes they check are derived from what was sent, not from a typed
    /// re-serialization of it.
    pub fn from_value(value: Value) -> Result<Self, CanonicalizationError> {
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Walk the tree and fail on the first float.
fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}
