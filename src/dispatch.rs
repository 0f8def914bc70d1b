//! Runtime dispatch: structural matching of an input map against variant fingerprints.
//!
//! Variants are tried in declaration order and the first whose field sets
//! cover the input exactly wins:
//!
//! 1. every required field must be present, and
//! 2. every input key must be required or optional for the variant.
//!
//! This is not a most-specific match. When two variants both cover the input,
//! the one declared first is chosen even if the later one fits more tightly.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DecodeError;
use crate::types::json_type_name;
use crate::union::{Tag, UnionType, UnionValue};

/// Outcome of a dispatch that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Matched(UnionValue),
    NoMatch(NoMatch),
}

impl Dispatch {
    pub fn is_match(&self) -> bool {
        matches!(self, Dispatch::Matched(_))
    }

    pub fn matched(self) -> Option<UnionValue> {
        match self {
            Dispatch::Matched(value) => Some(value),
            Dispatch::NoMatch(_) => None,
        }
    }

    /// The tag of a match, if any.
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Dispatch::Matched(value) => Some(value.tag()),
            Dispatch::NoMatch(_) => None,
        }
    }
}

/// Why no variant accepted an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoMatch {
    /// Input keys, sorted.
    pub keys: Vec<String>,
    /// One entry per variant in declaration order.
    pub rejections: Vec<Rejection>,
}

impl std::fmt::Display for NoMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no oneOf option matches keys [{}]", self.keys.join(", "))?;
        for rejection in &self.rejections {
            write!(f, "; {}", rejection)?;
        }
        Ok(())
    }
}

/// A single variant's reasons for rejecting an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub tag: String,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.tag)?;
        if !self.missing.is_empty() {
            write!(f, " missing [{}]", self.missing.join(", "))?;
        }
        if !self.extra.is_empty() {
            write!(f, " unexpected [{}]", self.extra.join(", "))?;
        }
        Ok(())
    }
}

impl UnionType {
    /// Pick the first variant whose fingerprint covers `input` and decode into it.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` when the matched variant rejects the payload. Later
    /// variants are not tried in that case.
    pub fn from_value(&self, input: &Map<String, Value>) -> Result<Dispatch, DecodeError> {
        let keys: BTreeSet<&str> = input.keys().map(String::as_str).collect();
        let mut rejections = Vec::new();

        for (index, variant) in self.variants().iter().enumerate() {
            let missing = variant.missing(&keys);
            let extra = if missing.is_empty() {
                variant.extra(&keys)
            } else {
                Vec::new()
            };

            if missing.is_empty() && extra.is_empty() {
                tracing::debug!(
                    union = self.name(),
                    tag = variant.tag_name(),
                    "oneOf option matched"
                );
                let payload = variant.type_handle().materialize(input)?;
                let tag = Tag::new(index, variant.tag_name());
                return Ok(Dispatch::Matched(UnionValue::new(tag, payload)));
            }

            tracing::debug!(
                union = self.name(),
                tag = variant.tag_name(),
                ?missing,
                ?extra,
                "oneOf option rejected"
            );
            rejections.push(Rejection {
                tag: variant.tag_name().to_string(),
                missing: missing.into_iter().map(String::from).collect(),
                extra: extra.into_iter().map(String::from).collect(),
            });
        }

        Ok(Dispatch::NoMatch(NoMatch {
            keys: keys.into_iter().map(String::from).collect(),
            rejections,
        }))
    }

    /// [`from_value`](Self::from_value) for an arbitrary JSON value.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::NotAnObject` unless `input` is a JSON object.
    pub fn from_json(&self, input: &Value) -> Result<Dispatch, DecodeError> {
        match input {
            Value::Object(map) => self.from_value(map),
            other => Err(DecodeError::NotAnObject {
                actual: json_type_name(other).to_string(),
            }),
        }
    }
}
