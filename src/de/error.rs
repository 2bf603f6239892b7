// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
#![allow(missing_docs)]

use super::Visitor;
use crate::{LogicalType, TypeRef};

/// Type alias around a result.
pub type Result<T> = std::result::Result<T, Error>;

/// A deserialization error.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{kind}")]
#[diagnostic(forward(kind))]
pub struct Error {
    /// What went wrong.
    #[source]
    pub kind: Kind,
}

/// Error type for deserialization.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum Kind {
    /// The input was not valid json.
    #[error("Malformed json: {0}")]
    #[diagnostic(code(sequin::de::json))]
    Json(#[from] serde_json::Error),
    /// An empty string was read into a container and the configured coercion is `Fail`.
    #[error(
        "Cannot deserialize value of type `{target}` from empty String (\"\"): \
         coercion of empty strings into {logical:?} targets is disabled"
    )]
    #[diagnostic(
        code(sequin::de::empty_string),
        help("set the `EmptyString` coercion for this type to `AsEmpty` to read it as an empty value")
    )]
    EmptyStringCoercion {
        /// The declared type being read into.
        target: String,
        /// Its logical type.
        logical: LogicalType,
    },
    /// A custom error thrown by a visitor.
    #[error("{0}")]
    #[diagnostic(code(sequin::de::message))]
    Message(String),

    /// A key was requested twice in a row.
    #[error("Tried to deserialize a key without a value")]
    KeyAfterKey,
    /// A value was requested without its key.
    #[error("Tried to deserialize a value before its key")]
    ValueAfterValue,
}

/// What the deserializer actually found, for error messages.
#[derive(Clone, Copy, PartialEq, Debug)]
#[allow(missing_docs)]
pub enum Unexpected<'a> {
    /// `null`.
    Nil,
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Str(&'a str),
    Seq,
    Map,
    /// An empty string read into a container.
    Empty,
}

/// What a visitor expected, for error messages.
pub trait Expected {
    /// Write the expectation, e.g. "a sequence".
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result;
}

impl Expected for &str {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self)
    }
}

impl<'de, T> Expected for T
where
    T: Visitor<'de>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.expecting(f)
    }
}

impl<'a> std::fmt::Display for dyn Expected + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Expected::fmt(self, f)
    }
}

impl<'a> std::fmt::Display for Unexpected<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unexpected::Nil => f.write_str("null"),
            Unexpected::Bool(v) => write!(f, "boolean `{v}`"),
            Unexpected::Signed(v) => write!(f, "integer `{v}`"),
            Unexpected::Unsigned(v) => write!(f, "integer `{v}`"),
            Unexpected::Float(v) => write!(f, "float `{v}`"),
            Unexpected::Str(s) => write!(f, "string {s:?}"),
            Unexpected::Seq => f.write_str("sequence"),
            Unexpected::Map => f.write_str("map"),
            Unexpected::Empty => f.write_str("empty value"),
        }
    }
}

impl Error {
    /// A free-form error.
    pub fn custom(str: impl std::fmt::Display) -> Self {
        Error {
            kind: Kind::Message(str.to_string()),
        }
    }

    /// The input had the wrong type.
    pub fn invalid_type(unexpected: Unexpected<'_>, exp: &dyn Expected) -> Self {
        Self::custom(format!("invalid type: {unexpected}, expected {exp}"))
    }

    /// The input had the right type but an unusable value.
    pub fn invalid_value(unexpected: Unexpected<'_>, exp: &dyn Expected) -> Self {
        Self::custom(format!("invalid value: {unexpected}, expected {exp}"))
    }

    /// A sequence or map had the wrong number of entries.
    pub fn invalid_length(len: usize, exp: &dyn Expected) -> Self {
        Self::custom(format!("invalid length: {len}, expected {exp}"))
    }

    /// An empty string could not be coerced into `target`.
    pub fn empty_string(target: &TypeRef) -> Self {
        Error {
            kind: Kind::EmptyStringCoercion {
                target: target.name().to_string(),
                logical: target.logical(),
            },
        }
    }
}

impl From<Kind> for Error {
    fn from(kind: Kind) -> Self {
        Error { kind }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            kind: Kind::Json(value),
        }
    }
}
