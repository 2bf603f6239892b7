// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
#![allow(missing_docs)]

/// Type alias around a result.
pub type Result<T> = std::result::Result<T, Error>;

/// A serialization error.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    #[source]
    pub kind: Kind,
}

/// Error type for serialization and serializer resolution.
#[derive(Debug, thiserror::Error)]
pub enum Kind {
    /// A format annotation named a feature that does not exist.
    #[error("Unknown format feature `{0}`")]
    UnknownFormatFeature(String),
    /// A format annotation both enabled and disabled the same feature.
    #[error("Format feature `{0}` is both enabled and disabled")]
    ConflictingFormatFeature(&'static str),
    /// An array or object was closed that was never opened.
    #[error("Tried to end {expected} while in {found}")]
    MismatchedEnd {
        /// The context the caller tried to close.
        expected: &'static str,
        /// The context actually open.
        found: &'static str,
    },
    /// A value was written inside an object where a field name was required.
    #[error("Expected a field name, got a value")]
    ExpectedFieldName,
    /// A field name was written outside of an object, or twice in a row.
    #[error("Unexpected field name `{0}`")]
    UnexpectedFieldName(String),
    /// A native type id was written to a writer that cannot represent one.
    #[error("This writer does not support native type ids")]
    NativeTypeIdUnsupported,
    /// `serde_json` failed to encode a scalar.
    #[error("Failed to encode json: {0}")]
    Json(#[from] serde_json::Error),
    /// The output could not be turned into a string.
    #[error("Output was not valid utf8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// A custom error.
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// A free-form error.
    pub fn custom(msg: impl std::fmt::Display) -> Self {
        Error {
            kind: Kind::Message(msg.to_string()),
        }
    }
}

impl From<Kind> for Error {
    fn from(kind: Kind) -> Self {
        Error { kind }
    }
}
