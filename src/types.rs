// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::borrow::Cow;

/// The coarse category of a declared type.
///
/// Coercion rules are keyed on this rather than on concrete types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum LogicalType {
    /// Fixed-layout sequences, like `[i32]` or `Box<[String]>`.
    Array,
    /// Growable sequences, like `Vec<T>`.
    Collection,
    /// Key/value containers.
    Map,
    /// Structured records with named fields.
    Pojo,
    /// Anything at all (a dynamic value).
    Untyped,
    /// Integral numbers.
    Integer,
    /// Floating point numbers.
    Float,
    /// Booleans.
    Boolean,
    /// Enumerations read from their names.
    Enum,
    /// Strings.
    Textual,
    /// Scalars that fit none of the above.
    OtherScalar,
}

impl LogicalType {
    /// Is this a sequence or mapping shape?
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Collection | Self::Map)
    }
}

/// A description of a declared or runtime type.
///
/// Names come from [`std::any::type_name`] unless given explicitly,
/// so they are meant for messages and type ids, not for identity across builds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeRef {
    name: Cow<'static, str>,
    logical: LogicalType,
}

impl TypeRef {
    /// Create a descriptor with an explicit name.
    pub fn new(name: impl Into<Cow<'static, str>>, logical: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical,
        }
    }

    /// Describe the rust type `T`.
    pub fn of<T: ?Sized>(logical: LogicalType) -> Self {
        Self::new(std::any::type_name::<T>(), logical)
    }

    /// The full name of this type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with every module path stripped, including inside generic arguments.
    pub fn simple_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        // where the path segment currently being read starts in `out`
        let mut segment = 0;
        let mut chars = self.name.chars().peekable();
        while let Some(c) = chars.next() {
            if c == ':' && chars.peek() == Some(&':') {
                chars.next();
                out.truncate(segment);
            } else {
                out.push(c);
                if !(c.is_alphanumeric() || c == '_') {
                    segment = out.len();
                }
            }
        }
        out
    }

    /// The logical category of this type.
    pub fn logical(&self) -> LogicalType {
        self.logical
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
