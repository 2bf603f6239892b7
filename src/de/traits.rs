// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{error::Unexpected, Error, Result};
use crate::TypeRef;

/// A type that can be read out of a [`Deserializer`].
pub trait Deserialize<'de>: Sized {
    /// Read a value from `deserializer`.
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: Deserializer<'de>;

    /// The declared type this impl reads, if it takes part in coercion.
    fn declared_type() -> Option<TypeRef> {
        None
    }
}

/// A [`Deserialize`] that does not borrow from its input.
pub trait DeserializeOwned: for<'de> Deserialize<'de> {}

impl<T> DeserializeOwned for T where T: for<'de> Deserialize<'de> {}

/// A source of values. Drives a [`Visitor`] with whatever it finds.
pub trait Deserializer<'de>: Sized {
    /// Hand the next value to `visitor`.
    fn deserialize<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>;

    /// Like [`Deserializer::deserialize`], but null goes to [`VisitorOption::visit_none`].
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: VisitorOption<'de>;
}

/// Builds a value from whatever the deserializer hands it.
///
/// Every `visit_*` method errors with an invalid type by default.
pub trait Visitor<'de>: Sized {
    type Value;

    /// Describe what this visitor expects, for error messages.
    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result;

    /// The type being produced.
    ///
    /// Deserializers use this to decide which coercions apply, so containers should always
    /// provide it.
    fn target(&self) -> Option<TypeRef> {
        None
    }

    // Primitives
    /// Called for null.
    fn visit_nil(self) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Nil, &self))
    }
    /// Called for a boolean.
    fn visit_bool(self, v: bool) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Bool(v), &self))
    }
    /// Called for an integer that fits in an `i64`.
    fn visit_i64(self, v: i64) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Signed(v), &self))
    }
    /// Called for a positive integer too large for an `i64`.
    fn visit_u64(self, v: u64) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Unsigned(v), &self))
    }
    /// Called for any other number.
    fn visit_f64(self, v: f64) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Float(v), &self))
    }
    /// Called for a string.
    fn visit_str(self, v: &'de str) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Str(v), &self))
    }

    // Collections
    /// Called for an array.
    fn visit_seq<A>(self, seq: A) -> Result<Self::Value>
    where
        A: SeqAccess<'de>,
    {
        Err(Error::invalid_type(Unexpected::Seq, &self))
    }
    /// Called for an object.
    fn visit_map<A>(self, map: A) -> Result<Self::Value>
    where
        A: MapAccess<'de>,
    {
        Err(Error::invalid_type(Unexpected::Map, &self))
    }

    /// Produce an empty instance of the target, used by `AsEmpty` coercions.
    fn visit_empty(self) -> Result<Self::Value> {
        Err(Error::invalid_type(Unexpected::Empty, &self))
    }
}

/// A visitor for optional values.
pub trait VisitorOption<'de> {
    type Value;

    /// The type wrapped by the option.
    fn target(&self) -> Option<TypeRef> {
        None
    }

    /// Called for null.
    fn visit_none(self) -> Result<Self::Value>;

    /// Called for anything else, with a deserializer positioned on it.
    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value>
    where
        D: Deserializer<'de>;
}

/// Gives a visitor the elements of a sequence, one at a time.
pub trait SeqAccess<'de> {
    /// The next element, or `None` at the end.
    fn next_element<T>(&mut self) -> Result<Option<T>>
    where
        T: Deserialize<'de>;

    /// Total number of elements.
    fn len(&self) -> usize;

    /// How many elements have been read.
    fn index(&self) -> usize;
}

/// Gives a visitor the entries of a map, one at a time.
pub trait MapAccess<'de> {
    /// The next key, or `None` at the end.
    fn next_key<K>(&mut self) -> Result<Option<K>>
    where
        K: Deserialize<'de>;

    /// The value for the last key.
    fn next_value<V>(&mut self) -> Result<V>
    where
        V: Deserialize<'de>;

    /// The next key and its value, or `None` at the end.
    fn next_entry<K, V>(&mut self) -> Result<Option<(K, V)>>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
    {
        if let Some(k) = self.next_key()? {
            self.next_value().map(|v| Some((k, v)))
        } else {
            Ok(None)
        }
    }

    /// Total number of entries.
    fn len(&self) -> usize;

    /// How many entries have been read.
    fn index(&self) -> usize;
}

impl<'de, 'a, A> MapAccess<'de> for &'a mut A
where
    A: MapAccess<'de>,
{
    fn next_key<K>(&mut self) -> Result<Option<K>>
    where
        K: Deserialize<'de>,
    {
        (**self).next_key()
    }

    fn next_value<V>(&mut self) -> Result<V>
    where
        V: Deserialize<'de>,
    {
        (**self).next_value()
    }

    fn next_entry<K, V>(&mut self) -> Result<Option<(K, V)>>
    where
        K: Deserialize<'de>,
        V: Deserialize<'de>,
    {
        (**self).next_entry()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn index(&self) -> usize {
        (**self).index()
    }
}

impl<'de, 'a, A> SeqAccess<'de> for &'a mut A
where
    A: SeqAccess<'de>,
{
    fn next_element<T>(&mut self) -> Result<Option<T>>
    where
        T: Deserialize<'de>,
    {
        (**self).next_element()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn index(&self) -> usize {
        (**self).index()
    }
}
