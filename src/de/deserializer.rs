// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use serde_json::Value;

use super::{
    error::Unexpected, CoercionAction, CoercionConfigs, CoercionInputShape, Deserialize,
    DeserializerTrait, Error, Kind, MapAccess, Result, SeqAccess, Visitor, VisitorOption,
};
use crate::{LogicalType, TypeRef};

/// Reads values out of a parsed json document.
///
/// Borrows both the document and the coercion settings, so it is cheap to copy into nested
/// values.
#[derive(Debug, Clone, Copy)]
pub struct Deserializer<'de, 'c> {
    value: &'de Value,
    coercions: &'c CoercionConfigs,
}

impl<'de, 'c> Deserializer<'de, 'c> {
    /// Read from `value`, applying `coercions`.
    pub fn new(value: &'de Value, coercions: &'c CoercionConfigs) -> Self {
        Self { value, coercions }
    }

    /// The coercion action for an empty string read into `target`.
    ///
    /// Only containers consult the empty-string coercion; everything else reads the string
    /// as-is.
    fn empty_string_action(&self, target: Option<&TypeRef>) -> Option<CoercionAction> {
        let target = target.filter(|t| t.logical().is_container())?;
        let action = self
            .coercions
            .find_coercion(target.logical(), CoercionInputShape::EmptyString);
        if action != CoercionAction::Fail {
            tracing::debug!(value_type = %target, ?action, "coercing empty String");
        }
        Some(action)
    }

    fn deserialize_empty_string<V>(self, s: &'de str, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let target = visitor.target();
        match self.empty_string_action(target.as_ref()) {
            Some(CoercionAction::Fail) => {
                // only reachable with a container target
                let target = target.unwrap_or_else(|| TypeRef::new("?", LogicalType::Untyped));
                Err(Error::empty_string(&target))
            }
            Some(CoercionAction::AsEmpty) => visitor.visit_empty(),
            Some(CoercionAction::AsNull) => visitor.visit_nil(),
            Some(CoercionAction::TryConvert) | None => visitor.visit_str(s),
        }
    }
}

impl<'de, 'c> DeserializerTrait<'de> for Deserializer<'de, 'c> {
    fn deserialize<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_nil(),
            Value::Bool(v) => visitor.visit_bool(*v),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    visitor.visit_i64(v)
                } else if let Some(v) = n.as_u64() {
                    visitor.visit_u64(v)
                } else if let Some(v) = n.as_f64() {
                    visitor.visit_f64(v)
                } else {
                    Err(Error::custom(format!("unrepresentable number {n}")))
                }
            }
            Value::String(s) if s.is_empty() => self.deserialize_empty_string(s, visitor),
            Value::String(s) => visitor.visit_str(s),
            Value::Array(values) => visitor.visit_seq(Seq {
                iter: values.iter(),
                len: values.len(),
                index: 0,
                coercions: self.coercions,
            }),
            Value::Object(map) => visitor.visit_map(Map {
                iter: map.iter(),
                value: None,
                len: map.len(),
                index: 0,
                coercions: self.coercions,
            }),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: VisitorOption<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            Value::String(s) if s.is_empty() => {
                match self.empty_string_action(visitor.target().as_ref()) {
                    Some(CoercionAction::AsNull) => visitor.visit_none(),
                    _ => visitor.visit_some(self),
                }
            }
            _ => visitor.visit_some(self),
        }
    }
}

struct Seq<'de, 'c> {
    iter: std::slice::Iter<'de, Value>,
    len: usize,
    index: usize,
    coercions: &'c CoercionConfigs,
}

impl<'de, 'c> SeqAccess<'de> for Seq<'de, 'c> {
    fn next_element<T>(&mut self) -> Result<Option<T>>
    where
        T: Deserialize<'de>,
    {
        let Some(value) = self.iter.next() else {
            return Ok(None);
        };
        self.index += 1;
        T::deserialize(Deserializer::new(value, self.coercions)).map(Some)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn index(&self) -> usize {
        self.index
    }
}

struct Map<'de, 'c> {
    iter: serde_json::map::Iter<'de>,
    value: Option<&'de Value>,
    len: usize,
    index: usize,
    coercions: &'c CoercionConfigs,
}

impl<'de, 'c> MapAccess<'de> for Map<'de, 'c> {
    fn next_key<K>(&mut self) -> Result<Option<K>>
    where
        K: Deserialize<'de>,
    {
        if self.value.is_some() {
            return Err(Kind::KeyAfterKey.into());
        }
        let Some((key, value)) = self.iter.next() else {
            return Ok(None);
        };
        self.index += 1;
        self.value = Some(value);
        K::deserialize(KeyDeserializer { key }).map(Some)
    }

    fn next_value<V>(&mut self) -> Result<V>
    where
        V: Deserialize<'de>,
    {
        let Some(value) = self.value.take() else {
            return Err(Kind::ValueAfterValue.into());
        };
        V::deserialize(Deserializer::new(value, self.coercions))
    }

    fn len(&self) -> usize {
        self.len
    }

    fn index(&self) -> usize {
        self.index
    }
}

/// Reads a map key from its string form.
///
/// Json keys are always strings, so scalar targets get the key parsed for them.
struct KeyDeserializer<'de> {
    key: &'de str,
}

impl<'de> DeserializerTrait<'de> for KeyDeserializer<'de> {
    fn deserialize<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let key = self.key;
        let logical = visitor.target().map(|t| t.logical());
        match logical {
            Some(LogicalType::Integer) => {
                if let Ok(v) = key.parse::<i64>() {
                    visitor.visit_i64(v)
                } else if let Ok(v) = key.parse::<u64>() {
                    visitor.visit_u64(v)
                } else {
                    Err(Error::invalid_value(Unexpected::Str(key), &visitor))
                }
            }
            Some(LogicalType::Float) => match key.parse::<f64>() {
                Ok(v) => visitor.visit_f64(v),
                Err(_) => Err(Error::invalid_value(Unexpected::Str(key), &visitor)),
            },
            Some(LogicalType::Boolean) => match key {
                "true" => visitor.visit_bool(true),
                "false" => visitor.visit_bool(false),
                _ => Err(Error::invalid_value(Unexpected::Str(key), &visitor)),
            },
            _ => visitor.visit_str(key),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: VisitorOption<'de>,
    {
        visitor.visit_some(self)
    }
}
