// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::{
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

use indexmap::IndexMap;

use super::{
    error::Unexpected, Deserialize, DeserializerTrait, Error, MapAccess, Result, SeqAccess,
    Visitor, VisitorOption,
};
use crate::{LogicalType, TypeRef};

macro_rules! primitive_int_impl {
    ($($int:ident),*) => {
        paste::paste! {
            $(
            struct [<$int:camel Visitor>];

            impl<'de> Visitor<'de> for [<$int:camel Visitor>] {
                type Value = $int;

                fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    formatter.write_str(concat!("an integer fitting in ", stringify!($int)))
                }

                fn target(&self) -> Option<TypeRef> {
                    $int::declared_type()
                }

                fn visit_i64(self, v: i64) -> Result<Self::Value> {
                    $int::try_from(v).map_err(|_| Error::invalid_value(Unexpected::Signed(v), &self))
                }

                fn visit_u64(self, v: u64) -> Result<Self::Value> {
                    $int::try_from(v).map_err(|_| Error::invalid_value(Unexpected::Unsigned(v), &self))
                }
            }

            impl<'de> Deserialize<'de> for $int {
                fn deserialize<D>(deserializer: D) -> Result<Self>
                where
                    D: DeserializerTrait<'de>,
                {
                    deserializer.deserialize([<$int:camel Visitor>])
                }

                fn declared_type() -> Option<TypeRef> {
                    Some(TypeRef::of::<$int>(LogicalType::Integer))
                }
            }
            )*
        }
    };
}

primitive_int_impl!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! primitive_float_impl {
    ($($float:ident),*) => {
        paste::paste! {
            $(
            struct [<$float:camel Visitor>];

            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            impl<'de> Visitor<'de> for [<$float:camel Visitor>] {
                type Value = $float;

                fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    formatter.write_str("a number")
                }

                fn target(&self) -> Option<TypeRef> {
                    $float::declared_type()
                }

                fn visit_i64(self, v: i64) -> Result<Self::Value> {
                    Ok(v as $float)
                }

                fn visit_u64(self, v: u64) -> Result<Self::Value> {
                    Ok(v as $float)
                }

                fn visit_f64(self, v: f64) -> Result<Self::Value> {
                    Ok(v as $float)
                }
            }

            impl<'de> Deserialize<'de> for $float {
                fn deserialize<D>(deserializer: D) -> Result<Self>
                where
                    D: DeserializerTrait<'de>,
                {
                    deserializer.deserialize([<$float:camel Visitor>])
                }

                fn declared_type() -> Option<TypeRef> {
                    Some(TypeRef::of::<$float>(LogicalType::Float))
                }
            }
            )*
        }
    };
}

primitive_float_impl!(f32, f64);

impl<'de> Deserialize<'de> for bool {
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        struct BoolVisitor;

        impl<'de> Visitor<'de> for BoolVisitor {
            type Value = bool;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a boolean")
            }

            fn target(&self) -> Option<TypeRef> {
                bool::declared_type()
            }

            fn visit_bool(self, v: bool) -> Result<Self::Value> {
                Ok(v)
            }
        }

        deserializer.deserialize(BoolVisitor)
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<bool>(LogicalType::Boolean))
    }
}

impl<'de> Deserialize<'de> for String {
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        struct StringVisitor;

        impl<'de> Visitor<'de> for StringVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a string")
            }

            fn target(&self) -> Option<TypeRef> {
                String::declared_type()
            }

            fn visit_str(self, v: &'de str) -> Result<Self::Value> {
                Ok(v.to_owned())
            }
        }

        deserializer.deserialize(StringVisitor)
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<String>(LogicalType::Textual))
    }
}

impl<'de> Deserialize<'de> for &'de str {
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        struct StrVisitor;

        impl<'de> Visitor<'de> for StrVisitor {
            type Value = &'de str;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("a borrowed string")
            }

            fn target(&self) -> Option<TypeRef> {
                Some(TypeRef::of::<str>(LogicalType::Textual))
            }

            fn visit_str(self, v: &'de str) -> Result<Self::Value> {
                Ok(v)
            }
        }

        deserializer.deserialize(StrVisitor)
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<str>(LogicalType::Textual))
    }
}

impl<'de, T> Deserialize<'de> for Option<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        struct OptionVisitor<T> {
            _marker: PhantomData<T>,
        }

        impl<'de, T> VisitorOption<'de> for OptionVisitor<T>
        where
            T: Deserialize<'de>,
        {
            type Value = Option<T>;

            fn target(&self) -> Option<TypeRef> {
                T::declared_type()
            }

            fn visit_none(self) -> Result<Self::Value> {
                Ok(None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value>
            where
                D: DeserializerTrait<'de>,
            {
                T::deserialize(deserializer).map(Some)
            }
        }

        deserializer.deserialize_option(OptionVisitor {
            _marker: PhantomData,
        })
    }

    fn declared_type() -> Option<TypeRef> {
        T::declared_type()
    }
}

/// Reads any sequence into a `Vec`, reporting `target` as the declared type.
struct SeqVisitor<T> {
    target: TypeRef,
    _marker: PhantomData<T>,
}

impl<T> SeqVisitor<T> {
    fn new(target: TypeRef) -> Self {
        Self {
            target,
            _marker: PhantomData,
        }
    }
}

impl<'de, T> Visitor<'de> for SeqVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = Vec<T>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "a sequence for `{}`", self.target.simple_name())
    }

    fn target(&self) -> Option<TypeRef> {
        Some(self.target.clone())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value>
    where
        A: SeqAccess<'de>,
    {
        let mut values = Vec::with_capacity(seq.len());
        while let Some(v) = seq.next_element()? {
            values.push(v);
        }
        Ok(values)
    }

    fn visit_empty(self) -> Result<Self::Value> {
        Ok(Vec::new())
    }
}

impl<'de, T> Deserialize<'de> for Vec<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        deserializer.deserialize(SeqVisitor::new(TypeRef::of::<Self>(LogicalType::Collection)))
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<Self>(LogicalType::Collection))
    }
}

impl<'de, T> Deserialize<'de> for Box<[T]>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        deserializer
            .deserialize(SeqVisitor::new(TypeRef::of::<[T]>(LogicalType::Array)))
            .map(Vec::into_boxed_slice)
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<[T]>(LogicalType::Array))
    }
}

/// Reads any map into `M`, reporting `target` as the declared type.
struct MapVisitor<M, K, V> {
    target: TypeRef,
    _marker: PhantomData<(M, K, V)>,
}

impl<M, K, V> MapVisitor<M, K, V> {
    fn new(target: TypeRef) -> Self {
        Self {
            target,
            _marker: PhantomData,
        }
    }
}

impl<'de, M, K, V> Visitor<'de> for MapVisitor<M, K, V>
where
    M: Default + Extend<(K, V)>,
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    type Value = M;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "a map for `{}`", self.target.simple_name())
    }

    fn target(&self) -> Option<TypeRef> {
        Some(self.target.clone())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value>
    where
        A: MapAccess<'de>,
    {
        let mut values = M::default();
        while let Some(entry) = map.next_entry()? {
            values.extend(std::iter::once(entry));
        }
        Ok(values)
    }

    fn visit_empty(self) -> Result<Self::Value> {
        Ok(M::default())
    }
}

impl<'de, K, V, S> Deserialize<'de> for HashMap<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        deserializer.deserialize(MapVisitor::<Self, K, V>::new(TypeRef::of::<Self>(
            LogicalType::Map,
        )))
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<Self>(LogicalType::Map))
    }
}

impl<'de, K, V> Deserialize<'de> for BTreeMap<K, V>
where
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        deserializer.deserialize(MapVisitor::<Self, K, V>::new(TypeRef::of::<Self>(
            LogicalType::Map,
        )))
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<Self>(LogicalType::Map))
    }
}

impl<'de, K, V, S> Deserialize<'de> for IndexMap<K, V, S>
where
    K: Deserialize<'de> + Hash + Eq,
    V: Deserialize<'de>,
    S: BuildHasher + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        deserializer.deserialize(MapVisitor::<Self, K, V>::new(TypeRef::of::<Self>(
            LogicalType::Map,
        )))
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<Self>(LogicalType::Map))
    }
}

impl<'de> Deserialize<'de> for serde_json::Value {
    fn deserialize<D>(deserializer: D) -> Result<Self>
    where
        D: DeserializerTrait<'de>,
    {
        use serde_json::Value;

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("any value")
            }

            fn target(&self) -> Option<TypeRef> {
                Value::declared_type()
            }

            fn visit_nil(self) -> Result<Self::Value> {
                Ok(Value::Null)
            }

            fn visit_bool(self, v: bool) -> Result<Self::Value> {
                Ok(Value::Bool(v))
            }

            fn visit_i64(self, v: i64) -> Result<Self::Value> {
                Ok(Value::from(v))
            }

            fn visit_u64(self, v: u64) -> Result<Self::Value> {
                Ok(Value::from(v))
            }

            fn visit_f64(self, v: f64) -> Result<Self::Value> {
                Ok(serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number))
            }

            fn visit_str(self, v: &'de str) -> Result<Self::Value> {
                Ok(Value::String(v.to_owned()))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value>
            where
                A: SeqAccess<'de>,
            {
                let mut values = Vec::with_capacity(seq.len());
                while let Some(v) = seq.next_element()? {
                    values.push(v);
                }
                Ok(Value::Array(values))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value>
            where
                A: MapAccess<'de>,
            {
                let mut values = serde_json::Map::with_capacity(map.len());
                while let Some((k, v)) = map.next_entry::<String, Value>()? {
                    values.insert(k, v);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize(ValueVisitor)
    }

    fn declared_type() -> Option<TypeRef> {
        Some(TypeRef::of::<serde_json::Value>(LogicalType::Untyped))
    }
}
