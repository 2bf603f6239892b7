// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{Result, Serialize, SerializationConfig, Writer};

macro_rules! primitive_int_impl {
    ($method:ident => $($primitive:ty),*) => {
        $(impl Serialize for $primitive {
            fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
                writer.$method((*self).into())
            }
        })*
    };
}

primitive_int_impl!(write_i64 => i8, i16, i32, i64);
primitive_int_impl!(write_u64 => u8, u16, u32, u64);

impl Serialize for bool {
    fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
        writer.write_bool(*self)
    }
}

impl Serialize for f32 {
    fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
        writer.write_f64(f64::from(*self))
    }
}

impl Serialize for f64 {
    fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
        writer.write_f64(*self)
    }
}

impl Serialize for str {
    fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
        writer.write_string(self)
    }
}

impl Serialize for String {
    fn serialize(&self, writer: &mut dyn Writer, _: &SerializationConfig) -> Result<()> {
        writer.write_string(self)
    }
}

impl<T> Serialize for Option<T>
where
    T: Serialize,
{
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        match self {
            Some(v) => v.serialize(writer, config),
            None => writer.write_nil(),
        }
    }
}

impl<T> Serialize for &T
where
    T: Serialize + ?Sized,
{
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        T::serialize(self, writer, config)
    }
}

impl<T> Serialize for Box<T>
where
    T: Serialize + ?Sized,
{
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        T::serialize(self, writer, config)
    }
}

// Plain sequences. Arrays that need unwrapping or type ids go through `ArraySerializer`.
impl<T> Serialize for [T]
where
    T: Serialize,
{
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        writer.write_start_array(Some(self.len()))?;
        for item in self {
            item.serialize(writer, config)?;
        }
        writer.write_end_array()
    }
}

impl<T> Serialize for Vec<T>
where
    T: Serialize,
{
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        self.as_slice().serialize(writer, config)
    }
}

impl Serialize for serde_json::Value {
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()> {
        use serde_json::Value;

        match self {
            Value::Null => writer.write_nil(),
            Value::Bool(v) => writer.write_bool(*v),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    writer.write_i64(v)
                } else if let Some(v) = n.as_u64() {
                    writer.write_u64(v)
                } else {
                    // as_f64 only fails with arbitrary precision numbers, which are not enabled
                    writer.write_f64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => writer.write_string(s),
            Value::Array(values) => values.serialize(writer, config),
            Value::Object(map) => {
                writer.write_start_object()?;
                for (k, v) in map {
                    writer.write_field_name(k)?;
                    v.serialize(writer, config)?;
                }
                writer.write_end_object()
            }
        }
    }
}
