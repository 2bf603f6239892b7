// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::marker::PhantomData;

use super::{ArrayBase, ArraySerializer};
use crate::ser::{Result, Serialize, SerializationConfig, UnwrapPolicy, Writer};
use crate::{LogicalType, TypeRef};

macro_rules! primitive_array_impl {
    ($($kind:ident => $primitive:ty, $method:ident;)*) => {
        paste::paste! {
            $(
                #[doc = concat!("Serializer for `[", stringify!($primitive), "]`.")]
                #[derive(Debug, Clone, PartialEq, Eq)]
                pub struct [<$kind ArraySerializer>] {
                    base: ArrayBase,
                }

                impl [<$kind ArraySerializer>] {
                    /// A serializer with no unwrap override.
                    #[must_use]
                    pub fn new() -> Self {
                        Self {
                            base: ArrayBase::new(TypeRef::of::<[$primitive]>(LogicalType::Array)),
                        }
                    }
                }

                impl Default for [<$kind ArraySerializer>] {
                    fn default() -> Self {
                        Self::new()
                    }
                }

                impl ArraySerializer for [<$kind ArraySerializer>] {
                    type Element = $primitive;

                    fn base(&self) -> &ArrayBase {
                        &self.base
                    }

                    fn with_resolved(&self, unwrap: UnwrapPolicy) -> Self {
                        Self {
                            base: self.base.with_unwrap(unwrap),
                        }
                    }

                    fn serialize_contents(
                        &self,
                        value: &[$primitive],
                        writer: &mut dyn Writer,
                        _: &SerializationConfig,
                    ) -> Result<()> {
                        for &v in value {
                            writer.$method(v.into())?;
                        }
                        Ok(())
                    }
                }
            )*
        }
    };
}

primitive_array_impl! {
    Boolean => bool, write_bool;
    Short => i16, write_i64;
    Int => i32, write_i64;
    Long => i64, write_i64;
    Float => f32, write_f64;
    Double => f64, write_f64;
}

/// Serializer for `[String]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringArraySerializer {
    base: ArrayBase,
}

impl StringArraySerializer {
    /// A serializer with no unwrap override.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: ArrayBase::new(TypeRef::of::<[String]>(LogicalType::Array)),
        }
    }
}

impl Default for StringArraySerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArraySerializer for StringArraySerializer {
    type Element = String;

    fn base(&self) -> &ArrayBase {
        &self.base
    }

    fn with_resolved(&self, unwrap: UnwrapPolicy) -> Self {
        Self {
            base: self.base.with_unwrap(unwrap),
        }
    }

    fn serialize_contents(
        &self,
        value: &[String],
        writer: &mut dyn Writer,
        _: &SerializationConfig,
    ) -> Result<()> {
        for v in value {
            writer.write_string(v)?;
        }
        Ok(())
    }
}

/// Serializer for arrays of arbitrary [`Serialize`] values.
///
/// Use `T = Box<dyn Serialize>` for arrays whose elements have different types.
#[derive(Debug)]
pub struct ObjectArraySerializer<T: ?Sized> {
    base: ArrayBase,
    _element: PhantomData<fn(&T)>,
}

impl<T> ObjectArraySerializer<T>
where
    T: Serialize,
{
    /// A serializer for `[T]`, with no unwrap override.
    #[must_use]
    pub fn new() -> Self {
        Self::with_type(TypeRef::of::<[T]>(LogicalType::Array))
    }

    /// Use a custom descriptor for the handled type, for example to give it a nicer type id.
    #[must_use]
    pub fn with_type(handled: TypeRef) -> Self {
        Self {
            base: ArrayBase::new(handled),
            _element: PhantomData,
        }
    }
}

impl<T> Default for ObjectArraySerializer<T>
where
    T: Serialize,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObjectArraySerializer<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            _element: PhantomData,
        }
    }
}

impl<T> ArraySerializer for ObjectArraySerializer<T>
where
    T: Serialize,
{
    type Element = T;

    fn base(&self) -> &ArrayBase {
        &self.base
    }

    fn with_resolved(&self, unwrap: UnwrapPolicy) -> Self {
        Self {
            base: self.base.with_unwrap(unwrap),
            _element: PhantomData,
        }
    }

    fn serialize_contents(
        &self,
        value: &[T],
        writer: &mut dyn Writer,
        config: &SerializationConfig,
    ) -> Result<()> {
        for v in value {
            v.serialize(writer, config)?;
        }
        Ok(())
    }
}
