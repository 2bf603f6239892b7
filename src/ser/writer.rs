// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{Error, Inclusion, Kind, Result, Shape, WritableTypeId};
use crate::TypeRef;

/// The value currently being written in some structural context.
///
/// Bound by container serializers so nested serialization logic can look at what encloses it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentValue {
    /// The runtime type of the container.
    pub value_type: TypeRef,
    /// How many elements it has.
    pub len: usize,
}

/// A token-oriented output sink.
///
/// Every method either writes exactly one structural token or fails.
/// Writers are not expected to recover after an error; the output may contain a partial structure.
pub trait Writer {
    /// Open a sequence. `len` is a hint and may be ignored.
    fn write_start_array(&mut self, len: Option<usize>) -> Result<()>;

    /// Close the innermost sequence.
    fn write_end_array(&mut self) -> Result<()>;

    /// Open an object.
    fn write_start_object(&mut self) -> Result<()>;

    /// Close the innermost object.
    fn write_end_object(&mut self) -> Result<()>;

    /// Write the name of the next object field.
    fn write_field_name(&mut self, name: &str) -> Result<()>;

    /// Write a string value.
    fn write_string(&mut self, v: &str) -> Result<()>;

    /// Write a boolean value.
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Write a signed integer.
    fn write_i64(&mut self, v: i64) -> Result<()>;

    /// Write an unsigned integer.
    fn write_u64(&mut self, v: u64) -> Result<()>;

    /// Non-finite values are up to the writer.
    fn write_f64(&mut self, v: f64) -> Result<()>;

    /// Write null.
    fn write_nil(&mut self) -> Result<()>;

    /// Bind the value being written in the innermost open context.
    fn assign_current_value(&mut self, value: CurrentValue);

    /// The value bound to the innermost open context, if any.
    fn current_value(&self) -> Option<&CurrentValue>;

    /// Can this writer embed type ids natively, without a wrapper?
    fn can_write_type_id(&self) -> bool {
        false
    }

    /// Write a native type id. Only called if [`Writer::can_write_type_id`] is true.
    fn write_type_id(&mut self, _id: &str) -> Result<()> {
        Err(Error {
            kind: Kind::NativeTypeIdUnsupported,
        })
    }

    /// Convenience for a field name followed by a string value.
    fn write_string_field(&mut self, name: &str, value: &str) -> Result<()> {
        self.write_field_name(name)?;
        self.write_string(value)
    }

    /// Open a type-id envelope, including the start marker of the value itself.
    ///
    /// The returned id must be passed to [`Writer::write_type_suffix`] once the value's
    /// contents have been written.
    fn write_type_prefix(&mut self, mut type_id: WritableTypeId) -> Result<WritableTypeId> {
        if self.can_write_type_id() {
            type_id.wrapper_written = false;
            self.write_type_id(&type_id.id)?;
        } else {
            type_id.wrapper_written = true;

            // property inclusions only make sense inside an object
            if type_id.value_shape != Shape::StartObject
                && type_id.inclusion.requires_object_context()
            {
                type_id.inclusion = Inclusion::WrapperArray;
            }

            match type_id.inclusion {
                Inclusion::ParentProperty | Inclusion::PayloadProperty => {}
                Inclusion::MetadataProperty => {
                    self.write_start_object()?;
                    self.write_string_field(&type_id.property, &type_id.id)?;
                    return Ok(type_id);
                }
                Inclusion::WrapperObject => {
                    self.write_start_object()?;
                    self.write_field_name(&type_id.id)?;
                }
                Inclusion::WrapperArray => {
                    self.write_start_array(Some(2))?;
                    self.write_string(&type_id.id)?;
                }
            }
        }

        match type_id.value_shape {
            Shape::StartObject => self.write_start_object()?,
            Shape::StartArray => self.write_start_array(None)?,
            Shape::Scalar => {}
        }
        Ok(type_id)
    }

    /// Close a type-id envelope opened by [`Writer::write_type_prefix`].
    fn write_type_suffix(&mut self, type_id: WritableTypeId) -> Result<WritableTypeId> {
        match type_id.value_shape {
            Shape::StartObject => self.write_end_object()?,
            Shape::StartArray => self.write_end_array()?,
            Shape::Scalar => {}
        }

        if type_id.wrapper_written {
            match type_id.inclusion {
                Inclusion::WrapperArray => self.write_end_array()?,
                Inclusion::ParentProperty => {
                    self.write_string_field(&type_id.property, &type_id.id)?;
                }
                Inclusion::MetadataProperty | Inclusion::PayloadProperty => {}
                Inclusion::WrapperObject => self.write_end_object()?,
            }
        }
        Ok(type_id)
    }
}

impl<W> Writer for &mut W
where
    W: Writer + ?Sized,
{
    fn write_start_array(&mut self, len: Option<usize>) -> Result<()> {
        (**self).write_start_array(len)
    }

    fn write_end_array(&mut self) -> Result<()> {
        (**self).write_end_array()
    }

    fn write_start_object(&mut self) -> Result<()> {
        (**self).write_start_object()
    }

    fn write_end_object(&mut self) -> Result<()> {
        (**self).write_end_object()
    }

    fn write_field_name(&mut self, name: &str) -> Result<()> {
        (**self).write_field_name(name)
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        (**self).write_string(v)
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        (**self).write_bool(v)
    }

    fn write_i64(&mut self, v: i64) -> Result<()> {
        (**self).write_i64(v)
    }

    fn write_u64(&mut self, v: u64) -> Result<()> {
        (**self).write_u64(v)
    }

    fn write_f64(&mut self, v: f64) -> Result<()> {
        (**self).write_f64(v)
    }

    fn write_nil(&mut self) -> Result<()> {
        (**self).write_nil()
    }

    fn assign_current_value(&mut self, value: CurrentValue) {
        (**self).assign_current_value(value);
    }

    fn current_value(&self) -> Option<&CurrentValue> {
        (**self).current_value()
    }

    fn can_write_type_id(&self) -> bool {
        (**self).can_write_type_id()
    }

    fn write_type_id(&mut self, id: &str) -> Result<()> {
        (**self).write_type_id(id)
    }

    fn write_type_prefix(&mut self, type_id: WritableTypeId) -> Result<WritableTypeId> {
        (**self).write_type_prefix(type_id)
    }

    fn write_type_suffix(&mut self, type_id: WritableTypeId) -> Result<WritableTypeId> {
        (**self).write_type_suffix(type_id)
    }
}
