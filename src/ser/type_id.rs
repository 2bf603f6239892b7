// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::borrow::Cow;

use indexmap::IndexMap;

use super::{Result, Writer};
use crate::TypeRef;

/// The logical shape a tagged value is written as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// The value opens a sequence.
    StartArray,
    /// The value opens an object.
    StartObject,
    /// The value is a single scalar.
    Scalar,
}

/// Where a type id is placed relative to the value it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum Inclusion {
    /// `["id", value]`
    #[default]
    WrapperArray,
    /// `{"id": value}`
    WrapperObject,
    /// `{"@type": "id", ...fields}`. Needs the value to be an object.
    MetadataProperty,
    /// The value already carries its id as a regular field. Nothing is written.
    PayloadProperty,
    /// The id is written as a sibling property after the value.
    ParentProperty,
}

impl Inclusion {
    /// Can this inclusion only be used if the value is an object?
    pub fn requires_object_context(self) -> bool {
        matches!(self, Self::MetadataProperty | Self::PayloadProperty)
    }
}

/// Everything needed to open and later close a type-id envelope.
///
/// Returned by [`TypeTagger::type_id`], passed through the prefix hook, and handed back to
/// the suffix hook so both ends of an envelope agree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WritableTypeId {
    /// The type id itself.
    pub id: String,
    /// The shape of the value being wrapped.
    pub value_shape: Shape,
    /// How the id is included.
    pub inclusion: Inclusion,
    /// The property name used by property-style inclusions.
    pub property: Cow<'static, str>,
    /// Set by the prefix hook if a wrapper was opened that the suffix hook must close.
    pub wrapper_written: bool,
}

impl WritableTypeId {
    /// A type id for a value of the given shape, not yet written.
    pub fn new(id: impl Into<String>, value_shape: Shape) -> Self {
        Self {
            id: id.into(),
            value_shape,
            inclusion: Inclusion::default(),
            property: Cow::Borrowed(DEFAULT_PROPERTY),
            wrapper_written: false,
        }
    }
}

/// The property name property-style inclusions use by default.
pub const DEFAULT_PROPERTY: &str = "@type";

/// Decides which type id a value gets and emits the envelope around it.
///
/// Implementors usually only need [`TypeTagger::type_id`].
/// The prefix and suffix hooks default to the writer's own envelope logic.
pub trait TypeTagger: std::fmt::Debug + Send + Sync {
    /// Compute the type id for a value of `value_type` written as `shape`.
    fn type_id(&self, value_type: &TypeRef, shape: Shape) -> Result<WritableTypeId>;

    /// Open the envelope.
    fn write_type_prefix(
        &self,
        writer: &mut dyn Writer,
        type_id: WritableTypeId,
    ) -> Result<WritableTypeId> {
        writer.write_type_prefix(type_id)
    }

    /// Close the envelope opened by [`TypeTagger::write_type_prefix`].
    fn write_type_suffix(
        &self,
        writer: &mut dyn Writer,
        type_id: WritableTypeId,
    ) -> Result<WritableTypeId> {
        writer.write_type_suffix(type_id)
    }
}

/// How [`StdTypeTagger`] turns a type into an id.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Use the full type name.
    #[default]
    Class,
    /// Use a registered logical name, falling back to the simple type name.
    Name(IndexMap<String, String>),
}

/// The standard [`TypeTagger`].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StdTypeTagger {
    strategy: IdStrategy,
    inclusion: Inclusion,
    property: Cow<'static, str>,
}

impl StdTypeTagger {
    /// Tag with full type names, wrapped in an array.
    pub fn new() -> Self {
        Self {
            strategy: IdStrategy::Class,
            inclusion: Inclusion::WrapperArray,
            property: Cow::Borrowed(DEFAULT_PROPERTY),
        }
    }

    /// Tag with logical names.
    ///
    /// Register names with [`StdTypeTagger::register`].
    pub fn named() -> Self {
        Self {
            strategy: IdStrategy::Name(IndexMap::new()),
            ..Self::new()
        }
    }

    /// Use `inclusion` for every id this tagger writes.
    #[must_use]
    pub fn with_inclusion(mut self, inclusion: Inclusion) -> Self {
        self.inclusion = inclusion;
        self
    }

    /// The property name used by property-based inclusions.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<Cow<'static, str>>) -> Self {
        self.property = property.into();
        self
    }

    /// Register a logical name for a type.
    ///
    /// Switches to [`IdStrategy::Name`] if needed.
    #[must_use]
    pub fn register(mut self, ty: &TypeRef, name: impl Into<String>) -> Self {
        match &mut self.strategy {
            IdStrategy::Name(names) => {
                names.insert(ty.name().to_string(), name.into());
            }
            IdStrategy::Class => {
                let mut names = IndexMap::new();
                names.insert(ty.name().to_string(), name.into());
                self.strategy = IdStrategy::Name(names);
            }
        }
        self
    }

    /// The inclusion used for every id this tagger writes.
    pub fn inclusion(&self) -> Inclusion {
        self.inclusion
    }

    fn id_for(&self, ty: &TypeRef) -> String {
        match &self.strategy {
            IdStrategy::Class => ty.name().to_string(),
            IdStrategy::Name(names) => names
                .get(ty.name())
                .cloned()
                .unwrap_or_else(|| ty.simple_name()),
        }
    }
}

impl TypeTagger for StdTypeTagger {
    fn type_id(&self, value_type: &TypeRef, shape: Shape) -> Result<WritableTypeId> {
        Ok(WritableTypeId {
            id: self.id_for(value_type),
            value_shape: shape,
            inclusion: self.inclusion,
            property: self.property.clone(),
            wrapper_written: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Inclusion, Shape, StdTypeTagger, TypeTagger};
    use crate::{LogicalType, TypeRef};

    #[test]
    fn class_ids() {
        let tagger = StdTypeTagger::new();
        let ty = TypeRef::of::<[i32]>(LogicalType::Array);

        let id = tagger.type_id(&ty, Shape::StartArray).unwrap();
        assert_eq!(id.id, "[i32]");
        assert_eq!(id.inclusion, Inclusion::WrapperArray);
        assert!(!id.wrapper_written);
    }

    #[test]
    fn named_ids() {
        let ints = TypeRef::of::<[i32]>(LogicalType::Array);
        let other = TypeRef::new("app::model::Points", LogicalType::Array);
        let tagger = StdTypeTagger::named()
            .register(&ints, "ints")
            .with_inclusion(Inclusion::WrapperObject)
            .with_property("kind");

        let id = tagger.type_id(&ints, Shape::StartArray).unwrap();
        assert_eq!(id.id, "ints");
        assert_eq!(id.inclusion, Inclusion::WrapperObject);
        assert_eq!(id.property, "kind");

        // unregistered types fall back to their simple name
        let id = tagger.type_id(&other, Shape::StartArray).unwrap();
        assert_eq!(id.id, "Points");
    }

    #[test]
    fn object_context() {
        assert!(Inclusion::MetadataProperty.requires_object_context());
        assert!(Inclusion::PayloadProperty.requires_object_context());
        assert!(!Inclusion::WrapperArray.requires_object_context());
        assert!(!Inclusion::ParentProperty.requires_object_context());
    }
}
