#![warn(rust_2018_idioms, clippy::all, clippy::pedantic)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::all
)]
#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

//! sequin
//!
//! sequin writes arrays to json in a way that polymorphic readers can take apart again,
//! and reads json back with configurable coercions.
//!
//! Arrays are written by [`ser::ArraySerializer`]s. Every serializer carries an unwrap policy that decides
//! whether a one-element array is written as its sole element:
//!
//! ```text
//! ForceUnwrap  -> always
//! ForceKeep    -> never
//! Unspecified  -> whatever WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED says globally
//! ```
//!
//! Serializers are immutable. Binding one to a property with [`ser::ArraySerializer::contextualize`]
//! either returns the same instance or a new one with the property's policy, so instances can be
//! cached and shared between threads freely.
//!
//! Arrays can also be written inside a type-id envelope (see [`ser::TypeTagger`]), for example
//! `["[i32]",[1,2,3]]`. Tagged arrays are never unwrapped.
//!
//! On the read side, an empty string read into a sequence or map fails by default.
//! [`de::CoercionConfigs`] can turn that into an empty value instead:
//!
//! ```
//! use sequin::{de::{CoercionAction, CoercionInputShape}, Mapper};
//!
//! let mapper = Mapper::builder()
//!     .with_coercion_config_defaults(|c| {
//!         c.set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsEmpty);
//!     })
//!     .build();
//!
//! let values: Vec<i32> = mapper.read_value(r#""""#).unwrap();
//! assert!(values.is_empty());
//! ```
//!
//! Some common terminology:
//! - handled type: The array type a serializer writes, like `[i32]`.
//! - property site: The owner and name of the field an array is written through.
//! - envelope: The markers written around a tagged value so its type id can be recovered.

// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/// Json reading and coercion settings.
pub mod de;
/// Array serializers, writers, and type-id envelopes.
pub mod ser;

mod config;
mod mapper;
mod types;

pub use config::{ConfigError, MapperConfig};
pub use mapper::{Mapper, MapperBuilder};
pub use types::{LogicalType, TypeRef};

#[doc(inline)]
pub use de::{
    Deserialize, DeserializeOwned, Deserializer, DeserializerTrait, Error as DeError, MapAccess,
    Result as DeResult, SeqAccess, Visitor, VisitorOption,
};
#[doc(inline)]
pub use ser::{ArraySerializer, Error as SerError, Result as SerResult, Serialize, Writer};

/// Read a `T` out of json using default settings.
/// Equivalent to `Mapper::new().read_value(json)`.
pub fn from_str<T>(json: &str) -> Result<T, DeError>
where
    T: DeserializeOwned,
{
    let value: serde_json::Value = serde_json::from_str(json)?;
    de::from_value(&value, &de::CoercionConfigs::new())
}

/// Write a value as json using default settings.
///
/// # Errors
/// Errors if the value fails to serialize.
pub fn to_string<T>(value: &T) -> Result<String, SerError>
where
    T: Serialize + ?Sized,
{
    let mut writer = ser::JsonWriter::new();
    value.serialize(&mut writer, &ser::SerializationConfig::new())?;
    writer.into_string()
}

#[cfg(test)]
mod empty_string_default {
    use std::collections::HashMap;

    use crate::de::Kind;
    use crate::DeError;

    fn assert_rejected(err: &DeError, target: &str) {
        let msg = err.to_string();
        assert!(matches!(err.kind, Kind::EmptyStringCoercion { .. }), "{msg}");
        assert!(msg.contains("Cannot deserialize value of type"), "{msg}");
        assert!(msg.contains(target), "{msg}");
        assert!(msg.contains("from empty String"), "{msg}");
    }

    #[test]
    fn list_of_numbers() {
        let err = crate::from_str::<Vec<f64>>(r#""""#).unwrap_err();
        assert_rejected(&err, "Vec<f64>");
    }

    #[test]
    fn map_of_scalars() {
        let err = crate::from_str::<HashMap<i64, bool>>(r#""""#).unwrap_err();
        assert_rejected(&err, "HashMap<i64, bool");
    }

    #[test]
    fn primitive_arrays() {
        assert_rejected(&crate::from_str::<Box<[bool]>>(r#""""#).unwrap_err(), "[bool]");
        assert_rejected(&crate::from_str::<Box<[i32]>>(r#""""#).unwrap_err(), "[i32]");
        assert_rejected(&crate::from_str::<Box<[i64]>>(r#""""#).unwrap_err(), "[i64]");
        assert_rejected(&crate::from_str::<Box<[f32]>>(r#""""#).unwrap_err(), "[f32]");
        assert_rejected(&crate::from_str::<Box<[f64]>>(r#""""#).unwrap_err(), "[f64]");
    }

    #[test]
    fn reported_as_diagnostic() {
        let err = crate::from_str::<Vec<i32>>(r#""""#).unwrap_err();
        let report = miette::Report::new(err);
        let rendered = format!("{report:?}");
        assert!(rendered.contains("sequin::de::empty_string"), "{rendered}");
    }
}

#[cfg(test)]
mod empty_string_as_empty {
    use std::collections::{BTreeMap, HashMap};

    use crate::de::{CoercionAction, CoercionInputShape, Unexpected};
    use crate::{DeError, Deserialize, DeserializerTrait, LogicalType, Mapper, TypeRef, Visitor};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Abc {
        A,
        B,
        C,
    }

    impl<'de> Deserialize<'de> for Abc {
        fn deserialize<D>(deserializer: D) -> Result<Self, DeError>
        where
            D: DeserializerTrait<'de>,
        {
            struct AbcVisitor;

            impl<'de> Visitor<'de> for AbcVisitor {
                type Value = Abc;

                fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    formatter.write_str("one of `A`, `B`, `C`")
                }

                fn target(&self) -> Option<TypeRef> {
                    Abc::declared_type()
                }

                fn visit_str(self, v: &'de str) -> Result<Self::Value, DeError> {
                    match v {
                        "A" => Ok(Abc::A),
                        "B" => Ok(Abc::B),
                        "C" => Ok(Abc::C),
                        _ => Err(DeError::invalid_value(Unexpected::Str(v), &self)),
                    }
                }
            }

            deserializer.deserialize(AbcVisitor)
        }

        fn declared_type() -> Option<TypeRef> {
            Some(TypeRef::of::<Abc>(LogicalType::Enum))
        }
    }

    fn mapper() -> Mapper {
        Mapper::builder()
            .with_coercion_config_defaults(|c| {
                c.set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsEmpty);
            })
            .build()
    }

    #[test]
    fn list_of_strings() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("sequin=debug")
            .try_init();

        let v: Vec<String> = mapper().read_value(r#""""#).unwrap();
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn enum_keyed_map() {
        let v: BTreeMap<Abc, bool> = mapper().read_value(r#""""#).unwrap();
        assert_eq!(v.len(), 0);

        // the same target still reads real content
        let v: BTreeMap<Abc, bool> = mapper().read_value(r#"{"B": true}"#).unwrap();
        assert_eq!(v.get(&Abc::B), Some(&true));
    }

    #[test]
    fn object_array() {
        let v: Box<[serde_json::Value]> = mapper().read_value(r#""""#).unwrap();
        assert_eq!(v.len(), 0);

        let v: Box<[String]> = mapper().read_value(r#""""#).unwrap();
        assert_eq!(v.len(), 0);
    }

    #[test]
    fn primitive_arrays() {
        let mapper = mapper();
        assert_eq!(mapper.read_value::<Box<[i32]>>(r#""""#).unwrap().len(), 0);
        assert_eq!(mapper.read_value::<Box<[bool]>>(r#""""#).unwrap().len(), 0);
        assert_eq!(mapper.read_value::<Box<[i64]>>(r#""""#).unwrap().len(), 0);
        assert_eq!(mapper.read_value::<Box<[f32]>>(r#""""#).unwrap().len(), 0);
        assert_eq!(mapper.read_value::<Box<[f64]>>(r#""""#).unwrap().len(), 0);
    }

    #[test]
    fn maps() {
        let v: HashMap<i64, bool> = mapper().read_value(r#""""#).unwrap();
        assert!(v.is_empty());

        let v: indexmap::IndexMap<String, Vec<i32>> = mapper().read_value(r#""""#).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn scoped_to_one_type() {
        let mapper = Mapper::builder()
            .with_coercion_config(LogicalType::Collection, |c| {
                c.set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsEmpty);
            })
            .build();

        assert!(mapper.read_value::<Vec<i32>>(r#""""#).unwrap().is_empty());
        assert!(mapper.read_value::<Box<[i32]>>(r#""""#).is_err());
        assert!(mapper.read_value::<HashMap<String, i32>>(r#""""#).is_err());
    }
}

#[cfg(test)]
mod element_coercions {
    use crate::de::{CoercionAction, CoercionInputShape};
    use crate::Mapper;

    fn mapper() -> Mapper {
        Mapper::builder()
            .with_coercion_config_defaults(|c| {
                c.set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsEmpty);
            })
            .build()
    }

    #[test]
    fn empty_string_elements_are_strings() {
        let v: Vec<String> = mapper().read_value(r#"[""]"#).unwrap();
        assert_eq!(v, [""]);

        let v: Vec<String> = crate::from_str(r#"["", "x"]"#).unwrap();
        assert_eq!(v, ["", "x"]);
    }

    #[test]
    fn scalars_are_unaffected() {
        assert!(mapper().read_value::<i32>(r#""""#).is_err());
        assert!(mapper().read_value::<Vec<i32>>(r#"[""]"#).is_err());
        assert_eq!(mapper().read_value::<String>(r#""""#).unwrap(), "");
    }

    #[test]
    fn nested_containers_coerce_individually() {
        let v: Vec<Vec<i32>> = mapper().read_value(r#"["", [1]]"#).unwrap();
        assert_eq!(v, [vec![], vec![1]]);

        let err = crate::from_str::<Vec<Vec<i32>>>(r#"["", [1]]"#).unwrap_err();
        assert!(err.to_string().contains("from empty String"));
    }
}

#[cfg(test)]
mod writing {
    use std::sync::Arc;

    use crate::ser::{
        ArraySerializer, ContextualCache, DoubleArraySerializer, FormatAnnotation,
        FormatOverrides, Inclusion, PropertySite, SerializationFeature, StdTypeTagger,
        StringArraySerializer,
    };
    use crate::{LogicalType, Mapper, TypeRef};

    #[test]
    fn to_string() {
        assert_eq!(crate::to_string(&vec!["a", "b"]).unwrap(), r#"["a","b"]"#);
        assert_eq!(crate::to_string(&Some(1.5)).unwrap(), "1.5");
        assert_eq!(crate::to_string("x").unwrap(), r#""x""#);
    }

    #[test]
    fn global_switch() {
        let ser = DoubleArraySerializer::new();
        assert_eq!(Mapper::new().write_array(&ser, &[1.5]).unwrap(), "[1.5]");

        let mapper = Mapper::builder()
            .enable(SerializationFeature::WriteSingleElemArraysUnwrapped)
            .build();
        assert_eq!(mapper.write_array(&ser, &[1.5]).unwrap(), "1.5");
        assert_eq!(mapper.write_array(&ser, &[1.5, 2.0]).unwrap(), "[1.5,2.0]");
        assert_eq!(mapper.write_array(&ser, &[]).unwrap(), "[]");
    }

    #[test]
    fn cached_per_property() {
        let cache = ContextualCache::new(StringArraySerializer::new(), FormatOverrides::new());
        let site = PropertySite::new("Doc", "tags").with_format(FormatAnnotation {
            with: vec!["WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED".to_string()],
            without: vec![],
        });

        let first = cache.for_property(Some(&site)).unwrap();
        let second = cache.for_property(Some(&site)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let value = ["only".to_string()];
        assert_eq!(Mapper::new().write_array(&*first, &value).unwrap(), r#""only""#);
        assert_eq!(
            Mapper::new().write_array(&**cache.canonical(), &value).unwrap(),
            r#"["only"]"#
        );
    }

    #[test]
    fn tagged_wrapper_object() {
        let handled = TypeRef::of::<[String]>(LogicalType::Array);
        let tagger = StdTypeTagger::named()
            .register(&handled, "tags")
            .with_inclusion(Inclusion::WrapperObject);

        let out = Mapper::new()
            .write_array_tagged(
                &StringArraySerializer::new(),
                &["a".to_string(), "b".to_string()],
                &tagger,
            )
            .unwrap();
        assert_eq!(out, r#"{"tags":["a","b"]}"#);
    }

    #[test]
    fn tagged_metadata_property_falls_back_to_wrapper_array() {
        let tagger = StdTypeTagger::named().with_inclusion(Inclusion::MetadataProperty);
        let out = Mapper::new()
            .write_array_tagged(&StringArraySerializer::new(), &[], &tagger)
            .unwrap();
        assert_eq!(out, r#"["[String]",[]]"#);
    }
}
