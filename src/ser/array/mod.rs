// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::sync::Arc;

use super::{
    CurrentValue, FeatureSwitch, FormatResolver, PropertySite, Result, SerializationConfig,
    SerializationFeature, Shape, TypeTagger, UnwrapPolicy, Writer,
};
use crate::TypeRef;

mod impls;

pub use impls::{
    BooleanArraySerializer, DoubleArraySerializer, FloatArraySerializer, IntArraySerializer,
    LongArraySerializer, ObjectArraySerializer, ShortArraySerializer, StringArraySerializer,
};

/// State shared by every array serializer: the handled type and the unwrap override.
///
/// Immutable. Reconfiguring produces a new value via [`ArrayBase::with_unwrap`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArrayBase {
    handled: TypeRef,
    unwrap: UnwrapPolicy,
}

impl ArrayBase {
    /// A base with no local unwrap override.
    pub fn new(handled: TypeRef) -> Self {
        Self {
            handled,
            unwrap: UnwrapPolicy::Unspecified,
        }
    }

    /// A copy of this base with the unwrap policy replaced.
    #[must_use]
    pub fn with_unwrap(&self, unwrap: UnwrapPolicy) -> Self {
        Self {
            handled: self.handled.clone(),
            unwrap,
        }
    }

    /// The array type this serializer writes.
    pub fn handled_type(&self) -> &TypeRef {
        &self.handled
    }

    /// The local unwrap setting.
    pub fn unwrap_policy(&self) -> UnwrapPolicy {
        self.unwrap
    }
}

/// A serializer for one kind of array.
///
/// Implementors provide access to their [`ArrayBase`], a way to copy themselves with a new
/// unwrap policy, and the element-writing step. Everything else is provided and should not
/// be overridden, with the exception of [`ArraySerializer::serialize`].
///
/// Instances are immutable and meant to be shared behind an [`Arc`].
pub trait ArraySerializer: Sized + Send + Sync {
    /// The element type. The serializer handles `[Self::Element]`.
    type Element;

    /// The shared state.
    fn base(&self) -> &ArrayBase;

    /// A copy of `self` with the unwrap policy replaced.
    ///
    /// Must preserve the handled type and any other configuration.
    #[must_use]
    fn with_resolved(&self, unwrap: UnwrapPolicy) -> Self;

    /// Write every element of `value`, in order, without any enclosing markers.
    fn serialize_contents(
        &self,
        value: &[Self::Element],
        writer: &mut dyn Writer,
        config: &SerializationConfig,
    ) -> Result<()>;

    /// See [`ArrayBase::handled_type`].
    fn handled_type(&self) -> &TypeRef {
        self.base().handled_type()
    }

    /// See [`ArrayBase::unwrap_policy`].
    fn unwrap_policy(&self) -> UnwrapPolicy {
        self.base().unwrap_policy()
    }

    /// Bind this serializer to a property.
    ///
    /// Returns `self` unless the resolver yields a directive whose unwrap setting differs from
    /// the current one, in which case a new instance carrying that setting is returned.
    /// `self` is never modified.
    ///
    /// # Errors
    /// Errors from the resolver are passed through.
    fn contextualize(
        self: &Arc<Self>,
        resolver: &dyn FormatResolver,
        property: Option<&PropertySite>,
    ) -> Result<Arc<Self>> {
        let Some(property) = property else {
            return Ok(Arc::clone(self));
        };

        if let Some(format) = resolver.find_format_overrides(property, self.handled_type())? {
            let unwrap = format.unwrap_single();
            if unwrap != self.unwrap_policy() {
                tracing::trace!(
                    handled = %self.handled_type(),
                    owner = %property.owner,
                    property = %property.name,
                    ?unwrap,
                    "resolved array serializer for property"
                );
                return Ok(Arc::new(self.with_resolved(unwrap)));
            }
        }
        Ok(Arc::clone(self))
    }

    /// Should a one-element array be written as its element?
    fn should_unwrap_single(&self, features: &dyn FeatureSwitch) -> bool {
        self.unwrap_policy()
            .resolve(features.is_enabled(SerializationFeature::WriteSingleElemArraysUnwrapped))
    }

    /// Write `value` as a plain array.
    ///
    /// One-element arrays are written as their element if [`ArraySerializer::should_unwrap_single`] says so.
    fn serialize(
        &self,
        value: &[Self::Element],
        writer: &mut dyn Writer,
        config: &SerializationConfig,
    ) -> Result<()> {
        if value.len() == 1 && self.should_unwrap_single(config) {
            return self.serialize_contents(value, writer, config);
        }

        writer.write_start_array(Some(value.len()))?;
        writer.assign_current_value(self.current_value(value));
        self.serialize_contents(value, writer, config)?;
        writer.write_end_array()
    }

    /// Write `value` wrapped in a type-id envelope.
    ///
    /// The value is always tagged as an array, and is never unwrapped.
    /// On error the output may contain an unterminated envelope.
    fn serialize_with_type(
        &self,
        value: &[Self::Element],
        writer: &mut dyn Writer,
        config: &SerializationConfig,
        tagger: &dyn TypeTagger,
    ) -> Result<()> {
        let type_id = tagger.type_id(self.handled_type(), Shape::StartArray)?;
        let type_id = tagger.write_type_prefix(writer, type_id)?;
        writer.assign_current_value(self.current_value(value));
        self.serialize_contents(value, writer, config)?;
        tagger.write_type_suffix(writer, type_id)?;
        Ok(())
    }

    #[doc(hidden)]
    fn current_value(&self, value: &[Self::Element]) -> CurrentValue {
        CurrentValue {
            value_type: self.handled_type().clone(),
            len: value.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{ArrayBase, ArraySerializer, IntArraySerializer, StringArraySerializer};
    use crate::ser::{
        Error, FeatureSwitch, FormatAnnotation, FormatDirective, FormatFeature, FormatOverrides,
        FormatResolver, Inclusion, JsonWriter, Kind, PropertySite, Result, SerializationConfig,
        SerializationFeature, Shape, StdTypeTagger, Token, TokenWriter, TypeTagger,
        UnwrapPolicy, WritableTypeId, Writer,
    };
    use crate::{LogicalType, TypeRef};

    const UNWRAP: &str = "WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED";

    fn site(with: &[&str], without: &[&str]) -> PropertySite {
        PropertySite::new("Holder", "values").with_format(FormatAnnotation {
            with: with.iter().map(ToString::to_string).collect(),
            without: without.iter().map(ToString::to_string).collect(),
        })
    }

    fn unwrapping() -> SerializationConfig {
        SerializationConfig::new().with(SerializationFeature::WriteSingleElemArraysUnwrapped)
    }

    /// A resolver that always answers the same thing.
    struct Fixed(Option<UnwrapPolicy>);

    impl FormatResolver for Fixed {
        fn find_format_overrides(
            &self,
            _: &PropertySite,
            _: &TypeRef,
        ) -> Result<Option<FormatDirective>> {
            Ok(self.0.map(|policy| match policy {
                UnwrapPolicy::ForceUnwrap => {
                    FormatDirective::new().with(FormatFeature::WriteSingleElemArraysUnwrapped)
                }
                UnwrapPolicy::ForceKeep => {
                    FormatDirective::new().without(FormatFeature::WriteSingleElemArraysUnwrapped)
                }
                UnwrapPolicy::Unspecified => FormatDirective::new(),
            }))
        }
    }

    struct Broken;

    impl FormatResolver for Broken {
        fn find_format_overrides(
            &self,
            _: &PropertySite,
            _: &TypeRef,
        ) -> Result<Option<FormatDirective>> {
            Err(Error::custom("malformed annotation"))
        }
    }

    /// A serializer whose contents always fail after writing one element.
    #[derive(Debug)]
    struct Failing(ArrayBase);

    impl ArraySerializer for Failing {
        type Element = i32;

        fn base(&self) -> &ArrayBase {
            &self.0
        }

        fn with_resolved(&self, unwrap: UnwrapPolicy) -> Self {
            Failing(self.0.with_unwrap(unwrap))
        }

        fn serialize_contents(
            &self,
            value: &[i32],
            writer: &mut dyn Writer,
            _: &SerializationConfig,
        ) -> Result<()> {
            writer.write_i64(value[0].into())?;
            Err(Error::custom("element exploded"))
        }
    }

    #[derive(Debug)]
    struct FailingTagger;

    impl TypeTagger for FailingTagger {
        fn type_id(&self, _: &TypeRef, _: Shape) -> Result<WritableTypeId> {
            Err(Error::custom("no id for you"))
        }
    }

    #[test]
    fn unwrap_truth_table() {
        let base = Arc::new(StringArraySerializer::new());
        for global in [SerializationConfig::new(), unwrapping()] {
            let on = global.is_enabled(SerializationFeature::WriteSingleElemArraysUnwrapped);

            let forced = base.with_resolved(UnwrapPolicy::ForceUnwrap);
            assert!(forced.should_unwrap_single(&global));

            let kept = base.with_resolved(UnwrapPolicy::ForceKeep);
            assert!(!kept.should_unwrap_single(&global));

            assert_eq!(base.should_unwrap_single(&global), on);
        }
    }

    #[test]
    fn contextualize_without_property_is_identity() {
        let base = Arc::new(IntArraySerializer::new());
        let resolved = base
            .contextualize(&Fixed(Some(UnwrapPolicy::ForceUnwrap)), None)
            .unwrap();
        assert!(Arc::ptr_eq(&base, &resolved));
    }

    #[test]
    fn contextualize_without_directive_is_identity() {
        let base = Arc::new(IntArraySerializer::new());
        let resolved = base.contextualize(&Fixed(None), Some(&site(&[], &[]))).unwrap();
        assert!(Arc::ptr_eq(&base, &resolved));
    }

    #[test]
    fn contextualize_same_policy_is_identity() {
        let base = Arc::new(IntArraySerializer::new());
        let resolved = base
            .contextualize(&Fixed(Some(UnwrapPolicy::Unspecified)), Some(&site(&[], &[])))
            .unwrap();
        assert!(Arc::ptr_eq(&base, &resolved));
    }

    #[test]
    fn contextualize_copies_on_override() {
        let base = Arc::new(IntArraySerializer::new());
        let resolved = base
            .contextualize(&FormatOverrides::new(), Some(&site(&[UNWRAP], &[])))
            .unwrap();

        assert!(!Arc::ptr_eq(&base, &resolved));
        assert_eq!(resolved.unwrap_policy(), UnwrapPolicy::ForceUnwrap);
        assert_eq!(resolved.handled_type(), base.handled_type());

        // the original still defers to the global switch
        assert_eq!(base.unwrap_policy(), UnwrapPolicy::Unspecified);
        assert!(!base.should_unwrap_single(&SerializationConfig::new()));
        assert!(base.should_unwrap_single(&unwrapping()));
    }

    #[test]
    fn contextualize_back_to_unspecified() {
        let forced = Arc::new(IntArraySerializer::new().with_resolved(UnwrapPolicy::ForceKeep));
        let resolved = forced
            .contextualize(&Fixed(Some(UnwrapPolicy::Unspecified)), Some(&site(&[], &[])))
            .unwrap();

        assert!(!Arc::ptr_eq(&forced, &resolved));
        assert_eq!(resolved.unwrap_policy(), UnwrapPolicy::Unspecified);
        assert_eq!(forced.unwrap_policy(), UnwrapPolicy::ForceKeep);
    }

    #[test]
    fn contextualize_is_idempotent() {
        let resolver = FormatOverrides::new();
        for property in [site(&[UNWRAP], &[]), site(&[], &[UNWRAP]), site(&[], &[])] {
            let base = Arc::new(StringArraySerializer::new());
            let once = base.contextualize(&resolver, Some(&property)).unwrap();
            let twice = once.contextualize(&resolver, Some(&property)).unwrap();

            assert_eq!(once.unwrap_policy(), twice.unwrap_policy());
            assert!(Arc::ptr_eq(&once, &twice));
        }
    }

    #[test]
    fn contextualize_propagates_resolver_errors() {
        let base = Arc::new(IntArraySerializer::new());
        let err = base.contextualize(&Broken, Some(&site(&[], &[]))).unwrap_err();
        assert_eq!(err.to_string(), "malformed annotation");

        let err = base
            .contextualize(&FormatOverrides::new(), Some(&site(&["BOGUS"], &[])))
            .unwrap_err();
        assert!(matches!(err.kind, Kind::UnknownFormatFeature(_)));
    }

    #[test]
    fn tagged_envelope_pairs() {
        let ser = IntArraySerializer::new();
        let tagger = StdTypeTagger::new();

        for value in [&[][..], &[7][..], &[1, 2, 3][..]] {
            let mut writer = TokenWriter::new();
            ser.serialize_with_type(value, &mut writer, &SerializationConfig::new(), &tagger)
                .unwrap();

            let tokens = &writer.tokens;
            assert_eq!(tokens[0], Token::StartArray(Some(2)));
            assert_eq!(tokens[1], Token::String("[i32]".to_string()));
            assert_eq!(tokens[2], Token::StartArray(None));
            assert!(tokens[3].is_current_value());
            let contents = &tokens[4..tokens.len() - 2];
            assert_eq!(contents.len(), value.len());
            assert!(contents.iter().all(|t| matches!(t, Token::I64(_))));
            assert_eq!(tokens[tokens.len() - 2], Token::EndArray);
            assert_eq!(tokens[tokens.len() - 1], Token::EndArray);
        }
    }

    #[test]
    fn tagged_never_unwraps() {
        let ser = StringArraySerializer::new().with_resolved(UnwrapPolicy::ForceUnwrap);
        let mut writer = JsonWriter::new();
        ser.serialize_with_type(
            &["only".to_string()],
            &mut writer,
            &unwrapping(),
            &StdTypeTagger::named(),
        )
        .unwrap();

        assert_eq!(
            writer.into_string().unwrap(),
            r#"["[String]",["only"]]"#
        );
    }

    #[test]
    fn tagged_inclusions() {
        let ser = IntArraySerializer::new();
        let ints = ser.handled_type().clone();
        let cases = [
            (Inclusion::WrapperArray, r#"["ints",[1,2]]"#),
            (Inclusion::WrapperObject, r#"{"ints":[1,2]}"#),
            // arrays cannot carry a property, so these fall back to a wrapper array
            (Inclusion::MetadataProperty, r#"["ints",[1,2]]"#),
            (Inclusion::PayloadProperty, r#"["ints",[1,2]]"#),
        ];

        for (inclusion, expected) in cases {
            let tagger = StdTypeTagger::named()
                .register(&ints, "ints")
                .with_inclusion(inclusion);
            let mut writer = JsonWriter::new();
            ser.serialize_with_type(&[1, 2], &mut writer, &SerializationConfig::new(), &tagger)
                .unwrap();
            assert_eq!(writer.into_string().unwrap(), expected, "{inclusion:?}");
        }
    }

    #[test]
    fn tagged_parent_property() {
        let ser = IntArraySerializer::new();
        let tagger = StdTypeTagger::named()
            .register(ser.handled_type(), "ints")
            .with_inclusion(Inclusion::ParentProperty)
            .with_property("kind");

        let mut writer = JsonWriter::new();
        writer.write_start_object().unwrap();
        writer.write_field_name("values").unwrap();
        ser.serialize_with_type(&[3], &mut writer, &SerializationConfig::new(), &tagger)
            .unwrap();
        writer.write_end_object().unwrap();

        assert_eq!(
            writer.into_string().unwrap(),
            r#"{"values":[3],"kind":"ints"}"#
        );
    }

    #[test]
    fn tagged_native_ids() {
        let ser = IntArraySerializer::new();
        let mut writer = TokenWriter::with_native_type_ids();
        ser.serialize_with_type(
            &[4],
            &mut writer,
            &SerializationConfig::new(),
            &StdTypeTagger::new(),
        )
        .unwrap();

        assert_eq!(writer.tokens[0], Token::TypeId("[i32]".to_string()));
        assert_eq!(writer.tokens[1], Token::StartArray(None));
        assert_eq!(writer.tokens[3], Token::I64(4));
        assert_eq!(writer.tokens[4], Token::EndArray);
        assert_eq!(writer.tokens.len(), 5);
    }

    #[test]
    fn tagged_binds_current_value() {
        let ser = StringArraySerializer::new();
        let mut writer = TokenWriter::new();
        let value = ["a".to_string(), "b".to_string()];
        ser.serialize_with_type(
            &value,
            &mut writer,
            &SerializationConfig::new(),
            &StdTypeTagger::new(),
        )
        .unwrap();

        let current = writer.tokens[3].as_current_value().unwrap();
        assert_eq!(current.value_type, TypeRef::of::<[String]>(LogicalType::Array));
        assert_eq!(current.len, 2);
    }

    #[test]
    fn tagged_failures_propagate() {
        let failing = Failing(ArrayBase::new(TypeRef::of::<[i32]>(LogicalType::Array)));
        let mut writer = TokenWriter::new();
        let err = failing
            .serialize_with_type(
                &[1, 2],
                &mut writer,
                &SerializationConfig::new(),
                &StdTypeTagger::new(),
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "element exploded");
        // the envelope is left open
        assert_eq!(writer.tokens.last(), Some(&Token::I64(1)));

        let mut writer = TokenWriter::new();
        let err = IntArraySerializer::new()
            .serialize_with_type(&[1], &mut writer, &SerializationConfig::new(), &FailingTagger)
            .unwrap_err();
        assert_eq!(err.to_string(), "no id for you");
        assert!(writer.tokens.is_empty());
    }

    #[test]
    fn plain_unwrapping() {
        let one = ["solo".to_string()];
        let two = ["a".to_string(), "b".to_string()];
        let cases = [
            (UnwrapPolicy::Unspecified, SerializationConfig::new(), r#"["solo"]"#),
            (UnwrapPolicy::Unspecified, unwrapping(), r#""solo""#),
            (UnwrapPolicy::ForceUnwrap, SerializationConfig::new(), r#""solo""#),
            (UnwrapPolicy::ForceKeep, unwrapping(), r#"["solo"]"#),
        ];

        for (policy, config, expected) in cases {
            let ser = StringArraySerializer::new().with_resolved(policy);
            let mut writer = JsonWriter::new();
            ser.serialize(&one, &mut writer, &config).unwrap();
            assert_eq!(writer.into_string().unwrap(), expected, "{policy:?}");

            // longer arrays are never unwrapped
            let mut writer = JsonWriter::new();
            ser.serialize(&two, &mut writer, &config).unwrap();
            assert_eq!(writer.into_string().unwrap(), r#"["a","b"]"#);
        }
    }
}
