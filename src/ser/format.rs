// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::borrow::Cow;

use indexmap::IndexMap;

use super::{Error, Kind, Result};
use crate::TypeRef;

/// A local override for single-element unwrapping.
///
/// [`UnwrapPolicy::Unspecified`] defers to
/// [`SerializationFeature::WriteSingleElemArraysUnwrapped`](super::SerializationFeature).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum UnwrapPolicy {
    /// Always write one-element arrays as their element.
    ForceUnwrap,
    /// Never unwrap.
    ForceKeep,
    /// Use the global setting.
    #[default]
    Unspecified,
}

impl UnwrapPolicy {
    /// Decide, given the current global setting.
    pub fn resolve(self, global: bool) -> bool {
        match self {
            Self::ForceUnwrap => true,
            Self::ForceKeep => false,
            Self::Unspecified => global,
        }
    }

    /// Is this policy unspecified?
    pub fn is_unspecified(self) -> bool {
        self == Self::Unspecified
    }

    /// `other` if it says anything, `self` otherwise.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        if other.is_unspecified() {
            self
        } else {
            other
        }
    }
}

impl From<Option<bool>> for UnwrapPolicy {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::ForceUnwrap,
            Some(false) => Self::ForceKeep,
            None => Self::Unspecified,
        }
    }
}

/// Per-property format switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatFeature {
    /// Write one-element arrays as their sole element.
    WriteSingleElemArraysUnwrapped,
}

impl FormatFeature {
    /// The name used in annotations and config files.
    pub fn name(self) -> &'static str {
        match self {
            Self::WriteSingleElemArraysUnwrapped => "WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED",
        }
    }
}

impl std::str::FromStr for FormatFeature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED" => Ok(Self::WriteSingleElemArraysUnwrapped),
            _ => Err(Error {
                kind: Kind::UnknownFormatFeature(s.to_string()),
            }),
        }
    }
}

/// A resolved set of format settings for one property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FormatDirective {
    unwrap_single: UnwrapPolicy,
}

impl FormatDirective {
    /// Every feature unspecified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force `feature` on.
    #[must_use]
    pub fn with(mut self, feature: FormatFeature) -> Self {
        self.set(feature, UnwrapPolicy::ForceUnwrap);
        self
    }

    /// Force `feature` off.
    #[must_use]
    pub fn without(mut self, feature: FormatFeature) -> Self {
        self.set(feature, UnwrapPolicy::ForceKeep);
        self
    }

    fn set(&mut self, feature: FormatFeature, policy: UnwrapPolicy) {
        match feature {
            FormatFeature::WriteSingleElemArraysUnwrapped => self.unwrap_single = policy,
        }
    }

    /// The tri-state setting of a feature.
    pub fn feature(&self, feature: FormatFeature) -> UnwrapPolicy {
        match feature {
            FormatFeature::WriteSingleElemArraysUnwrapped => self.unwrap_single,
        }
    }

    /// Shorthand for the single-element unwrap setting.
    pub fn unwrap_single(&self) -> UnwrapPolicy {
        self.unwrap_single
    }

    /// Layer `overrides` on top of `self`. Settings `overrides` leaves unspecified are kept.
    #[must_use]
    pub fn merged_with(self, overrides: FormatDirective) -> Self {
        Self {
            unwrap_single: self.unwrap_single.or(overrides.unwrap_single),
        }
    }
}

/// Raw format data attached to a property, by feature name.
///
/// This is unvalidated; [`FormatAnnotation::parse`] checks it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct FormatAnnotation {
    /// Features to enable.
    pub with: Vec<String>,
    /// Features to disable.
    pub without: Vec<String>,
}

impl FormatAnnotation {
    /// Validate this annotation.
    ///
    /// # Errors
    /// Errors if a feature name is unknown, or if a feature is both enabled and disabled.
    pub fn parse(&self) -> Result<FormatDirective> {
        let mut directive = FormatDirective::new();
        for name in &self.with {
            directive = directive.with(name.parse()?);
        }
        for name in &self.without {
            let feature: FormatFeature = name.parse()?;
            if directive.feature(feature) == UnwrapPolicy::ForceUnwrap {
                return Err(Error {
                    kind: Kind::ConflictingFormatFeature(feature.name()),
                });
            }
            directive = directive.without(feature);
        }
        Ok(directive)
    }
}

/// Where a value is being written: a named property of some owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct PropertySite {
    /// The type declaring the property.
    pub owner: Cow<'static, str>,
    /// The property name.
    pub name: Cow<'static, str>,
    /// Format data attached directly to the property.
    pub format: Option<FormatAnnotation>,
}

impl PropertySite {
    /// A property with no format annotation.
    pub fn new(owner: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            format: None,
        }
    }

    /// Attach a format annotation.
    #[must_use]
    pub fn with_format(mut self, format: FormatAnnotation) -> Self {
        self.format = Some(format);
        self
    }
}

/// Finds the format settings that apply at a property.
pub trait FormatResolver {
    /// `None` means nothing is configured for this property or type.
    fn find_format_overrides(
        &self,
        property: &PropertySite,
        handled: &TypeRef,
    ) -> Result<Option<FormatDirective>>;
}

/// Configured per-type format defaults.
///
/// Resolution layers the property's own annotation over the default for the handled type.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FormatOverrides {
    by_type: IndexMap<String, FormatDirective>,
}

impl FormatOverrides {
    /// No per-type defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default format for a handled type, replacing any previous one.
    pub fn set(&mut self, ty: &TypeRef, directive: FormatDirective) {
        self.set_named(ty.name(), directive);
    }

    /// Like [`FormatOverrides::set`], by full type name.
    pub fn set_named(&mut self, name: impl Into<String>, directive: FormatDirective) {
        self.by_type.insert(name.into(), directive);
    }

    /// The default format for a handled type, if one was set.
    pub fn get(&self, ty: &TypeRef) -> Option<&FormatDirective> {
        self.by_type.get(ty.name())
    }
}

impl FormatResolver for FormatOverrides {
    fn find_format_overrides(
        &self,
        property: &PropertySite,
        handled: &TypeRef,
    ) -> Result<Option<FormatDirective>> {
        let local = property.format.as_ref().map(FormatAnnotation::parse).transpose()?;
        let directive = match (self.get(handled).copied(), local) {
            (None, None) => None,
            (Some(d), None) | (None, Some(d)) => Some(d),
            (Some(default), Some(local)) => Some(default.merged_with(local)),
        };
        Ok(directive)
    }
}

impl<R> FormatResolver for &R
where
    R: FormatResolver + ?Sized,
{
    fn find_format_overrides(
        &self,
        property: &PropertySite,
        handled: &TypeRef,
    ) -> Result<Option<FormatDirective>> {
        (**self).find_format_overrides(property, handled)
    }
}
