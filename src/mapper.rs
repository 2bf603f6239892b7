// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::sync::Arc;

use crate::{
    config::{ConfigError, MapperConfig},
    de::{self, CoercionAction, CoercionConfig, CoercionConfigs, Deserialize, DeserializeOwned},
    ser::{
        self, ArraySerializer, FormatDirective, FormatOverrides, JsonWriter, PropertySite,
        Serialize, SerializationConfig, SerializationFeature, TypeTagger,
    },
    LogicalType, TypeRef,
};

/// Reads and writes json with one set of settings.
///
/// Cheap to share; every method takes `&self`.
#[derive(Clone, Debug, Default)]
pub struct Mapper {
    serialization: SerializationConfig,
    formats: FormatOverrides,
    coercions: CoercionConfigs,
}

/// Builder for [`Mapper`].
#[derive(Debug, Default)]
pub struct MapperBuilder {
    mapper: Mapper,
}

impl Mapper {
    /// A mapper with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a mapper.
    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    /// # Errors
    /// Errors if a format entry is invalid.
    pub fn from_config(config: &MapperConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            serialization: config.serialization_config(),
            formats: config.format_overrides()?,
            coercions: config.coercions.clone(),
        })
    }

    /// Load a [`MapperConfig`] from json and build a mapper from it.
    ///
    /// # Errors
    /// Errors if the json is malformed or a format entry is invalid.
    pub fn from_config_str(json: &str) -> Result<Self, ConfigError> {
        Self::from_config(&MapperConfig::from_json_str(json)?)
    }

    /// The global feature switches.
    pub fn serialization_config(&self) -> &SerializationConfig {
        &self.serialization
    }

    /// The per-type format defaults.
    pub fn format_overrides(&self) -> &FormatOverrides {
        &self.formats
    }

    /// The read-side coercion settings.
    pub fn coercion_configs(&self) -> &CoercionConfigs {
        &self.coercions
    }

    /// Parse `json` and read a `T` out of it.
    ///
    /// # Errors
    /// Errors if `json` is malformed or does not fit `T`.
    pub fn read_value<T>(&self, json: &str) -> de::Result<T>
    where
        T: DeserializeOwned,
    {
        let value: serde_json::Value = serde_json::from_str(json)?;
        T::deserialize(de::Deserializer::new(&value, &self.coercions))
    }

    /// Read a `T` out of an already parsed value, borrowing from it where possible.
    ///
    /// # Errors
    /// Errors if `value` does not fit `T`.
    pub fn from_json_value<'de, T>(&self, value: &'de serde_json::Value) -> de::Result<T>
    where
        T: Deserialize<'de>,
    {
        de::from_value(value, &self.coercions)
    }

    /// Bind `serializer` to a property using this mapper's format settings.
    ///
    /// # Errors
    /// Errors if the property's format annotation is invalid.
    pub fn contextualize<S>(
        &self,
        serializer: &Arc<S>,
        property: Option<&PropertySite>,
    ) -> ser::Result<Arc<S>>
    where
        S: ArraySerializer,
    {
        serializer.contextualize(&self.formats, property)
    }

    /// Write `value` as a json array.
    ///
    /// # Errors
    /// Errors if an element fails to serialize.
    pub fn write_array<S>(&self, serializer: &S, value: &[S::Element]) -> ser::Result<String>
    where
        S: ArraySerializer,
    {
        let mut writer = JsonWriter::new();
        serializer.serialize(value, &mut writer, &self.serialization)?;
        writer.into_string()
    }

    /// Write `value` as a json array wrapped in a type-id envelope.
    ///
    /// # Errors
    /// Errors if the tagger or an element fails.
    pub fn write_array_tagged<S>(
        &self,
        serializer: &S,
        value: &[S::Element],
        tagger: &dyn TypeTagger,
    ) -> ser::Result<String>
    where
        S: ArraySerializer,
    {
        let mut writer = JsonWriter::new();
        serializer.serialize_with_type(value, &mut writer, &self.serialization, tagger)?;
        writer.into_string()
    }

    /// Write any [`Serialize`] value as json.
    ///
    /// # Errors
    /// Errors if `value` fails to serialize.
    pub fn write_value<T>(&self, value: &T) -> ser::Result<String>
    where
        T: Serialize + ?Sized,
    {
        let mut writer = JsonWriter::new();
        value.serialize(&mut writer, &self.serialization)?;
        writer.into_string()
    }
}

impl MapperBuilder {
    /// Turn a serialization feature on.
    #[must_use]
    pub fn enable(mut self, feature: SerializationFeature) -> Self {
        self.mapper.serialization.enable(feature);
        self
    }

    /// Turn a serialization feature off.
    #[must_use]
    pub fn disable(mut self, feature: SerializationFeature) -> Self {
        self.mapper.serialization.disable(feature);
        self
    }

    /// Edit the coercion settings that apply to every target type.
    #[must_use]
    pub fn with_coercion_config_defaults(mut self, f: impl FnOnce(&mut CoercionConfig)) -> Self {
        f(self.mapper.coercions.defaults_mut());
        self
    }

    /// Edit the coercion settings for one logical type.
    #[must_use]
    pub fn with_coercion_config(
        mut self,
        target: LogicalType,
        f: impl FnOnce(&mut CoercionConfig),
    ) -> Self {
        f(self.mapper.coercions.find_or_create(target));
        self
    }

    /// Set the action used when no coercion setting matches.
    #[must_use]
    pub fn with_default_coercion_action(mut self, action: CoercionAction) -> Self {
        self.mapper.coercions.set_default_action(action);
        self
    }

    /// Set the default format for a handled type.
    #[must_use]
    pub fn with_format_override(mut self, handled: &TypeRef, directive: FormatDirective) -> Self {
        self.mapper.formats.set(handled, directive);
        self
    }

    /// Finish building.
    pub fn build(self) -> Mapper {
        self.mapper
    }
}
