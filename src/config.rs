// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use indexmap::IndexMap;

use crate::{
    de::CoercionConfigs,
    ser::{self, FormatAnnotation, FormatOverrides, SerializationConfig, SerializationFeature},
};

/// Everything needed to set up a [`Mapper`](crate::Mapper), as a serde document.
///
/// ```json
/// {
///   "enable": ["WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED"],
///   "formats": { "[i32]": { "without": ["WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED"] } },
///   "coercions": { "defaults": { "EmptyString": "AsEmpty" } }
/// }
/// ```
///
/// Keys of `formats` are full type names, as printed by [`std::any::type_name`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Serialization features to turn on.
    pub enable: Vec<SerializationFeature>,
    /// Serialization features to turn off. Applied after `enable`.
    pub disable: Vec<SerializationFeature>,
    /// Default format settings per handled type.
    pub formats: IndexMap<String, FormatAnnotation>,
    /// Coercion settings for reads.
    pub coercions: CoercionConfigs,
}

/// Errors from loading a [`MapperConfig`].
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ConfigError {
    /// The document was not valid json, or did not match the config layout.
    #[error("Failed to parse mapper config: {0}")]
    #[diagnostic(code(sequin::config::json))]
    Json(#[from] serde_json::Error),
    /// A `formats` entry failed to validate.
    #[error("Invalid format for `{type_name}`: {source}")]
    #[diagnostic(
        code(sequin::config::format),
        help("the only known format feature is WRITE_SINGLE_ELEM_ARRAYS_UNWRAPPED")
    )]
    Format {
        /// The key of the bad entry.
        type_name: String,
        /// Why it failed.
        #[source]
        source: ser::Error,
    },
}

impl MapperConfig {
    /// Parse a config from json.
    ///
    /// # Errors
    /// Errors if the json is malformed or does not match the config layout.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The global feature switches this config describes.
    pub fn serialization_config(&self) -> SerializationConfig {
        let mut config = SerializationConfig::new();
        for &feature in &self.enable {
            config.enable(feature);
        }
        for &feature in &self.disable {
            config.disable(feature);
        }
        config
    }

    /// Validate and collect the per-type format settings.
    ///
    /// # Errors
    /// Errors if any entry names an unknown feature or contradicts itself.
    pub fn format_overrides(&self) -> Result<FormatOverrides, ConfigError> {
        let mut overrides = FormatOverrides::new();
        for (type_name, annotation) in &self.formats {
            let directive = annotation.parse().map_err(|source| ConfigError::Format {
                type_name: type_name.clone(),
                source,
            })?;
            overrides.set_named(type_name.clone(), directive);
        }
        Ok(overrides)
    }
}
