// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use indexmap::IndexSet;

/// Global on/off switches for serialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SerializationFeature {
    /// Write one-element arrays as their sole element.
    WriteSingleElemArraysUnwrapped,
}

impl SerializationFeature {
    /// Whether the feature is on in a fresh configuration.
    pub fn enabled_by_default(self) -> bool {
        match self {
            Self::WriteSingleElemArraysUnwrapped => false,
        }
    }
}

/// Anything that can answer whether a [`SerializationFeature`] is enabled.
pub trait FeatureSwitch {
    /// Is `feature` on?
    fn is_enabled(&self, feature: SerializationFeature) -> bool;
}

/// Session-wide serialization settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializationConfig {
    features: IndexSet<SerializationFeature>,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        let features = [SerializationFeature::WriteSingleElemArraysUnwrapped]
            .into_iter()
            .filter(|f| f.enabled_by_default())
            .collect();
        Self { features }
    }
}

impl SerializationConfig {
    /// Every feature at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SerializationConfig::enable`].
    #[must_use]
    pub fn with(mut self, feature: SerializationFeature) -> Self {
        self.enable(feature);
        self
    }

    /// Builder form of [`SerializationConfig::disable`].
    #[must_use]
    pub fn without(mut self, feature: SerializationFeature) -> Self {
        self.disable(feature);
        self
    }

    /// Turn `feature` on.
    pub fn enable(&mut self, feature: SerializationFeature) {
        self.features.insert(feature);
    }

    /// Turn `feature` off.
    pub fn disable(&mut self, feature: SerializationFeature) {
        self.features.shift_remove(&feature);
    }
}

impl FeatureSwitch for SerializationConfig {
    fn is_enabled(&self, feature: SerializationFeature) -> bool {
        self.features.contains(&feature)
    }
}
