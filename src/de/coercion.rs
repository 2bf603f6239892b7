// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use indexmap::IndexMap;

use crate::LogicalType;

/// What to do with input that does not directly match the target type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum CoercionAction {
    /// Reject the input with an error.
    Fail,
    /// Let the target try to read the input as-is.
    #[default]
    TryConvert,
    /// Read the input as null.
    AsNull,
    /// Read the input as an empty instance of the target.
    AsEmpty,
}

/// The shape of an input value, as far as coercion is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(serde::Deserialize, serde::Serialize)]
#[allow(missing_docs)]
pub enum CoercionInputShape {
    Array,
    Object,
    Integer,
    Float,
    Boolean,
    String,
    EmptyArray,
    EmptyObject,
    /// `""`.
    EmptyString,
}

/// Actions for each input shape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct CoercionConfig {
    actions: IndexMap<CoercionInputShape, CoercionAction>,
}

impl CoercionConfig {
    /// An empty config that defers every input shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the action for one input shape.
    pub fn set_coercion(&mut self, input: CoercionInputShape, action: CoercionAction) -> &mut Self {
        self.actions.insert(input, action);
        self
    }

    /// The action explicitly configured for `input`, if any.
    pub fn find_action(&self, input: CoercionInputShape) -> Option<CoercionAction> {
        self.actions.get(&input).copied()
    }
}

/// Every coercion setting of a mapper.
///
/// Lookups go from most to least specific: the target's own config, then the defaults for
/// the input shape, then built-in rules, then the default action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CoercionConfigs {
    default_action: CoercionAction,
    defaults: CoercionConfig,
    per_type: IndexMap<LogicalType, CoercionConfig>,
}

impl CoercionConfigs {
    /// No per-type settings, no defaults, and `TryConvert` as the default action.
    pub fn new() -> Self {
        Self::default()
    }

    /// The action used when nothing more specific is configured.
    pub fn default_action(&self) -> CoercionAction {
        self.default_action
    }

    /// Set the action used when nothing more specific is configured.
    pub fn set_default_action(&mut self, action: CoercionAction) -> &mut Self {
        self.default_action = action;
        self
    }

    /// Settings that apply to every target type.
    pub fn defaults_mut(&mut self) -> &mut CoercionConfig {
        &mut self.defaults
    }

    /// Settings for one logical type, created empty if missing.
    pub fn find_or_create(&mut self, target: LogicalType) -> &mut CoercionConfig {
        self.per_type.entry(target).or_default()
    }

    /// Decide what to do when `input` is read into a `target`.
    pub fn find_coercion(&self, target: LogicalType, input: CoercionInputShape) -> CoercionAction {
        if let Some(action) = self
            .per_type
            .get(&target)
            .and_then(|config| config.find_action(input))
        {
            return action;
        }

        if let Some(action) = self.defaults.find_action(input) {
            return action;
        }

        if input == CoercionInputShape::EmptyString && target.is_container() {
            return CoercionAction::Fail;
        }

        self.default_action
    }
}

#[cfg(test)]
mod tests {
    use super::{CoercionAction, CoercionConfigs, CoercionInputShape};
    use crate::LogicalType;

    #[test]
    fn empty_string_into_containers_fails_by_default() {
        let configs = CoercionConfigs::new();
        for target in [LogicalType::Array, LogicalType::Collection, LogicalType::Map] {
            assert_eq!(
                configs.find_coercion(target, CoercionInputShape::EmptyString),
                CoercionAction::Fail
            );
        }
        assert_eq!(
            configs.find_coercion(LogicalType::Textual, CoercionInputShape::EmptyString),
            CoercionAction::TryConvert
        );
    }

    #[test]
    fn specific_wins() {
        let mut configs = CoercionConfigs::new();
        configs
            .defaults_mut()
            .set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsEmpty);
        configs
            .find_or_create(LogicalType::Map)
            .set_coercion(CoercionInputShape::EmptyString, CoercionAction::AsNull);

        assert_eq!(
            configs.find_coercion(LogicalType::Collection, CoercionInputShape::EmptyString),
            CoercionAction::AsEmpty
        );
        assert_eq!(
            configs.find_coercion(LogicalType::Map, CoercionInputShape::EmptyString),
            CoercionAction::AsNull
        );
    }

    #[test]
    fn other_shapes_use_default_action() {
        let mut configs = CoercionConfigs::new();
        assert_eq!(
            configs.find_coercion(LogicalType::Array, CoercionInputShape::Integer),
            CoercionAction::TryConvert
        );

        configs.set_default_action(CoercionAction::Fail);
        assert_eq!(
            configs.find_coercion(LogicalType::Array, CoercionInputShape::Integer),
            CoercionAction::Fail
        );
    }

    #[test]
    fn from_json() -> color_eyre::Result<()> {
        let configs: CoercionConfigs = serde_json::from_str(
            r#"{
                "defaults": { "EmptyString": "AsEmpty" },
                "per_type": { "Array": { "EmptyString": "Fail" } }
            }"#,
        )?;

        assert_eq!(configs.default_action(), CoercionAction::TryConvert);
        assert_eq!(
            configs.find_coercion(LogicalType::Collection, CoercionInputShape::EmptyString),
            CoercionAction::AsEmpty
        );
        assert_eq!(
            configs.find_coercion(LogicalType::Array, CoercionInputShape::EmptyString),
            CoercionAction::Fail
        );
        Ok(())
    }
}
