// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
mod coercion;
mod deserializer;
mod error;
mod impls;
mod traits;

pub use error::Result;
pub use error::{Error, Expected, Kind, Unexpected};

pub use coercion::{CoercionAction, CoercionConfig, CoercionConfigs, CoercionInputShape};
pub use deserializer::Deserializer;
pub use traits::{
    Deserialize, DeserializeOwned, Deserializer as DeserializerTrait, MapAccess, SeqAccess,
    Visitor, VisitorOption,
};

/// Deserialize a `T` out of an already parsed json value.
///
/// # Errors
/// Errors if the value does not fit `T` under the given coercion settings.
pub fn from_value<'de, T>(value: &'de serde_json::Value, coercions: &CoercionConfigs) -> Result<T>
where
    T: Deserialize<'de>,
{
    T::deserialize(Deserializer::new(value, coercions))
}
