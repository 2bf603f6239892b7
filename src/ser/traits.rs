// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use super::{Result, SerializationConfig, Writer};

/// A value that can write itself to a [`Writer`].
///
/// This trait is object safe, so heterogeneous elements can be stored as `Box<dyn Serialize>`.
pub trait Serialize {
    /// Serialize this value into the given writer.
    fn serialize(&self, writer: &mut dyn Writer, config: &SerializationConfig) -> Result<()>;
}
