// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
mod array;
mod cache;
mod error;
mod features;
mod format;
mod impls;
mod json;
mod tokens;
mod traits;
mod type_id;
mod writer;

pub use error::Result;

pub use error::{Error, Kind};

pub use array::{
    ArrayBase, ArraySerializer, BooleanArraySerializer, DoubleArraySerializer,
    FloatArraySerializer, IntArraySerializer, LongArraySerializer, ObjectArraySerializer,
    ShortArraySerializer, StringArraySerializer,
};
pub use cache::ContextualCache;
pub use features::{FeatureSwitch, SerializationConfig, SerializationFeature};
pub use format::{
    FormatAnnotation, FormatDirective, FormatFeature, FormatOverrides, FormatResolver,
    PropertySite, UnwrapPolicy,
};
pub use json::JsonWriter;
pub use tokens::{Token, TokenWriter};
pub use traits::Serialize;
pub use type_id::{
    IdStrategy, Inclusion, Shape, StdTypeTagger, TypeTagger, WritableTypeId, DEFAULT_PROPERTY,
};
pub use writer::{CurrentValue, Writer};
