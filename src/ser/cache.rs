// Copyright (c) 2024 Lily Lyons
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::sync::Arc;

use dashmap::DashMap;

use super::{ArraySerializer, FormatOverrides, FormatResolver, PropertySite, Result};

/// Remembers the contextualized serializer for every property it has seen.
///
/// The cache is bound to one resolver for its whole life. Entries are keyed on the full
/// [`PropertySite`], so two sites that share an owner and name but carry different format
/// annotations resolve separately.
///
/// The canonical instance is handed out as-is for values with no property.
/// Safe to share between threads; concurrent misses for the same property may both resolve,
/// but only one result is kept.
#[derive(Debug)]
pub struct ContextualCache<S, R = FormatOverrides> {
    canonical: Arc<S>,
    resolver: R,
    resolved: DashMap<PropertySite, Arc<S>>,
}

impl<S, R> ContextualCache<S, R>
where
    S: ArraySerializer,
    R: FormatResolver,
{
    /// Create a cache around `canonical` that resolves formats through `resolver`.
    pub fn new(canonical: S, resolver: R) -> Self {
        Self {
            canonical: Arc::new(canonical),
            resolver,
            resolved: DashMap::new(),
        }
    }

    /// The instance used when there is no property.
    pub fn canonical(&self) -> &Arc<S> {
        &self.canonical
    }

    /// The resolver this cache was built with.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Get the serializer for a property, resolving it on first use.
    ///
    /// # Errors
    /// Errors if the property's format cannot be resolved.
    /// Resolution errors are not cached, so a later call will try again.
    pub fn for_property(&self, property: Option<&PropertySite>) -> Result<Arc<S>> {
        let Some(property) = property else {
            return Ok(Arc::clone(&self.canonical));
        };

        if let Some(hit) = self.resolved.get(property) {
            return Ok(Arc::clone(hit.value()));
        }

        tracing::trace!(owner = %property.owner, property = %property.name, "contextual cache miss");
        let resolved = self.canonical.contextualize(&self.resolver, Some(property))?;
        let entry = self.resolved.entry(property.clone()).or_insert(resolved);
        Ok(Arc::clone(entry.value()))
    }

    /// How many property sites have been resolved.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Has nothing been resolved yet?
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
