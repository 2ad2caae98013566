//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Ji.
//! The Ji project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Ji Loader Module
//!
//! The per-plugin code-loading unit. Each cached plugin owns exactly one
//! [`JiPluginLoader`] holding the byte maps decomposed from its archive.
//!
//! ## Resolution Order
//!
//! Resolution is deliberately self-first: a plugin's own code must shadow
//! same-named host code, not be shadowed by it. `resolve` consults the
//! loader's already-defined cache, then drains and defines from the
//! plugin's own class bytes, and only then falls back to the parent
//! resolver's normal resolution.
//!
//! ## Drain Semantics
//!
//! Class bytes are removed from the pending map the moment they are
//! defined; the defined unit owns them from then on. A unit is defined at
//! most once per loader. Resource bytes are never drained and serve a
//! fresh stream on every request.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::{Arc, Mutex, RwLock};

use crate::errors::{JiError, Result};

/// A defined unit of plugin code: the canonical name, the owning plugin,
/// a BLAKE3 content fingerprint, and the raw bytes drained from the
/// archive.
#[derive(Clone, Debug)]
pub struct JiCodeUnit {
    name: String,
    origin: String,
    fingerprint: String,
    bytes: Vec<u8>,
}

impl JiCodeUnit {
    /// Defines a unit from raw bytes, fingerprinting the content.
    pub fn define(name: impl Into<String>, origin: impl Into<String>, bytes: Vec<u8>) -> Self {
        let fingerprint = blake3::hash(&bytes).to_hex().to_string();
        JiCodeUnit {
            name: name.into(),
            origin: origin.into(),
            fingerprint,
            bytes,
        }
    }

    /// Canonical unit name, e.g. `a.b.C`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the plugin or resolver that defined the unit.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Hex BLAKE3 fingerprint of the unit's bytes.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// A byte-backed resource location for consumers that need a named,
/// re-openable handle rather than a one-shot stream. Deliberately not a
/// general URL abstraction.
#[derive(Clone, Debug)]
pub struct JiVirtualResource {
    location: String,
    bytes: Vec<u8>,
}

impl JiVirtualResource {
    pub fn new(location: impl Into<String>, bytes: Vec<u8>) -> Self {
        JiVirtualResource {
            location: location.into(),
            bytes,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Opens a fresh reader over the stored bytes.
    pub fn open(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes.clone())
    }
}

/// A code-resolution unit. Loaders, the host resolver, and resolver chains
/// all speak this contract, so delegation is plain ordered composition.
pub trait JiCodeResolver: Send + Sync {
    /// Looks a unit up in this resolver's own holdings only, without
    /// delegating further.
    fn find_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>>;

    /// Full resolution through whatever chain this resolver fronts.
    fn resolve_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.find_unit(name)
    }

    /// Raw bytes of a resource held by this resolver.
    fn open_resource(&self, _path: &str) -> Option<Vec<u8>> {
        None
    }

    /// A re-openable location for a resource held by this resolver.
    fn locate_resource(&self, _path: &str) -> Option<JiVirtualResource> {
        None
    }
}

/// Ordered first-hit-wins composition of resolvers.
pub struct JiResolverChain {
    resolvers: Vec<Arc<dyn JiCodeResolver>>,
}

impl JiResolverChain {
    pub fn new(resolvers: Vec<Arc<dyn JiCodeResolver>>) -> Self {
        JiResolverChain { resolvers }
    }

    /// A chain that resolves nothing; the default parent for hosts that
    /// contribute no code of their own.
    pub fn empty() -> Self {
        JiResolverChain {
            resolvers: Vec::new(),
        }
    }
}

impl JiCodeResolver for JiResolverChain {
    fn find_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.resolvers.iter().find_map(|r| r.find_unit(name))
    }

    fn resolve_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.resolvers.iter().find_map(|r| r.resolve_unit(name))
    }

    fn open_resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resolvers.iter().find_map(|r| r.open_resource(path))
    }

    fn locate_resource(&self, path: &str) -> Option<JiVirtualResource> {
        self.resolvers.iter().find_map(|r| r.locate_resource(path))
    }
}

/// The isolated, self-first code loader scoped to one plugin.
pub struct JiPluginLoader {
    plugin_name: String,
    parent: Arc<dyn JiCodeResolver>,
    /// Pending class bytes, drained as each unit is defined.
    classes: Mutex<HashMap<String, Vec<u8>>>,
    /// Jar-borne resources, never drained.
    resources: HashMap<String, Vec<u8>>,
    /// Original key set of `classes`, retained for introspection after the
    /// byte map drains.
    class_names: HashSet<String>,
    /// Units already defined by this loader.
    defined: RwLock<HashMap<String, Arc<JiCodeUnit>>>,
    /// Per-name resolution locks so racing first requests for the same
    /// unit serialize without stalling unrelated names.
    name_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// The owning snapshot's live static-file map, consulted by the
    /// virtual-resource fallback.
    live_files: Arc<HashMap<String, Vec<u8>>>,
}

impl JiPluginLoader {
    pub fn new(
        plugin_name: impl Into<String>,
        parent: Arc<dyn JiCodeResolver>,
        classes: HashMap<String, Vec<u8>>,
        resources: HashMap<String, Vec<u8>>,
        live_files: Arc<HashMap<String, Vec<u8>>>,
    ) -> Self {
        let class_names = classes.keys().cloned().collect();
        JiPluginLoader {
            plugin_name: plugin_name.into(),
            parent,
            classes: Mutex::new(classes),
            resources,
            class_names,
            defined: RwLock::new(HashMap::new()),
            name_locks: Mutex::new(HashMap::new()),
            live_files,
        }
    }

    /// Name of the plugin this loader is scoped to.
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// The immutable snapshot of originally-owned unit names, valid for the
    /// loader's whole lifetime regardless of drainage.
    pub fn owned_names(&self) -> &HashSet<String> {
        &self.class_names
    }

    /// True while the named unit's bytes are still waiting to be defined.
    pub fn is_unit_pending(&self, name: &str) -> bool {
        self.classes.lock().unwrap().contains_key(name)
    }

    /// Drains the named unit's bytes and defines it, or delegates to the
    /// parent's own holdings when this loader never owned the name.
    pub fn define_from_name(&self, name: &str) -> Result<Arc<JiCodeUnit>> {
        let drained = self.classes.lock().unwrap().remove(name);
        if let Some(bytes) = drained {
            let unit = Arc::new(JiCodeUnit::define(name, &self.plugin_name, bytes));
            self.defined
                .write()
                .unwrap()
                .insert(name.to_string(), unit.clone());
            log::debug!(
                "dock.loader.define: code unit defined - plugin={}, unit={}",
                self.plugin_name,
                name
            );
            return Ok(unit);
        }

        self.parent
            .find_unit(name)
            .ok_or_else(|| JiError::not_found(name))
    }

    /// Resolves a unit name: the already-defined cache, then the plugin's
    /// own pending bytes, then the parent's normal resolution.
    pub fn resolve(&self, name: &str) -> Result<Arc<JiCodeUnit>> {
        if let Some(unit) = self.defined.read().unwrap().get(name) {
            return Ok(unit.clone());
        }

        let name_lock = self.name_lock(name);
        let _guard = name_lock.lock().unwrap();

        // another thread may have defined the unit while we waited
        if let Some(unit) = self.defined.read().unwrap().get(name) {
            return Ok(unit.clone());
        }

        match self.define_from_name(name) {
            Ok(unit) => Ok(unit),
            Err(e) if e.is_not_found() => self
                .parent
                .resolve_unit(name)
                .ok_or_else(|| JiError::not_found(name)),
            Err(e) => Err(e),
        }
    }

    /// Opens a fresh stream over a jar-borne resource, delegating to the
    /// parent when this loader does not hold the path.
    pub fn open_resource_stream(&self, path: &str) -> Result<Cursor<Vec<u8>>> {
        if let Some(bytes) = self.resources.get(path) {
            return Ok(Cursor::new(bytes.clone()));
        }

        self.parent
            .open_resource(path)
            .map(Cursor::new)
            .ok_or_else(|| JiError::not_found(path))
    }

    /// Locates a re-openable resource: the parent's resolution first, then
    /// `messages/<path>` against the plugin's live static-file map, then
    /// this loader's own resources.
    pub fn locate_resource_url(&self, path: &str) -> Option<JiVirtualResource> {
        if let Some(found) = self.parent.locate_resource(path) {
            return Some(found);
        }

        let message_key = format!("messages/{}", path);
        if let Some(bytes) = self.live_files.get(&message_key) {
            return Some(JiVirtualResource::new(
                self.virtual_location(&message_key),
                bytes.clone(),
            ));
        }

        self.resources
            .get(path)
            .map(|bytes| JiVirtualResource::new(self.virtual_location(path), bytes.clone()))
    }

    fn virtual_location(&self, path: &str) -> String {
        format!("plugin:{}!/{}", self.plugin_name, path)
    }

    fn name_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.name_locks.lock().unwrap();
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

impl JiCodeResolver for JiPluginLoader {
    fn find_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        if let Some(unit) = self.defined.read().unwrap().get(name) {
            return Some(unit.clone());
        }

        let name_lock = self.name_lock(name);
        let _guard = name_lock.lock().unwrap();

        if let Some(unit) = self.defined.read().unwrap().get(name) {
            return Some(unit.clone());
        }

        let bytes = self.classes.lock().unwrap().remove(name)?;
        let unit = Arc::new(JiCodeUnit::define(name, &self.plugin_name, bytes));
        self.defined
            .write()
            .unwrap()
            .insert(name.to_string(), unit.clone());
        Some(unit)
    }

    fn resolve_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.resolve(name).ok()
    }

    fn open_resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.get(path).cloned()
    }

    fn locate_resource(&self, path: &str) -> Option<JiVirtualResource> {
        self.resources
            .get(path)
            .map(|bytes| JiVirtualResource::new(self.virtual_location(path), bytes.clone()))
    }
}

impl std::fmt::Debug for JiPluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiPluginLoader")
            .field("plugin_name", &self.plugin_name)
            .field("owned_units", &self.class_names.len())
            .field("pending_units", &self.classes.lock().unwrap().len())
            .field("defined_units", &self.defined.read().unwrap().len())
            .field("resources", &self.resources.len())
            .finish_non_exhaustive()
    }
}
