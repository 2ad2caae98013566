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

//! # Ji Registry Module
//!
//! The process-wide plugin cache: a sharded concurrent map from plugin name
//! to snapshot, plus a monotonic version counter bumped on every structural
//! change. The counter is a cheap "has anything changed" signal for
//! code-resolution consumers; its value carries no meaning beyond ordering
//! and may be observed slightly before or after the corresponding map
//! mutation.
//!
//! Every lookup is failure-contained per plugin: an absent name yields
//! `None`/`false`/empty, never an error. Only `cache` fails loudly, since
//! it is a deliberate mutation whose caller needs to know it failed.
//!
//! The registry is an explicitly constructed, explicitly injected value.
//! Hosts build one at startup, hand it to whatever serves requests, and
//! drop it at shutdown; there is no ambient global instance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::JiSystemConfig;
use crate::errors::{JiError, Result};
use crate::io::JiPluginFileHandler;
use crate::metadata::{JiExportType, JiPlugin, JiSettingsForm};

use super::archive::{self, JiArchiveContents};
use super::authorization;
use super::content::{JiPageContent, JiPageContentRequest};
use super::loader::{JiCodeResolver, JiCodeUnit, JiPluginLoader};
use super::snapshot::JiCachedPlugin;

/// The concurrent plugin cache.
pub struct JiPluginCache {
    /// Cached plugins keyed by name.
    plugins: DashMap<String, Arc<JiCachedPlugin>>,
    /// Bumped on every install, eviction, or clear. Consumers compare for
    /// inequality only.
    version: AtomicI64,
    /// Resolver plugin loaders fall back to for host-provided code.
    parent: Arc<dyn JiCodeResolver>,
    /// Live system configuration, read fresh on every enforcement check.
    config: Arc<dyn JiSystemConfig>,
}

impl JiPluginCache {
    pub fn new(parent: Arc<dyn JiCodeResolver>, config: Arc<dyn JiSystemConfig>) -> Self {
        JiPluginCache {
            plugins: DashMap::new(),
            version: AtomicI64::new(1),
            parent,
            config,
        }
    }

    /// Caches a plugin: decomposes its archive, builds the snapshot, and
    /// publishes it under the plugin's name with insert-if-absent
    /// semantics. A concurrent second call for the same name is a silent
    /// no-op; it never overwrites. The version is bumped either way,
    /// because a structural attempt occurred.
    pub fn cache(&self, plugin: &JiPlugin, file_handler: &dyn JiPluginFileHandler) -> Result<()> {
        let contents = match self.decompose(plugin, file_handler) {
            Ok(contents) => contents,
            Err(e) => {
                log::error!(
                    "dock.registry.cache_failed: an error occurred while caching the plugin - plugin={}, error={}",
                    plugin.name,
                    e
                );
                return Err(e);
            }
        };

        let snapshot = Arc::new(JiCachedPlugin::from_parts(
            plugin,
            contents,
            self.parent.clone(),
        ));

        self.plugins
            .entry(plugin.name.clone())
            .or_insert(snapshot);
        self.update_version();

        log::info!(
            "dock.registry.cache: plugin cached - plugin={}, version={}",
            plugin.name,
            plugin.version.as_deref().unwrap_or("")
        );

        Ok(())
    }

    /// Removes the named plugin if present. The version is bumped whether
    /// or not anything was removed.
    pub fn evict(&self, plugin_name: &str) {
        self.plugins.remove(plugin_name);
        self.update_version();

        log::info!(
            "dock.registry.evict: plugin evicted - plugin={}",
            plugin_name
        );
    }

    /// Removes every cached plugin.
    pub fn clear(&self) {
        self.plugins.clear();
        self.update_version();

        log::info!("dock.registry.clear: plugin cache cleared");
    }

    pub fn is_cached(&self, plugin: &JiPlugin) -> bool {
        self.plugins.contains_key(&plugin.name)
    }

    /// Last-modified stamp of the cached plugin, or -1 when absent.
    pub fn get_last_modified(&self, plugin_name: &str) -> i64 {
        match self.plugins.get(plugin_name) {
            Some(snapshot) => snapshot.last_modified(),
            None => -1,
        }
    }

    /// Version string of the cached plugin, or empty when absent.
    pub fn get_plugin_version(&self, plugin_name: &str) -> String {
        self.plugins
            .get(plugin_name)
            .and_then(|snapshot| snapshot.version().map(str::to_string))
            .unwrap_or_default()
    }

    /// Names of all cached plugins. Iteration order carries no meaning.
    pub fn get_cached_plugins(&self) -> Vec<String> {
        self.plugins.iter().map(|e| e.key().clone()).collect()
    }

    /// Current value of the structural version counter.
    pub fn get_version(&self) -> i64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Recomputes and replaces the named plugin's settings from the
    /// descriptor, stamping the update, in one critical section.
    pub fn update_settings(&self, plugin: &JiPlugin) {
        if let Some(snapshot) = self.plugins.get(&plugin.name) {
            snapshot.update_settings(plugin);
        }
    }

    pub fn get_setting(&self, plugin_name: &str, setting_name: &str) -> Option<String> {
        self.plugins
            .get(plugin_name)
            .and_then(|snapshot| snapshot.get_setting(setting_name))
    }

    pub fn get_settings_form(&self, plugin_name: &str) -> Option<JiSettingsForm> {
        self.plugins
            .get(plugin_name)
            .and_then(|snapshot| snapshot.settings_form())
    }

    pub fn get_settings_page_name(&self, plugin_name: &str) -> Option<String> {
        self.plugins
            .get(plugin_name)
            .and_then(|snapshot| snapshot.settings_page_name())
    }

    /// Raw bytes of one cached static file.
    pub fn get_plugin_file(&self, plugin_name: &str, file: &str) -> Option<Vec<u8>> {
        self.plugins
            .get(plugin_name)
            .and_then(|snapshot| snapshot.get_file(file))
    }

    /// The whole static-file map of one cached plugin.
    pub fn get_files(&self, plugin_name: &str) -> Option<Arc<HashMap<String, Vec<u8>>>> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.files())
    }

    pub fn is_script_package(&self, plugin_name: &str, package_name: &str) -> bool {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.is_script_package(package_name))
            .unwrap_or(false)
    }

    pub fn get_service_executor_class_names(&self, plugin_name: &str) -> Vec<String> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.service_executor_class_names().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn get_task_executor_class_names(&self, plugin_name: &str) -> Vec<String> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.task_executor_class_names().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn get_policy_executor_class_names(&self, plugin_name: &str) -> Vec<String> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.policy_executor_class_names().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn get_recommender_class_names(&self, plugin_name: &str) -> Vec<String> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.recommender_class_names().into_iter().collect())
            .unwrap_or_default()
    }

    pub fn is_restricted_package(&self, package_name: &str) -> bool {
        authorization::is_restricted_package(package_name)
    }

    /// Whether the plugin declares the class as exported for the given
    /// type. The relaxed-enforcement flag is read fresh from system
    /// configuration on every call; `Unchecked` is always declared. An
    /// absent plugin is never declared.
    pub fn is_class_declared_exported_as_type(
        &self,
        plugin_name: &str,
        class_name: &str,
        export_type: JiExportType,
    ) -> bool {
        let snapshot = match self.plugins.get(plugin_name) {
            Some(snapshot) => snapshot,
            None => return false,
        };

        if self.config.is_relax_export_enforcement() {
            // we are in a relaxed mood here, so just wave it on through
            return true;
        }

        match export_type {
            JiExportType::ServiceExecutor => snapshot.is_service_executor_class(class_name),
            JiExportType::TaskExecutor => snapshot.is_task_executor_class(class_name),
            JiExportType::PolicyExecutor => snapshot.is_policy_executor_class(class_name),
            JiExportType::Recommender => snapshot.is_recommender_class(class_name),
            JiExportType::Unchecked => true,
        }
    }

    /// Resolves the configured REST resource classes of every cached
    /// plugin. A class that fails to resolve is logged and skipped.
    pub fn get_configured_resources(&self) -> Vec<Arc<JiCodeUnit>> {
        let mut units = Vec::new();
        for entry in self.plugins.iter() {
            units.extend(entry.value().resource_units());
        }
        units
    }

    /// Resolves the configured REST resource classes of one plugin.
    pub fn get_configured_resources_for_plugin(&self, plugin_name: &str) -> Vec<Arc<JiCodeUnit>> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.resource_units())
            .unwrap_or_default()
    }

    /// The integration point external code uses to resolve plugin-provided
    /// classes.
    pub fn get_class_loader(&self, plugin_name: &str) -> Option<Arc<JiPluginLoader>> {
        self.plugins
            .get(plugin_name)
            .map(|snapshot| snapshot.class_loader())
    }

    /// Aggregates the authorized script and stylesheet URLs of every cached
    /// plugin for the request, filling in full-page data when the request
    /// targets a plugin that declares one. Every cached plugin is visited
    /// exactly once; cross-plugin ordering is unspecified.
    pub fn get_page_content(&self, request: &JiPageContentRequest) -> JiPageContent {
        let mut page_content = JiPageContent::default();

        for entry in self.plugins.iter() {
            let snapshot = entry.value();
            snapshot.add_content_for_page(request, &mut page_content);

            if Self::is_requested_page_plugin(snapshot.name(), request) && snapshot.has_full_page()
            {
                page_content.page_defined = true;
                page_content.page_title =
                    snapshot.full_page().map(|page| page.title().to_string());
                page_content.page_right = snapshot.right_required().map(str::to_string);
            }
        }

        page_content
    }

    fn is_requested_page_plugin(plugin_name: &str, request: &JiPageContentRequest) -> bool {
        request.full_page && request.page_plugin_name.as_deref() == Some(plugin_name)
    }

    fn decompose(
        &self,
        plugin: &JiPlugin,
        file_handler: &dyn JiPluginFileHandler,
    ) -> Result<JiArchiveContents> {
        let mut stream = file_handler
            .read_plugin_file(plugin)
            .map_err(|e| JiError::archive(&plugin.name, e.to_string()))?;

        archive::read_archive(&mut stream)
            .map_err(|e| JiError::archive(&plugin.name, e.to_string()))
    }

    fn update_version(&self) {
        log::debug!("dock.registry.version: update to plugin cache detected");
        self.version.fetch_add(1, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for JiPluginCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiPluginCache")
            .field("plugin_count", &self.plugins.len())
            .field("version", &self.get_version())
            .finish_non_exhaustive()
    }
}
