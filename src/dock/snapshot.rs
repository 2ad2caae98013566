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

//! # Ji Snapshot Module
//!
//! The cached, immutable-after-construction representation of one installed
//! plugin. Identity and content are fixed when the snapshot is built from
//! the persisted descriptor and the decomposed archive; the settings map
//! and last-modified stamp are the only mutable state, guarded by a single
//! lock so readers never observe a half-applied settings update.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::metadata::{JiPlugin, JiSettingsForm};

use super::archive::JiArchiveContents;
use super::authorization;
use super::content::{JiPageContent, JiPageContentRequest};
use super::loader::{JiCodeResolver, JiCodeUnit, JiPluginLoader};

/// Cached full-page data.
#[derive(Clone, Debug)]
pub struct JiCachedFullPage {
    title: String,
}

impl JiCachedFullPage {
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// Cached snippet data with archive paths already expanded to served URLs.
#[derive(Clone, Debug)]
pub struct JiCachedSnippet {
    script_urls: Vec<String>,
    style_sheet_urls: Vec<String>,
    right_required: Option<String>,
    regex_pattern: Option<String>,
}

impl JiCachedSnippet {
    pub fn script_urls(&self) -> &[String] {
        &self.script_urls
    }

    pub fn style_sheet_urls(&self) -> &[String] {
        &self.style_sheet_urls
    }

    pub fn right_required(&self) -> Option<&str> {
        self.right_required.as_deref()
    }

    pub fn regex_pattern(&self) -> Option<&str> {
        self.regex_pattern.as_deref()
    }
}

/// The mutable tail of a snapshot: current setting values and the
/// last-modified stamp, updated together.
#[derive(Debug)]
struct JiMutableState {
    settings: HashMap<String, String>,
    last_modified: i64,
}

/// One cached plugin: metadata, page content, static files, and the owned
/// isolated loader.
pub struct JiCachedPlugin {
    name: String,
    version: Option<String>,
    position: i32,
    right_required: Option<String>,
    full_page: Option<JiCachedFullPage>,
    snippets: Vec<JiCachedSnippet>,
    state: Mutex<JiMutableState>,
    settings_form: Option<JiSettingsForm>,
    settings_page_name: Option<String>,
    files: Arc<HashMap<String, Vec<u8>>>,
    loader: Arc<JiPluginLoader>,
    service_executor_class_names: HashSet<String>,
    task_executor_class_names: HashSet<String>,
    policy_executor_class_names: HashSet<String>,
    recommender_class_names: HashSet<String>,
    script_package_names: HashSet<String>,
    resource_class_names: Vec<String>,
}

impl JiCachedPlugin {
    /// Builds the snapshot from the persisted descriptor and the decomposed
    /// archive. The loader shares the static-file map for its
    /// virtual-resource fallback.
    pub fn from_parts(
        plugin: &JiPlugin,
        contents: JiArchiveContents,
        parent: Arc<dyn JiCodeResolver>,
    ) -> Self {
        let full_page = plugin.full_page.as_ref().map(|page| JiCachedFullPage {
            title: page.title.clone(),
        });

        let snippets = plugin
            .snippets
            .iter()
            .map(|snippet| JiCachedSnippet {
                script_urls: snippet
                    .scripts
                    .iter()
                    .map(|script| authorization::plugin_file_url(&plugin.name, script))
                    .collect(),
                style_sheet_urls: snippet
                    .style_sheets
                    .iter()
                    .map(|sheet| authorization::plugin_file_url(&plugin.name, sheet))
                    .collect(),
                right_required: snippet.right_required.clone(),
                regex_pattern: snippet.regex_pattern.clone(),
            })
            .collect();

        let files = Arc::new(contents.files);
        let loader = Arc::new(JiPluginLoader::new(
            plugin.name.clone(),
            parent,
            contents.classes,
            contents.resources,
            files.clone(),
        ));

        JiCachedPlugin {
            name: plugin.name.clone(),
            version: plugin.version.clone(),
            position: plugin.position,
            right_required: plugin.right_required.clone(),
            full_page,
            snippets,
            state: Mutex::new(JiMutableState {
                settings: process_settings(plugin),
                last_modified: plugin.last_modified,
            }),
            settings_form: plugin.settings_form.clone(),
            settings_page_name: plugin.settings_page_name.clone(),
            files,
            loader,
            service_executor_class_names: plugin
                .service_executor_class_names
                .iter()
                .cloned()
                .collect(),
            task_executor_class_names: plugin.task_executor_class_names.iter().cloned().collect(),
            policy_executor_class_names: plugin
                .policy_executor_class_names
                .iter()
                .cloned()
                .collect(),
            recommender_class_names: plugin.recommender_class_names.iter().cloned().collect(),
            script_package_names: plugin.script_package_names.iter().cloned().collect(),
            resource_class_names: plugin.resource_class_names.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Ordering hint from the descriptor; not enforced by the cache.
    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn right_required(&self) -> Option<&str> {
        self.right_required.as_deref()
    }

    pub fn has_full_page(&self) -> bool {
        self.full_page.is_some()
    }

    pub fn full_page(&self) -> Option<&JiCachedFullPage> {
        self.full_page.as_ref()
    }

    pub fn snippets(&self) -> &[JiCachedSnippet] {
        &self.snippets
    }

    /// The static-file map, shared with the loader.
    pub fn files(&self) -> Arc<HashMap<String, Vec<u8>>> {
        self.files.clone()
    }

    pub fn get_file(&self, file: &str) -> Option<Vec<u8>> {
        self.files.get(file).cloned()
    }

    pub fn class_loader(&self) -> Arc<JiPluginLoader> {
        self.loader.clone()
    }

    /// Resolves the declared REST resource classes through this plugin's
    /// own loader. Individual failures are logged and skipped so one bad
    /// declaration never hides the rest.
    pub fn resource_units(&self) -> Vec<Arc<JiCodeUnit>> {
        let mut units = Vec::new();
        for class_name in &self.resource_class_names {
            match self.loader.resolve(class_name) {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    log::warn!(
                        "dock.snapshot.resource_skipped: unable to resolve plugin REST resource - plugin={}, class={}, error={}",
                        self.name,
                        class_name,
                        e
                    );
                }
            }
        }
        units
    }

    pub fn resource_class_names(&self) -> &[String] {
        &self.resource_class_names
    }

    /// True if the plugin has declared the given package as available to
    /// script class resolution.
    pub fn is_script_package(&self, package_name: &str) -> bool {
        self.script_package_names.contains(package_name)
    }

    pub fn is_service_executor_class(&self, class_name: &str) -> bool {
        self.service_executor_class_names.contains(class_name)
    }

    pub fn is_task_executor_class(&self, class_name: &str) -> bool {
        self.task_executor_class_names.contains(class_name)
    }

    pub fn is_policy_executor_class(&self, class_name: &str) -> bool {
        self.policy_executor_class_names.contains(class_name)
    }

    pub fn is_recommender_class(&self, class_name: &str) -> bool {
        self.recommender_class_names.contains(class_name)
    }

    pub fn service_executor_class_names(&self) -> HashSet<String> {
        self.service_executor_class_names.clone()
    }

    pub fn task_executor_class_names(&self) -> HashSet<String> {
        self.task_executor_class_names.clone()
    }

    pub fn policy_executor_class_names(&self) -> HashSet<String> {
        self.policy_executor_class_names.clone()
    }

    pub fn recommender_class_names(&self) -> HashSet<String> {
        self.recommender_class_names.clone()
    }

    /// Current value of one cached setting.
    pub fn get_setting(&self, setting_name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .settings
            .get(setting_name)
            .cloned()
    }

    /// Replaces the settings map with values recomputed from the descriptor
    /// and stamps the update, atomically with respect to readers.
    pub fn update_settings(&self, plugin: &JiPlugin) {
        let mut state = self.state.lock().unwrap();
        state.settings = process_settings(plugin);
        state.last_modified = plugin.last_modified;
    }

    pub fn last_modified(&self) -> i64 {
        self.state.lock().unwrap().last_modified
    }

    pub fn set_last_modified(&self, last_modified: i64) {
        self.state.lock().unwrap().last_modified = last_modified;
    }

    pub fn settings_form(&self) -> Option<JiSettingsForm> {
        self.settings_form.clone()
    }

    pub fn settings_page_name(&self) -> Option<String> {
        self.settings_page_name.clone()
    }

    /// Contributes this plugin's authorized snippet content to the page
    /// being assembled.
    pub fn add_content_for_page(
        &self,
        request: &JiPageContentRequest,
        page_content: &mut JiPageContent,
    ) {
        for snippet in &self.snippets {
            let authorized = authorization::is_authorized_for_content(
                snippet.right_required(),
                snippet.regex_pattern(),
                request,
            );
            if authorized {
                page_content
                    .script_urls
                    .extend(snippet.script_urls().iter().cloned());
                page_content
                    .style_sheet_urls
                    .extend(snippet.style_sheet_urls().iter().cloned());
            }
        }
    }
}

impl std::fmt::Debug for JiCachedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JiCachedPlugin")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("files", &self.files.len())
            .field("snippets", &self.snippets.len())
            .finish_non_exhaustive()
    }
}

/// Computes the effective cached settings: the current value unless it is
/// absent or empty, in which case the declared default applies. A setting
/// explicitly cleared to the empty string therefore reverts to its default.
pub(crate) fn process_settings(plugin: &JiPlugin) -> HashMap<String, String> {
    let mut settings = HashMap::new();
    for setting in &plugin.settings {
        let value = match &setting.value {
            Some(v) if !v.is_empty() => v.clone(),
            _ => setting.default_value.clone().unwrap_or_default(),
        };
        settings.insert(setting.name.clone(), value);
    }
    settings
}
