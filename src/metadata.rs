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

//! # Ji Plugin Metadata Module
//!
//! The persisted plugin descriptor consumed by the cache. Installation and
//! persistence of these objects belong to the host's installer; the cache
//! only reads them at cache/update time and never mutates the source object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extensibility categories a plugin class may be exported for.
///
/// `Unchecked` deliberately bypasses the export declaration check and is
/// intended for host-internal call sites that perform their own vetting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JiExportType {
    ServiceExecutor,
    TaskExecutor,
    PolicyExecutor,
    Recommender,
    Unchecked,
}

/// One configurable setting declared by a plugin.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiSetting {
    pub name: String,
    /// Declared data type of the setting value, e.g. `"string"` or `"int"`.
    pub data_type: String,
    /// Current value as persisted by the host. Empty or absent values fall
    /// back to `default_value` when cached.
    pub value: Option<String>,
    pub default_value: Option<String>,
    pub multi_valued: bool,
}

/// A snippet of client content contributed to matching host pages.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiSnippet {
    /// Script files, as paths relative to the plugin archive root.
    pub scripts: Vec<String>,
    /// Stylesheet files, as paths relative to the plugin archive root.
    pub style_sheets: Vec<String>,
    /// Right a non-admin requester must hold to receive this snippet.
    pub right_required: Option<String>,
    /// Pattern the request path must fully match for the snippet to apply.
    pub regex_pattern: Option<String>,
}

/// Full-page definition for plugins that contribute an entire page.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiFullPage {
    pub title: String,
}

/// Form describing a plugin's settings for rendering by the host UI. The
/// definition payload is opaque to the cache.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiSettingsForm {
    pub name: String,
    pub definition: Value,
}

/// The persisted plugin descriptor.
///
/// Field groups mirror what the installer writes: identity and ordering,
/// page content, settings, export declarations, and version constraints
/// consulted during install/upgrade eligibility checks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiPlugin {
    /// Unique plugin name; the registry key.
    pub name: String,
    /// Dotted-numeric version string, e.g. `"1.2.0"`.
    pub version: Option<String>,
    /// Development builds opt out of upgrade version ordering when both
    /// sides of the upgrade carry this flag.
    pub development_version: bool,
    /// Ordering hint for hosts that render plugin lists.
    pub position: i32,
    /// Right required to view the plugin's full page.
    pub right_required: Option<String>,
    pub full_page: Option<JiFullPage>,
    pub snippets: Vec<JiSnippet>,
    pub settings: Vec<JiSetting>,
    pub service_executor_class_names: Vec<String>,
    pub task_executor_class_names: Vec<String>,
    pub policy_executor_class_names: Vec<String>,
    pub recommender_class_names: Vec<String>,
    /// Packages the plugin exposes to script class resolution.
    pub script_package_names: Vec<String>,
    /// REST resource classes, resolved lazily through the plugin's loader.
    pub resource_class_names: Vec<String>,
    pub settings_form: Option<JiSettingsForm>,
    pub settings_page_name: Option<String>,
    pub min_system_version: Option<String>,
    pub max_system_version: Option<String>,
    pub min_upgradable_version: Option<String>,
    /// Millisecond timestamp of the last persisted modification.
    pub last_modified: i64,
}

impl JiPlugin {
    /// Export class-name list declared for the given type. `Unchecked` has
    /// no backing list.
    pub fn export_class_names(&self, export_type: JiExportType) -> &[String] {
        match export_type {
            JiExportType::ServiceExecutor => &self.service_executor_class_names,
            JiExportType::TaskExecutor => &self.task_executor_class_names,
            JiExportType::PolicyExecutor => &self.policy_executor_class_names,
            JiExportType::Recommender => &self.recommender_class_names,
            JiExportType::Unchecked => &[],
        }
    }
}
