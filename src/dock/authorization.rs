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

//! # Ji Authorization Module
//!
//! Stateless predicates and helpers shared by the cache and its callers:
//! package restriction checks, snippet content authorization, the served
//! static-file URL scheme, and the guarded path for loading an exported
//! plugin class.

use std::sync::Arc;

use regex::Regex;

use crate::errors::{JiError, Result};
use crate::metadata::JiExportType;

use super::content::JiPageContentRequest;
use super::loader::JiCodeUnit;
use super::registry::JiPluginCache;

/// The mount point plugin static files are served from.
const SERVLET_MOUNT: &str = "/plugin/";

/// The mount point for files included in a server-rendered page context.
const INCLUDE_MOUNT: &str = "/plugin/include/";

/// Package roots plugins may never export: the platform namespace and the
/// host's own.
const RESTRICTED_ROOTS: [&str; 2] = ["java", "ji"];

/// Check if the given package name is one that is restricted by the host
/// from being exported from a plugin.
///
/// Currently, the following are restricted:
///      - empty package
///      - package "ji" and any package that starts with "ji."
///      - package "java" and any package that starts with "java."
pub fn is_restricted_package(package_name: &str) -> bool {
    if package_name.is_empty() {
        return true;
    }

    RESTRICTED_ROOTS.iter().any(|root| {
        package_name == *root
            || (package_name.starts_with(root) && package_name[root.len()..].starts_with('.'))
    })
}

/// Determines if content should be included on the requested page for the
/// requesting identity. The right is checked first; a present pattern must
/// then fully match the request path.
///
/// An unparsable pattern never takes down a request thread: it logs and
/// excludes the content.
pub fn is_authorized_for_content(
    required_right: Option<&str>,
    regex_pattern: Option<&str>,
    request: &JiPageContentRequest,
) -> bool {
    if !has_required_right(required_right, request) {
        return false;
    }

    let pattern = match regex_pattern {
        Some(p) if !p.is_empty() => p,
        _ => return true,
    };

    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(re) => re.is_match(&request.path),
        Err(e) => {
            log::warn!(
                "dock.authorization.bad_pattern: unparsable snippet pattern excluded - pattern={}, error={}",
                pattern,
                e
            );
            false
        }
    }
}

/// The requester has access if there is no right, they are a system admin,
/// or they hold the right.
pub fn has_required_right(required_right: Option<&str>, request: &JiPageContentRequest) -> bool {
    match required_right {
        None => true,
        Some(right) if right.is_empty() => true,
        Some(right) => request.system_admin || request.has_right(right),
    }
}

/// Public URL for a plugin static file: `/plugin/{name}/{file}`.
pub fn plugin_file_url(plugin_name: &str, file: &str) -> String {
    format!("{}{}/{}", SERVLET_MOUNT, plugin_name, file)
}

/// URL used to include a plugin file in a server-rendered page context.
pub fn plugin_file_include_url(plugin_name: &str, file: &str) -> String {
    format!("{}{}/{}", INCLUDE_MOUNT, plugin_name, file)
}

/// Parses the plugin name and file from a request path of the shape
/// `{prefix}/{pluginName}/{file}`. Query strings are stripped; empty
/// tokens yield `None`.
pub fn name_and_file_from_url(path: &str, prefix: &str) -> (Option<String>, Option<String>) {
    let mut plugin_name = None;
    let mut file = None;

    let path = match path.find('?') {
        Some(query_idx) => &path[..query_idx],
        None => path,
    };

    if let Some(prefix_idx) = path.find(prefix) {
        let mut sub_idx = prefix_idx + prefix.len();
        if !prefix.ends_with('/') {
            sub_idx += 1;
        }

        if sub_idx <= path.len() {
            // name is the first token; file is the rest of the tokens joined
            let tokens: Vec<&str> = path[sub_idx..].split('/').collect();
            if !tokens[0].is_empty() {
                plugin_name = Some(tokens[0].to_string());
                if tokens.len() > 1 && !tokens[1].is_empty() {
                    file = Some(tokens[1..].join("/"));
                }
            }
        }
    }

    (plugin_name, file)
}

/// Loads a class exported by a plugin, enforcing the declaration chain: the
/// plugin must be cached, must declare the class for the given export type,
/// and the class must resolve through the plugin's own loader.
pub fn load_exported_unit(
    cache: &JiPluginCache,
    plugin_name: &str,
    class_name: &str,
    export_type: JiExportType,
) -> Result<Arc<JiCodeUnit>> {
    if plugin_name.is_empty() {
        return Err(JiError::validation("plugin name is empty"));
    }
    if class_name.is_empty() {
        return Err(JiError::validation("class name is empty"));
    }

    let loader = cache.get_class_loader(plugin_name).ok_or_else(|| {
        JiError::validation(format!("plugin '{}' not found, or not enabled", plugin_name))
    })?;

    if !cache.is_class_declared_exported_as_type(plugin_name, class_name, export_type) {
        return Err(JiError::validation(format!(
            "plugin '{}' does not declare class {} as exported for {:?}",
            plugin_name, class_name, export_type
        )));
    }

    loader.resolve(class_name)
}
