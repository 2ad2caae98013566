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

//! Request and response shapes for aggregating plugin page content.

use serde::{Deserialize, Serialize};

/// Context of one page-content request: the page being rendered and the
/// identity asking for it.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiPageContentRequest {
    /// Path of the page being rendered, matched against snippet patterns.
    pub path: String,
    /// Plugin whose full page is being requested, when this is a full-page
    /// render.
    pub page_plugin_name: Option<String>,
    pub full_page: bool,
    /// System administrators receive every snippet regardless of rights.
    pub system_admin: bool,
    pub user_rights: Vec<String>,
}

impl JiPageContentRequest {
    /// True when the requester holds the given right.
    pub fn has_right(&self, right: &str) -> bool {
        self.user_rights.iter().any(|r| r == right)
    }
}

/// Aggregated content contributed by all cached plugins for one request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct JiPageContent {
    pub script_urls: Vec<String>,
    pub style_sheet_urls: Vec<String>,
    /// Set when the requested full page belongs to a cached plugin that
    /// declares one.
    pub page_defined: bool,
    pub page_title: Option<String>,
    pub page_right: Option<String>,
}
