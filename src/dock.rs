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

pub mod archive;
pub mod authorization;
pub mod content;
pub mod loader;
pub mod names;
pub mod registry;
pub mod snapshot;

pub use archive::{
    classify_entry, is_setup_entry, read_archive, JiArchiveContents, JiArchiveEntryKind,
    JiSetupPhase,
};
pub use authorization::{
    has_required_right, is_authorized_for_content, is_restricted_package, load_exported_unit,
    name_and_file_from_url, plugin_file_include_url, plugin_file_url,
};
pub use content::{JiPageContent, JiPageContentRequest};
pub use loader::{JiCodeResolver, JiCodeUnit, JiPluginLoader, JiResolverChain, JiVirtualResource};
pub use registry::JiPluginCache;
pub use snapshot::{JiCachedFullPage, JiCachedPlugin, JiCachedSnippet};
