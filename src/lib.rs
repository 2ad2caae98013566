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

//! # Ji Core Library
//!
//! This is the main library entry point for the Ji plugin cache: the
//! subsystem a host application embeds to package, load, isolate, and serve
//! code and resources contributed by dynamically installable plugins.
//!
//! ## Module Overview
//!
//! The library is organized into the following major modules:
//!
//! - **metadata**: The persisted plugin descriptor the cache reads from
//! - **io**: The file-handler seam yielding raw archive byte streams
//! - **dock**: The cache itself: archive decomposition, per-plugin
//!   snapshots and isolated loaders, the concurrent registry, and the
//!   authorization predicates layered on top
//! - **version**: Dotted-numeric version comparison and upgrade eligibility
//! - **config**: System-wide flags read live by the cache
//! - **errors**: Canonical error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use jix::{JiFilesystemFileHandler, JiPlugin, JiPluginCache, JiResolverChain,
//!           JiStaticSystemConfig};
//!
//! let cache = JiPluginCache::new(
//!     Arc::new(JiResolverChain::empty()),
//!     Arc::new(JiStaticSystemConfig::default()),
//! );
//!
//! let handler = JiFilesystemFileHandler::new("/var/lib/ji/plugins");
//! let plugin = JiPlugin { name: "reports".into(), ..JiPlugin::default() };
//! cache.cache(&plugin, &handler)?;
//!
//! let loader = cache.get_class_loader("reports").unwrap();
//! let unit = loader.resolve("com.acme.reports.ReportTask")?;
//! ```
//!
//! ## Architecture
//!
//! An external installer persists plugin metadata and archives; the cache
//! decomposes each archive into static files, compiled code units, and
//! jar-borne resources, wraps them in an immutable snapshot with its own
//! isolated loader, and publishes the snapshot atomically. Request-serving
//! threads query the registry by plugin name for settings, files, loaders,
//! or aggregated page content.
//!
//! ## Error Handling
//!
//! Registry lookups degrade to `None`/`false`/empty for absent plugins;
//! only deliberate mutations (`cache`) and loader resolution surface
//! `JiError` values.

pub mod config;
pub mod dock;
pub mod errors;
pub mod io;
pub mod metadata;
pub mod version;

pub use config::{JiStaticSystemConfig, JiSystemConfig};
pub use errors::{JiError, Result};
pub use io::{JiFilesystemFileHandler, JiPluginFileHandler};
pub use metadata::{
    JiExportType, JiFullPage, JiPlugin, JiSetting, JiSettingsForm, JiSnippet,
};

pub use dock::{
    JiArchiveContents, JiCachedPlugin, JiCodeResolver, JiCodeUnit, JiPageContent,
    JiPageContentRequest, JiPluginCache, JiPluginLoader, JiResolverChain, JiVirtualResource,
};

pub use version::{
    is_equal_or_downgrade, is_min_upgradable_version_met, is_plugin_valid_for_system_version,
    is_upgrade_rejected, is_version_greater_than_or_equal, is_version_less_than_or_equal,
};
