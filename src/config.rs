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

//! # Ji Configuration Module
//!
//! System-wide configuration values consumed by the plugin cache. The cache
//! never caches these flags itself; it reads them through [`JiSystemConfig`]
//! on every check so a configuration change takes effect immediately.

use std::sync::atomic::{AtomicBool, Ordering};

/// Source of system-wide configuration flags consulted by the cache.
///
/// The host application typically backs this with its live configuration
/// store. Export-enforcement checks call [`is_relax_export_enforcement`]
/// fresh on every invocation.
///
/// [`is_relax_export_enforcement`]: JiSystemConfig::is_relax_export_enforcement
pub trait JiSystemConfig: Send + Sync {
    /// When true, every class of every cached plugin is treated as declared
    /// for any checked export type. An escape hatch for deployments that
    /// trust all installed plugins.
    fn is_relax_export_enforcement(&self) -> bool;
}

/// In-memory [`JiSystemConfig`] backed by atomics.
///
/// Suitable for embedding Ji without a host configuration store, and for
/// tests that flip flags between calls.
#[derive(Debug, Default)]
pub struct JiStaticSystemConfig {
    relax_export_enforcement: AtomicBool,
}

impl JiStaticSystemConfig {
    pub fn new(relax_export_enforcement: bool) -> Self {
        JiStaticSystemConfig {
            relax_export_enforcement: AtomicBool::new(relax_export_enforcement),
        }
    }

    /// Update the enforcement flag. Visible to the next check.
    pub fn set_relax_export_enforcement(&self, relaxed: bool) {
        self.relax_export_enforcement
            .store(relaxed, Ordering::SeqCst);
    }
}

impl JiSystemConfig for JiStaticSystemConfig {
    fn is_relax_export_enforcement(&self) -> bool {
        self.relax_export_enforcement.load(Ordering::SeqCst)
    }
}
