//! Copyright © 2025 Dunimd Team. All Rights Reserved.
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

//! # Ji IO Module
//!
//! The file-handler seam between the cache and wherever plugin archives are
//! actually stored. The cache only needs a readable byte stream per plugin;
//! hosts back this with a database blob, an object store, or, as the
//! bundled implementation does, a directory of archive files.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::errors::{JiError, Result};
use crate::metadata::JiPlugin;

/// Opens the raw distribution archive of a plugin for reading.
pub trait JiPluginFileHandler: Send + Sync {
    fn read_plugin_file(&self, plugin: &JiPlugin) -> Result<Box<dyn Read + Send>>;
}

/// File handler serving archives from `<root>/<plugin-name>.zip`.
#[derive(Debug)]
pub struct JiFilesystemFileHandler {
    root: PathBuf,
}

impl JiFilesystemFileHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JiFilesystemFileHandler { root: root.into() }
    }

    fn archive_path(&self, plugin: &JiPlugin) -> PathBuf {
        self.root.join(format!("{}.zip", plugin.name))
    }
}

impl JiPluginFileHandler for JiFilesystemFileHandler {
    fn read_plugin_file(&self, plugin: &JiPlugin) -> Result<Box<dyn Read + Send>> {
        let path = self.archive_path(plugin);
        log::debug!(
            "io.plugin_file.open: opening plugin archive - plugin={}, path={}",
            plugin.name,
            path.display()
        );

        let file = File::open(&path).map_err(|e| {
            JiError::Io(format!(
                "unable to open plugin archive '{}': {}",
                path.display(),
                e
            ))
        })?;

        Ok(Box::new(file))
    }
}
