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

//! # Ji Archive Module
//!
//! Decomposition of a plugin distribution archive into the byte maps the
//! cache serves from: static files, compiled code units, and jar-borne
//! resources. The same entry classification drives the installer, which
//! additionally consumes the manifest, database scripts, and import files
//! that the cache path skips.
//!
//! Nested jars are buffered in full before being re-read. The outer stream
//! is compressed and cannot be re-entered mid-entry, so streaming into the
//! inner archive is not an option.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use zip::read::read_zipfile_from_stream;
use zip::ZipArchive;

use crate::errors::Result;

use super::names;

/// The name of the metadata directory in a jar file. Entries under it are
/// excluded from the resources map.
const META_INF: &str = "META-INF";

/// The plugin manifest entry at the archive root.
const MANIFEST_ENTRY: &str = "manifest.xml";

/// Directories holding installer-owned database scripts.
const SQL_SCRIPTS_BASE_DIR: &str = "db/";
const SQL_SCRIPTS_INSTALL_DIR: &str = "db/install/";
const SQL_SCRIPTS_UPGRADE_DIR: &str = "db/upgrade/";
const SQL_SCRIPTS_UNINSTALL_DIR: &str = "db/uninstall/";

/// Directories holding installer-owned object import files.
const IMPORT_DIR: &str = "import/";
const INSTALL_IMPORT_DIR: &str = "import/install/";
const UPGRADE_IMPORT_DIR: &str = "import/upgrade/";

/// Installation phase a setup entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JiSetupPhase {
    Install,
    Upgrade,
    Uninstall,
    /// Directly under the setup base directory, outside any phase folder.
    Unscoped,
}

/// Classification of one archive entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JiArchiveEntryKind {
    Directory,
    Manifest,
    SqlScript(JiSetupPhase),
    ImportFile(JiSetupPhase),
    NestedJar,
    StaticFile,
}

/// Classifies an archive entry by name. Setup directories match
/// case-insensitively; the manifest name is exact.
pub fn classify_entry(name: &str, is_dir: bool) -> JiArchiveEntryKind {
    if is_dir {
        return JiArchiveEntryKind::Directory;
    }

    let lower = name.to_lowercase();
    if name == MANIFEST_ENTRY {
        JiArchiveEntryKind::Manifest
    } else if lower.starts_with(SQL_SCRIPTS_INSTALL_DIR) {
        JiArchiveEntryKind::SqlScript(JiSetupPhase::Install)
    } else if lower.starts_with(SQL_SCRIPTS_UPGRADE_DIR) {
        JiArchiveEntryKind::SqlScript(JiSetupPhase::Upgrade)
    } else if lower.starts_with(SQL_SCRIPTS_UNINSTALL_DIR) {
        JiArchiveEntryKind::SqlScript(JiSetupPhase::Uninstall)
    } else if lower.starts_with(SQL_SCRIPTS_BASE_DIR) {
        JiArchiveEntryKind::SqlScript(JiSetupPhase::Unscoped)
    } else if lower.starts_with(IMPORT_DIR) && lower.ends_with("xml") {
        if lower.starts_with(INSTALL_IMPORT_DIR) {
            JiArchiveEntryKind::ImportFile(JiSetupPhase::Install)
        } else if lower.starts_with(UPGRADE_IMPORT_DIR) {
            JiArchiveEntryKind::ImportFile(JiSetupPhase::Upgrade)
        } else {
            JiArchiveEntryKind::ImportFile(JiSetupPhase::Unscoped)
        }
    } else if name.ends_with(names::JAR_EXT) {
        JiArchiveEntryKind::NestedJar
    } else {
        JiArchiveEntryKind::StaticFile
    }
}

/// True for entries consumed by the installer rather than the cache: the
/// manifest, database scripts, and import files.
pub fn is_setup_entry(name: &str, is_dir: bool) -> bool {
    matches!(
        classify_entry(name, is_dir),
        JiArchiveEntryKind::Manifest
            | JiArchiveEntryKind::SqlScript(_)
            | JiArchiveEntryKind::ImportFile(_)
    )
}

/// The decomposed contents of one plugin archive.
#[derive(Debug, Default)]
pub struct JiArchiveContents {
    /// Static files keyed by archive path, served verbatim.
    pub files: HashMap<String, Vec<u8>>,
    /// Compiled code units keyed by canonical unit name.
    pub classes: HashMap<String, Vec<u8>>,
    /// Jar-borne resources keyed by entry path.
    pub resources: HashMap<String, Vec<u8>>,
}

/// Streams a plugin archive and decomposes it into file, class, and
/// resource maps.
///
/// Directory and setup entries are skipped. Entries ending in `.jar` are
/// buffered and exploded one level. Everything else lands verbatim in the
/// static-files map. Any IO or zip failure aborts the whole read; callers
/// never observe a partially decomposed archive.
pub fn read_archive<R: Read>(reader: &mut R) -> Result<JiArchiveContents> {
    let mut contents = JiArchiveContents::default();

    loop {
        let mut entry = match read_zipfile_from_stream(reader)? {
            Some(entry) => entry,
            None => break,
        };

        let entry_name = entry.name().to_string();
        match classify_entry(&entry_name, entry.is_dir()) {
            JiArchiveEntryKind::Directory
            | JiArchiveEntryKind::Manifest
            | JiArchiveEntryKind::SqlScript(_)
            | JiArchiveEntryKind::ImportFile(_) => {}
            JiArchiveEntryKind::NestedJar => {
                let mut jar_data = Vec::new();
                entry.read_to_end(&mut jar_data)?;
                read_nested_jar(&jar_data, &mut contents)?;
            }
            JiArchiveEntryKind::StaticFile => {
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                contents.files.insert(entry_name, data);
            }
        }
    }

    log::debug!(
        "dock.archive.read: plugin archive decomposed - files={}, classes={}, resources={}",
        contents.files.len(),
        contents.classes.len(),
        contents.resources.len()
    );

    Ok(contents)
}

/// Reads a buffered nested jar, storing class files under their canonical
/// names and everything else outside `META-INF` under its raw path. Class
/// classification takes precedence over the `META-INF` exclusion.
fn read_nested_jar(jar_data: &[u8], contents: &mut JiArchiveContents) -> Result<()> {
    let mut jar = ZipArchive::new(Cursor::new(jar_data))?;

    for index in 0..jar.len() {
        let mut entry = jar.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        if let Some(unit_name) = names::unit_name_for_entry(&entry_name) {
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            contents.classes.insert(unit_name, data);
        } else if !is_meta_inf_entry(&entry_name) {
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            contents.resources.insert(entry_name, data);
        }
    }

    Ok(())
}

fn is_meta_inf_entry(entry_name: &str) -> bool {
    entry_name.to_uppercase().starts_with(META_INF)
}
