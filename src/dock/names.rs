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

//! Mapping between archive entry naming (`a/b/C.class`) and canonical
//! code-unit names (`a.b.C`).

/// Extension for a compiled code-unit file inside a nested jar.
pub const CLASS_EXT: &str = ".class";

/// Extension for a nested jar entry inside a plugin archive.
pub const JAR_EXT: &str = ".jar";

/// Canonical unit name for a class-file entry, or `None` when the entry is
/// not a class file. Inner-unit markers (`$`) are preserved as-is.
pub fn unit_name_for_entry(entry_name: &str) -> Option<String> {
    entry_name
        .strip_suffix(CLASS_EXT)
        .map(|stem| stem.replace('/', "."))
}

/// Archive entry name for a canonical unit name.
pub fn entry_name_for_unit(unit_name: &str) -> String {
    format!("{}{}", unit_name.replace('.', "/"), CLASS_EXT)
}
