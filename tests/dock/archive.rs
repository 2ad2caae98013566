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

use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use jix::dock::read_archive;

/// Builds an in-memory zip from (name, data) pairs. Names ending in `/`
/// become directory entries.
fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(name.trim_end_matches('/'), FileOptions::default())
                .expect("directory");
        } else {
            writer
                .start_file(*name, FileOptions::default())
                .expect("entry");
            writer.write_all(data).expect("entry data");
        }
    }
    writer.finish().expect("finish").into_inner()
}

fn build_jar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip(entries)
}

#[test]
fn decomposes_files_classes_and_resources() {
    let jar = build_jar(&[
        ("a/B.class", b"class-bytes".as_slice()),
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0".as_slice()),
        ("templates/report.html", b"<html/>".as_slice()),
    ]);
    let archive = build_zip(&[
        ("ui/style.css", b"body {}".as_slice()),
        ("lib/plugin.jar", jar.as_slice()),
    ]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    assert_eq!(contents.files.len(), 1);
    assert_eq!(
        contents.files.get("ui/style.css").map(Vec::as_slice),
        Some(b"body {}".as_slice())
    );

    assert_eq!(contents.classes.len(), 1);
    assert_eq!(
        contents.classes.get("a.B").map(Vec::as_slice),
        Some(b"class-bytes".as_slice())
    );

    assert_eq!(contents.resources.len(), 1);
    assert!(contents.resources.contains_key("templates/report.html"));
    assert!(!contents.resources.contains_key("META-INF/MANIFEST.MF"));
}

#[test]
fn setup_entries_and_directories_are_skipped() {
    let archive = build_zip(&[
        ("manifest.xml", b"<Plugin/>".as_slice()),
        ("db/install/create.sql", b"CREATE TABLE t;".as_slice()),
        ("db/upgrade/alter.sql", b"ALTER TABLE t;".as_slice()),
        ("import/install/objects.xml", b"<Objects/>".as_slice()),
        ("ui/", b"".as_slice()),
        ("ui/page.html", b"<html/>".as_slice()),
    ]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    assert_eq!(contents.files.len(), 1);
    assert!(contents.files.contains_key("ui/page.html"));
    assert!(contents.classes.is_empty());
    assert!(contents.resources.is_empty());
}

#[test]
fn class_classification_takes_precedence_over_meta_inf() {
    let jar = build_jar(&[
        ("META-INF/versions/Gen.class", b"generated".as_slice()),
        ("META-INF/services/ji.Extension", b"a.B".as_slice()),
    ]);
    let archive = build_zip(&[("lib/plugin.jar", jar.as_slice())]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    // a compiled unit under META-INF is still a class...
    assert!(contents.classes.contains_key("META-INF.versions.Gen"));
    // ...while plain META-INF content stays excluded
    assert!(contents.resources.is_empty());
}

#[test]
fn static_file_only_archives_are_legal() {
    let archive = build_zip(&[
        ("ui/app.js", b"app();".as_slice()),
        ("ui/style.css", b"body {}".as_slice()),
    ]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    assert_eq!(contents.files.len(), 2);
    assert!(contents.classes.is_empty());
    assert!(contents.resources.is_empty());
}

#[test]
fn inner_unit_names_keep_their_markers() {
    let jar = build_jar(&[("a/b/C$Inner.class", b"inner".as_slice())]);
    let archive = build_zip(&[("lib/plugin.jar", jar.as_slice())]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    assert!(contents.classes.contains_key("a.b.C$Inner"));
}

#[test]
fn multiple_jars_merge_into_one_class_map() {
    let jar_one = build_jar(&[("a/One.class", b"one".as_slice())]);
    let jar_two = build_jar(&[
        ("b/Two.class", b"two".as_slice()),
        ("i18n/messages.properties", b"k=v".as_slice()),
    ]);
    let archive = build_zip(&[
        ("lib/one.jar", jar_one.as_slice()),
        ("lib/two.jar", jar_two.as_slice()),
    ]);

    let contents = read_archive(&mut Cursor::new(archive)).expect("read");

    assert_eq!(contents.classes.len(), 2);
    assert!(contents.classes.contains_key("a.One"));
    assert!(contents.classes.contains_key("b.Two"));
    assert_eq!(
        contents.resources.get("i18n/messages.properties").map(Vec::as_slice),
        Some(b"k=v".as_slice())
    );
}

#[test]
fn malformed_archives_fail_the_whole_read() {
    let mut garbage = Cursor::new(b"this is not a zip archive".to_vec());
    assert!(read_archive(&mut garbage).is_err());
}
