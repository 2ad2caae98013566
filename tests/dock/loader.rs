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

use std::collections::HashMap;
use std::io::Read;
use std::sync::{Arc, Barrier};
use std::thread;

use jix::dock::{JiCodeResolver, JiCodeUnit, JiPluginLoader, JiResolverChain, JiVirtualResource};

fn byte_map(entries: &[(&str, &[u8])]) -> HashMap<String, Vec<u8>> {
    entries
        .iter()
        .map(|(name, data)| (name.to_string(), data.to_vec()))
        .collect()
}

fn loader_with(
    classes: &[(&str, &[u8])],
    resources: &[(&str, &[u8])],
    live_files: &[(&str, &[u8])],
) -> JiPluginLoader {
    JiPluginLoader::new(
        "reports",
        Arc::new(JiResolverChain::empty()),
        byte_map(classes),
        byte_map(resources),
        Arc::new(byte_map(live_files)),
    )
}

/// A parent that distinguishes its own holdings from full-chain resolution,
/// the way a host resolver fronting further delegates would.
struct StubParent {
    own: HashMap<String, Arc<JiCodeUnit>>,
    chained: HashMap<String, Arc<JiCodeUnit>>,
    resources: HashMap<String, Vec<u8>>,
}

impl StubParent {
    fn new() -> Self {
        StubParent {
            own: HashMap::new(),
            chained: HashMap::new(),
            resources: HashMap::new(),
        }
    }

    fn with_own(mut self, name: &str, bytes: &[u8]) -> Self {
        self.own.insert(
            name.to_string(),
            Arc::new(JiCodeUnit::define(name, "host", bytes.to_vec())),
        );
        self
    }

    fn with_chained(mut self, name: &str, bytes: &[u8]) -> Self {
        self.chained.insert(
            name.to_string(),
            Arc::new(JiCodeUnit::define(name, "host-chain", bytes.to_vec())),
        );
        self
    }

    fn with_resource(mut self, path: &str, bytes: &[u8]) -> Self {
        self.resources.insert(path.to_string(), bytes.to_vec());
        self
    }
}

impl JiCodeResolver for StubParent {
    fn find_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.own.get(name).cloned()
    }

    fn resolve_unit(&self, name: &str) -> Option<Arc<JiCodeUnit>> {
        self.own
            .get(name)
            .or_else(|| self.chained.get(name))
            .cloned()
    }

    fn open_resource(&self, path: &str) -> Option<Vec<u8>> {
        self.resources.get(path).cloned()
    }

    fn locate_resource(&self, path: &str) -> Option<JiVirtualResource> {
        self.resources
            .get(path)
            .map(|bytes| JiVirtualResource::new(format!("host:{}", path), bytes.clone()))
    }
}

#[test]
fn resolving_twice_defines_once_and_drains_the_bytes() {
    let loader = loader_with(&[("a.B", b"unit-bytes")], &[], &[]);

    assert!(loader.is_unit_pending("a.B"));

    let first = loader.resolve("a.B").expect("first resolution");
    let second = loader.resolve("a.B").expect("second resolution");

    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.bytes(), b"unit-bytes");

    // the bytes drained out of the pending map, the name remains listed
    assert!(!loader.is_unit_pending("a.B"));
    assert!(loader.owned_names().contains("a.B"));
}

#[test]
fn loaders_with_the_same_name_stay_isolated() {
    let loader_a = loader_with(&[("com.foo.Widget", b"widget-a")], &[], &[]);
    let loader_b = loader_with(&[("com.foo.Widget", b"widget-b")], &[], &[]);

    let unit_a = loader_a.resolve("com.foo.Widget").expect("a");
    let unit_b = loader_b.resolve("com.foo.Widget").expect("b");

    assert_ne!(unit_a.fingerprint(), unit_b.fingerprint());
    assert_eq!(unit_a.bytes(), b"widget-a");
    assert_eq!(unit_b.bytes(), b"widget-b");
}

#[test]
fn plugin_units_shadow_same_named_parent_units() {
    let parent = StubParent::new().with_own("a.B", b"host-bytes");
    let loader = JiPluginLoader::new(
        "reports",
        Arc::new(parent),
        byte_map(&[("a.B", b"plugin-bytes")]),
        HashMap::new(),
        Arc::new(HashMap::new()),
    );

    let unit = loader.resolve("a.B").expect("resolve");
    assert_eq!(unit.bytes(), b"plugin-bytes");
    assert_eq!(unit.origin(), "reports");
}

#[test]
fn unknown_names_fall_back_to_the_parent_chain() {
    let parent = StubParent::new()
        .with_own("host.Only", b"host-only")
        .with_chained("deep.Chain", b"deep-chain");
    let loader = JiPluginLoader::new(
        "reports",
        Arc::new(parent),
        HashMap::new(),
        HashMap::new(),
        Arc::new(HashMap::new()),
    );

    // define_from_name consults the parent's own holdings only
    assert_eq!(
        loader.define_from_name("host.Only").expect("own").bytes(),
        b"host-only"
    );
    assert!(loader
        .define_from_name("deep.Chain")
        .expect_err("not in own holdings")
        .is_not_found());

    // resolve falls through to the parent's full resolution
    assert_eq!(
        loader.resolve("deep.Chain").expect("chained").bytes(),
        b"deep-chain"
    );

    let missing = loader.resolve("no.Such").expect_err("missing everywhere");
    assert!(missing.is_not_found());
}

#[test]
fn racing_requests_for_one_name_observe_a_single_unit() {
    let loader = Arc::new(loader_with(&[("a.B", b"contended")], &[], &[]));
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let mut handles = Vec::new();
    for _ in 0..threads {
        let loader = loader.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            loader.resolve("a.B").expect("resolve").fingerprint().to_string()
        }));
    }

    let fingerprints: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(fingerprints.windows(2).all(|w| w[0] == w[1]));
    assert!(!loader.is_unit_pending("a.B"));
}

#[test]
fn different_names_resolve_independently() {
    let loader = Arc::new(loader_with(
        &[("a.One", b"one"), ("b.Two", b"two")],
        &[],
        &[],
    ));

    thread::scope(|scope| {
        let l = loader.clone();
        scope.spawn(move || l.resolve("a.One").expect("one"));
        let l = loader.clone();
        scope.spawn(move || l.resolve("b.Two").expect("two"));
    });

    assert!(loader.owned_names().contains("a.One"));
    assert!(loader.owned_names().contains("b.Two"));
    assert!(!loader.is_unit_pending("a.One"));
    assert!(!loader.is_unit_pending("b.Two"));
}

#[test]
fn resource_streams_are_fresh_on_every_open() {
    let loader = loader_with(&[], &[("i18n/messages.properties", b"key=value")], &[]);

    for _ in 0..2 {
        let mut stream = loader
            .open_resource_stream("i18n/messages.properties")
            .expect("stream");
        let mut data = Vec::new();
        stream.read_to_end(&mut data).expect("read");
        assert_eq!(data, b"key=value");
    }

    assert!(loader
        .open_resource_stream("missing.properties")
        .expect_err("missing resource")
        .is_not_found());
}

#[test]
fn resource_lookup_falls_back_to_the_parent() {
    let parent = StubParent::new().with_resource("shared/host.properties", b"host=1");
    let loader = JiPluginLoader::new(
        "reports",
        Arc::new(parent),
        HashMap::new(),
        HashMap::new(),
        Arc::new(HashMap::new()),
    );

    let mut stream = loader
        .open_resource_stream("shared/host.properties")
        .expect("parent resource");
    let mut data = Vec::new();
    stream.read_to_end(&mut data).expect("read");
    assert_eq!(data, b"host=1");
}

#[test]
fn locate_prefers_parent_then_live_files_then_own_resources() {
    let parent = StubParent::new().with_resource("labels.properties", b"from-parent");
    let loader = JiPluginLoader::new(
        "reports",
        Arc::new(parent),
        HashMap::new(),
        byte_map(&[
            ("labels.properties", b"from-resources"),
            ("only.properties", b"own-only"),
        ]),
        Arc::new(byte_map(&[
            ("messages/labels.properties", b"from-live-files"),
            ("messages/bundle.properties", b"live-bundle"),
        ])),
    );

    // parent resolution wins outright
    let located = loader.locate_resource_url("labels.properties").expect("parent");
    assert_eq!(located.bytes(), b"from-parent");

    // the live static-file map answers under its messages/ key
    let located = loader.locate_resource_url("bundle.properties").expect("live");
    assert_eq!(located.bytes(), b"live-bundle");
    assert!(located.location().contains("messages/bundle.properties"));

    // the loader's own resources are the final tier
    let located = loader.locate_resource_url("only.properties").expect("own");
    assert_eq!(located.bytes(), b"own-only");

    assert!(loader.locate_resource_url("nowhere.properties").is_none());

    // a located resource opens fresh readers
    let mut data = Vec::new();
    located.open().read_to_end(&mut data).expect("read");
    assert_eq!(data, b"own-only");
}

#[test]
fn resolver_chains_answer_in_order() {
    let front = loader_with(&[("x.Y", b"front")], &[], &[]);
    let back = loader_with(&[("x.Y", b"back"), ("z.Only", b"back-only")], &[], &[]);
    let chain = JiResolverChain::new(vec![Arc::new(front), Arc::new(back)]);

    assert_eq!(chain.resolve_unit("x.Y").expect("ordered").bytes(), b"front");
    assert_eq!(
        chain.resolve_unit("z.Only").expect("fallback").bytes(),
        b"back-only"
    );
    assert!(chain.resolve_unit("none.At.All").is_none());
}
