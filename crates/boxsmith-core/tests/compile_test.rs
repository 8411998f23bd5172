#![allow(clippy::unwrap_used)]
// Integration tests for `ProfileCompiler` against an in-memory store.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use boxsmith_core::{
    CompileError, CompileOptions, Compiled, DataStore, EntityId, EntityKind, OmissionReason,
    ProfileCompiler, StoreSnapshot,
};

// ── Helpers ─────────────────────────────────────────────────────────

const PROXY: &str = "out.selector.default.proxy.10";
const AUTO: &str = "out.urltest.jp.auto.11";
const TOKYO: &str = "out.vless.jp.tokyo.12";
const SINGAPORE: &str = "out.trojan.sg.13";
const DIRECT: &str = "out.direct.default.direct.14";

fn store() -> DataStore {
    let snapshot: StoreSnapshot = serde_json::from_value(json!({
        "inbounds": [
            { "id": 1, "owner": 1, "type": "mixed", "address": "127.0.0.1", "port": 7890 },
            { "id": 2, "owner": 1, "type": "tun", "stack": "system", "mtu": 9000 },
            { "id": 3, "owner": 1, "type": "mixed", "address": "0.0.0.0", "port": 7891 }
        ],
        "outbounds": [
            { "id": 10, "owner": 1, "type": "selector", "name": "proxy", "outbounds": [11, 12] },
            { "id": 11, "owner": 1, "type": "urltest", "name": "auto", "region": "jp", "outbounds": [13] },
            { "id": 12, "owner": 1, "type": "vless", "name": "tokyo", "region": "jp",
              "address": "203.0.113.10", "port": 443, "uuid": "8f0c5a4e-3f7e-4a55-b2c1-5d1f2e9c0a11",
              "flow": "xtls-rprx-vision", "tls": { "enabled": true, "server_name": "tokyo.example" } },
            { "id": 13, "owner": 1, "type": "trojan", "region": "sg",
              "address": "203.0.113.20", "port": 443, "password": "hunter2" },
            { "id": 14, "owner": 1, "type": "direct", "name": "direct" },
            { "id": 15, "owner": 1, "type": "selector", "name": "loop-a", "outbounds": [16] },
            { "id": 16, "owner": 1, "type": "selector", "name": "loop-b", "outbounds": [15] }
        ],
        "endpoints": [
            { "id": 20, "owner": 1, "name": "home", "addresses": ["10.8.0.2/24"],
              "private_key": "priv-home", "public_key": "pub-home",
              "peers": [{ "id": 21, "address": "198.51.100.1", "port": 51820, "allowed_ips": ["0.0.0.0/0"] }] },
            { "id": 21, "owner": 1, "name": "", "addresses": ["10.8.0.1/24"],
              "private_key": "priv-gw", "public_key": "pub-gw", "preshared_key": "psk-gw" }
        ],
        "rule_sets": [
            { "id": 30, "owner": 1, "type": "remote", "name": "geosite-cn",
              "url": "https://example.org/geosite-cn.srs" },
            { "id": 31, "owner": 1, "type": "inline", "name": "lan",
              "rules": [{ "ip_cidr": ["192.168.0.0/16"] }] }
        ],
        "route_rules": [
            { "id": 40, "owner": 1, "name": "cn", "action": "route", "outbound": 14,
              "domain_suffixes": [".cn"], "rule_sets": [30, 39] },
            { "id": 41, "owner": 1, "name": "ads", "action": "reject", "outbound": 14,
              "domain_keywords": ["ads"] }
        ],
        "dns_servers": [
            { "id": 50, "owner": 1, "name": "cloudflare", "type": "https", "address": "1.1.1.1",
              "outbound_detour": 10, "wg_endpoint_detour": 20 },
            { "id": 51, "owner": 1, "name": "home", "type": "udp", "address": "10.0.0.53", "port": 53,
              "wg_endpoint_detour": 20 }
        ],
        "dns_rules": [
            { "id": 60, "owner": 1, "name": "google", "action": "route", "server": 50,
              "domain_suffixes": [".google.com"] },
            { "id": 61, "owner": 1, "name": "ads", "action": "reject", "server": 50,
              "domains": ["ads.example"] }
        ],
        "profiles": [
            { "id": 100, "created_by": 1, "name": "laptop",
              "inbounds": [1, 2, 3], "outbounds": [10, 11, 12, 13, 14], "route_final": 14,
              "wg_endpoints": [20, 21], "rules": [40, 41], "rule_sets": [30, 31],
              "dns_rules": [60, 61], "dns": [50, 51] },
            { "id": 101, "created_by": 1, "name": "dangling",
              "inbounds": [98], "outbounds": [12, 99, 13] },
            { "id": 102, "created_by": 1, "name": "empty" },
            { "id": 103, "created_by": 1, "name": "loop", "outbounds": [15], "route_final": 77 },
            { "id": 104, "created_by": 1, "name": "repeated", "outbounds": [14, 14, 12] }
        ]
    }))
    .unwrap();
    DataStore::from_snapshot(snapshot).unwrap()
}

async fn compile(store: &DataStore, id: u64) -> Compiled {
    ProfileCompiler::new(store, CompileOptions::default())
        .compile_id(EntityId::new(id))
        .await
        .unwrap()
}

fn document(compiled: &Compiled) -> Value {
    serde_json::from_str(compiled.to_json()).unwrap()
}

fn outbound<'a>(doc: &'a Value, tag: &str) -> &'a Value {
    doc["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["tag"] == tag)
        .unwrap()
}

// ── Whole-document tests ────────────────────────────────────────────

#[tokio::test]
async fn test_compile_is_idempotent() {
    let store = store();
    let first = compile(&store, 100).await;
    let second = compile(&store, 100).await;
    assert_eq!(first.to_json(), second.to_json());
}

#[tokio::test]
async fn test_fixed_top_level_settings() {
    let store = store();
    let doc = document(&compile(&store, 102).await);

    assert_eq!(doc["log"], json!({ "level": "info", "timestamp": true }));
    assert_eq!(
        doc["experimental"],
        json!({ "cache_file": { "enabled": true, "store_fakeip": true, "store_rdrc": false } })
    );
    assert_eq!(
        doc["route"],
        json!({ "rule_set": [], "rules": [], "final": "direct", "auto_detect_interface": true })
    );
    assert_eq!(
        doc["dns"],
        json!({
            "disable_cache": false, "disable_expire": false, "independent_cache": false,
            "servers": [], "rules": []
        })
    );
    assert_eq!(doc["inbounds"], json!([]));
    assert_eq!(doc["outbounds"], json!([]));
    assert_eq!(doc["endpoints"], json!([]));
}

#[tokio::test]
async fn test_text_form_is_two_space_pretty_json() {
    let store = store();
    let compiled = compile(&store, 102).await;
    assert!(compiled.to_json().starts_with("{\n  \"log\": {\n    \"level\": \"info\""));
    assert_eq!(compiled.file_name(), "empty.json");
}

#[tokio::test]
async fn test_tags_are_unique() {
    let store = store();
    let doc = document(&compile(&store, 100).await);

    let mut tags = Vec::new();
    for list in [&doc["inbounds"], &doc["outbounds"], &doc["endpoints"], &doc["route"]["rule_set"], &doc["dns"]["servers"]] {
        for entry in list.as_array().unwrap() {
            tags.push(entry["tag"].as_str().unwrap().to_owned());
        }
    }
    let unique: HashSet<&String> = tags.iter().collect();
    assert_eq!(unique.len(), tags.len());
    assert_eq!(
        doc["inbounds"].as_array().unwrap().iter().map(|i| i["tag"].clone()).collect::<Vec<_>>(),
        vec![json!("in.mixed.1"), json!("in.tun.2"), json!("in.mixed.3")]
    );
}

#[tokio::test]
async fn test_full_profile_sections() {
    let store = store();
    let compiled = compile(&store, 100).await;
    let doc = document(&compiled);

    assert_eq!(
        doc["inbounds"][1],
        json!({
            "type": "tun", "tag": "in.tun.2", "stack": "system", "mtu": 9000,
            "auto_route": true, "auto_redirect": true, "strict_route": true
        })
    );
    assert_eq!(
        doc["route"],
        json!({
            "rule_set": [
                { "tag": "rule_set.remote.30", "type": "remote", "url": "https://example.org/geosite-cn.srs" },
                { "tag": "rule_set.inline.31", "type": "inline", "rules": [{ "ip_cidr": ["192.168.0.0/16"] }] }
            ],
            "rules": [
                { "domain_suffix": [".cn"], "rule_set": ["rule_set.remote.30"], "outbound": DIRECT },
                { "domain_keyword": ["ads"], "action": "reject" }
            ],
            "final": DIRECT,
            "auto_detect_interface": true
        })
    );
    assert_eq!(
        doc["dns"]["servers"],
        json!([
            { "tag": "dns.https.50", "address": "https://1.1.1.1/dns-query", "detour": PROXY },
            { "tag": "dns.udp.51", "address": "10.0.0.53:53", "detour": "wg.home.20" }
        ])
    );
    assert_eq!(
        doc["dns"]["rules"],
        json!([
            { "domain_suffix": [".google.com"], "server": "dns.https.50" },
            { "domain": ["ads.example"], "disable_cache": true }
        ])
    );
    assert_eq!(
        doc["endpoints"][0]["peers"],
        json!([{
            "server": "198.51.100.1", "server_port": 51820, "allowed_ips": ["0.0.0.0/0"],
            "public_key": "pub-gw", "pre_shared_key": "psk-gw"
        }])
    );

    // The only dangling reference is rule set 39 inside route rule 40.
    assert_eq!(compiled.omitted.len(), 1);
    assert_eq!(compiled.omitted[0].entity.kind, EntityKind::RuleSet);
    assert_eq!(compiled.omitted[0].entity.id, EntityId::new(39));
    assert_eq!(compiled.omitted[0].referrer.map(|r| r.id), Some(EntityId::new(40)));
}

// ── Resolution tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_missing_references_are_omitted_in_order() {
    let store = store();
    let compiled = compile(&store, 101).await;
    let doc = document(&compiled);

    let tags: Vec<&str> = doc["outbounds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["tag"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec![TOKYO, SINGAPORE]);
    assert_eq!(doc["inbounds"], json!([]));

    let missing: Vec<(EntityKind, EntityId)> = compiled
        .omitted
        .iter()
        .map(|o| (o.entity.kind, o.entity.id))
        .collect();
    assert_eq!(
        missing,
        vec![
            (EntityKind::Inbound, EntityId::new(98)),
            (EntityKind::Outbound, EntityId::new(99)),
        ]
    );
    assert!(compiled.omitted.iter().all(|o| o.reason == OmissionReason::NotFound));
}

#[tokio::test]
async fn test_route_final_resolution() {
    let store = store();

    // Set and resolved.
    assert_eq!(document(&compile(&store, 100).await)["route"]["final"], DIRECT);
    // Unset: first resolved outbound.
    assert_eq!(document(&compile(&store, 101).await)["route"]["final"], TOKYO);
    // Nothing resolved.
    assert_eq!(document(&compile(&store, 102).await)["route"]["final"], "direct");
    // Set but not exported: direct, even though outbound 15 resolved.
    assert_eq!(document(&compile(&store, 103).await)["route"]["final"], "direct");
}

#[tokio::test]
async fn test_recursive_chain_resolves_two_levels() {
    let store = store();
    let doc = document(&compile(&store, 100).await);

    assert_eq!(outbound(&doc, PROXY)["outbounds"], json!([AUTO, TOKYO]));
    assert_eq!(outbound(&doc, AUTO)["outbounds"], json!([SINGAPORE]));
    assert_eq!(
        outbound(&doc, TOKYO),
        &json!({
            "type": "vless", "tag": TOKYO, "server": "203.0.113.10", "server_port": 443,
            "uuid": "8f0c5a4e-3f7e-4a55-b2c1-5d1f2e9c0a11", "flow": "xtls-rprx-vision",
            "tls": { "enabled": true, "server_name": "tokyo.example" }
        })
    );
}

#[tokio::test]
async fn test_cyclic_chain_is_truncated() {
    let store = store();
    let compiled = compile(&store, 103).await;
    let doc = document(&compiled);

    let loop_a = outbound(&doc, "out.selector.default.loop-a.15");
    assert_eq!(loop_a["outbounds"], json!(["out.selector.default.loop-b.16"]));

    assert_eq!(compiled.omitted.len(), 1);
    let cut = compiled.omitted[0];
    assert_eq!(cut.entity.id, EntityId::new(15));
    assert_eq!(cut.reason, OmissionReason::Cycle);
    assert_eq!(cut.referrer.map(|r| r.id), Some(EntityId::new(16)));
}

#[tokio::test]
async fn test_shallow_depth_limit() {
    let store = store();
    let compiled = ProfileCompiler::new(&store, CompileOptions { max_depth: 0 })
        .compile_id(EntityId::new(100))
        .await
        .unwrap();
    let doc = document(&compiled);

    // Members of top-level groups are one level down and cut.
    assert!(outbound(&doc, PROXY).get("outbounds").is_none());
    assert!(
        compiled
            .omitted
            .iter()
            .any(|o| o.reason == OmissionReason::DepthExceeded { limit: 0 })
    );
}

#[tokio::test]
async fn test_repeated_profile_references_appear_once() {
    let store = store();
    let doc = document(&compile(&store, 104).await);
    assert_eq!(doc["outbounds"].as_array().unwrap().len(), 2);
    assert_eq!(doc["route"]["final"], DIRECT);
}

#[tokio::test]
async fn test_unknown_profile_is_an_error() {
    let store = store();
    let err = ProfileCompiler::new(&store, CompileOptions::default())
        .compile_id(EntityId::new(555))
        .await
        .unwrap_err();
    assert!(
        matches!(err, CompileError::ProfileNotFound { id } if id == EntityId::new(555)),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_concurrent_compiles_share_one_store() {
    let store = store();
    let compiler = ProfileCompiler::new(&store, CompileOptions::default());
    let (a, b) = tokio::join!(
        compiler.compile_id(EntityId::new(100)),
        compiler.compile_id(EntityId::new(101))
    );
    assert_eq!(a.unwrap().name, "laptop");
    assert_eq!(b.unwrap().name, "dangling");
}

#[tokio::test]
async fn test_blank_stored_strings_still_compile() {
    let snapshot: StoreSnapshot = serde_json::from_value(json!({
        "outbounds": [{ "id": 1, "owner": 1, "type": "" }],
        "dns_servers": [{ "id": 2, "owner": 1, "name": "blank", "type": "udp", "address": "" }],
        "profiles": [{ "id": 3, "created_by": 1, "name": "blank", "outbounds": [1], "dns": [2] }]
    }))
    .unwrap();
    let store = DataStore::from_snapshot(snapshot).unwrap();

    let compiled = compile(&store, 3).await;
    let doc = document(&compiled);
    assert_eq!(doc["outbounds"][0]["type"], "");
    assert_eq!(doc["dns"]["servers"][0]["address"], "");
    assert_eq!(doc["route"]["final"], doc["outbounds"][0]["tag"]);
    assert!(compiled.omitted.is_empty());
}
