#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use slotgraph::{
    storage::{NodeFile, NodeRecord, RecordStore, StoreOptions},
    types::Index,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    nodes: PathBuf,
    rels: PathBuf,
    config: PathBuf,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().expect("tempdir");
    let nodes = dir.path().join("nodes.db");
    let rels = dir.path().join("rels.db");
    let config = dir.path().join("cli.toml");
    fs::write(&config, "").expect("write empty config");
    Fixture {
        _dir: dir,
        nodes,
        rels,
        config,
    }
}

fn run(fx: &Fixture, args: &[&str]) -> std::process::Output {
    cargo_bin_cmd!("slotgraph")
        .env_remove("SLOTGRAPH_LOG")
        .arg("--config")
        .arg(&fx.config)
        .arg("--node-file")
        .arg(&fx.nodes)
        .arg("--relationship-file")
        .arg(&fx.rels)
        .args(args)
        .output()
        .expect("run slotgraph")
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("utf8 stdout")
}

#[test]
fn put_then_read_node() {
    let fx = fixture();
    let put = run(&fx, &["put-node", "3", "--relationships", "1", "--properties", "257"]);
    assert!(put.status.success(), "put-node failed: {put:?}");

    let out = run(&fx, &["node", "3", "--raw"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("node 3: active=true relationships=1 properties=257"));
    assert!(text.contains("bytes: 010100000001010000"));

    let store = NodeFile::open(&fx.nodes, StoreOptions::default()).expect("open nodes");
    assert_eq!(
        store.fetch(Index(3)).expect("fetch"),
        Some(NodeRecord {
            active: true,
            relationships: Index(1),
            properties: Index(257),
        })
    );
}

#[test]
fn missing_slot_prints_absent() {
    let fx = fixture();
    run(&fx, &["put-node", "0"]);
    let out = run(&fx, &["node", "5"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("node 5: absent"));
}

#[test]
fn chain_walks_and_flags_violations() {
    let fx = fixture();
    for args in [
        vec!["put-node", "1", "--relationships", "0"],
        vec!["put-node", "2", "--relationships", "0"],
        vec!["put-relationship", "0", "--type", "7"],
    ] {
        assert!(run(&fx, &args).status.success());
    }

    let out = run(&fx, &["chain", "1"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("node 1 chain: [0] (1 relationships)"));

    run(&fx, &["put-relationship", "1", "--start-previous", "5", "--end-previous", "6"]);
    run(&fx, &["put-node", "3", "--relationships", "1"]);
    let out = run(&fx, &["chain", "3"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("chain violation"));
}

#[test]
fn chain_side_resolves_shared_head() {
    let fx = fixture();
    for args in [
        vec!["put-node", "4", "--relationships", "2"],
        vec!["put-relationship", "2", "--start-next", "3"],
        vec!["put-relationship", "3", "--start-previous", "2"],
    ] {
        assert!(run(&fx, &args).status.success());
    }

    let out = run(&fx, &["chain", "4"]);
    assert_eq!(out.status.code(), Some(2));

    let out = run(&fx, &["chain", "4", "--side", "start"]);
    assert!(out.status.success(), "{out:?}");
    assert!(stdout(&out).contains("node 4 chain: [2 -> 3] (2 relationships)"));
}

#[test]
fn delete_and_stats() {
    let fx = fixture();
    run(&fx, &["put-node", "0"]);
    run(&fx, &["put-node", "1"]);
    let del = run(&fx, &["delete", "node", "1"]);
    assert!(del.status.success());
    assert!(stdout(&del).contains("deleted node 1"));

    run(&fx, &["put-relationship", "2"]);
    let out = run(&fx, &["stats"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("nodes: slots=2 active=1 record_size=9"));
    assert!(text.contains("relationships: slots=3 active=1 record_size=33"));
}

#[test]
fn reading_missing_file_fails() {
    let fx = fixture();
    let out = run(&fx, &["relationship", "0"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error:"));
}

#[test]
fn config_supplies_file_paths() {
    let fx = fixture();
    fs::write(
        &fx.config,
        format!(
            "log_level = \"warn\"\n[files]\nnodes = {:?}\n",
            fx.nodes.display().to_string()
        ),
    )
    .expect("write config");
    run(&fx, &["put-node", "2", "--properties", "9"]);

    let out = cargo_bin_cmd!("slotgraph")
        .env_remove("SLOTGRAPH_LOG")
        .arg("--config")
        .arg(&fx.config)
        .args(["node", "2"])
        .output()
        .expect("run slotgraph");
    assert!(out.status.success(), "{out:?}");
    assert!(stdout(&out).contains("node 2: active=true relationships=empty properties=9"));
}
