#![allow(missing_docs)]

use std::fs;

use slotgraph::{
    primitives::io::{ByteSource, Medium, StdFileIo},
    storage::{
        fetch, Fetcher, Link, NodeFile, NodeRecord, NodeStore, RecordStore, RelationshipFile,
        RelationshipRecord, RelationshipStore, StoreOptions, NODE_RECORD_LEN, RELATIONSHIP_RECORD_LEN,
    },
    types::{Index, Result, SlotError, EMPTY},
};
use tempfile::tempdir;

fn sample_relationship() -> RelationshipRecord {
    RelationshipRecord {
        active: true,
        ty: Index(111),
        properties: Index(1),
        start: Link {
            self_index: Index(2),
            previous: Index(3),
            next: Index(4),
        },
        end: Link {
            self_index: Index(22),
            previous: Index(33),
            next: Index(44),
        },
    }
}

#[test]
fn node_file_survives_reopen() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nodes.db");
    let live = NodeRecord {
        active: true,
        relationships: Index(1),
        properties: Index(257),
    };
    let dead = NodeRecord {
        active: false,
        relationships: EMPTY,
        properties: Index(3),
    };
    {
        let store = NodeFile::open(&path, StoreOptions::new().sync_on_store(true))?;
        store.store(Index(0), &live)?;
        store.store(Index(3), &dead)?;
    }

    let bytes = fs::read(&path)?;
    assert_eq!(bytes.len(), 4 * NODE_RECORD_LEN);
    assert_eq!(&bytes[..NODE_RECORD_LEN], &[1, 1, 0, 0, 0, 1, 1, 0, 0]);
    assert!(bytes[NODE_RECORD_LEN..3 * NODE_RECORD_LEN]
        .iter()
        .all(|b| *b == 0xFF));

    let store = NodeFile::open(&path, StoreOptions::new().create_if_missing(false))?;
    assert_eq!(store.slot_count()?, 4);
    assert_eq!(store.fetch(Index(0))?, Some(live));
    assert_eq!(store.fetch(Index(3))?, Some(dead));
    assert_eq!(store.fetch(Index(1))?, None);
    assert_eq!(store.fetch(Index(2))?, None);
    assert_eq!(store.fetch(Index(4))?, None);
    assert_eq!(store.scan()?.len(), 2);
    assert_eq!(store.active_count()?, 1);
    Ok(())
}

#[test]
fn relationship_file_roundtrip_through_trait_object() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rels.db");
    let file = RelationshipFile::open(&path, StoreOptions::default())?;
    let store: &dyn RelationshipStore = &file;
    let rel = sample_relationship();
    store.store(Index(2), &rel)?;
    assert_eq!(store.fetch(Index(2))?, Some(rel));
    assert_eq!(file.medium().len()?, 3 * RELATIONSHIP_RECORD_LEN as u64);
    Ok(())
}

#[test]
fn fetcher_reads_raw_slots_from_file() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("raw.bin");
    fs::write(&path, [1u8, 2, 3])?;
    let io = StdFileIo::open(&path, false)?;

    let single = Fetcher::new(1, io.clone())?;
    assert_eq!(single.fetch(Index(0))?, vec![1]);
    assert_eq!(single.fetch(Index(2))?, vec![3]);
    assert!(matches!(
        single.fetch(Index(3)),
        Err(SlotError::ShortRead {
            expected: 1,
            got: 0
        })
    ));

    assert_eq!(fetch(2, &io, Index(0))?, vec![1, 2]);
    assert!(matches!(
        fetch(2, &io, Index(1)),
        Err(SlotError::ShortRead {
            expected: 2,
            got: 1
        })
    ));
    Ok(())
}

#[test]
fn truncated_relationship_file_reports_short_read() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("rels.db");
    {
        let store = RelationshipFile::open(&path, StoreOptions::default())?;
        store.store(Index(0), &sample_relationship())?;
        store.store(Index(1), &sample_relationship())?;
    }
    let file = fs::OpenOptions::new().write(true).open(&path)?;
    file.set_len((RELATIONSHIP_RECORD_LEN + 10) as u64)?;
    drop(file);

    let store = RelationshipFile::open(&path, StoreOptions::default())?;
    assert_eq!(store.slot_count()?, 1);
    assert!(store.fetch(Index(0))?.is_some());
    assert!(matches!(
        store.fetch(Index(1)),
        Err(SlotError::ShortRead {
            expected: 33,
            got: 10
        })
    ));
    assert_eq!(store.fetch(Index(2))?, None);
    Ok(())
}

#[test]
fn soft_delete_keeps_bytes_in_place() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nodes.db");
    let store = NodeFile::open(&path, StoreOptions::default())?;
    let node = NodeRecord {
        active: true,
        relationships: Index(7),
        properties: Index(8),
    };
    store.store(Index(1), &node)?;
    store.delete(Index(1))?;

    let mut raw = [0u8; NODE_RECORD_LEN];
    let got = store.medium().read_at(NODE_RECORD_LEN as u64, &mut raw)?;
    assert_eq!(got, NODE_RECORD_LEN);
    assert_eq!(raw, [0, 7, 0, 0, 0, 8, 0, 0, 0]);

    let nodes: &dyn NodeStore = &store;
    assert_eq!(
        nodes.fetch(Index(1))?,
        Some(NodeRecord {
            active: false,
            ..node
        })
    );
    Ok(())
}

#[test]
fn open_missing_without_create_fails() {
    let dir = tempdir().unwrap();
    let result = NodeFile::open(
        dir.path().join("missing.db"),
        StoreOptions::new().create_if_missing(false),
    );
    assert!(matches!(result, Err(SlotError::Io(_))));
}
