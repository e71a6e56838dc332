#![allow(missing_docs)]

use slotgraph::{
    storage::{
        validate_chain, ChainSide, ChainWalker, Link, MemoryStore, NodeFile, NodeRecord,
        RecordStore, RelationshipFile, RelationshipRecord, RelationshipStore, StoreOptions,
    },
    types::{Index, Result, SlotError, EMPTY},
};
use tempfile::tempdir;

/// Threads a star of `spokes` relationships around hub node 0, newest first,
/// the way a chain-maintaining writer would prepend each new relationship.
/// Relationship `i` joins the hub (start side) to leaf `i + 1` (end side).
fn build_star(
    nodes: &impl RecordStore<NodeRecord>,
    rels: &impl RecordStore<RelationshipRecord>,
    spokes: u32,
) -> Result<()> {
    let hub = Index(0);
    nodes.store(hub, &NodeRecord::new())?;
    for i in 0..spokes {
        let rel_index = Index(i);
        let leaf = Index(i + 1);
        let mut hub_record = nodes.fetch(hub)?.expect("hub written");
        let old_head = hub_record.relationships;
        if !old_head.is_empty() {
            let mut head = rels.fetch(old_head)?.expect("head written");
            head.start.previous = rel_index;
            rels.store(old_head, &head)?;
        }
        let rel = RelationshipRecord {
            start: Link {
                self_index: rel_index,
                previous: EMPTY,
                next: old_head,
            },
            ..RelationshipRecord::new(rel_index, Index(1))
        };
        rels.store(rel_index, &rel)?;
        hub_record.relationships = rel_index;
        nodes.store(hub, &hub_record)?;
        nodes.store(
            leaf,
            &NodeRecord {
                relationships: rel_index,
                ..NodeRecord::new()
            },
        )?;
    }
    Ok(())
}

#[test]
fn star_chain_on_files() -> Result<()> {
    let dir = tempdir()?;
    let nodes = NodeFile::open(dir.path().join("nodes.db"), StoreOptions::default())?;
    let rels = RelationshipFile::open(dir.path().join("rels.db"), StoreOptions::default())?;
    build_star(&nodes, &rels, 5)?;

    let hub = nodes.fetch(Index(0))?.expect("hub");
    // The newest relationship heads both the hub's and its leaf's chain.
    assert!(matches!(
        validate_chain(&rels, Index(0), &hub),
        Err(SlotError::BrokenChain { at: Index(4), .. })
    ));
    assert_eq!(
        ChainWalker::for_node(&rels, Index(0), &hub)
            .prefer(ChainSide::Start)
            .slots()?,
        vec![Index(4), Index(3), Index(2), Index(1), Index(0)]
    );
    assert_eq!(
        ChainWalker::for_node(&rels, Index(0), &hub)
            .prefer(ChainSide::Start)
            .validate()?,
        5
    );

    for leaf in 1..=5u32 {
        let record = nodes.fetch(Index(leaf))?.expect("leaf");
        let steps: Vec<_> = ChainWalker::for_node(&rels, Index(leaf), &record)
            .prefer(ChainSide::End)
            .collect::<Result<_>>()?;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].slot, Index(leaf - 1));
        assert_eq!(steps[0].side, ChainSide::End);
    }
    Ok(())
}

#[test]
fn memory_and_file_stores_agree() -> Result<()> {
    let dir = tempdir()?;
    let file_nodes = NodeFile::open(dir.path().join("nodes.db"), StoreOptions::default())?;
    let file_rels = RelationshipFile::open(dir.path().join("rels.db"), StoreOptions::default())?;
    let mem_nodes = MemoryStore::<NodeRecord>::new();
    let mem_rels = MemoryStore::<RelationshipRecord>::new();
    build_star(&file_nodes, &file_rels, 8)?;
    build_star(&mem_nodes, &mem_rels, 8)?;

    for raw in 0..8u32 {
        assert_eq!(file_rels.fetch(Index(raw))?, mem_rels.fetch(Index(raw))?);
    }
    for raw in 0..=8u32 {
        assert_eq!(file_nodes.fetch(Index(raw))?, mem_nodes.fetch(Index(raw))?);
    }
    Ok(())
}

#[test]
fn walker_stops_after_cycle() -> Result<()> {
    let nodes = MemoryStore::<NodeRecord>::new();
    let rels = MemoryStore::<RelationshipRecord>::new();
    build_star(&nodes, &rels, 3)?;

    let mut tail = rels.fetch(Index(0))?.expect("tail");
    tail.start.next = Index(2);
    rels.store(Index(0), &tail)?;

    let hub = nodes.fetch(Index(0))?.expect("hub");
    let store: &dyn RelationshipStore = &rels;
    let mut walker = ChainWalker::for_node(store, Index(0), &hub).prefer(ChainSide::Start);
    assert_eq!(walker.next().map(|s| s.map(|step| step.slot).ok()), Some(Some(Index(2))));
    assert!(walker.next().map_or(false, |s| s.is_ok()));
    assert!(walker.next().map_or(false, |s| s.is_ok()));
    assert!(matches!(
        walker.next(),
        Some(Err(SlotError::ChainCycle { at: Index(2), .. }))
    ));
    assert!(walker.next().is_none());
    Ok(())
}
