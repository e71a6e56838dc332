//! Walking and checking a node's doubly linked relationship chain.
//!
//! Each relationship threads two chains, one per endpoint, through its
//! `start` and `end` links. Links name only their own relationship, so a
//! walk picks the link whose `previous` is the slot it just left (`EMPTY`
//! at the head). Where both links qualify and diverge, the walker needs a
//! [`ChainSide`] preference. Writers keep chains acyclic; these helpers only
//! detect violations.

use rustc_hash::FxHashSet;
use tracing::warn;

use super::record::{ChainSide, Link, NodeRecord, RelationshipRecord};
use super::store::RelationshipStore;
use crate::types::{Index, Result, SlotError, EMPTY};

/// One relationship visited by a [`ChainWalker`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ChainStep {
    /// Slot the relationship was read from.
    pub slot: Index,
    /// The decoded relationship.
    pub record: RelationshipRecord,
    /// Link the walk went through.
    pub side: ChainSide,
}

impl ChainStep {
    /// The link the walk went through.
    pub fn link(&self) -> &Link {
        self.record.link(self.side)
    }
}

/// Iterator over the relationships in one node's chain, head first.
///
/// Stops after the first error.
pub struct ChainWalker<'a, S: ?Sized> {
    store: &'a S,
    node: Index,
    previous: Index,
    next: Index,
    prefer: Option<ChainSide>,
    seen: FxHashSet<Index>,
    done: bool,
}

impl<'a, S: RelationshipStore + ?Sized> ChainWalker<'a, S> {
    /// Walks the chain of `node` starting at relationship `head`.
    pub fn new(store: &'a S, node: Index, head: Index) -> Self {
        Self {
            store,
            node,
            previous: EMPTY,
            next: head,
            prefer: None,
            seen: FxHashSet::default(),
            done: false,
        }
    }

    /// Walks the chain whose head is recorded in `record`.
    pub fn for_node(store: &'a S, node: Index, record: &NodeRecord) -> Self {
        Self::new(store, node, record.relationships)
    }

    /// Side taken where both links of a relationship follow the previous slot.
    pub fn prefer(mut self, side: ChainSide) -> Self {
        self.prefer = Some(side);
        self
    }

    /// Collects the visited slots.
    pub fn slots(self) -> Result<Vec<Index>> {
        self.map(|step| step.map(|s| s.slot)).collect()
    }

    /// Walks to the end and returns the chain length.
    ///
    /// Beyond what walking already rejects, every visited relationship must
    /// be active and its link's self index must name the slot it was read
    /// from.
    pub fn validate(self) -> Result<usize> {
        let node = self.node;
        let mut len = 0usize;
        for step in self {
            let step = step?;
            let reason = if !step.record.active {
                Some("inactive relationship still linked")
            } else if step.link().self_index != step.slot {
                Some("self index does not name the slot")
            } else {
                None
            };
            if let Some(reason) = reason {
                warn!(node = node.get(), at = step.slot.get(), reason, "chain.invalid");
                return Err(SlotError::BrokenChain {
                    node,
                    at: step.slot,
                    reason,
                });
            }
            len += 1;
        }
        Ok(len)
    }

    fn fail(&mut self, err: SlotError) -> Option<Result<ChainStep>> {
        warn!(node = self.node.get(), error = %err, "chain.violation");
        self.done = true;
        Some(Err(err))
    }
}

impl<'a, S: RelationshipStore + ?Sized> Iterator for ChainWalker<'a, S> {
    type Item = Result<ChainStep>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next.is_empty() {
            return None;
        }
        let at = self.next;
        if !self.seen.insert(at) {
            return self.fail(SlotError::ChainCycle {
                node: self.node,
                at,
            });
        }
        let record = match self.store.fetch(at) {
            Ok(Some(record)) => record,
            Ok(None) => {
                return self.fail(SlotError::BrokenChain {
                    node: self.node,
                    at,
                    reason: "missing relationship",
                })
            }
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        match record.side_after(self.previous, self.prefer) {
            Ok(side) => {
                self.previous = at;
                self.next = record.link(side).next;
                Some(Ok(ChainStep {
                    slot: at,
                    record,
                    side,
                }))
            }
            Err(reason) => self.fail(SlotError::BrokenChain {
                node: self.node,
                at,
                reason,
            }),
        }
    }
}

/// Collects the relationship slots in `node`'s chain.
pub fn walk_chain<S>(store: &S, node: Index, record: &NodeRecord) -> Result<Vec<Index>>
where
    S: RelationshipStore + ?Sized,
{
    ChainWalker::for_node(store, node, record).slots()
}

/// Walks `node`'s chain and checks its liveness and self indices.
///
/// Returns the chain length. See [`ChainWalker::validate`].
pub fn validate_chain<S>(store: &S, node: Index, record: &NodeRecord) -> Result<usize>
where
    S: RelationshipStore + ?Sized,
{
    ChainWalker::for_node(store, node, record).validate()
}
