//! Per-voter contribution registers.

use std::collections::BTreeMap;

use venn_crdt::{LamportClock, LwwEntry, LwwRegister};
use venn_messages::AggregateVoterNode;
use venn_types::{Epoch, PointId, SynthesisId, TopicId, VoterId};

/// Fully-scoped register address: one register per voter per point per
/// synthesis generation. Epoch scoping subsumes supersession; an old epoch's
/// registers simply stop being read.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContributionKey {
    pub topic_id: TopicId,
    pub synthesis_id: SynthesisId,
    pub epoch: Epoch,
    pub voter_id: VoterId,
    pub point_id: PointId,
}

/// All contribution registers of one replica, sharing a single Lamport clock.
///
/// Registers are created on first write and mutated in place; retraction
/// writes `Neutral`, never deletes. The stored value is exactly the public
/// [`AggregateVoterNode`] projection, so nothing identity-bearing can be in
/// here to leak.
#[derive(Debug, Default)]
pub struct ContributionStore {
    clock: LamportClock,
    registers: BTreeMap<ContributionKey, LwwRegister<AggregateVoterNode>>,
}

impl ContributionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local write: stamp `node` with the next clock tick.
    pub fn set(&mut self, key: ContributionKey, node: AggregateVoterNode) -> LwwEntry<AggregateVoterNode> {
        self.registers
            .entry(key)
            .or_default()
            .set(&mut self.clock, node)
            .clone()
    }

    /// Merge a replicated entry into the register at `key`.
    pub fn merge_remote(
        &mut self,
        key: ContributionKey,
        incoming: LwwEntry<AggregateVoterNode>,
    ) -> LwwEntry<AggregateVoterNode> {
        self.registers
            .entry(key)
            .or_default()
            .merge(&mut self.clock, incoming)
            .clone()
    }

    /// The current node at `key`, if the register has ever been written.
    pub fn node(&self, key: &ContributionKey) -> Option<&AggregateVoterNode> {
        self.registers.get(key).and_then(|r| r.read())
    }

    pub fn entry(&self, key: &ContributionKey) -> Option<&LwwEntry<AggregateVoterNode>> {
        self.registers.get(key).and_then(|r| r.entry())
    }

    /// All written registers under one `(topic, synthesis, epoch)` scope.
    pub fn rows(
        &self,
        topic_id: &TopicId,
        synthesis_id: &SynthesisId,
        epoch: Epoch,
    ) -> Vec<(&ContributionKey, &LwwEntry<AggregateVoterNode>)> {
        self.registers
            .iter()
            .filter(|(key, _)| {
                key.topic_id == *topic_id && key.synthesis_id == *synthesis_id && key.epoch == epoch
            })
            .filter_map(|(key, reg)| reg.entry().map(|entry| (key, entry)))
            .collect()
    }

    /// Every written register, for replication exchange.
    pub fn entries(
        &self,
    ) -> impl Iterator<Item = (&ContributionKey, &LwwEntry<AggregateVoterNode>)> {
        self.registers
            .iter()
            .filter_map(|(key, reg)| reg.entry().map(|entry| (key, entry)))
    }

    pub fn clock_value(&self) -> u64 {
        self.clock.value()
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
