//! Counting rules shared by the snapshot builder and the row-summary fallback.

use serde::{Deserialize, Serialize};
use venn_messages::{AggregateVoterNode, VoteIntentRecord};
use venn_types::Agreement;

/// Public per-point counts, however they were obtained (materialized snapshot
/// or live row summary).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointAggregate {
    pub agree: u64,
    pub disagree: u64,
    pub weight: f64,
    pub participants: u64,
}

impl PointAggregate {
    fn fold(&mut self, agreement: Agreement, weight: f64) {
        match agreement {
            Agreement::Agree => self.agree += 1,
            Agreement::Disagree => self.disagree += 1,
            // Neutral is a retraction: present, but not a participant.
            Agreement::Neutral => return,
        }
        self.participants += 1;
        self.weight += weight;
    }
}

/// Tally the per-voter winning intents for one point.
pub fn tally_winners(winners: &[VoteIntentRecord]) -> PointAggregate {
    let mut counts = PointAggregate::default();
    for winner in winners {
        counts.fold(winner.agreement, winner.weight);
    }
    counts
}

/// Summarize live voter nodes directly, bypassing materialized snapshots.
/// The read path uses this when no snapshot has been published yet.
pub fn summarize_nodes<'a>(nodes: impl IntoIterator<Item = &'a AggregateVoterNode>) -> PointAggregate {
    let mut counts = PointAggregate::default();
    for node in nodes {
        counts.fold(node.agreement, node.weight);
    }
    counts
}
