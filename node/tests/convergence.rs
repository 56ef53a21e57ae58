//! Multi-replica integration tests over the in-memory mesh.

use std::sync::Arc;

use serde_json::json;
use venn_derive::{derive_synthesis_point_id, Column};
use venn_messages::ConstituencyProof;
use venn_node::{Replica, ReplicaConfig};
use venn_nullables::{AckMode, NullClock, NullMesh};
use venn_sentiment::{IdentitySession, IntentQueue, VoteRequest};
use venn_types::{Agreement, Epoch, PointId, SynthesisId, Timestamp, TopicId};

fn topic() -> TopicId {
    TopicId::new("topic-1")
}

fn synthesis() -> SynthesisId {
    SynthesisId::new("synth-1")
}

fn point() -> PointId {
    derive_synthesis_point_id(
        &topic(),
        &synthesis(),
        Epoch::ZERO,
        Column::Frame,
        "The reform lowers costs",
    )
}

fn replica(mesh: &NullMesh, nullifier: &str, now: Timestamp) -> Replica {
    venn_utils::init_tracing();
    Replica::new(
        IdentitySession {
            nullifier: nullifier.into(),
            trust_score: 0.5,
            scaled_trust_score: 1.0,
        },
        Arc::new(mesh.clone()),
        ReplicaConfig::default(),
        IntentQueue::in_memory(),
        now,
    )
}

fn vote(desired: Agreement, nullifier: &str) -> VoteRequest {
    VoteRequest {
        topic_id: topic(),
        synthesis_id: synthesis(),
        epoch: Epoch::ZERO,
        point_id: point(),
        desired,
        proof: Some(ConstituencyProof {
            district_hash: "district-1".into(),
            nullifier: nullifier.into(),
            merkle_root: "root-1".into(),
        }),
    }
}

#[tokio::test(start_paused = true)]
async fn two_voters_converge_through_a_stance_switch() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());
    let mut bob = replica(&mesh, "nullifier-b", clock.now());

    // Alice agrees; Bob observes it before voting.
    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    let seen_by_bob = bob
        .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
        .await
        .unwrap();
    assert_eq!(seen_by_bob.agree, 1);
    assert_eq!(seen_by_bob.participants, 1);

    // Bob disagrees, then Alice switches sides.
    clock.advance_ms(1_000);
    bob.admit_and_project(vote(Agreement::Disagree, "nullifier-b"), clock.now())
        .await
        .unwrap();
    clock.advance_ms(1_000);
    alice
        .admit_and_project(vote(Agreement::Disagree, "nullifier-a"), clock.now())
        .await
        .unwrap();

    // Every participant and a fresh observer read the same final counts.
    let observer = replica(&mesh, "nullifier-c", clock.now());
    for reader in [&alice, &bob, &observer] {
        let counts = reader
            .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
            .await
            .unwrap();
        assert_eq!(counts.agree, 0);
        assert_eq!(counts.disagree, 2);
        assert_eq!(counts.participants, 2);
        assert_eq!(counts.weight, 2.0);
    }
}

#[tokio::test(start_paused = true)]
async fn repeated_click_retracts_and_reads_back_as_zero() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());

    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    clock.advance_ms(500);
    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();

    let counts = alice
        .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
        .await
        .unwrap();
    assert_eq!(counts.agree, 0);
    assert_eq!(counts.disagree, 0);
    assert_eq!(counts.participants, 0);
}

#[tokio::test(start_paused = true)]
async fn failed_projection_stays_queued_until_replay() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());

    mesh.set_ack_mode(AckMode::Fail);
    let receipt = alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    // The vote itself is admitted; only the projection failed.
    assert!(receipt.accepted);
    assert_eq!(alice.engine().queue().len(), 1);
    assert!(mesh.is_empty());

    // The transport comes back; replay drains the queue.
    mesh.set_ack_mode(AckMode::Immediate);
    clock.advance_ms(1_000);
    let summary = alice.replay_intent_queue(clock.now()).await;
    assert_eq!(summary.replayed, 1);
    assert_eq!(summary.failed, 0);
    assert!(alice.engine().queue().is_empty());

    let counts = alice
        .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
        .await
        .unwrap();
    assert_eq!(counts.agree, 1);
}

#[tokio::test(start_paused = true)]
async fn replay_keeps_failing_intents_queued() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());

    mesh.set_ack_mode(AckMode::Fail);
    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    let summary = alice.replay_intent_queue(clock.now()).await;
    assert_eq!(summary.replayed, 0);
    assert_eq!(summary.failed, 1);
    assert_eq!(alice.engine().queue().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn lost_ack_recovers_by_reading_the_write_back() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());

    // Writes land but acks never arrive.
    mesh.set_ack_mode(AckMode::Silent);
    let receipt = alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    assert!(receipt.accepted);
    // Read-back recovery confirmed the write, so nothing stays queued.
    assert!(alice.engine().queue().is_empty());

    mesh.set_ack_mode(AckMode::Immediate);
    let counts = alice
        .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
        .await
        .unwrap();
    assert_eq!(counts.agree, 1);
}

#[tokio::test(start_paused = true)]
async fn fresh_replica_hydrates_from_the_mesh() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());
    let mut bob = replica(&mesh, "nullifier-b", clock.now());

    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();
    clock.advance_ms(1_000);
    bob.admit_and_project(vote(Agreement::Disagree, "nullifier-b"), clock.now())
        .await
        .unwrap();

    let mut carol = replica(&mesh, "nullifier-c", clock.now());
    let merged = carol.hydrate(&topic(), &synthesis(), Epoch::ZERO).await;
    assert_eq!(merged, 2);
    assert_eq!(carol.engine().store().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn hydration_of_an_empty_scope_degrades_to_local_cache() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());
    let merged = alice.hydrate(&topic(), &synthesis(), Epoch::ZERO).await;
    assert_eq!(merged, 0);
}

#[tokio::test(start_paused = true)]
async fn hydration_backoff_ends_with_the_final_read() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());

    let started = tokio::time::Instant::now();
    let merged = alice.hydrate(&topic(), &synthesis(), Epoch::ZERO).await;
    assert_eq!(merged, 0);
    // Three attempts, backoff between them only: 500ms + 1000ms.
    assert_eq!(started.elapsed(), std::time::Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn malformed_neighbor_state_does_not_poison_reads() {
    let mesh = NullMesh::new();
    let clock = NullClock::default();
    let mut alice = replica(&mesh, "nullifier-a", clock.now());
    alice
        .admit_and_project(vote(Agreement::Agree, "nullifier-a"), clock.now())
        .await
        .unwrap();

    // A buggy peer replicated junk under the same scope, including an
    // invalid snapshot that must be ignored in favor of the row summary.
    let scope = format!(
        "aggregates/topics/{}/syntheses/{}/epochs/0",
        topic(),
        synthesis()
    );
    mesh.seed(&format!("{scope}/voters/evil/xyz"), json!("not an object"));
    mesh.seed(
        &format!("{scope}/points/{}", point()),
        json!({ "schema_version": "wrong", "agree": 99 }),
    );

    let counts = alice
        .read_point_aggregate(&topic(), &synthesis(), Epoch::ZERO, &point())
        .await
        .unwrap();
    assert_eq!(counts.agree, 1);
    assert_eq!(counts.participants, 1);
}
