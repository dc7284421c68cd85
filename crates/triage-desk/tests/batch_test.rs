//! Batch runner and decision log against a real on-disk knowledge base.

use std::fs;
use std::path::Path;

use resolution::{ResolutionAction, ResolutionStats};
use triage_desk::{batch, parse_jsonl, setup, DecisionLog, DeskConfig};

fn write_kb(dir: &Path) {
    fs::write(
        dir.join("password_reset.txt"),
        "To reset your password, open the reset link we emailed you.\n",
    )
    .unwrap();
    fs::write(
        dir.join("refunds.txt"),
        "Duplicate charges are refunded within five business days.\n",
    )
    .unwrap();
}

fn config_for(dir: &Path) -> DeskConfig {
    DeskConfig {
        kb_dir: dir.to_path_buf(),
        max_in_flight: 3,
        ..DeskConfig::default()
    }
}

const TICKETS: &str = r#"{"ticket": {"id": 1, "subject": "Password reset not working", "description": "the reset link fails"}}
{"id": "2", "subject": "Billing question", "description": "I was charged twice this month"}
{"freshdesk_webhook": {"ticket_id": 3}}
{"id": 4, "subject": "System crash", "description": "Application keeps crashing with error 500"}
{"id": 5}
"#;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_preserves_input_order() {
    let dir = tempfile::tempdir().unwrap();
    write_kb(dir.path());
    let engine = setup::build_engine(&config_for(dir.path())).unwrap();

    let tickets: Vec<_> = parse_jsonl(TICKETS)
        .into_iter()
        .filter_map(|(_, r)| r.ok())
        .collect();
    assert_eq!(tickets.len(), 4);

    let outcomes = batch::resolve_all(engine, tickets, 2).await.unwrap();
    let ids: Vec<_> = outcomes.iter().map(|o| o.ticket_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "4", "5"]);

    let actions: Vec<_> = outcomes.iter().map(|o| o.decision.action).collect();
    assert_eq!(
        actions,
        vec![
            ResolutionAction::AutoResolve,
            ResolutionAction::OfferWithEscalation,
            ResolutionAction::Escalate,
            ResolutionAction::Escalate,
        ]
    );
}

#[tokio::test]
async fn batch_of_nothing_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let engine = setup::build_engine(&config_for(dir.path())).unwrap();
    let outcomes = batch::resolve_all(engine, Vec::new(), 4).await.unwrap();
    assert!(outcomes.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn decision_log_round_trip_feeds_stats() {
    let dir = tempfile::tempdir().unwrap();
    write_kb(dir.path());
    let engine = setup::build_engine(&config_for(dir.path())).unwrap();
    let tickets: Vec<_> = parse_jsonl(TICKETS)
        .into_iter()
        .filter_map(|(_, r)| r.ok())
        .collect();
    let outcomes = batch::resolve_all(engine, tickets, 4).await.unwrap();

    let log = DecisionLog::new(dir.path().join("decisions.jsonl"));
    assert_eq!(log.append(&outcomes).unwrap(), 4);
    assert_eq!(log.append(&outcomes[..1]).unwrap(), 1);

    let records = log.read().unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].outcome.ticket_id, outcomes[0].ticket_id);
    assert_eq!(records[0].outcome.decision, outcomes[0].decision);
    assert!(records[0].escalation_note.is_none());
    assert!(records[2]
        .escalation_note
        .as_deref()
        .is_some_and(|note| note.contains("Team: engineering")));

    let replayed: Vec<_> = records.into_iter().map(|r| r.outcome).collect();
    let stats = ResolutionStats::from_outcomes(&replayed);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.auto_resolved, 2);
    assert_eq!(stats.escalated, 2);
}
