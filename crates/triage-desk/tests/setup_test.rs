//! Startup wiring from configuration.

use std::fs;

use resolution::{EngineConfig, KnowledgeDocument, RetrievalMethod, Ticket};
use triage_desk::{parse_ticket, setup, DeskConfig, IngestError, ProviderSettings};

#[test]
fn local_embeddings_enable_semantic_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("export_data.txt"),
        "Open Settings, choose Data and press Export to download a CSV.",
    )
    .unwrap();
    let config = DeskConfig {
        kb_dir: dir.path().to_path_buf(),
        ..DeskConfig::default()
    };

    let engine = setup::build_engine(&config).unwrap();
    assert!(engine.corpus().has_embeddings());
    let retrieval = engine.retrieve("how do I export my data to CSV");
    assert_eq!(retrieval.method, RetrievalMethod::Semantic);
}

#[test]
fn no_providers_means_keyword_only() {
    let settings = ProviderSettings {
        local_embeddings: false,
        ..ProviderSettings::default()
    };
    let caps = setup::capabilities(&settings, &EngineConfig::default());
    assert!(caps.zero_shot.is_none());
    assert!(caps.embedder.is_none());
}

#[test]
fn json_corpus_takes_precedence() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("kb.json");
    let docs = vec![KnowledgeDocument::new("faq-1", "Login help", "Use the forgot password link.")];
    fs::write(&json, serde_json::to_string(&docs).unwrap()).unwrap();

    let config = DeskConfig {
        kb_dir: dir.path().join("unused"),
        kb_json: Some(json),
        ..DeskConfig::default()
    };
    let corpus = setup::load_corpus(&config).unwrap();
    assert_eq!(corpus.len(), 1);
    assert_eq!(corpus.documents()[0].id, "faq-1");
}

#[test]
fn invalid_engine_config_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DeskConfig {
        kb_dir: dir.path().to_path_buf(),
        ..DeskConfig::default()
    };
    config.engine.classifier.confidence_threshold = 2.0;
    assert!(setup::build_engine(&config).is_err());
}

#[test]
fn unreachable_model_still_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = DeskConfig {
        kb_dir: dir.path().to_path_buf(),
        ..DeskConfig::default()
    };
    config.providers.zero_shot_url = Some("http://127.0.0.1:9/zero-shot".to_string());
    config.providers.request_timeout_secs = 1;

    let engine = setup::build_engine(&config).unwrap();
    let outcome = engine.resolve(&Ticket::new("1", "Refund please", "charged twice"));
    assert_eq!(outcome.classification.category, resolution::Category::Billing);
}

#[test]
fn ingested_payload_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let engine = setup::build_engine(&DeskConfig {
        kb_dir: dir.path().to_path_buf(),
        ..DeskConfig::default()
    })
    .unwrap();

    let ticket = parse_ticket(r#"{"ticket": {"id": 99, "subject": "Feature suggestion"}}"#).unwrap();
    let outcome = engine.resolve(&ticket);
    assert_eq!(outcome.ticket_id, "99");
    assert_eq!(outcome.classification.category, resolution::Category::FeatureRequest);

    let err = parse_ticket(r#"{"freshdesk_webhook": {"ticket_id": "99"}}"#).unwrap_err();
    assert!(matches!(err, IngestError::ReferenceOnly(_)));
}
