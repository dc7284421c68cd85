//! Operator desk for the ticket resolution engine.
//!
//! Loads configuration and the knowledge base, wires HTTP model providers
//! into the engine, ingests ticket payloads, resolves them (one at a time
//! or as a parallel batch) and keeps a JSONL decision log.

pub mod batch;
pub mod config;
pub mod ingest;
pub mod providers;
pub mod setup;
pub mod telemetry;

pub use config::{DeskConfig, ProviderSettings};
pub use ingest::{parse_jsonl, parse_ticket, IngestError};
pub use telemetry::{DecisionLog, DecisionRecord};
