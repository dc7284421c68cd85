//! Ticket payload ingestion.
//!
//! Accepted shapes:
//!
//! ```text
//! {"ticket": {"id": 42, "subject": "...", "description": "..."}}
//! {"id": "42", "subject": "...", "description": "..."}
//! {"freshdesk_webhook": {"ticket_id": 42}}     -> ReferenceOnly
//! ```
//!
//! A webhook that only references a ticket cannot be resolved here; the
//! ticketing backend client has to fetch it first.

use resolution::Ticket;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload does not contain a ticket: {0}")]
    Unrecognized(String),

    #[error("webhook only references ticket {0}; fetch it from the ticketing backend first")]
    ReferenceOnly(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TicketId {
    Number(serde_json::Number),
    Text(String),
}

impl TicketId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
struct RawTicket {
    id: TicketId,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<RawTicket> for Ticket {
    fn from(raw: RawTicket) -> Self {
        Ticket::new(
            raw.id.into_string(),
            raw.subject.unwrap_or_default(),
            raw.description.unwrap_or_default(),
        )
    }
}

#[derive(Deserialize)]
struct WebhookReference {
    ticket_id: TicketId,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Wrapped { ticket: RawTicket },
    Reference { freshdesk_webhook: WebhookReference },
    Direct(RawTicket),
}

/// Parse one JSON payload into a ticket.
pub fn parse_ticket(json: &str) -> Result<Ticket, IngestError> {
    let value: Value = serde_json::from_str(json)?;
    ticket_from_value(value)
}

pub fn ticket_from_value(value: Value) -> Result<Ticket, IngestError> {
    let payload =
        Payload::deserialize(value).map_err(|e| IngestError::Unrecognized(e.to_string()))?;
    match payload {
        Payload::Wrapped { ticket } | Payload::Direct(ticket) => Ok(ticket.into()),
        Payload::Reference { freshdesk_webhook } => Err(IngestError::ReferenceOnly(
            freshdesk_webhook.ticket_id.into_string(),
        )),
    }
}

/// Parse JSONL: one payload per non-blank line. Line numbers start at 1.
pub fn parse_jsonl(content: &str) -> Vec<(usize, Result<Ticket, IngestError>)> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, parse_ticket(line)))
        .collect()
}
