//! Response text composition.

use crate::config::PolicyConfig;
use crate::types::{ClassificationResult, KnowledgeDocument};

/// Placeholder in [`PolicyConfig::acknowledgment`] replaced by the team name.
pub const TEAM_PLACEHOLDER: &str = "{team}";

/// Retrieved article body, or the generic message when nothing was found.
pub fn article_or_generic(document: Option<&KnowledgeDocument>, config: &PolicyConfig) -> String {
    match document {
        Some(doc) => doc.body.clone(),
        None => config.generic_message.clone(),
    }
}

/// `body` followed by a blank line and the escalation offer.
pub fn with_escalation_offer(body: &str, config: &PolicyConfig) -> String {
    format!("{}\n\n{}", body, config.escalation_offer)
}

pub fn acknowledgment(team: &str, config: &PolicyConfig) -> String {
    config.acknowledgment.replace(TEAM_PLACEHOLDER, team)
}

/// Private note for the agent picking up an escalated ticket.
pub fn escalation_note(
    rationale: &str,
    classification: &ClassificationResult,
    team: &str,
    response_text: &str,
) -> String {
    let mut note = String::from("Escalated by the resolution engine.\n");
    note.push_str(&format!("Reason: {rationale}\n"));
    note.push_str(&format!(
        "Tier: {} | Category: {} | Team: {}\n",
        classification.tier, classification.category, team
    ));
    note.push_str(&format!(
        "Confidence: {:.0}% ({})\n",
        classification.confidence * 100.0,
        classification.method
    ));
    if !classification.matched_keywords.is_empty() {
        note.push_str(&format!(
            "Matched keywords: {}\n",
            classification.matched_keywords.join(", ")
        ));
    }
    note.push_str(&format!("\nResponse sent to customer:\n{response_text}"));
    note
}
