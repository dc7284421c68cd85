//! Parallel batch resolution.
//!
//! ```text
//! tickets ──► JoinSet::spawn_blocking(engine.resolve) × N   (semaphore-bounded)
//!         ◄── join_next() ... reorder by input index
//! ```
//!
//! Resolution is synchronous and may block on model calls, so each ticket
//! runs on the blocking pool over a shared `Arc<ResolutionEngine>`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use resolution::{ResolutionEngine, ResolutionOutcome, Ticket};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Resolve every ticket, at most `max_in_flight` at once.
///
/// Outcomes come back in input order, one per ticket. If resolving any
/// ticket panics the whole batch fails with an error naming those tickets,
/// so the output always lines up with the input.
pub async fn resolve_all(
    engine: Arc<ResolutionEngine>,
    tickets: Vec<Ticket>,
    max_in_flight: usize,
) -> Result<Vec<ResolutionOutcome>> {
    resolve_with(tickets, max_in_flight, move |ticket| engine.resolve(ticket)).await
}

async fn resolve_with<F>(
    tickets: Vec<Ticket>,
    max_in_flight: usize,
    resolve: F,
) -> Result<Vec<ResolutionOutcome>>
where
    F: Fn(&Ticket) -> ResolutionOutcome + Send + Sync + 'static,
{
    let resolve = Arc::new(resolve);
    let sem = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let total = tickets.len();
    let mut join_set: JoinSet<(usize, String, Option<ResolutionOutcome>)> = JoinSet::new();

    for (idx, ticket) in tickets.into_iter().enumerate() {
        let permit = sem
            .clone()
            .acquire_owned()
            .await
            .context("batch semaphore closed")?;
        let resolve = Arc::clone(&resolve);
        join_set.spawn_blocking(move || {
            let _permit = permit;
            let outcome = catch_unwind(AssertUnwindSafe(|| (*resolve)(&ticket))).ok();
            (idx, ticket.id, outcome)
        });
    }

    let mut slots: Vec<Option<ResolutionOutcome>> = vec![None; total];
    let mut failed = Vec::new();
    while let Some(res) = join_set.join_next().await {
        let (idx, ticket_id, outcome) = res.context("batch task failed")?;
        match outcome {
            Some(outcome) => {
                debug!(idx, ticket_id = %outcome.ticket_id, "batch ticket done");
                slots[idx] = Some(outcome);
            }
            None => {
                error!(idx, %ticket_id, "resolution panicked");
                failed.push((idx, ticket_id));
            }
        }
    }

    if !failed.is_empty() {
        failed.sort();
        let ids: Vec<_> = failed.into_iter().map(|(_, id)| id).collect();
        bail!("resolution panicked for ticket(s): {}", ids.join(", "));
    }
    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolution::{EngineConfig, KnowledgeBase, ModelCapabilities};

    fn engine() -> Arc<ResolutionEngine> {
        Arc::new(
            ResolutionEngine::new(
                EngineConfig::default(),
                ModelCapabilities::none(),
                Arc::new(KnowledgeBase::default()),
            )
            .unwrap(),
        )
    }

    fn tickets(n: usize) -> Vec<Ticket> {
        (0..n)
            .map(|i| Ticket::new(i.to_string(), "Refund", "charged twice"))
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_one_outcome_per_ticket_in_order() {
        let outcomes = resolve_all(engine(), tickets(10), 3).await.unwrap();
        let ids: Vec<_> = outcomes.iter().map(|o| o.ticket_id.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicked_ticket_fails_batch_with_its_id() {
        let engine = engine();
        let err = resolve_with(tickets(5), 2, move |ticket| {
            if ticket.id == "1" || ticket.id == "3" {
                panic!("resolver blew up");
            }
            engine.resolve(ticket)
        })
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "resolution panicked for ticket(s): 1, 3");
    }

    #[tokio::test]
    async fn test_zero_in_flight_still_runs() {
        let outcomes = resolve_all(engine(), tickets(2), 0).await.unwrap();
        assert_eq!(outcomes.len(), 2);
    }
}
