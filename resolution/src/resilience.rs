//! Resilience: ordered fallback chains
//!
//! Every decision in the engine goes through a [`FallbackChain`]: an ordered
//! list of strategy tiers tried one after another, ending in a terminal
//! default that cannot fail.
//!
//! # Design
//!
//! ```text
//! execute(attempt, default)
//!   ├─ tier 0 succeeds            → ChainOutcome { level: Full, served_by: tier 0 }
//!   ├─ tier 0 fails, tier n wins  → ChainOutcome { level: Partial, served_by: tier n, warnings }
//!   └─ every tier fails           → ChainOutcome { level: Fallback, served_by: terminal }
//! ```
//!
//! A tier "fails" when it returns a [`StrategyError`] or panics. Both are
//! handled the same way: record a warning and move on. There are no retries
//! inside a tier. The terminal default is a plain closure returning `T`, so
//! the chain always produces a value.
//!
//! # Usage
//!
//! ```rust,ignore
//! let chain = FallbackChain::new("classifier", Method::Default)
//!     .add_tier(Method::Model)
//!     .add_tier(Method::Keyword);
//!
//! let outcome = chain.execute(|tier| try_tier(tier, &input), ClassificationResult::fallback);
//! ```

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::error::StrategyError;

/// How far down the chain the result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DegradationLevel {
    /// First tier succeeded.
    Full,
    /// A later, lower-fidelity tier succeeded.
    Partial,
    /// Every tier failed; the terminal default was used.
    Fallback,
}

impl std::fmt::Display for DegradationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Partial => write!(f, "partial"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// Result of running a chain, tagged with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainOutcome<T, S> {
    pub value: T,
    /// Which tier produced `value`.
    pub served_by: S,
    pub level: DegradationLevel,
    /// One entry per failed tier, in order.
    pub warnings: Vec<String>,
}

impl<T, S> ChainOutcome<T, S> {
    pub fn is_degraded(&self) -> bool {
        self.level != DegradationLevel::Full
    }
}

/// Ordered chain of strategy tiers ending in an infallible default.
///
/// The chain holds only tier tags, so one instance can be shared by any
/// number of concurrent callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackChain<S> {
    name: String,
    tiers: Vec<S>,
    terminal: S,
}

impl<S> FallbackChain<S>
where
    S: Copy + PartialEq + Display,
{
    /// Create a chain whose terminal default is tagged `terminal`.
    pub fn new(name: &str, terminal: S) -> Self {
        Self {
            name: name.to_string(),
            tiers: Vec::new(),
            terminal,
        }
    }

    /// Append a tier after the existing ones.
    pub fn add_tier(mut self, tier: S) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Remove a tier, e.g. when its capability is switched off.
    pub fn without_tier(mut self, tier: S) -> Self {
        self.tiers.retain(|t| *t != tier);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fallible tiers in execution order (terminal excluded).
    pub fn tiers(&self) -> &[S] {
        &self.tiers
    }

    pub fn terminal(&self) -> S {
        self.terminal
    }

    /// Number of fallible tiers.
    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Run the tiers in order and return the first success.
    ///
    /// `attempt` is called with each tier tag. Panics inside it are caught
    /// and treated like a returned error. `default` is only called if every
    /// tier fails and is not guarded: a panic there is a bug.
    pub fn execute<T, F, D>(&self, mut attempt: F, default: D) -> ChainOutcome<T, S>
    where
        F: FnMut(S) -> Result<T, StrategyError>,
        D: FnOnce() -> T,
    {
        let mut warnings = Vec::new();

        for (idx, tier) in self.tiers.iter().copied().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| attempt(tier)))
                .unwrap_or_else(|payload| Err(StrategyError::Fault(panic_message(&*payload))));

            match result {
                Ok(value) => {
                    let level = if idx == 0 {
                        DegradationLevel::Full
                    } else {
                        DegradationLevel::Partial
                    };
                    return ChainOutcome {
                        value,
                        served_by: tier,
                        level,
                        warnings,
                    };
                }
                Err(err) => {
                    if err.is_fault() {
                        warn!(chain = %self.name, tier = %tier, error = %err, "Strategy faulted, falling through");
                    } else {
                        debug!(chain = %self.name, tier = %tier, reason = %err, "Strategy unavailable, falling through");
                    }
                    warnings.push(format!("{} '{}' unavailable: {}", self.name, tier, err));
                }
            }
        }

        ChainOutcome {
            value: default(),
            served_by: self.terminal,
            level: DegradationLevel::Fallback,
            warnings,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Primary,
        Secondary,
        Default,
    }

    impl std::fmt::Display for Tag {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    fn chain() -> FallbackChain<Tag> {
        FallbackChain::new("test", Tag::Default)
            .add_tier(Tag::Primary)
            .add_tier(Tag::Secondary)
    }

    #[test]
    fn test_primary_succeeds() {
        let outcome = chain().execute(
            |tier| match tier {
                Tag::Primary => Ok("primary"),
                _ => Err(StrategyError::NoMatch),
            },
            || "default",
        );
        assert_eq!(outcome.value, "primary");
        assert_eq!(outcome.served_by, Tag::Primary);
        assert_eq!(outcome.level, DegradationLevel::Full);
        assert!(!outcome.is_degraded());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_falls_to_second() {
        let outcome = chain().execute(
            |tier| match tier {
                Tag::Primary => Err(StrategyError::ResourceUnavailable { resource: "model" }),
                _ => Ok("secondary"),
            },
            || "default",
        );
        assert_eq!(outcome.value, "secondary");
        assert_eq!(outcome.served_by, Tag::Secondary);
        assert_eq!(outcome.level, DegradationLevel::Partial);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_all_fail_uses_default() {
        let outcome = chain().execute(|_| Err::<&str, _>(StrategyError::NoMatch), || "default");
        assert_eq!(outcome.value, "default");
        assert_eq!(outcome.served_by, Tag::Default);
        assert_eq!(outcome.level, DegradationLevel::Fallback);
        assert_eq!(outcome.warnings.len(), 2);
    }

    #[test]
    fn test_panic_is_treated_as_unavailable() {
        let outcome = chain().execute(
            |tier| match tier {
                Tag::Primary => panic!("model exploded"),
                _ => Ok(7),
            },
            || 0,
        );
        assert_eq!(outcome.value, 7);
        assert_eq!(outcome.served_by, Tag::Secondary);
        assert!(outcome.warnings[0].contains("model exploded"));
    }

    #[test]
    fn test_tiers_attempted_in_order_without_retry() {
        let mut seen = Vec::new();
        let _ = chain().execute(
            |tier| {
                seen.push(tier);
                Err::<(), _>(StrategyError::NoMatch)
            },
            || (),
        );
        assert_eq!(seen, vec![Tag::Primary, Tag::Secondary]);
    }

    #[test]
    fn test_without_tier_skips_it() {
        let c = chain().without_tier(Tag::Primary);
        assert_eq!(c.tiers(), &[Tag::Secondary]);
        let mut seen = Vec::new();
        let outcome = c.execute(
            |tier| {
                seen.push(tier);
                Ok(1)
            },
            || 0,
        );
        assert_eq!(seen, vec![Tag::Secondary]);
        assert_eq!(outcome.level, DegradationLevel::Full);
    }

    #[test]
    fn test_empty_chain_goes_straight_to_default() {
        let c: FallbackChain<Tag> = FallbackChain::new("empty", Tag::Default);
        let outcome = c.execute(|_| Ok("never"), || "default");
        assert_eq!(outcome.value, "default");
        assert_eq!(c.tier_count(), 0);
    }

    #[test]
    fn test_chain_is_reusable() {
        let c = chain();
        let a = c.execute(|_| Ok(1), || 0);
        let b = c.execute(|_| Ok(1), || 0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degradation_level_display() {
        assert_eq!(DegradationLevel::Full.to_string(), "full");
        assert_eq!(DegradationLevel::Partial.to_string(), "partial");
        assert_eq!(DegradationLevel::Fallback.to_string(), "fallback");
    }
}
