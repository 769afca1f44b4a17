//! Payment verification on return from the payment provider.
//!
//! The provider sends the user back with `?reference=...` (or the legacy
//! `?trxref=...`). Every location change re-runs the check, so the guard
//! here is what keeps a reference from being verified twice.

use reqwest::Url;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub const REFERENCE_PARAM: &str = "reference";
pub const TRXREF_PARAM: &str = "trxref";

/// `reference` wins over `trxref`; blank values count as absent
pub fn payment_reference(url: &Url) -> Option<String> {
    let lookup = |name: &str| {
        url.query_pairs()
            .find(|(k, v)| k == name && !v.trim().is_empty())
            .map(|(_, v)| v.trim().to_string())
    };
    lookup(REFERENCE_PARAM).or_else(|| lookup(TRXREF_PARAM))
}

/// Drops both payment parameters and keeps everything else in order
pub fn scrub_payment_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != REFERENCE_PARAM && k != TRXREF_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    clean.set_query(None);
    if !kept.is_empty() {
        clean.query_pairs_mut().extend_pairs(kept);
    }
    clean
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationState {
    Idle,
    Pending { reference: String },
    Succeeded { reference: String },
    Failed { reference: String, message: String },
}

#[derive(Debug)]
struct VerifierInner {
    state: VerificationState,
    // References started and not since released by a failure
    seen: HashSet<String>,
}

/// In-flight guard plus the record of handled references
#[derive(Debug)]
pub struct PaymentVerifier {
    in_flight: AtomicBool,
    inner: Mutex<VerifierInner>,
}

impl PaymentVerifier {
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            inner: Mutex::new(VerifierInner {
                state: VerificationState::Idle,
                seen: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VerifierInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claims the guard for `reference`. Never succeeds while another
    /// verification is in flight, and never again for a reference that was
    /// verified successfully or is still pending.
    pub fn try_begin(&self, reference: &str) -> bool {
        let mut inner = self.lock();
        if inner.seen.contains(reference) {
            debug!(reference = %reference, "Reference already handled");
            return false;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(reference = %reference, "Verification already in flight");
            return false;
        }

        inner.seen.insert(reference.to_string());
        inner.state = VerificationState::Pending {
            reference: reference.to_string(),
        };
        true
    }

    /// Records the outcome and releases the guard. A failed reference may be
    /// verified again when the user comes back with a fresh redirect.
    pub fn finish(&self, reference: &str, outcome: Result<(), String>) {
        let mut inner = self.lock();
        inner.state = match outcome {
            Ok(()) => VerificationState::Succeeded {
                reference: reference.to_string(),
            },
            Err(message) => {
                inner.seen.remove(reference);
                VerificationState::Failed {
                    reference: reference.to_string(),
                    message,
                }
            }
        };
        self.in_flight.store(false, Ordering::Release);
    }

    /// Releases a guard left behind after the parameter vanished.
    /// Returns whether anything was reset.
    pub fn force_reset(&self) -> bool {
        let mut inner = self.lock();
        if !self.in_flight.swap(false, Ordering::AcqRel) {
            return false;
        }
        if let VerificationState::Pending { reference } = &inner.state {
            warn!(reference = %reference, "Force-resetting stuck payment verification");
        }
        inner.state = VerificationState::Idle;
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> VerificationState {
        self.lock().state.clone()
    }

    pub fn has_seen(&self, reference: &str) -> bool {
        self.lock().seen.contains(reference)
    }
}

impl Default for PaymentVerifier {
    fn default() -> Self {
        Self::new()
    }
}
