//! Concurrency guard
//!
//! At most one participant of a session may be generating at a time. The
//! guard is a per-session single-flight lock; acquiring it yields a
//! [`GenerationPermit`] that releases on drop.

use colloquy_domain::ParticipantId;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug)]
struct Holder {
    participant: ParticipantId,
    ticket: u64,
}

#[derive(Debug, Default)]
struct GuardInner {
    holder: Option<Holder>,
    next_ticket: u64,
}

/// Per-session generation lock
#[derive(Debug, Default)]
pub struct ConcurrencyGuard {
    inner: Mutex<GuardInner>,
}

impl ConcurrencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GuardInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically take the lock for `participant`.
    ///
    /// Returns `None` if anyone (including `participant`) already holds it.
    pub fn try_acquire(&self, participant: &ParticipantId) -> Option<GenerationPermit<'_>> {
        let mut inner = self.lock();
        if let Some(holder) = &inner.holder {
            debug!(
                "Generation lock busy: {} requested while {} holds it",
                participant, holder.participant
            );
            return None;
        }
        inner.next_ticket += 1;
        let ticket = inner.next_ticket;
        inner.holder = Some(Holder {
            participant: participant.clone(),
            ticket,
        });
        Some(GenerationPermit {
            guard: self,
            participant: participant.clone(),
            ticket,
        })
    }

    /// Release the lock if `participant` holds it. Returns whether it did.
    pub fn release(&self, participant: &ParticipantId) -> bool {
        let mut inner = self.lock();
        match &inner.holder {
            Some(holder) if &holder.participant == participant => {
                inner.holder = None;
                true
            }
            _ => false,
        }
    }

    /// Clear the lock regardless of holder. Used on stop.
    pub fn force_release(&self) {
        self.lock().holder = None;
    }

    pub fn is_generating(&self) -> bool {
        self.lock().holder.is_some()
    }

    pub fn locked_participant(&self) -> Option<ParticipantId> {
        self.lock().holder.as_ref().map(|h| h.participant.clone())
    }

    fn release_ticket(&self, ticket: u64) {
        let mut inner = self.lock();
        if inner.holder.as_ref().is_some_and(|h| h.ticket == ticket) {
            inner.holder = None;
        }
    }
}

/// Proof that the holder may generate. Dropping it releases the lock,
/// unless the lock was force-released and re-acquired in the meantime.
#[derive(Debug)]
pub struct GenerationPermit<'a> {
    guard: &'a ConcurrencyGuard,
    participant: ParticipantId,
    ticket: u64,
}

impl GenerationPermit<'_> {
    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }
}

impl Drop for GenerationPermit<'_> {
    fn drop(&mut self) {
        self.guard.release_ticket(self.ticket);
    }
}
