//! Deadline scheduling on logical time
//!
//! Deadlines carry a plain action value rather than a callback; whoever
//! drains them decides what the action means. Tokens are not `Clone`, so a
//! deadline has exactly one owner, and cancelling consumes the token.

use std::time::Duration;

/// Proof of an armed deadline; hand it back to `Scheduler::cancel`
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct DeadlineToken {
    id: u64,
}

impl DeadlineToken {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A deadline that came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expired<A> {
    pub id: u64,
    pub due: Duration,
    pub action: A,
}

/// Schedules actions at future points of logical time
pub trait Scheduler<A> {
    /// Current logical time
    fn now(&self) -> Duration;

    /// Arm a deadline `delay` from now
    fn schedule(&mut self, delay: Duration, action: A) -> DeadlineToken;

    /// Disarm a deadline. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: DeadlineToken);

    /// Remove and return the earliest deadline due at or before `until`,
    /// moving the clock to its due time. Ties fire in arming order.
    fn pop_due(&mut self, until: Duration) -> Option<Expired<A>>;

    /// Move the clock forward to `until` (never backwards)
    fn advance_to(&mut self, until: Duration);

    fn pending(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Pending<A> {
    id: u64,
    due: Duration,
    action: A,
}

/// Deterministic scheduler driven entirely by the caller's clock
#[derive(Debug, Clone)]
pub struct LogicalScheduler<A> {
    now: Duration,
    next_id: u64,
    pending: Vec<Pending<A>>,
}

impl<A> Default for LogicalScheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> LogicalScheduler<A> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            pending: Vec::new(),
        }
    }
}

impl<A> Scheduler<A> for LogicalScheduler<A> {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule(&mut self, delay: Duration, action: A) -> DeadlineToken {
        let id = self.next_id;
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay,
            action,
        });
        DeadlineToken { id }
    }

    fn cancel(&mut self, token: DeadlineToken) {
        self.pending.retain(|p| p.id != token.id);
    }

    fn pop_due(&mut self, until: Duration) -> Option<Expired<A>> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.id))
            .map(|(i, _)| i)?;
        let Pending { id, due, action } = self.pending.remove(index);
        self.now = self.now.max(due);
        Some(Expired { id, due, action })
    }

    fn advance_to(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}
