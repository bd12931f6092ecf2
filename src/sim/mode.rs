//! Serve / play / linger mode machine
//!
//! Each mode value owns the token of its own deadline. Every transition
//! takes the outgoing mode apart and cancels its token before the next
//! deadline is armed, so at most one deadline is ever live.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::timer::{DeadlineToken, Scheduler};
use crate::Player;

/// What a mode deadline does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTimeout {
    /// Serve window ran out: start play anyway
    BeginPlay,
    /// Linger is over: the scorer serves
    Serve(Player),
}

/// Current phase of the match
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for `who` to double-touch, bounded by `deadline`
    Serving { who: Player, deadline: DeadlineToken },
    /// Short pause after a point
    Lingering { deadline: DeadlineToken },
    /// Ball is live; floor contacts score
    InPlay,
}

/// Payload-free view of `Mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeKind {
    Serving,
    Lingering,
    InPlay,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Serving { .. } => ModeKind::Serving,
            Mode::Lingering { .. } => ModeKind::Lingering,
            Mode::InPlay => ModeKind::InPlay,
        }
    }

    /// Designated server while serving
    pub fn server(&self) -> Option<Player> {
        match self {
            Mode::Serving { who, .. } => Some(*who),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<&DeadlineToken> {
        match self {
            Mode::Serving { deadline, .. } | Mode::Lingering { deadline } => Some(deadline),
            Mode::InPlay => None,
        }
    }

    fn into_deadline(self) -> Option<DeadlineToken> {
        match self {
            Mode::Serving { deadline, .. } | Mode::Lingering { deadline } => Some(deadline),
            Mode::InPlay => None,
        }
    }
}

/// Deadline lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTimings {
    pub serve_timeout: Duration,
    pub linger: Duration,
}

/// Owns the mode and the scheduler its deadlines live on
#[derive(Debug)]
pub struct ModeStateMachine<S> {
    mode: Mode,
    scheduler: S,
    timings: ModeTimings,
}

impl<S: Scheduler<ModeTimeout>> ModeStateMachine<S> {
    /// Start out serving for `first_server`
    pub fn new(mut scheduler: S, timings: ModeTimings, first_server: Player) -> Self {
        let deadline = scheduler.schedule(timings.serve_timeout, ModeTimeout::BeginPlay);
        log::debug!("Mode -> Serving({first_server:?})");
        Self {
            mode: Mode::Serving {
                who: first_server,
                deadline,
            },
            scheduler,
            timings,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Leave the current mode, cancelling its deadline
    fn disarm(&mut self) -> ModeKind {
        let previous = std::mem::replace(&mut self.mode, Mode::InPlay);
        let kind = previous.kind();
        if let Some(token) = previous.into_deadline() {
            log::debug!("Cancelling {kind:?} deadline #{}", token.id());
            self.scheduler.cancel(token);
        }
        kind
    }

    /// Switch to serving for `who`; play starts on its own after the serve timeout
    pub fn enter_serve(&mut self, who: Player) {
        let from = self.disarm();
        let deadline = self
            .scheduler
            .schedule(self.timings.serve_timeout, ModeTimeout::BeginPlay);
        self.mode = Mode::Serving { who, deadline };
        log::debug!("Mode {from:?} -> Serving({who:?})");
    }

    pub fn enter_play(&mut self) {
        let from = self.disarm();
        self.mode = Mode::InPlay;
        log::debug!("Mode {from:?} -> InPlay");
    }

    /// Pause after a point; `scorer` serves once the linger expires
    pub fn enter_lingering(&mut self, scorer: Player) {
        let from = self.disarm();
        let deadline = self
            .scheduler
            .schedule(self.timings.linger, ModeTimeout::Serve(scorer));
        self.mode = Mode::Lingering { deadline };
        log::debug!("Mode {from:?} -> Lingering (next server {scorer:?})");
    }

    /// True iff `player` is the one allowed to trigger the serve right now
    pub fn accepts_serve_from(&self, player: Player) -> bool {
        self.mode.server() == Some(player)
    }

    /// Next deadline of the current mode that is due by `until`.
    ///
    /// The clock moves to the deadline's due time so whatever the caller
    /// arms in response is measured from that instant.
    pub fn next_due(&mut self, until: Duration) -> Option<ModeTimeout> {
        while let Some(expired) = self.scheduler.pop_due(until) {
            let owned = self.mode.deadline().map(DeadlineToken::id) == Some(expired.id);
            if owned {
                log::debug!("{:?} deadline #{} fired at {:?}", self.kind(), expired.id, expired.due);
                return Some(expired.action);
            }
            log::warn!(
                "Discarding deadline #{} ({:?}) not owned by current mode {:?}",
                expired.id,
                expired.action,
                self.kind()
            );
        }
        None
    }

    /// Move the clock to `until` once all due deadlines are handled
    pub fn settle(&mut self, until: Duration) {
        self.scheduler.advance_to(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::timer::LogicalScheduler;

    const TIMINGS: ModeTimings = ModeTimings {
        serve_timeout: Duration::from_millis(5000),
        linger: Duration::from_millis(2000),
    };

    fn machine(first: Player) -> ModeStateMachine<LogicalScheduler<ModeTimeout>> {
        ModeStateMachine::new(LogicalScheduler::new(), TIMINGS, first)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_starts_serving_with_one_deadline() {
        let m = machine(Player::Two);
        assert_eq!(m.kind(), ModeKind::Serving);
        assert_eq!(m.mode().server(), Some(Player::Two));
        assert_eq!(m.scheduler().pending(), 1);
    }

    #[test]
    fn test_serve_timeout_begins_play_after_5000ms() {
        let mut m = machine(Player::One);
        assert_eq!(m.next_due(ms(4999)), None);
        assert_eq!(m.next_due(ms(5000)), Some(ModeTimeout::BeginPlay));
        m.enter_play();
        assert_eq!(m.kind(), ModeKind::InPlay);
        assert_eq!(m.scheduler().pending(), 0);
    }

    #[test]
    fn test_linger_hands_serve_to_scorer_after_2000ms() {
        let mut m = machine(Player::One);
        m.enter_play();
        m.settle(ms(1000));
        m.enter_lingering(Player::Two);
        assert_eq!(m.kind(), ModeKind::Lingering);

        assert_eq!(m.next_due(ms(2999)), None);
        assert_eq!(m.next_due(ms(3000)), Some(ModeTimeout::Serve(Player::Two)));
        m.enter_serve(Player::Two);
        assert_eq!(m.mode().server(), Some(Player::Two));
        assert_eq!(m.scheduler().pending(), 1);
    }

    #[test]
    fn test_only_designated_server_may_serve() {
        let mut m = machine(Player::One);
        assert!(m.accepts_serve_from(Player::One));
        assert!(!m.accepts_serve_from(Player::Two));
        m.enter_play();
        assert!(!m.accepts_serve_from(Player::One));
    }

    #[test]
    fn test_leaving_serve_early_cancels_its_deadline() {
        let mut m = machine(Player::One);
        m.enter_play();
        assert_eq!(m.scheduler().pending(), 0);
        // Well past the old serve deadline: nothing fires
        assert_eq!(m.next_due(ms(60_000)), None);
        assert_eq!(m.kind(), ModeKind::InPlay);
    }

    #[test]
    fn test_reentering_serve_replaces_deadline() {
        let mut m = machine(Player::One);
        m.settle(ms(4000));
        m.enter_serve(Player::Two);
        assert_eq!(m.scheduler().pending(), 1);
        // The first deadline (t=5000) is gone; the new one is at t=9000
        assert_eq!(m.next_due(ms(8999)), None);
        assert_eq!(m.next_due(ms(9000)), Some(ModeTimeout::BeginPlay));
    }
}
