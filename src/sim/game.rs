//! Match controller
//!
//! Owns the score and the event queue, steps the physics world, turns floor
//! contacts into points and drives the mode machine. Everything runs on the
//! caller's thread: inside `step`, `advance_time` or an input method.

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::bodies::{Arena, Ball, Paddle};
use super::detector::CollisionEventDetector;
use super::mode::{Mode, ModeKind, ModeStateMachine, ModeTimeout, ModeTimings};
use super::physics::SimpleWorld;
use super::snapshot::{ScoreEvent, ScoreReason, Snapshot, encode};
use super::timer::{LogicalScheduler, Scheduler};
use super::world::PhysicsWorld;
use crate::Player;
use crate::consts::*;
use crate::error::{ConfigError, MatchError, PhysicsError};
use crate::game_def::GameDefinition;
use crate::settings::MatchSettings;

fn random_player(rng: &mut Pcg32) -> Player {
    if rng.random_bool(0.5) {
        Player::One
    } else {
        Player::Two
    }
}

/// One running match
#[derive(Debug)]
pub struct Match<W = SimpleWorld, S = LogicalScheduler<ModeTimeout>> {
    def: GameDefinition,
    settings: MatchSettings,
    world: W,
    arena: Arena,
    ball: Ball,
    paddles: [Paddle; 2],
    modes: ModeStateMachine<S>,
    detector: CollisionEventDetector,
    score: [u32; 2],
    queued_events: Vec<ScoreEvent>,
    rng: Pcg32,
    last_anomaly: Option<MatchError>,
}

impl Match {
    /// Build a match on the bundled physics world and a logical clock
    pub fn new(def: GameDefinition, settings: MatchSettings) -> Result<Self, ConfigError> {
        let world = SimpleWorld::new(settings.gravity, settings.solver());
        Self::with_parts(def, settings, world, LogicalScheduler::new())
    }
}

impl<W: PhysicsWorld, S: Scheduler<ModeTimeout>> Match<W, S> {
    /// Build a match on a caller-supplied world and scheduler.
    ///
    /// The match starts the way `start_new_game` leaves it: reset poses,
    /// random server.
    pub fn with_parts(
        def: GameDefinition,
        settings: MatchSettings,
        mut world: W,
        scheduler: S,
    ) -> Result<Self, ConfigError> {
        def.validate()?;

        let arena = Arena::new(&mut world, &def);
        let ball = Ball::new(&mut world, &def, settings.ball_restitution);
        let paddles = [
            Paddle::new(&mut world, &def, settings.paddle_max_speed, settings.paddle_max_spin),
            Paddle::new(&mut world, &def, settings.paddle_max_speed, settings.paddle_max_spin),
        ];
        let detector = CollisionEventDetector::new(ball.body());

        let seed = settings.seed.unwrap_or_else(rand::random::<u64>);
        let mut rng = Pcg32::seed_from_u64(seed);
        let first_server = random_player(&mut rng);
        let timings = ModeTimings {
            serve_timeout: settings.serve_timeout(),
            linger: settings.linger(),
        };
        let modes = ModeStateMachine::new(scheduler, timings, first_server);

        let mut game = Self {
            def,
            settings,
            world,
            arena,
            ball,
            paddles,
            modes,
            detector,
            score: [0, 0],
            queued_events: Vec::new(),
            rng,
            last_anomaly: None,
        };
        game.reset();
        log::info!("New match (seed {seed}), {first_server:?} serves");
        Ok(game)
    }

    // === Accessors ===

    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    pub fn mode(&self) -> &Mode {
        self.modes.mode()
    }

    pub fn mode_kind(&self) -> ModeKind {
        self.modes.kind()
    }

    /// Logical time elapsed since the match was built
    pub fn now(&self) -> Duration {
        self.modes.now()
    }

    /// Number of armed mode deadlines (never more than one)
    pub fn pending_deadlines(&self) -> usize {
        self.modes.scheduler().pending()
    }

    /// Events waiting for the next snapshot
    pub fn queued_events(&self) -> &[ScoreEvent] {
        &self.queued_events
    }

    /// Most recent anomaly swallowed during a step
    pub fn last_anomaly(&self) -> Option<&MatchError> {
        self.last_anomaly.as_ref()
    }

    pub fn definition(&self) -> &GameDefinition {
        &self.def
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, player: Player) -> &Paddle {
        &self.paddles[player.index()]
    }

    /// No win condition exists; a match runs until the session drops it
    pub fn over(&self) -> bool {
        false
    }

    // === Inputs ===

    /// Forward touch samples (logical units) to a paddle
    pub fn set_touch_points(&mut self, ctrl_index: usize, points: &[Vec2]) {
        match Player::from_index(ctrl_index) {
            Some(player) => self.paddles[player.index()].set_touch_points(points),
            None => log::warn!("Ignoring touch points for unknown control {ctrl_index}"),
        }
    }

    /// Serve trigger; only the designated server may start play early
    pub fn double_touch(&mut self, ctrl_index: usize) {
        let Some(player) = Player::from_index(ctrl_index) else {
            log::warn!("Ignoring double touch from unknown control {ctrl_index}");
            return;
        };
        if self.modes.accepts_serve_from(player) {
            log::info!("{player:?} serves");
            self.enter_play_mode();
        } else {
            log::debug!("Double touch from {player:?} ignored while {:?}", self.mode_kind());
        }
    }

    // === Modes ===

    /// Reset poses and hand the serve to a random player. The score is kept.
    pub fn start_new_game(&mut self) {
        self.reset();
        self.enter_serve_mode(None);
    }

    /// Serve for `who`, or for a random player
    pub fn enter_serve_mode(&mut self, who: Option<Player>) {
        let who = who.unwrap_or_else(|| random_player(&mut self.rng));
        self.modes.enter_serve(who);
        log::info!("{who:?} to serve");
    }

    /// Start play and kick the ball
    pub fn enter_play_mode(&mut self) {
        self.modes.enter_play();
        self.ball.set_velocity(&mut self.world, self.settings.serve_velocity);
    }

    /// Award a point. Only legal while the ball is in play; otherwise
    /// nothing changes and the violation is returned (and logged).
    pub fn point_scored(&mut self, scorer: Player, reason: ScoreReason) -> Result<(), MatchError> {
        let mode = self.mode_kind();
        if mode != ModeKind::InPlay {
            let err = MatchError::InvalidStateTransition { scorer, mode };
            log::warn!("{err}");
            return Err(err);
        }

        let slot = &mut self.score[scorer.index()];
        *slot = slot.saturating_add(1);
        self.queued_events.push(ScoreEvent {
            score: self.score,
            reason,
        });
        log::info!(
            "Point to {scorer:?} ({}): {}-{}",
            reason.description(),
            self.score[0],
            self.score[1]
        );

        self.modes.enter_lingering(scorer);
        Ok(())
    }

    /// Put paddles and ball back at their starting poses
    pub fn reset(&mut self) {
        for player in Player::ALL {
            let center = self.def.zone(player).center();
            let side = match player {
                Player::One => -1.0,
                Player::Two => 1.0,
            };
            let position = self
                .def
                .to_world(Vec2::new(center.x + PADDLE_RESET_OFFSET * side, center.y));
            self.paddles[player.index()].set_transform(
                &mut self.world,
                position,
                -side * PADDLE_RESET_ANGLE,
            );
        }

        let net = self.def.above_net.center();
        self.ball.set_transform(
            &mut self.world,
            self.def.to_world(Vec2::new(net.x - BALL_RESET_OFFSET, net.y)),
            0.0,
        );
    }

    // === Simulation ===

    /// Advance everything by `dt` seconds and return the snapshot
    pub fn step(&mut self, dt: f32) -> Result<Snapshot, PhysicsError> {
        let elapsed = Duration::try_from_secs_f32(dt).map_err(|_| PhysicsError::InvalidTimestep(dt))?;

        for paddle in &self.paddles {
            paddle.on_frame(&mut self.world, dt);
        }
        self.ball.on_frame(&mut self.world, self.modes.kind());

        if let Err(err) = self.world.step(dt, &mut self.detector) {
            self.detector.drain();
            return Err(err);
        }
        self.process_floor_contacts();

        self.advance_time(elapsed);
        Ok(self.get_state())
    }

    /// Move logical time forward, firing mode deadlines as they come due
    pub fn advance_time(&mut self, elapsed: Duration) {
        let until = self.modes.now().saturating_add(elapsed);
        while let Some(timeout) = self.modes.next_due(until) {
            match timeout {
                ModeTimeout::BeginPlay => {
                    log::info!("Serve window expired, starting play");
                    self.enter_play_mode();
                }
                ModeTimeout::Serve(next) => self.enter_serve_mode(Some(next)),
            }
        }
        self.modes.settle(until);
    }

    /// Snapshot of the current poses; drains queued events into it
    pub fn get_state(&mut self) -> Snapshot {
        let paddles = [
            self.paddles[0].pose(&self.world),
            self.paddles[1].pose(&self.world),
        ];
        let ball = self.ball.pose(&self.world);
        encode(paddles, ball, &mut self.queued_events)
    }

    fn process_floor_contacts(&mut self) {
        for contact in self.detector.drain() {
            match self.detector.interpret(&contact, self.modes.kind(), &self.def) {
                None => {}
                Some(Ok(scorer)) => {
                    if let Err(err) = self.point_scored(scorer, ScoreReason::TouchedFloor) {
                        self.last_anomaly = Some(err);
                    }
                }
                Some(Err(err)) => {
                    log::warn!("{err}; no point awarded");
                    self.last_anomaly = Some(err);
                }
            }
        }
    }
}
