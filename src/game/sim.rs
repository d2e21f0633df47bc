//! Pure simulation core: arena geometry, bouncing sprites, the round state
//! machine and the player roster. Nothing in here touches the browser; the
//! frame loop in the parent module feeds it held-key input and whole fixed
//! timesteps, so tests can drive synthetic time directly.

use crate::game::setup::{Key, Setup};

// --- Arena / timing constants ------------------------------------------------

pub const ARENA_W: f64 = 600.0;
pub const ARENA_H: f64 = 400.0;
pub const SPRITE_SIZE: f64 = 40.0;

/// Simulated time per step. The loop targets 60 steps per wall-clock second
/// but the sim only ever sees this constant.
pub const FRAME_MS: f64 = 1000.0 / 60.0;

pub const KOALA_STEP: f64 = 5.0;
pub const STRAWBERRY_SPAWN_MS: f64 = 1000.0;
pub const SQUIRREL_SPAWN_MS: f64 = 3000.0;
pub const STRAWBERRY_SPEED: f64 = 3.0;
pub const SQUIRREL_SPEED: f64 = 2.0;
/// How long the win / lose message stays up before the next round begins.
pub const ROUND_PAUSE_MS: f64 = 2000.0;
/// Spawn centers keep this distance from every arena edge.
pub const SPAWN_MARGIN: f64 = SPRITE_SIZE;
pub const MAX_PLAYERS: usize = 4;

// --- Geometry ----------------------------------------------------------------

/// Axis-aligned box, top-left anchored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn from_center(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            x: cx - w / 2.0,
            y: cy - h / 2.0,
            w,
            h,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Pull the rect back so it lies fully inside the arena.
    pub fn clamp_to_arena(&mut self) {
        self.x = self.x.clamp(0.0, ARENA_W - self.w);
        self.y = self.y.clamp(0.0, ARENA_H - self.h);
    }

    pub fn in_arena(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x + self.w <= ARENA_W && self.y + self.h <= ARENA_H
    }
}

// --- Random source -----------------------------------------------------------

/// Linear congruential generator; prototype-grade randomness, not crypto
/// secure. Owned by the play state so tests can pin the seed.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // Low bits of an LCG cycle short; drop the bottom 16 before use.
        self.state >> 16
    }

    /// Uniform integer in `lo..=hi`, both ends inclusive.
    pub fn pick_int(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo <= hi);
        lo + (self.next() % (hi - lo + 1) as u64) as i64
    }

    /// Uniform sign: `speed` or `-speed`.
    pub fn pick_sign(&mut self, speed: f64) -> f64 {
        if self.next() & 1 == 1 { speed } else { -speed }
    }
}

// --- Players / turns ---------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Player {
    pub name: String,
    pub score: u32,
}

/// Ordered player list plus the cyclic active-turn index. Created once at
/// setup and alive for the whole session.
#[derive(Clone, Debug)]
pub struct Roster {
    players: Vec<Player>,
    active: usize,
}

impl Roster {
    pub fn new(names: Vec<String>) -> Self {
        debug_assert!(!names.is_empty());
        Self {
            players: names
                .into_iter()
                .map(|name| Player { name, score: 0 })
                .collect(),
            active: 0,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Player {
        &self.players[self.active]
    }

    /// One point to whoever's turn it is.
    pub fn award_active(&mut self) {
        self.players[self.active].score += 1;
    }

    pub fn advance_turn(&mut self) {
        self.active = (self.active + 1) % self.players.len();
    }
}

// --- Round state -------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Static instruction screen; only shown before the very first round.
    Instructions,
    Running,
    /// Outcome message on screen while the countdown drains.
    RoundOver { outcome: Outcome, remaining_ms: f64 },
}

/// A sprite that drifts by a fixed velocity and reflects off the arena edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mover {
    pub rect: Rect,
    pub vx: f64,
    pub vy: f64,
}

impl Mover {
    /// One step of drift. An axis that reaches an edge has its velocity sign
    /// flipped and the rect is pulled back inside so the reflection cannot
    /// re-trigger on the next step.
    pub fn advance(&mut self) {
        self.rect.x += self.vx;
        self.rect.y += self.vy;
        if self.rect.x <= 0.0 || self.rect.x + self.rect.w >= ARENA_W {
            self.vx = -self.vx;
        }
        if self.rect.y <= 0.0 || self.rect.y + self.rect.h >= ARENA_H {
            self.vy = -self.vy;
        }
        self.rect.clamp_to_arena();
    }
}

/// Held directional keys, sampled per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Per-round transient state; rebuilt from scratch by every reset.
#[derive(Clone, Debug)]
pub struct Round {
    pub koala: Rect,
    pub strawberry: Option<Mover>,
    pub squirrel: Option<Mover>,
    /// Whole fixed steps since the round started. Milliseconds are derived by
    /// one multiplication; summing `FRAME_MS` repeatedly drifts low and would
    /// fire the spawn thresholds a step late.
    steps: u64,
}

impl Round {
    fn new() -> Self {
        Self {
            koala: Rect::from_center(ARENA_W / 2.0, ARENA_H / 2.0, SPRITE_SIZE, SPRITE_SIZE),
            strawberry: None,
            squirrel: None,
            steps: 0,
        }
    }

    /// Simulated time since the round started.
    pub fn elapsed_ms(&self) -> f64 {
        self.steps as f64 * FRAME_MS
    }

    /// Whole seconds since the round started, for the HUD timer.
    pub fn elapsed_secs(&self) -> u64 {
        (self.elapsed_ms() / 1000.0) as u64
    }
}

// --- Play state machine ------------------------------------------------------

#[derive(Clone, Debug)]
pub struct PlayState {
    pub roster: Roster,
    pub phase: Phase,
    pub round: Round,
    rng: Lcg,
}

impl PlayState {
    pub fn new(roster: Roster, seed: u64) -> Self {
        Self {
            roster,
            phase: Phase::Instructions,
            round: Round::new(),
            rng: Lcg::new(seed),
        }
    }

    /// Reset and go: fresh round, koala centered, nothing spawned yet.
    pub fn begin_round(&mut self) {
        self.round = Round::new();
        self.phase = Phase::Running;
    }

    /// Any keypress on the instruction screen starts the first round.
    pub fn dismiss_instructions(&mut self) {
        if self.phase == Phase::Instructions {
            self.begin_round();
        }
    }

    /// Advance the simulation by one fixed step.
    pub fn step(&mut self, input: &InputState) {
        match &mut self.phase {
            Phase::Instructions => {}
            Phase::Running => self.step_running(input),
            Phase::RoundOver { remaining_ms, .. } => {
                *remaining_ms -= FRAME_MS;
                if *remaining_ms <= 0.0 {
                    // Automatic restarts skip the instruction screen; only the
                    // very first round waits for a keypress.
                    self.roster.advance_turn();
                    self.begin_round();
                }
            }
        }
    }

    fn step_running(&mut self, input: &InputState) {
        self.round.steps += 1;

        if input.left {
            self.round.koala.x -= KOALA_STEP;
        }
        if input.right {
            self.round.koala.x += KOALA_STEP;
        }
        if input.up {
            self.round.koala.y -= KOALA_STEP;
        }
        if input.down {
            self.round.koala.y += KOALA_STEP;
        }
        self.round.koala.clamp_to_arena();

        if self.round.strawberry.is_none() && self.round.elapsed_ms() >= STRAWBERRY_SPAWN_MS {
            self.round.strawberry = Some(random_mover(&mut self.rng, STRAWBERRY_SPEED));
        }
        if let Some(m) = &mut self.round.strawberry {
            m.advance();
        }
        if self.round.squirrel.is_none() && self.round.elapsed_ms() >= SQUIRREL_SPAWN_MS {
            self.round.squirrel = Some(random_mover(&mut self.rng, SQUIRREL_SPEED));
        }
        if let Some(m) = &mut self.round.squirrel {
            m.advance();
        }

        // Hazard is tested first; touching both in one step counts as a loss.
        if let Some(m) = &self.round.strawberry {
            if m.rect.intersects(&self.round.koala) {
                self.finish_round(Outcome::Lose);
                return;
            }
        }
        if let Some(m) = &self.round.squirrel {
            if m.rect.intersects(&self.round.koala) {
                self.finish_round(Outcome::Win);
            }
        }
    }

    fn finish_round(&mut self, outcome: Outcome) {
        if outcome == Outcome::Win {
            self.roster.award_active();
        }
        self.phase = Phase::RoundOver {
            outcome,
            remaining_ms: ROUND_PAUSE_MS,
        };
    }
}

/// Spawn a bouncer at a uniformly random margin-respecting center with a
/// diagonal velocity of the given magnitude per axis.
fn random_mover(rng: &mut Lcg, speed: f64) -> Mover {
    let cx = rng.pick_int(SPAWN_MARGIN as i64, (ARENA_W - SPAWN_MARGIN) as i64) as f64;
    let cy = rng.pick_int(SPAWN_MARGIN as i64, (ARENA_H - SPAWN_MARGIN) as i64) as f64;
    Mover {
        rect: Rect::from_center(cx, cy, SPRITE_SIZE, SPRITE_SIZE),
        vx: rng.pick_sign(speed),
        vy: rng.pick_sign(speed),
    }
}

// --- Top-level game (setup vs. play) -----------------------------------------

#[derive(Clone, Debug)]
pub enum Game {
    Setup(Setup),
    Play(PlayState),
}

impl Game {
    pub fn new() -> Self {
        Game::Setup(Setup::new())
    }

    /// Route a discrete keypress. `seed` is only consumed at the moment setup
    /// completes, to initialize the play-state RNG.
    pub fn handle_key(&mut self, key: Key, seed: u64) {
        match self {
            Game::Setup(setup) => {
                if let Some(roster) = setup.handle_key(key) {
                    *self = Game::Play(PlayState::new(roster, seed));
                }
            }
            Game::Play(play) => play.dismiss_instructions(),
        }
    }

    /// One fixed timestep; a no-op until setup has produced a roster.
    pub fn step(&mut self, input: &InputState) {
        if let Game::Play(play) = self {
            play.step(input);
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
