//! Core game session: state machine, spawn scheduling, countdown clock and
//! score accounting.
//!
//! This module is pure Rust with no DOM types so the whole rule set runs under
//! native `cargo test`. Time never comes from a wall clock: the embedder feeds
//! `performance.now()`-style millisecond timestamps into [`GameSession::advance`]
//! and the session drains whatever deadlines (clock ticks, spawns, drop
//! expiries) have come due, in timestamp order. Catches arrive out-of-band via
//! [`GameSession::catch`]. All randomness flows through [`RngSource`].

use crate::rng::RngSource;
use crate::{LOSING_MESSAGES, WINNING_MESSAGES};

// --- Fixed rules -------------------------------------------------------------

/// Session length in seconds.
pub const SESSION_SECS: u32 = 30;
/// Final score needed for a Win verdict.
pub const WIN_SCORE: u32 = 20;
/// Base drop diameter in pixels, scaled by a random multiplier per spawn.
pub const BASE_DROP_SIZE: f64 = 60.0;

const CLOCK_PERIOD_MS: f64 = 1_000.0;
const SIZE_MULT_MIN: f64 = 0.5;
const SIZE_MULT_MAX: f64 = 1.3;

/// Unique per-spawn identifier, also carried on the rendered element.
pub type DropId = u64;

// --- Difficulty --------------------------------------------------------------

/// Spawn/fall/bad-chance parameters bound at session start and immutable for
/// the session's duration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DifficultySettings {
    pub spawn_interval_ms: f64,
    pub fall_duration_secs: f64,
    pub bad_drop_chance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Fixed preset table.
    pub fn settings(self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                spawn_interval_ms: 1_200.0,
                fall_duration_secs: 5.0,
                bad_drop_chance: 0.05,
            },
            Difficulty::Medium => DifficultySettings {
                spawn_interval_ms: 900.0,
                fall_duration_secs: 4.0,
                bad_drop_chance: 0.10,
            },
            Difficulty::Hard => DifficultySettings {
                spawn_interval_ms: 600.0,
                fall_duration_secs: 3.0,
                bad_drop_chance: 0.20,
            },
        }
    }

    /// Parse a difficulty selector value ("easy" / "medium" / "hard").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

// --- Drops -------------------------------------------------------------------

/// One falling drop, owned by the session while active.
#[derive(Debug, Clone)]
pub struct WaterDrop {
    pub id: DropId,
    /// Diameter in pixels: BASE_DROP_SIZE * uniform[0.5, 1.3).
    pub size: f64,
    /// Left edge in pixels, uniform over [0, container_width - size].
    pub x: f64,
    pub fall_duration_secs: f64,
    pub bad: bool,
    /// Set exactly once, by catch or expiry; guards double scoring.
    resolved: bool,
    expires_at_ms: f64,
}

impl WaterDrop {
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

// --- Events ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Verdict {
    Win,
    Lose,
}

/// Everything the rendering adapter needs to mirror the session into the DOM.
/// Score deltas are only reported for catches; expiry is silent.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started { score: u32, remaining_secs: u32 },
    ClockTicked { remaining_secs: u32 },
    DropSpawned {
        id: DropId,
        size: f64,
        x: f64,
        fall_duration_secs: f64,
        bad: bool,
    },
    DropCaught { id: DropId, delta: i32, score: u32 },
    DropExpired { id: DropId },
    Ended { verdict: Verdict, message: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Ended,
}

// --- Session -----------------------------------------------------------------

/// Which deadline fires next inside `advance`. Tie order at the same
/// millisecond: clock first (so the session can end before a simultaneous
/// spawn), then expiries, then spawns.
#[derive(Debug, Clone, Copy)]
enum Due {
    Clock,
    Expire(DropId),
    Spawn,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    state: SessionState,
    score: u32,
    remaining_secs: u32,
    settings: DifficultySettings,
    drops: Vec<WaterDrop>,
    next_drop_id: DropId,
    next_spawn_at_ms: f64,
    next_clock_at_ms: f64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            score: 0,
            remaining_secs: SESSION_SECS,
            settings: Difficulty::default().settings(),
            drops: Vec::new(),
            next_drop_id: 0,
            next_spawn_at_ms: 0.0,
            next_clock_at_ms: 0.0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn settings(&self) -> DifficultySettings {
        self.settings
    }

    /// Drops that are currently falling (spawned, not yet caught or expired).
    pub fn active_drops(&self) -> &[WaterDrop] {
        &self.drops
    }

    /// Begin a session at `now_ms`. No-op while already Running. A missing
    /// difficulty selection falls back to Medium. The first drop spawns one
    /// full interval after start; the clock ticks every second.
    pub fn start(&mut self, selected: Option<Difficulty>, now_ms: f64) -> Vec<SessionEvent> {
        if self.state == SessionState::Running {
            return Vec::new();
        }
        self.state = SessionState::Running;
        self.score = 0;
        self.remaining_secs = SESSION_SECS;
        self.settings = selected.unwrap_or_default().settings();
        self.drops.clear();
        self.next_spawn_at_ms = now_ms + self.settings.spawn_interval_ms;
        self.next_clock_at_ms = now_ms + CLOCK_PERIOD_MS;
        vec![SessionEvent::Started {
            score: 0,
            remaining_secs: SESSION_SECS,
        }]
    }

    /// Drain every deadline due at or before `now_ms`, in timestamp order.
    /// Stops immediately once the session ends: deadlines later in the same
    /// call (pending spawns, expiries) are discarded, so nothing spawns and no
    /// score mutates after the final tick.
    pub fn advance(
        &mut self,
        now_ms: f64,
        container_width: f64,
        rng: &mut impl RngSource,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while self.state == SessionState::Running {
            let (at, due) = self.next_due();
            if at > now_ms {
                break;
            }
            match due {
                Due::Clock => {
                    self.next_clock_at_ms += CLOCK_PERIOD_MS;
                    self.remaining_secs -= 1;
                    events.push(SessionEvent::ClockTicked {
                        remaining_secs: self.remaining_secs,
                    });
                    if self.remaining_secs == 0 {
                        events.push(self.finish(rng));
                    }
                }
                Due::Expire(id) => {
                    if let Some(pos) = self.drops.iter().position(|d| d.id == id) {
                        self.drops[pos].resolved = true;
                        self.drops.swap_remove(pos);
                        events.push(SessionEvent::DropExpired { id });
                    }
                }
                Due::Spawn => {
                    events.push(self.spawn(at, container_width, rng));
                }
            }
        }
        events
    }

    /// Player clicked drop `id`. No-op unless Running and the drop is still
    /// active, so a second click on the same drop (or a click raced against
    /// its expiry) scores nothing. Good drops score +1; bad drops -1, clamped
    /// so the score never goes below zero (the -1 delta is still reported for
    /// popup feedback, matching the displayed penalty).
    pub fn catch(&mut self, id: DropId) -> Vec<SessionEvent> {
        if self.state != SessionState::Running {
            return Vec::new();
        }
        let Some(pos) = self.drops.iter().position(|d| d.id == id) else {
            return Vec::new();
        };
        if self.drops[pos].resolved {
            return Vec::new();
        }
        self.drops[pos].resolved = true;
        let bad = self.drops[pos].bad;
        self.drops.swap_remove(pos);
        let delta = if bad {
            self.score = self.score.saturating_sub(1);
            -1
        } else {
            self.score += 1;
            1
        };
        vec![SessionEvent::DropCaught {
            id,
            delta,
            score: self.score,
        }]
    }

    // Earliest pending deadline. Expiries tie-break among themselves by id so
    // simultaneous expiries resolve in spawn order.
    fn next_due(&self) -> (f64, Due) {
        let mut best = (self.next_clock_at_ms, Due::Clock);
        if let Some(d) = self
            .drops
            .iter()
            .min_by(|a, b| a.expires_at_ms.total_cmp(&b.expires_at_ms).then(a.id.cmp(&b.id)))
        {
            if d.expires_at_ms < best.0 {
                best = (d.expires_at_ms, Due::Expire(d.id));
            }
        }
        if self.next_spawn_at_ms < best.0 {
            best = (self.next_spawn_at_ms, Due::Spawn);
        }
        best
    }

    fn spawn(&mut self, at_ms: f64, container_width: f64, rng: &mut impl RngSource) -> SessionEvent {
        self.next_spawn_at_ms += self.settings.spawn_interval_ms;
        let id = self.next_drop_id;
        self.next_drop_id += 1;
        let size = BASE_DROP_SIZE * rng.range_f64(SIZE_MULT_MIN, SIZE_MULT_MAX);
        let x = rng.range_f64(0.0, (container_width - size).max(0.0));
        let fall_duration_secs = self.settings.fall_duration_secs;
        let bad = rng.chance(self.settings.bad_drop_chance);
        self.drops.push(WaterDrop {
            id,
            size,
            x,
            fall_duration_secs,
            bad,
            resolved: false,
            expires_at_ms: at_ms + fall_duration_secs * 1_000.0,
        });
        SessionEvent::DropSpawned {
            id,
            size,
            x,
            fall_duration_secs,
            bad,
        }
    }

    fn finish(&mut self, rng: &mut impl RngSource) -> SessionEvent {
        self.state = SessionState::Ended;
        let (verdict, set) = if self.score >= WIN_SCORE {
            (Verdict::Win, WINNING_MESSAGES)
        } else {
            (Verdict::Lose, LOSING_MESSAGES)
        };
        SessionEvent::Ended {
            verdict,
            message: set[rng.index(set.len())],
        }
    }
}

// --- Tests -------------------------------------------------------------------
