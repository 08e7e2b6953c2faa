//! Drop Catch core crate.
//!
//! A 30-second arcade reaction game: water drops spawn above the game
//! container and fall at a difficulty-set pace; clicking a good drop scores
//! +1, clicking a bad drop costs 1 (never below zero), and 20 points at the
//! buzzer wins. Game rules live in [`session`] as a pure, natively testable
//! state machine; `dom` is the thin web-sys adapter that wires it to the
//! page (container, score/time readouts, start button, difficulty radios).

use wasm_bindgen::prelude::*;

pub mod rng;
pub mod session;

mod dom;

pub use session::{
    Difficulty, DifficultySettings, DropId, GameSession, SessionEvent, SessionState, Verdict,
    WaterDrop, BASE_DROP_SIZE, SESSION_SECS, WIN_SCORE,
};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Verdict message sets. End-of-session shows one entry picked uniformly at
// random from the set matching the verdict.
// -----------------------------------------------------------------------------

pub const WINNING_MESSAGES: &[&str] = &[
    "Great job! You caught enough drops!",
    "Winner! You mastered the water drops!",
    "Awesome! You reached the goal!",
    "Congratulations! You win!",
    "Fantastic! You have quick reflexes!",
];

pub const LOSING_MESSAGES: &[&str] = &[
    "Try again! You can do better!",
    "Almost there! Give it another shot!",
    "Keep practicing! You'll get it!",
    "Don't give up! Try again!",
    "So close! Try once more!",
];

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

/// Attach the game to the page: looks up the container and HUD elements, arms
/// the start button, and begins the frame loop. Call once after module load.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    dom::mount()
}
