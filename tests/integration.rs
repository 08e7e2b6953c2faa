// Integration tests (native) for the `drop-catch` crate.
// These tests avoid wasm-specific functionality and drive whole sessions
// through the pure core with a simulated clock, so they run under
// `cargo test` on the host.

use std::collections::VecDeque;

use drop_catch::rng::{RngSource, SplitMix64};
use drop_catch::{
    Difficulty, DropId, GameSession, SessionEvent, SessionState, Verdict, LOSING_MESSAGES,
    WINNING_MESSAGES,
};

const WIDTH: f64 = 640.0;

/// Rng whose uniform draws come from a script, falling back to a seeded
/// stream once the script runs dry. Each spawn consumes three draws (size,
/// position, bad-chance), so scripting every third value picks which drops
/// are bad.
struct ScriptRng {
    script: VecDeque<f64>,
    fallback: SplitMix64,
}

impl ScriptRng {
    fn new(script: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: SplitMix64::new(0x0D0_CA7C4),
        }
    }
}

impl RngSource for ScriptRng {
    fn next_u64(&mut self) -> u64 {
        self.fallback.next_u64()
    }
    fn unit_f64(&mut self) -> f64 {
        self.script
            .pop_front()
            .unwrap_or_else(|| self.fallback.unit_f64())
    }
}

/// Three scripted draws per spawn; 0.0 for the chance draw forces a bad
/// drop, 0.99 a good one.
fn spawn_script(bad_flags: &[bool]) -> Vec<f64> {
    bad_flags
        .iter()
        .flat_map(|bad| [0.5, 0.5, if *bad { 0.0 } else { 0.99 }])
        .collect()
}

fn spawned(events: &[SessionEvent]) -> Vec<(DropId, bool)> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::DropSpawned { id, bad, .. } => Some((*id, *bad)),
            _ => None,
        })
        .collect()
}

fn ended_verdict(events: &[SessionEvent]) -> Option<(Verdict, &'static str)> {
    events.iter().find_map(|e| match e {
        SessionEvent::Ended { verdict, message } => Some((*verdict, *message)),
        _ => None,
    })
}

/// Run a full session, catching each spawned drop iff `plan(id, bad)` says
/// so, and return the session plus the events of the final advance.
fn play_session(
    difficulty: Difficulty,
    rng: &mut impl RngSource,
    mut plan: impl FnMut(DropId, bool) -> bool,
) -> (GameSession, Vec<SessionEvent>) {
    let mut session = GameSession::new();
    session.start(Some(difficulty), 0.0);
    let mut t = 0.0;
    let mut last = Vec::new();
    while session.state() == SessionState::Running {
        t += 50.0;
        let events = session.advance(t, WIDTH, rng);
        for (id, bad) in spawned(&events) {
            if plan(id, bad) {
                session.catch(id);
            }
        }
        last = events;
    }
    (session, last)
}

#[test]
fn catching_twenty_good_drops_wins() {
    let mut rng = ScriptRng::new(spawn_script(&[false; 40]));
    let mut caught = 0u32;
    let (session, last) = play_session(Difficulty::Medium, &mut rng, |_, bad| {
        if !bad && caught < 20 {
            caught += 1;
            true
        } else {
            false
        }
    });
    assert_eq!(session.score(), 20);
    let (verdict, message) = ended_verdict(&last).expect("session should end with a verdict");
    assert_eq!(verdict, Verdict::Win);
    assert!(WINNING_MESSAGES.contains(&message));
}

#[test]
fn five_good_three_bad_scores_two_and_loses() {
    // First five spawns good, next three bad, rest good (uncaught).
    let mut flags = vec![false; 5];
    flags.extend([true; 3]);
    flags.extend([false; 30]);
    let mut rng = ScriptRng::new(spawn_script(&flags));

    let mut seen = 0usize;
    let (session, last) = play_session(Difficulty::Medium, &mut rng, |_, _| {
        seen += 1;
        seen <= 8 // catch exactly the first eight spawns: 5 good then 3 bad
    });
    assert_eq!(session.score(), 2);
    let (verdict, message) = ended_verdict(&last).expect("session should end with a verdict");
    assert_eq!(verdict, Verdict::Lose);
    assert!(LOSING_MESSAGES.contains(&message));
}

#[test]
fn uncaught_session_ends_scoreless_with_losing_message() {
    let mut rng = SplitMix64::new(2024);
    let (session, last) = play_session(Difficulty::Hard, &mut rng, |_, _| false);
    assert_eq!(session.score(), 0);
    let (verdict, message) = ended_verdict(&last).expect("session should end with a verdict");
    assert_eq!(verdict, Verdict::Lose);
    assert!(LOSING_MESSAGES.contains(&message));
}

#[test]
fn score_stays_clamped_when_catching_everything() {
    // Catch every drop, good or bad, across several seeds; bad catches at
    // zero must clamp rather than wrap, so the score always equals
    // max(0, accumulated deltas) recomputed independently.
    for seed in [1u64, 7, 99, 5000] {
        let mut session = GameSession::new();
        let mut rng = SplitMix64::new(seed);
        session.start(Some(Difficulty::Hard), 0.0);
        let mut t = 0.0;
        let mut shadow: i64 = 0;
        while session.state() == SessionState::Running {
            t += 50.0;
            let events = session.advance(t, WIDTH, &mut rng);
            for (id, _) in spawned(&events) {
                for ev in session.catch(id) {
                    if let SessionEvent::DropCaught { delta, score, .. } = ev {
                        shadow = (shadow + i64::from(delta)).max(0);
                        assert_eq!(i64::from(score), shadow);
                    }
                }
            }
        }
        assert_eq!(session.state(), SessionState::Ended);
        assert_eq!(i64::from(session.score()), shadow);
    }
}

#[test]
fn expired_drops_never_touch_the_score() {
    let mut rng = ScriptRng::new(spawn_script(&[true, false, true, false]));
    let mut session = GameSession::new();
    session.start(Some(Difficulty::Medium), 0.0);
    // Four drops spawn by 3.6s and all fall out unclicked (4s fall).
    let events = session.advance(10_000.0, WIDTH, &mut rng);
    let expired = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::DropExpired { .. }))
        .count();
    assert!(expired >= 4);
    assert_eq!(session.score(), 0);
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::DropCaught { .. })));
}

#[test]
fn identical_seeds_replay_identical_sessions() {
    let run = |seed: u64| {
        let mut session = GameSession::new();
        let mut rng = SplitMix64::new(seed);
        session.start(Some(Difficulty::Medium), 0.0);
        let mut all = Vec::new();
        let mut t = 0.0;
        while session.state() == SessionState::Running {
            t += 100.0;
            all.extend(session.advance(t, WIDTH, &mut rng));
        }
        all
    };
    assert_eq!(run(31337), run(31337));
    assert_ne!(run(31337), run(31338));
}
