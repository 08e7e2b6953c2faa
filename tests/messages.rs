// Invariants over the verdict message sets.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use drop_catch::{LOSING_MESSAGES, WINNING_MESSAGES};

#[test]
fn each_verdict_has_five_unique_messages() {
    for (name, set) in [("winning", WINNING_MESSAGES), ("losing", LOSING_MESSAGES)] {
        assert_eq!(set.len(), 5, "{name} message set should have 5 entries");
        let unique: HashSet<&str> = set.iter().copied().collect();
        assert_eq!(unique.len(), set.len(), "duplicate entry in {name} messages");
        for msg in set {
            assert!(!msg.trim().is_empty(), "empty entry in {name} messages");
        }
    }
}

#[test]
fn verdict_sets_do_not_overlap() {
    let winning: HashSet<&str> = WINNING_MESSAGES.iter().copied().collect();
    for msg in LOSING_MESSAGES {
        assert!(
            !winning.contains(msg),
            "message '{msg}' appears in both verdict sets"
        );
    }
}
