//! Tests for the lifecycle state machine

use super::lifecycle::*;
use crate::error::LifecycleError;

#[test]
fn test_lifecycle_starts_in_starting() {
    assert_eq!(Lifecycle::new().current(), LifecycleState::Starting);
}

#[test]
fn test_lifecycle_full_sequence() {
    let lifecycle = Lifecycle::new();

    lifecycle.advance(LifecycleState::Serving).unwrap();
    lifecycle.advance(LifecycleState::ShuttingDown).unwrap();
    lifecycle.advance(LifecycleState::Stopped).unwrap();

    assert_eq!(lifecycle.current(), LifecycleState::Stopped);
}

#[test]
fn test_lifecycle_rejects_skipped_state() {
    let lifecycle = Lifecycle::new();

    let err = lifecycle.advance(LifecycleState::ShuttingDown).unwrap_err();

    assert_eq!(
        err,
        LifecycleError::InvalidTransition {
            from: LifecycleState::Starting,
            to: LifecycleState::ShuttingDown,
        }
    );
    assert_eq!(lifecycle.current(), LifecycleState::Starting);
}

#[test]
fn test_lifecycle_nothing_precedes_starting() {
    let lifecycle = Lifecycle::new();
    assert!(lifecycle.advance(LifecycleState::Starting).is_err());
}

#[test]
fn test_lifecycle_stopped_is_terminal() {
    let lifecycle = Lifecycle::new();
    lifecycle.advance(LifecycleState::Serving).unwrap();
    lifecycle.advance(LifecycleState::ShuttingDown).unwrap();
    lifecycle.advance(LifecycleState::Stopped).unwrap();

    for next in [
        LifecycleState::Starting,
        LifecycleState::Serving,
        LifecycleState::ShuttingDown,
        LifecycleState::Stopped,
    ] {
        assert!(lifecycle.advance(next).is_err());
    }
}

#[test]
fn test_lifecycle_clones_share_state() {
    let lifecycle = Lifecycle::new();
    let shared = lifecycle.clone();

    lifecycle.advance(LifecycleState::Serving).unwrap();

    assert_eq!(shared.current(), LifecycleState::Serving);
    // Second shutdown attempt through the clone must not succeed twice
    shared.advance(LifecycleState::ShuttingDown).unwrap();
    assert!(lifecycle.advance(LifecycleState::ShuttingDown).is_err());
}

#[test]
fn test_lifecycle_state_discriminants_round_trip() {
    for state in [
        LifecycleState::Starting,
        LifecycleState::Serving,
        LifecycleState::ShuttingDown,
        LifecycleState::Stopped,
    ] {
        assert_eq!(LifecycleState::from_u8(state as u8), state);
    }
}

#[test]
#[should_panic(expected = "invalid lifecycle discriminant")]
fn test_lifecycle_state_rejects_unknown_discriminant() {
    LifecycleState::from_u8(4);
}
