#![forbid(unsafe_code)]

//! End-to-end join binding scenarios against the recording provider.

use std::cell::RefCell;
use std::rc::Rc;

use joinbind_core::{Analog, ChannelIdentity, Digital, Serial, SignalValue};
use joinbind_harness::{ProviderCall, RecordingProvider, trace_guard};
use joinbind_runtime::{JoinScope, use_join, use_join_read_only};

fn provider() -> Rc<RecordingProvider> {
    Rc::new(RecordingProvider::new())
}

// ============================================================================
// Feedback / publish asymmetry
// ============================================================================

#[test]
fn digital_read_write_round_trip() {
    let _trace = trace_guard();
    let p = provider();
    let id = ChannelIdentity::of::<Digital>(3);

    let binding = use_join::<Digital, _>(&p, 3);
    assert!(!binding.get());

    p.feedback::<Digital>(3, true);
    assert!(binding.get());

    binding.publish(false);
    assert_eq!(p.published(id), vec![SignalValue::Boolean(false)]);
    assert!(binding.get(), "publish must not move local state");

    p.feedback::<Digital>(3, false);
    assert!(!binding.get());
}

#[test]
fn analog_read_only_teardown() {
    let p = provider();
    let id = ChannelIdentity::of::<Analog>(7);

    let binding = use_join_read_only::<Analog, _>(&p, 7);
    assert_eq!(binding.get(), 0.0);

    p.feedback::<Analog>(7, 42.0);
    assert_eq!(binding.get(), 42.0);

    drop(binding);
    assert_eq!(p.unsubscribe_count(id), 1);
    assert_eq!(p.live_count(), 0);
}

#[test]
fn retarget_releases_then_subscribes() {
    let p = provider();
    let mut binding = use_join::<Digital, _>(&p, 3);
    let states = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&states);
    let _watch = binding.subscribe(move |v| s.borrow_mut().push(*v));

    p.feedback::<Digital>(3, true);
    let old = binding.subscription().unwrap();
    p.take_calls();

    binding.retarget(4);
    let calls = p.take_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        ProviderCall::Unsubscribe {
            identity: ChannelIdentity::of::<Digital>(3),
            subscription: old,
        }
    );
    assert!(calls[1].is_subscribe());
    assert_eq!(calls[1].identity(), ChannelIdentity::of::<Digital>(4));
    assert!(!binding.get());
    assert_eq!(*states.borrow(), vec![true, false]);
}

// ============================================================================
// Late and stale feedback
// ============================================================================

#[test]
fn feedback_after_teardown_never_lands() {
    let p = provider();
    let binding = use_join_read_only::<Serial, _>(&p, 1);
    let state = binding.state();
    let handle = binding.subscription().unwrap();

    p.feedback::<Serial>(1, "Room A".to_owned());
    drop(binding);

    assert!(p.deliver_late(handle, SignalValue::String("Room B".into())));
    assert_eq!(state.get(), "Room A");
}

#[test]
fn old_join_feedback_ignored_after_retarget() {
    let p = provider();
    let mut binding = use_join::<Analog, _>(&p, 10);
    binding.retarget(11);

    assert_eq!(p.feedback::<Analog>(10, 99.0), 0);
    p.feedback::<Analog>(11, 5.0);
    assert_eq!(binding.get(), 5.0);
}

// ============================================================================
// Teardown on every exit path
// ============================================================================

#[test]
fn unwinding_releases_subscription() {
    let p = provider();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _binding = use_join::<Digital, _>(&p, 20);
        panic!("component render failed");
    }));

    assert!(result.is_err());
    assert_eq!(p.unsubscribe_count(ChannelIdentity::of::<Digital>(20)), 1);
    assert_eq!(p.live_count(), 0);
}

#[test]
fn kind_change_releases_old_kind_first() {
    let p = provider();
    let binding = use_join::<Digital, _>(&p, 5);
    let binding = binding.into_kind::<Serial>(5);

    let calls = p.calls();
    let kinds: Vec<_> = calls
        .iter()
        .map(|c| (c.is_subscribe(), c.identity()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (true, ChannelIdentity::of::<Digital>(5)),
            (false, ChannelIdentity::of::<Digital>(5)),
            (true, ChannelIdentity::of::<Serial>(5)),
        ]
    );
    assert_eq!(binding.get(), "");
}

#[test]
fn scope_models_component_lifetime() {
    let p = provider();
    let mut scope = JoinScope::new();
    let (power, power_pub) = scope.join::<Digital, _>(&p, 1);
    let volume = scope.join_read_only::<Analog, _>(&p, 2);

    {
        let _held = power_pub.press();
        p.feedback::<Digital>(1, true);
        assert!(power.get());
    }
    p.feedback::<Analog>(2, 30.0);
    assert_eq!(volume.get(), 30.0);
    assert_eq!(
        p.published(ChannelIdentity::of::<Digital>(1)),
        vec![SignalValue::Boolean(true), SignalValue::Boolean(false)]
    );

    drop(scope);
    assert_eq!(p.live_count(), 0);
}
