#![forbid(unsafe_code)]

//! In-memory provider that records calls and delivers feedback on demand.
//!
//! # Invariants
//!
//! 1. [`RecordingProvider::calls`] lists every provider call in the order it
//!    was made, including unsubscribes for handles it never issued.
//! 2. Subscription handles are unique for the lifetime of one provider.
//! 3. [`RecordingProvider::deliver`] reaches only live listeners, in
//!    subscription order. Released listeners are kept so
//!    [`RecordingProvider::deliver_late`] can simulate a delivery racing an
//!    unsubscribe.
//! 4. No `RefCell` borrow is held while a listener runs, so listeners may
//!    call back into the provider.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use joinbind_core::{
    ChannelIdentity, JoinNumber, JoinProvider, OnValue, Signal, SignalValue, SubscriptionId,
};

/// One call made against the provider.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderCall {
    Subscribe {
        identity: ChannelIdentity,
        subscription: SubscriptionId,
    },
    Unsubscribe {
        identity: ChannelIdentity,
        subscription: SubscriptionId,
    },
    Publish {
        identity: ChannelIdentity,
        value: SignalValue,
    },
}

impl ProviderCall {
    /// The channel the call addressed.
    #[must_use]
    pub fn identity(&self) -> ChannelIdentity {
        match self {
            Self::Subscribe { identity, .. }
            | Self::Unsubscribe { identity, .. }
            | Self::Publish { identity, .. } => *identity,
        }
    }

    #[must_use]
    pub fn is_subscribe(&self) -> bool {
        matches!(self, Self::Subscribe { .. })
    }

    #[must_use]
    pub fn is_unsubscribe(&self) -> bool {
        matches!(self, Self::Unsubscribe { .. })
    }
}

struct Listener {
    identity: ChannelIdentity,
    subscription: SubscriptionId,
    on_value: Rc<dyn Fn(SignalValue)>,
}

/// A [`JoinProvider`] for tests.
#[derive(Default)]
pub struct RecordingProvider {
    next_id: Cell<u64>,
    calls: RefCell<Vec<ProviderCall>>,
    live: RefCell<Vec<Listener>>,
    released: RefCell<Vec<Listener>>,
    replay: RefCell<HashMap<ChannelIdentity, SignalValue>>,
    on_unsubscribe: RefCell<HashMap<ChannelIdentity, SignalValue>>,
}

impl RecordingProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke the new listener with `value` from inside `subscribe` for
    /// every later subscription to `identity`, as providers that cache the
    /// last feedback value do.
    pub fn replay_on_subscribe(&self, identity: ChannelIdentity, value: SignalValue) {
        self.replay.borrow_mut().insert(identity, value);
    }

    /// Invoke the listener being released with `value` from inside every
    /// later `unsubscribe` on `identity`, after it has been deregistered.
    /// Models a final delivery racing the unsubscribe.
    pub fn deliver_on_unsubscribe(&self, identity: ChannelIdentity, value: SignalValue) {
        self.on_unsubscribe.borrow_mut().insert(identity, value);
    }

    /// Deliver `value` to every live listener on `identity`.
    ///
    /// Returns the number of listeners invoked.
    pub fn deliver(&self, identity: ChannelIdentity, value: SignalValue) -> usize {
        let targets: Vec<_> = self
            .live
            .borrow()
            .iter()
            .filter(|l| l.identity == identity)
            .map(|l| Rc::clone(&l.on_value))
            .collect();
        tracing::trace!(%identity, listeners = targets.len(), "deliver");
        for on_value in &targets {
            on_value(value.clone());
        }
        targets.len()
    }

    /// Typed convenience for [`deliver`](Self::deliver).
    pub fn feedback<S: Signal>(&self, join: impl Into<JoinNumber>, value: S::Value) -> usize {
        self.deliver(
            ChannelIdentity::of::<S>(join),
            S::into_signal_value(value),
        )
    }

    /// Invoke a listener that has already been unsubscribed.
    ///
    /// Returns `false` if `subscription` was never released.
    pub fn deliver_late(&self, subscription: SubscriptionId, value: SignalValue) -> bool {
        let target = self
            .released
            .borrow()
            .iter()
            .find(|l| l.subscription == subscription)
            .map(|l| Rc::clone(&l.on_value));
        match target {
            Some(on_value) => {
                on_value(value);
                true
            }
            None => false,
        }
    }

    /// Every call so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.borrow().clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<ProviderCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Calls that addressed `identity`, oldest first.
    #[must_use]
    pub fn calls_for(&self, identity: ChannelIdentity) -> Vec<ProviderCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.identity() == identity)
            .cloned()
            .collect()
    }

    /// Number of live subscriptions on `identity`.
    #[must_use]
    pub fn live_on(&self, identity: ChannelIdentity) -> usize {
        self.live
            .borrow()
            .iter()
            .filter(|l| l.identity == identity)
            .count()
    }

    /// Number of live subscriptions across all channels.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.borrow().len()
    }

    #[must_use]
    pub fn subscribe_count(&self, identity: ChannelIdentity) -> usize {
        self.calls_for(identity)
            .iter()
            .filter(|c| c.is_subscribe())
            .count()
    }

    #[must_use]
    pub fn unsubscribe_count(&self, identity: ChannelIdentity) -> usize {
        self.calls_for(identity)
            .iter()
            .filter(|c| c.is_unsubscribe())
            .count()
    }

    /// Values published to `identity`, oldest first.
    #[must_use]
    pub fn published(&self, identity: ChannelIdentity) -> Vec<SignalValue> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ProviderCall::Publish { identity: id, value } if *id == identity => {
                    Some(value.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Handle of the most recent subscription to `identity`, live or not.
    #[must_use]
    pub fn last_subscription(&self, identity: ChannelIdentity) -> Option<SubscriptionId> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            ProviderCall::Subscribe {
                identity: id,
                subscription,
            } if *id == identity => Some(*subscription),
            _ => None,
        })
    }

    fn issue_id(&self) -> SubscriptionId {
        let raw = self.next_id.get() + 1;
        self.next_id.set(raw);
        SubscriptionId::from_raw(raw)
    }
}

impl JoinProvider for RecordingProvider {
    fn subscribe<S: Signal>(&self, join: JoinNumber, on_value: OnValue<S>) -> SubscriptionId {
        let identity = ChannelIdentity::of::<S>(join);
        let subscription = self.issue_id();
        let on_value: Rc<dyn Fn(SignalValue)> = Rc::new(move |value| {
            if let Some(value) = S::from_signal_value(value) {
                on_value(value);
            }
        });

        self.calls.borrow_mut().push(ProviderCall::Subscribe {
            identity,
            subscription,
        });
        self.live.borrow_mut().push(Listener {
            identity,
            subscription,
            on_value: Rc::clone(&on_value),
        });
        tracing::trace!(%identity, %subscription, "subscribe");

        let replay = self.replay.borrow().get(&identity).cloned();
        if let Some(value) = replay {
            on_value(value);
        }
        subscription
    }

    fn unsubscribe<S: Signal>(&self, join: JoinNumber, subscription: SubscriptionId) {
        let identity = ChannelIdentity::of::<S>(join);
        self.calls.borrow_mut().push(ProviderCall::Unsubscribe {
            identity,
            subscription,
        });

        let released = {
            let mut live = self.live.borrow_mut();
            let pos = live
                .iter()
                .position(|l| l.subscription == subscription && l.identity == identity);
            pos.map(|pos| live.remove(pos))
        };
        let Some(listener) = released else {
            tracing::warn!(%identity, %subscription, "unsubscribe for unknown handle");
            return;
        };
        let on_value = Rc::clone(&listener.on_value);
        self.released.borrow_mut().push(listener);

        let last = self.on_unsubscribe.borrow().get(&identity).cloned();
        if let Some(value) = last {
            tracing::trace!(%identity, %subscription, "deliver during unsubscribe");
            on_value(value);
        }
    }

    fn publish<S: Signal>(&self, join: JoinNumber, value: S::Value) {
        let identity = ChannelIdentity::of::<S>(join);
        tracing::trace!(%identity, ?value, "publish");
        self.calls.borrow_mut().push(ProviderCall::Publish {
            identity,
            value: S::into_signal_value(value),
        });
    }
}

impl std::fmt::Debug for RecordingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingProvider")
            .field("calls", &self.calls.borrow().len())
            .field("live", &self.live.borrow().len())
            .field("released", &self.released.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joinbind_core::{Analog, Digital, Serial, SignalKind};
    use proptest::prelude::*;

    #[test]
    fn handles_are_unique() {
        let provider = RecordingProvider::new();
        let a = provider.subscribe::<Digital>(JoinNumber::new(1), Box::new(|_| {}));
        let b = provider.subscribe::<Digital>(JoinNumber::new(1), Box::new(|_| {}));
        assert_ne!(a, b);
        assert_eq!(provider.live_on(ChannelIdentity::of::<Digital>(1)), 2);
    }

    #[test]
    fn deliver_reaches_only_matching_kind() {
        let provider = RecordingProvider::new();
        let seen = Rc::new(Cell::new(0.0));
        let s = Rc::clone(&seen);
        provider.subscribe::<Analog>(JoinNumber::new(5), Box::new(move |v| s.set(v)));

        assert_eq!(provider.feedback::<Digital>(5, true), 0);
        assert_eq!(provider.feedback::<Analog>(5, 12.0), 1);
        assert_eq!(seen.get(), 12.0);
    }

    #[test]
    fn unsubscribe_moves_listener_to_released() {
        let provider = RecordingProvider::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = provider.subscribe::<Digital>(
            JoinNumber::new(2),
            Box::new(move |_| h.set(h.get() + 1)),
        );
        provider.unsubscribe::<Digital>(JoinNumber::new(2), id);

        assert_eq!(provider.feedback::<Digital>(2, true), 0);
        assert!(provider.deliver_late(id, SignalValue::Boolean(true)));
        assert_eq!(hits.get(), 1);
        assert_eq!(provider.live_count(), 0);
    }

    #[test]
    fn replay_invokes_listener_during_subscribe() {
        let provider = RecordingProvider::new();
        let identity = ChannelIdentity::of::<Digital>(9);
        provider.replay_on_subscribe(identity, SignalValue::Boolean(true));

        let seen = Rc::new(Cell::new(false));
        let s = Rc::clone(&seen);
        provider.subscribe::<Digital>(JoinNumber::new(9), Box::new(move |v| s.set(v)));
        assert!(seen.get());
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let provider = RecordingProvider::new();
        let id = provider.subscribe::<Digital>(JoinNumber::new(3), Box::new(|_| {}));
        provider.publish::<Digital>(JoinNumber::new(3), true);
        provider.unsubscribe::<Digital>(JoinNumber::new(3), id);

        let identity = ChannelIdentity::of::<Digital>(3);
        assert_eq!(
            provider.take_calls(),
            vec![
                ProviderCall::Subscribe {
                    identity,
                    subscription: id
                },
                ProviderCall::Publish {
                    identity,
                    value: SignalValue::Boolean(true)
                },
                ProviderCall::Unsubscribe {
                    identity,
                    subscription: id
                },
            ]
        );
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn on_unsubscribe_delivery_reaches_released_listener() {
        let provider = RecordingProvider::new();
        let identity = ChannelIdentity::of::<Digital>(4);
        provider.deliver_on_unsubscribe(identity, SignalValue::Boolean(true));

        let seen = Rc::new(Cell::new(false));
        let s = Rc::clone(&seen);
        let id = provider.subscribe::<Digital>(JoinNumber::new(4), Box::new(move |v| s.set(v)));
        assert!(!seen.get());

        provider.unsubscribe::<Digital>(JoinNumber::new(4), id);
        assert!(seen.get());
        assert_eq!(provider.live_on(identity), 0);
        assert_eq!(provider.last_subscription(identity), Some(id));
    }

    fn listen(provider: &RecordingProvider, identity: ChannelIdentity) -> SubscriptionId {
        match identity.kind {
            SignalKind::Boolean => provider.subscribe::<Digital>(identity.join, Box::new(|_| {})),
            SignalKind::Numeric => provider.subscribe::<Analog>(identity.join, Box::new(|_| {})),
            SignalKind::String => provider.subscribe::<Serial>(identity.join, Box::new(|_| {})),
        }
    }

    proptest! {
        #[test]
        fn delivery_is_scoped_to_identity(
            listened in crate::strategies::identity(),
            delivered in crate::strategies::identity(),
        ) {
            let provider = RecordingProvider::new();
            let id = listen(&provider, listened);
            prop_assert_eq!(provider.last_subscription(listened), Some(id));

            let reached = provider.deliver(delivered, delivered.kind.default_value());
            prop_assert_eq!(reached, usize::from(listened == delivered));
        }
    }
}
