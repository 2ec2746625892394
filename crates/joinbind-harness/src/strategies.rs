#![forbid(unsafe_code)]

//! Proptest strategies for joins and signal values.

use joinbind_core::{Analog, ChannelIdentity, Digital, JoinNumber, Serial, Signal, SignalKind};
use proptest::prelude::*;

/// Join numbers in a range small enough to produce collisions.
pub fn join_number() -> impl Strategy<Value = JoinNumber> {
    (0u32..32).prop_map(JoinNumber::new)
}

/// Any signal kind.
pub fn signal_kind() -> impl Strategy<Value = SignalKind> {
    prop_oneof![
        Just(SignalKind::Boolean),
        Just(SignalKind::Numeric),
        Just(SignalKind::String),
    ]
}

/// Any channel identity.
pub fn identity() -> impl Strategy<Value = ChannelIdentity> {
    (signal_kind(), join_number()).prop_map(|(kind, join)| ChannelIdentity::new(kind, join))
}

/// A signal marker that can generate its own values.
pub trait ArbitrarySignal: Signal {
    fn values() -> BoxedStrategy<Self::Value>;
}

impl ArbitrarySignal for Digital {
    fn values() -> BoxedStrategy<bool> {
        any::<bool>().boxed()
    }
}

impl ArbitrarySignal for Analog {
    // Finite and exactly comparable; analog joins carry 16-bit levels.
    fn values() -> BoxedStrategy<f64> {
        (0u16..=u16::MAX).prop_map(f64::from).boxed()
    }
}

impl ArbitrarySignal for Serial {
    fn values() -> BoxedStrategy<String> {
        "[a-zA-Z0-9 ]{0,16}".boxed()
    }
}
