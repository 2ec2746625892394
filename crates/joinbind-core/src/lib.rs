#![forbid(unsafe_code)]

//! Core vocabulary for joinbind: the signal kind registry, channel
//! identities and the provider contract.
//!
//! Everything here is plain data plus one trait. The lifecycle logic that
//! uses it lives in `joinbind-runtime`.

pub mod join;
pub mod provider;
pub mod signal;

pub use join::{ChannelIdentity, Join, JoinNumber};
pub use provider::{JoinProvider, OnValue, SubscriptionId};
pub use signal::{Analog, Digital, Serial, Signal, SignalKind, SignalValue, UnknownSignalKind};
