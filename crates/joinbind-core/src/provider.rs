#![forbid(unsafe_code)]

//! The contract with the external pub/sub provider.
//!
//! The provider owns the transport to the processor. This crate only calls
//! into it; delivery, addressing and failure handling all live on the other
//! side of [`JoinProvider`].
//!
//! # Contract
//!
//! 1. `subscribe` registers `on_value` for every inbound update on the
//!    `(S::KIND, join)` channel and returns an opaque handle.
//! 2. `unsubscribe` receives the same `(S::KIND, join)` pair and the handle
//!    returned by `subscribe`. After it returns the provider should drop the
//!    callback; a late invocation is tolerated and ignored by the caller.
//! 3. `publish` asks the processor to apply `value`. Nothing is returned and
//!    local state is not touched.
//! 4. All three calls are synchronous and infallible from the caller's view.
//!    A provider may invoke `on_value` from inside `subscribe` (for example
//!    to replay the last known value).

use core::fmt;

use crate::join::JoinNumber;
use crate::signal::Signal;

/// Opaque handle for one live provider subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a provider-issued raw handle.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Inbound feedback callback for joins of kind `S`.
pub type OnValue<S> = Box<dyn Fn(<S as Signal>::Value)>;

/// Pub/sub surface of the control-system library.
///
/// Methods are generic over the signal marker so values cross the boundary
/// already typed; an untyped transport can erase them with
/// [`Signal::into_signal_value`].
pub trait JoinProvider {
    /// Start delivering feedback for `(S::KIND, join)` to `on_value`.
    fn subscribe<S: Signal>(&self, join: JoinNumber, on_value: OnValue<S>) -> SubscriptionId;

    /// Stop the subscription identified by `subscription`.
    fn unsubscribe<S: Signal>(&self, join: JoinNumber, subscription: SubscriptionId);

    /// Request that the processor apply `value` on `(S::KIND, join)`.
    fn publish<S: Signal>(&self, join: JoinNumber, value: S::Value);
}
