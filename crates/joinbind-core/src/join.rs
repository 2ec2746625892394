#![forbid(unsafe_code)]

//! Join numbers and channel identities.
//!
//! # Invariants
//!
//! 1. Join-number spaces are per kind: `(Boolean, 5)` and `(Numeric, 5)` are
//!    different channels.
//! 2. Two identities are equal iff both the kind and the join number match.
//! 3. Identities are immutable once built; re-targeting a binding means
//!    building a new identity.

use core::fmt;
use core::marker::PhantomData;

use crate::signal::{Signal, SignalKind};

/// A line number within one signal kind's namespace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JoinNumber(u32);

impl JoinNumber {
    /// Wrap a raw join number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for JoinNumber {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for JoinNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The `(kind, join)` pair that names one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIdentity {
    pub kind: SignalKind,
    pub join: JoinNumber,
}

impl ChannelIdentity {
    #[must_use]
    pub const fn new(kind: SignalKind, join: JoinNumber) -> Self {
        Self { kind, join }
    }

    /// Identity for a join of the signal kind `S`.
    #[must_use]
    pub fn of<S: Signal>(join: impl Into<JoinNumber>) -> Self {
        Self::new(S::KIND, join.into())
    }

    /// Decimal join key, as string-addressed providers expect it.
    #[must_use]
    pub fn join_key(&self) -> String {
        self.join.to_string()
    }
}

impl fmt::Display for ChannelIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.join)
    }
}

/// A join number statically tagged with its signal kind.
///
/// Lets call sites carry the kind in the type instead of pairing a
/// [`JoinNumber`] with a runtime [`SignalKind`].
pub struct Join<S: Signal> {
    number: JoinNumber,
    _kind: PhantomData<S>,
}

impl<S: Signal> Join<S> {
    #[must_use]
    pub fn new(number: impl Into<JoinNumber>) -> Self {
        Self {
            number: number.into(),
            _kind: PhantomData,
        }
    }

    #[must_use]
    pub fn number(&self) -> JoinNumber {
        self.number
    }

    #[must_use]
    pub fn identity(&self) -> ChannelIdentity {
        ChannelIdentity::new(S::KIND, self.number)
    }
}

impl<S: Signal> Clone for Join<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Signal> Copy for Join<S> {}

impl<S: Signal> PartialEq for Join<S> {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl<S: Signal> Eq for Join<S> {}

impl<S: Signal> fmt::Debug for Join<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Join")
            .field("kind", &S::KIND)
            .field("number", &self.number)
            .finish()
    }
}

impl<S: Signal> From<Join<S>> for ChannelIdentity {
    fn from(join: Join<S>) -> Self {
        join.identity()
    }
}
