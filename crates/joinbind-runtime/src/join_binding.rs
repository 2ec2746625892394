#![forbid(unsafe_code)]

//! The public entry point: bind a typed join and read (or publish) it.
//!
//! ```ignore
//! let provider = Rc::new(MyProvider::connect()?);
//!
//! // Read-write: state plus a publisher, like a `[state, pubState]` pair.
//! let power = use_join::<Digital, _>(&provider, 3);
//! let (is_on, power_pub) = power.split();
//! power_pub.publish(true);       // request; `is_on` moves only on feedback
//!
//! // Read-only: state alone. There is no publish method to call.
//! let volume = use_join_read_only::<Analog, _>(&provider, 7);
//! let level = volume.get();
//! ```
//!
//! # Invariants
//!
//! 1. The access mode is a type parameter fixed at construction.
//!    `JoinBinding<_, _, ReadOnly>` has no publish surface at all.
//! 2. The value type is `S::Value`; a publish of the wrong type does not
//!    compile.
//! 3. Dropping the binding releases its subscription.
//! 4. Two bindings on the same identity hold independent state and
//!    independent subscriptions.

use std::marker::PhantomData;
use std::rc::Rc;

use joinbind_core::{ChannelIdentity, Join, JoinNumber, JoinProvider, Signal, SubscriptionId};

use crate::lifecycle::JoinLifecycle;
use crate::publish::Publisher;
use crate::reactive::{
    Binding, Observable, Subscription, bind_mapped, bind_mapped2, bind_observable,
};

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::ReadOnly {}
    impl Sealed for super::ReadWrite {}
}

/// Access mode of a [`JoinBinding`].
pub trait Access: sealed::Sealed + 'static {
    /// Whether bindings in this mode expose a publisher.
    const WRITABLE: bool;
}

/// Observe feedback only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadOnly;

/// Observe feedback and publish requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadWrite;

impl Access for ReadOnly {
    const WRITABLE: bool = false;
}

impl Access for ReadWrite {
    const WRITABLE: bool = true;
}

/// A live, typed binding to one join.
pub struct JoinBinding<S: Signal, P: JoinProvider, M: Access = ReadWrite> {
    lifecycle: JoinLifecycle<S, P>,
    _mode: PhantomData<M>,
}

/// Bind a read-write join of kind `S`.
pub fn use_join<S: Signal, P: JoinProvider>(
    provider: &Rc<P>,
    join: impl Into<JoinNumber>,
) -> JoinBinding<S, P, ReadWrite> {
    JoinBinding::new(provider, join)
}

/// Bind a read-only join of kind `S`.
pub fn use_join_read_only<S: Signal, P: JoinProvider>(
    provider: &Rc<P>,
    join: impl Into<JoinNumber>,
) -> JoinBinding<S, P, ReadOnly> {
    JoinBinding::new(provider, join)
}

impl<S: Signal, P: JoinProvider, M: Access> JoinBinding<S, P, M> {
    /// Bind `join` in mode `M`, subscribing immediately.
    pub fn new(provider: &Rc<P>, join: impl Into<JoinNumber>) -> Self {
        Self {
            lifecycle: JoinLifecycle::activate(Rc::clone(provider), join),
            _mode: PhantomData,
        }
    }

    /// Bind a statically tagged join.
    pub fn from_join(provider: &Rc<P>, join: Join<S>) -> Self {
        Self::new(provider, join.number())
    }

    /// Current mirrored value.
    #[must_use]
    pub fn get(&self) -> S::Value {
        self.lifecycle.state().get()
    }

    /// Borrow the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&S::Value) -> R) -> R {
        self.lifecycle.state().with(f)
    }

    /// A read handle that outlives borrows of the binding.
    #[must_use]
    pub fn state(&self) -> Binding<S::Value> {
        bind_observable(self.lifecycle.state())
    }

    /// A read handle transformed by `map` on each read.
    pub fn map<T: 'static>(&self, map: impl Fn(&S::Value) -> T + 'static) -> Binding<T> {
        bind_mapped(self.lifecycle.state(), map)
    }

    /// A read handle over this join and `other`, combined by `map` on each read.
    ///
    /// Useful for labels that depend on two feedback lines, such as a
    /// source name shown only while power feedback is high.
    pub fn combine<T, Q, N, U>(
        &self,
        other: &JoinBinding<T, Q, N>,
        map: impl Fn(&S::Value, &T::Value) -> U + 'static,
    ) -> Binding<U>
    where
        T: Signal,
        Q: JoinProvider,
        N: Access,
        U: 'static,
    {
        bind_mapped2(self.lifecycle.state(), other.lifecycle.state(), map)
    }

    /// Call `callback` whenever the mirrored value changes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&S::Value) + 'static) -> Subscription {
        self.lifecycle.state().subscribe(callback)
    }

    /// Number of state changes so far, including resets on re-target.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.lifecycle.state().version()
    }

    #[must_use]
    pub fn identity(&self) -> Option<ChannelIdentity> {
        self.lifecycle.identity()
    }

    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.lifecycle.subscription()
    }

    #[must_use]
    pub fn is_writable(&self) -> bool {
        M::WRITABLE
    }

    /// Point the binding at another join of the same kind.
    ///
    /// Releases the current subscription, resets the state to the kind's
    /// default, then subscribes to `join`. Existing read handles and
    /// publishers follow the binding.
    pub fn retarget(&mut self, join: impl Into<JoinNumber>) {
        self.lifecycle.retarget(join);
    }

    /// Rebind to a join of another kind, keeping the access mode.
    ///
    /// Read handles and publishers taken from `self` do not follow; the
    /// old publisher goes inert.
    pub fn into_kind<T: Signal>(self, join: impl Into<JoinNumber>) -> JoinBinding<T, P, M> {
        JoinBinding {
            lifecycle: self.lifecycle.into_kind::<T>(join),
            _mode: PhantomData,
        }
    }

    pub(crate) fn observable(&self) -> &Observable<S::Value> {
        self.lifecycle.state()
    }
}

impl<S: Signal, P: JoinProvider> JoinBinding<S, P, ReadWrite> {
    /// Request that the processor apply `value`. The state is not touched.
    pub fn publish(&self, value: S::Value) {
        self.publisher().publish(value);
    }

    /// A publisher that keeps following this binding's target.
    #[must_use]
    pub fn publisher(&self) -> Publisher<S, P> {
        Publisher::new(
            Rc::clone(self.lifecycle.provider()),
            Rc::clone(self.lifecycle.target()),
        )
    }

    /// The `(state, publish)` pair.
    #[must_use]
    pub fn split(&self) -> (Binding<S::Value>, Publisher<S, P>) {
        (self.state(), self.publisher())
    }

    /// Give up the publish surface.
    #[must_use]
    pub fn into_read_only(self) -> JoinBinding<S, P, ReadOnly> {
        JoinBinding {
            lifecycle: self.lifecycle,
            _mode: PhantomData,
        }
    }
}

impl<S: Signal, P: JoinProvider, M: Access> std::fmt::Debug for JoinBinding<S, P, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinBinding")
            .field("writable", &M::WRITABLE)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}
