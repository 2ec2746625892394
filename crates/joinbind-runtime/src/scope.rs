#![forbid(unsafe_code)]

//! Ownership of many join bindings for one UI scope.
//!
//! A [`JoinScope`] plays the role of a component's lifetime: every binding
//! created through it is released when the scope is dropped or cleared.
//!
//! ```ignore
//! let mut scope = JoinScope::new();
//! let (power, power_pub) = scope.join::<Digital, _>(&provider, 3);
//! let volume = scope.join_read_only::<Analog, _>(&provider, 7);
//!
//! // When scope drops, every subscription is released.
//! ```
//!
//! # Invariants
//!
//! 1. Held items are released in reverse registration order.
//! 2. After drop or `clear()`, no feedback reaches state owned by the scope.
//! 3. Read handles handed out keep returning the last mirrored value, and
//!    publishers handed out go inert.
//! 4. `clear()` leaves the scope empty and reusable.

use std::any::Any;
use std::rc::Rc;

use joinbind_core::{JoinNumber, JoinProvider, Signal};

use crate::join_binding::{Access, JoinBinding, ReadOnly, ReadWrite};
use crate::publish::Publisher;
use crate::reactive::{Binding, Subscription};

/// Collects join bindings and change subscriptions for a logical scope.
#[derive(Default)]
pub struct JoinScope {
    held: Vec<Box<dyn Any>>,
}

impl JoinScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of an existing binding.
    pub fn hold<S, P, M>(&mut self, binding: JoinBinding<S, P, M>)
    where
        S: Signal,
        P: JoinProvider + 'static,
        M: Access,
    {
        self.held.push(Box::new(binding));
    }

    /// Keep a change subscription alive for the scope's lifetime.
    pub fn hold_subscription(&mut self, subscription: Subscription) {
        self.held.push(Box::new(subscription));
    }

    /// Bind a read-write join owned by this scope.
    pub fn join<S, P>(
        &mut self,
        provider: &Rc<P>,
        join: impl Into<JoinNumber>,
    ) -> (Binding<S::Value>, Publisher<S, P>)
    where
        S: Signal,
        P: JoinProvider + 'static,
    {
        let binding = JoinBinding::<S, P, ReadWrite>::new(provider, join);
        let pair = binding.split();
        self.hold(binding);
        pair
    }

    /// Bind a read-only join owned by this scope.
    pub fn join_read_only<S, P>(
        &mut self,
        provider: &Rc<P>,
        join: impl Into<JoinNumber>,
    ) -> Binding<S::Value>
    where
        S: Signal,
        P: JoinProvider + 'static,
    {
        let binding = JoinBinding::<S, P, ReadOnly>::new(provider, join);
        let state = binding.state();
        self.hold(binding);
        state
    }

    /// Bind a join and run `on_change` on each change, both owned by the scope.
    pub fn watch<S, P>(
        &mut self,
        provider: &Rc<P>,
        join: impl Into<JoinNumber>,
        on_change: impl Fn(&S::Value) + 'static,
    ) -> Binding<S::Value>
    where
        S: Signal,
        P: JoinProvider + 'static,
    {
        let binding = JoinBinding::<S, P, ReadOnly>::new(provider, join);
        let state = binding.state();
        let subscription = binding.observable().subscribe(on_change);
        self.hold(binding);
        self.hold_subscription(subscription);
        state
    }

    /// Number of held bindings and subscriptions.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.held.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Release everything immediately, newest first.
    pub fn clear(&mut self) {
        while let Some(item) = self.held.pop() {
            drop(item);
        }
    }
}

impl Drop for JoinScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for JoinScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinScope")
            .field("binding_count", &self.held.len())
            .finish()
    }
}
