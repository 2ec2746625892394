#![forbid(unsafe_code)]

//! Subscription lifecycle for one join binding.
//!
//! A [`JoinLifecycle`] owns at most one provider subscription and the
//! [`Observable`] that mirrors it. It moves through three transitions:
//!
//! ```text
//!   activate(join)          retarget(join')               drop
//!  ───────────────▶ Active ───────────────▶ Active' ─────────────▶ Released
//!                    │  release(join) then activate(join')
//!                    └─ feedback ⇒ state.set(value)
//! ```
//!
//! # Invariants
//!
//! 1. Activation sets the state to the kind's default *before* subscribing,
//!    so a provider that replays a value from inside `subscribe` wins.
//! 2. At most one subscription is live per lifecycle. Re-targeting issues
//!    `unsubscribe(old)` strictly before `subscribe(new)`.
//! 3. Every activation is matched by exactly one `unsubscribe`, issued on
//!    re-target or on drop (including drops during unwinding).
//! 4. Each activation carries its own token. The token is released before
//!    `unsubscribe` is called, and feedback arriving through a released
//!    token is discarded, including feedback delivered from inside
//!    `unsubscribe`.
//! 5. Feedback delivered from inside `subscribe` is held back and applied
//!    once the subscription handle is recorded, so observers never run
//!    while the handle is unknown.
//! 6. Publishers address the new join from the moment activation starts,
//!    and the old join until `unsubscribe` has returned.
//! 7. Only feedback mutates the state. Publishing never does.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Late feedback | Provider delivers during or after unsubscribe | Discarded, `trace` log |
//! | Observer panics on replayed value | UI callback bug | Handle already recorded; drop releases it |
//! | Observer or `subscribe` panics mid-activation | UI callback or provider bug | Token released, activation marked failed; later teardown is a logged no-op |
//! | Teardown with nothing live | Lifecycle logic defect | `error` log, debug assertion |

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;

use joinbind_core::{ChannelIdentity, JoinNumber, JoinProvider, OnValue, Signal, SubscriptionId};

use crate::reactive::Observable;

/// The join a lifecycle currently addresses, shared with its publishers.
///
/// `None` once the lifecycle has been torn down.
pub(crate) type Target = Rc<Cell<Option<JoinNumber>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Subscribing,
    Live,
    Released,
}

/// Shared between one activation and the callback handed to the provider.
struct Token<T> {
    phase: Cell<Phase>,
    replayed: RefCell<Option<T>>,
}

struct Activation<T> {
    join: JoinNumber,
    subscription: SubscriptionId,
    token: Rc<Token<T>>,
}

/// Releases the token and marks the activation failed if `stand_up` unwinds.
struct AbortOnUnwind<'a, T> {
    token: &'a Token<T>,
    failed: &'a Cell<bool>,
    target: &'a Cell<Option<JoinNumber>>,
    armed: bool,
}

impl<T> AbortOnUnwind<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for AbortOnUnwind<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.token.phase.set(Phase::Released);
            self.failed.set(true);
            self.target.set(None);
        }
    }
}

/// Owns one provider subscription and the state it feeds.
pub struct JoinLifecycle<S: Signal, P: JoinProvider> {
    provider: Rc<P>,
    state: Observable<S::Value>,
    target: Target,
    active: Option<Activation<S::Value>>,
    failed: Cell<bool>,
    _kind: PhantomData<S>,
}

impl<S: Signal, P: JoinProvider> JoinLifecycle<S, P> {
    /// Activate a new lifecycle on `join`.
    pub fn activate(provider: Rc<P>, join: impl Into<JoinNumber>) -> Self {
        let mut lifecycle = Self {
            provider,
            state: Observable::new(S::default_value()),
            target: Rc::new(Cell::new(None)),
            active: None,
            failed: Cell::new(false),
            _kind: PhantomData,
        };
        lifecycle.stand_up(join.into());
        lifecycle
    }

    /// The mirrored channel state.
    #[must_use]
    pub fn state(&self) -> &Observable<S::Value> {
        &self.state
    }

    /// The identity currently subscribed, if any.
    #[must_use]
    pub fn identity(&self) -> Option<ChannelIdentity> {
        self.active
            .as_ref()
            .map(|a| ChannelIdentity::new(S::KIND, a.join))
    }

    /// Handle of the live subscription, if any.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.active.as_ref().map(|a| a.subscription)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn provider(&self) -> &Rc<P> {
        &self.provider
    }

    pub(crate) fn target(&self) -> &Target {
        &self.target
    }

    /// Move the subscription to `join` within the same signal kind.
    ///
    /// Re-targeting to the join already active is a no-op.
    pub fn retarget(&mut self, join: impl Into<JoinNumber>) {
        let join = join.into();
        if self.active.as_ref().is_some_and(|a| a.join == join) {
            tracing::trace!(kind = %S::KIND, %join, "retarget to current join ignored");
            return;
        }
        tracing::debug!(
            kind = %S::KIND,
            from = ?self.active.as_ref().map(|a| a.join.get()),
            to = %join,
            "retarget join"
        );
        self.tear_down();
        self.stand_up(join);
    }

    /// Consume this lifecycle and activate one for another signal kind.
    ///
    /// The old subscription is released before the new one is requested.
    pub fn into_kind<T: Signal>(self, join: impl Into<JoinNumber>) -> JoinLifecycle<T, P> {
        let provider = Rc::clone(&self.provider);
        tracing::debug!(from = %S::KIND, to = %T::KIND, "change join kind");
        drop(self);
        JoinLifecycle::activate(provider, join)
    }

    fn stand_up(&mut self, join: JoinNumber) {
        debug_assert!(self.active.is_none(), "stand_up with a live subscription");
        self.failed.set(false);

        let token = Rc::new(Token {
            phase: Cell::new(Phase::Subscribing),
            replayed: RefCell::new(None),
        });
        let guard = AbortOnUnwind {
            token: &token,
            failed: &self.failed,
            target: &self.target,
            armed: true,
        };

        self.target.set(Some(join));
        self.state.set(S::default_value());

        let on_value: OnValue<S> = {
            let state = self.state.clone();
            let token = Rc::clone(&token);
            Box::new(move |value| match token.phase.get() {
                Phase::Live => {
                    tracing::trace!(kind = %S::KIND, %join, ?value, "feedback");
                    state.set(value);
                }
                Phase::Subscribing => {
                    tracing::trace!(kind = %S::KIND, %join, ?value, "feedback during subscribe deferred");
                    *token.replayed.borrow_mut() = Some(value);
                }
                Phase::Released => {
                    tracing::trace!(kind = %S::KIND, %join, ?value, "late feedback discarded");
                }
            })
        };

        let subscription = self.provider.subscribe::<S>(join, on_value);
        guard.disarm();
        tracing::debug!(kind = %S::KIND, %join, %subscription, "join subscribed");

        self.active = Some(Activation {
            join,
            subscription,
            token: Rc::clone(&token),
        });
        token.phase.set(Phase::Live);

        let replayed = token.replayed.borrow_mut().take();
        if let Some(value) = replayed {
            self.state.set(value);
        }
    }

    fn tear_down(&mut self) {
        let Some(active) = self.active.take() else {
            if self.failed.get() {
                tracing::debug!(kind = %S::KIND, "teardown after failed activation");
            } else if !std::thread::panicking() {
                tracing::error!(kind = %S::KIND, "teardown without a live subscription");
                debug_assert!(false, "join lifecycle torn down twice");
            }
            return;
        };
        active.token.phase.set(Phase::Released);
        self.provider
            .unsubscribe::<S>(active.join, active.subscription);
        self.target.set(None);
        tracing::debug!(
            kind = %S::KIND,
            join = %active.join,
            subscription = %active.subscription,
            "join unsubscribed"
        );
    }
}

impl<S: Signal, P: JoinProvider> Drop for JoinLifecycle<S, P> {
    fn drop(&mut self) {
        self.tear_down();
    }
}

impl<S: Signal, P: JoinProvider> std::fmt::Debug for JoinLifecycle<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinLifecycle")
            .field("identity", &self.identity())
            .field("subscription", &self.subscription())
            .field("state", &self.state)
            .finish()
    }
}
