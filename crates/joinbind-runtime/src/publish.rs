#![forbid(unsafe_code)]

//! Outbound half of a read-write join binding.
//!
//! A [`Publisher`] forwards values to the provider for whatever join its
//! binding currently targets. It never reads or writes the binding's state:
//! the processor's feedback is the only thing that moves the mirror.
//!
//! # Digital edges
//!
//! The processor sees a digital join as held high until it receives
//! `false`. [`Publisher::press`] returns a guard that publishes the falling
//! edge when dropped, so a press released on any path (including an early
//! return or a panic in UI code) still goes low.

use std::marker::PhantomData;
use std::rc::Rc;

use joinbind_core::{ChannelIdentity, Digital, JoinNumber, JoinProvider, Signal};

use crate::lifecycle::Target;

/// Sends values of kind `S` to the join a binding targets.
pub struct Publisher<S: Signal, P: JoinProvider> {
    provider: Rc<P>,
    target: Target,
    _kind: PhantomData<S>,
}

impl<S: Signal, P: JoinProvider> Publisher<S, P> {
    pub(crate) fn new(provider: Rc<P>, target: Target) -> Self {
        Self {
            provider,
            target,
            _kind: PhantomData,
        }
    }

    /// The identity a publish would address right now.
    #[must_use]
    pub fn identity(&self) -> Option<ChannelIdentity> {
        self.target.get().map(|join| ChannelIdentity::new(S::KIND, join))
    }

    /// Request that the processor apply `value`.
    ///
    /// Does nothing once the owning binding has been torn down.
    pub fn publish(&self, value: S::Value) {
        match self.target.get() {
            Some(join) => send::<S, P>(&self.provider, join, value),
            None => tracing::debug!(kind = %S::KIND, ?value, "publish after teardown dropped"),
        }
    }
}

impl<P: JoinProvider> Publisher<Digital, P> {
    /// Publish the rising edge and hold it until the guard drops.
    #[must_use = "dropping the press publishes the falling edge immediately"]
    pub fn press(&self) -> Press<P> {
        let join = self.target.get();
        if let Some(join) = join {
            send::<Digital, P>(&self.provider, join, true);
        }
        Press {
            provider: Rc::clone(&self.provider),
            join,
        }
    }

    /// Publish `true` immediately followed by `false`.
    pub fn pulse(&self) {
        drop(self.press());
    }
}

impl<S: Signal, P: JoinProvider> Clone for Publisher<S, P> {
    fn clone(&self) -> Self {
        Self {
            provider: Rc::clone(&self.provider),
            target: Rc::clone(&self.target),
            _kind: PhantomData,
        }
    }
}

impl<S: Signal, P: JoinProvider> std::fmt::Debug for Publisher<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("identity", &self.identity())
            .finish()
    }
}

/// A held digital press. Dropping it publishes `false`.
///
/// The falling edge goes to the join that received the rising edge, even if
/// the binding has been re-targeted in the meantime.
#[must_use = "dropping the press publishes the falling edge immediately"]
pub struct Press<P: JoinProvider> {
    provider: Rc<P>,
    join: Option<JoinNumber>,
}

impl<P: JoinProvider> Press<P> {
    /// The identity held high by this press.
    #[must_use]
    pub fn identity(&self) -> Option<ChannelIdentity> {
        self.join
            .map(|join| ChannelIdentity::new(Digital::KIND, join))
    }
}

impl<P: JoinProvider> Drop for Press<P> {
    fn drop(&mut self) {
        if let Some(join) = self.join {
            send::<Digital, P>(&self.provider, join, false);
        }
    }
}

impl<P: JoinProvider> std::fmt::Debug for Press<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Press")
            .field("identity", &self.identity())
            .finish()
    }
}

fn send<S: Signal, P: JoinProvider>(provider: &P, join: JoinNumber, value: S::Value) {
    tracing::trace!(kind = %S::KIND, %join, ?value, "publish");
    provider.publish::<S>(join, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use joinbind_core::SignalValue;
    use joinbind_harness::RecordingProvider;

    fn publisher(join: u32) -> (Rc<RecordingProvider>, Publisher<Digital, RecordingProvider>) {
        let provider = Rc::new(RecordingProvider::new());
        let target = Rc::new(Cell::new(Some(JoinNumber::new(join))));
        (Rc::clone(&provider), Publisher::new(provider, target))
    }

    #[test]
    fn publish_addresses_target() {
        let (p, publisher) = publisher(3);
        publisher.publish(true);
        assert_eq!(
            p.published(ChannelIdentity::of::<Digital>(3)),
            vec![SignalValue::Boolean(true)]
        );
    }

    #[test]
    fn publish_without_target_is_dropped() {
        let (p, publisher) = publisher(3);
        publisher.target.set(None);
        publisher.publish(true);
        assert!(p.calls().is_empty());
        assert_eq!(publisher.identity(), None);
    }

    #[test]
    fn press_publishes_both_edges() {
        let (p, publisher) = publisher(8);
        {
            let press = publisher.press();
            assert_eq!(press.identity(), Some(ChannelIdentity::of::<Digital>(8)));
            assert_eq!(
                p.published(ChannelIdentity::of::<Digital>(8)),
                vec![SignalValue::Boolean(true)]
            );
        }
        assert_eq!(
            p.published(ChannelIdentity::of::<Digital>(8)),
            vec![SignalValue::Boolean(true), SignalValue::Boolean(false)]
        );
    }

    #[test]
    fn press_releases_on_original_join() {
        let (p, publisher) = publisher(8);
        let press = publisher.press();
        publisher.target.set(Some(JoinNumber::new(9)));
        drop(press);

        assert_eq!(p.published(ChannelIdentity::of::<Digital>(8)).len(), 2);
        assert!(p.published(ChannelIdentity::of::<Digital>(9)).is_empty());
    }

    #[test]
    fn press_releases_during_unwind() {
        let (p, publisher) = publisher(2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _press = publisher.press();
            panic!("ui handler failed");
        }));
        assert!(result.is_err());
        assert_eq!(
            p.published(ChannelIdentity::of::<Digital>(2)).last(),
            Some(&SignalValue::Boolean(false))
        );
    }

    #[test]
    fn pulse_is_rising_then_falling() {
        let (p, publisher) = publisher(1);
        publisher.pulse();
        assert_eq!(
            p.published(ChannelIdentity::of::<Digital>(1)),
            vec![SignalValue::Boolean(true), SignalValue::Boolean(false)]
        );
    }
}
