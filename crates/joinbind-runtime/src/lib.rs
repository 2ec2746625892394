#![forbid(unsafe_code)]

//! Join bindings: typed, lifecycle-managed channels to a control processor.
//!
//! A join binding mirrors one `(kind, join)` channel into local reactive
//! state and, in read-write mode, publishes requests back. Feedback from the
//! processor is the only thing that changes the mirror; publishing is a
//! request, never a local write.
//!
//! - [`JoinBinding`] / [`use_join`] / [`use_join_read_only`]: the entry points.
//! - [`JoinLifecycle`]: subscribe, re-target and release for one binding.
//! - [`Publisher`] / [`Press`]: the outbound half of read-write bindings.
//! - [`JoinScope`]: releases a group of bindings together.
//! - [`reactive`]: the observable state underneath.
//! - `config` (feature `join-config`): named join maps from TOML/JSON.

pub mod join_binding;
pub mod lifecycle;
pub mod publish;
pub mod reactive;
pub mod scope;

#[cfg(feature = "join-config")]
pub mod config;

#[cfg(feature = "join-config")]
pub use config::{JoinEntry, JoinMap, JoinMapError};
pub use join_binding::{Access, JoinBinding, ReadOnly, ReadWrite, use_join, use_join_read_only};
pub use lifecycle::JoinLifecycle;
pub use publish::{Press, Publisher};
pub use reactive::{Binding, Observable, Subscription};
pub use scope::JoinScope;
