#![forbid(unsafe_code)]

//! Reactive state for join bindings.
//!
//! - [`Observable`]: a shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks. Each join binding mirrors its
//!   channel into one.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//! - [`Binding`]: a read-only, optionally mapped view UI code holds.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are stored as `Weak` function pointers and cleaned
//! up lazily during notification.

pub mod binding;
pub mod observable;

pub use binding::{Binding, bind_mapped, bind_mapped2, bind_observable};
pub use observable::{Observable, Subscription};
