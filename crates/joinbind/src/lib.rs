#![forbid(unsafe_code)]

//! joinbind public facade.
//!
//! Re-exports the core vocabulary and the runtime, plus a [`prelude`] for
//! UI code.
//!
//! ```
//! use std::rc::Rc;
//! use joinbind::prelude::*;
//! use joinbind_harness::RecordingProvider;
//!
//! let provider = Rc::new(RecordingProvider::new());
//! let lights = use_join::<Digital, _>(&provider, 3);
//! let (is_on, toggle) = lights.split();
//!
//! toggle.publish(true);
//! assert!(!is_on.get()); // waits for processor feedback
//!
//! provider.feedback::<Digital>(3, true);
//! assert!(is_on.get());
//! ```

pub use joinbind_core::{
    Analog, ChannelIdentity, Digital, Join, JoinNumber, JoinProvider, OnValue, Serial, Signal,
    SignalKind, SignalValue, SubscriptionId,
};
pub use joinbind_runtime::{
    Access, Binding, JoinBinding, JoinLifecycle, JoinScope, Observable, Press, Publisher,
    ReadOnly, ReadWrite, Subscription, use_join, use_join_read_only,
};
#[cfg(feature = "join-config")]
pub use joinbind_runtime::{JoinEntry, JoinMap, JoinMapError};

/// Everything UI code usually needs.
pub mod prelude {
    pub use joinbind_core::{Analog, Digital, JoinProvider, Serial, Signal};
    pub use joinbind_runtime::{
        Binding, JoinBinding, JoinScope, Publisher, ReadOnly, ReadWrite, use_join,
        use_join_read_only,
    };
}
