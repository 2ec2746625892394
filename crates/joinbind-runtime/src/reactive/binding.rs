#![forbid(unsafe_code)]

//! Read handles derived from [`Observable`] values.
//!
//! A [`Binding<T>`] is what UI code holds to read a join's state: it
//! evaluates on each `get()` and can be mapped into display values.
//!
//! ```ignore
//! let level = Observable::new(0.0);
//! let label = bind_mapped(&level, |v| format!("{v:.0}%"));
//! level.set(42.0);
//! assert_eq!(label.get(), "42%");
//! ```
//!
//! # Invariants
//!
//! 1. `Binding::get()` always returns the current (not stale) value.
//! 2. A binding's transform is applied on every `get()` call (no caching).
//! 3. Bindings are read-only. There is no way to write through one, so a
//!    join's state can only change through provider feedback.
//! 4. A binding keeps its source alive; after the owning join binding is
//!    torn down it keeps returning the last mirrored value.
//!
//! # Failure Modes
//!
//! - Transform panic: propagates to caller of `get()`.

use std::rc::Rc;

use super::observable::Observable;

/// A read-only view of an [`Observable`] with an optional transform.
pub struct Binding<T> {
    eval: Rc<dyn Fn() -> T>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            eval: Rc::clone(&self.eval),
        }
    }
}

impl<T: std::fmt::Debug + 'static> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}

impl<T: 'static> Binding<T> {
    /// Create a binding that evaluates `f` on each `get()` call.
    pub fn new(f: impl Fn() -> T + 'static) -> Self {
        Self { eval: Rc::new(f) }
    }

    /// Get the current bound value.
    #[must_use]
    pub fn get(&self) -> T {
        (self.eval)()
    }

    /// Apply a further transform, returning a new `Binding`.
    pub fn then<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> Binding<U> {
        Binding {
            eval: Rc::new(move || f((self.eval)())),
        }
    }
}

/// Create a direct binding to an observable (identity transform).
pub fn bind_observable<T: Clone + PartialEq + 'static>(source: &Observable<T>) -> Binding<T> {
    let src = source.clone();
    Binding {
        eval: Rc::new(move || src.get()),
    }
}

/// Create a mapped binding: `source` value transformed by `map`.
pub fn bind_mapped<S: Clone + PartialEq + 'static, T: 'static>(
    source: &Observable<S>,
    map: impl Fn(&S) -> T + 'static,
) -> Binding<T> {
    let src = source.clone();
    Binding {
        eval: Rc::new(move || src.with(|v| map(v))),
    }
}

/// Create a binding over two sources, re-combined by `map` on every read.
///
/// Backs `JoinBinding::combine`; both sources stay alive as long as the
/// binding does.
pub fn bind_mapped2<
    S1: Clone + PartialEq + 'static,
    S2: Clone + PartialEq + 'static,
    T: 'static,
>(
    s1: &Observable<S1>,
    s2: &Observable<S2>,
    map: impl Fn(&S1, &S2) -> T + 'static,
) -> Binding<T> {
    let src1 = s1.clone();
    let src2 = s2.clone();
    Binding {
        eval: Rc::new(move || src1.with(|v1| src2.with(|v2| map(v1, v2)))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn binding_tracks_source() {
        let obs = Observable::new(false);
        let b = bind_observable(&obs);
        assert!(!b.get());

        obs.set(true);
        assert!(b.get());
    }

    #[test]
    fn binding_map_formats_level() {
        let level = Observable::new(0.0_f64);
        let label = bind_mapped(&level, |v| format!("{v:.0}%"));
        assert_eq!(label.get(), "0%");

        level.set(42.0);
        assert_eq!(label.get(), "42%");
    }

    #[test]
    fn binding_map2_combines_sources() {
        let power = Observable::new(true);
        let source = Observable::new(String::from("HDMI 1"));
        let banner = bind_mapped2(&power, &source, |on, src| {
            if *on { src.clone() } else { "Off".to_owned() }
        });
        assert_eq!(banner.get(), "HDMI 1");

        power.set(false);
        assert_eq!(banner.get(), "Off");
    }

    #[test]
    fn binding_then_chain() {
        let obs = Observable::new(5.0_f64);
        let doubled = bind_observable(&obs).then(|v| v * 2.0);
        assert_eq!(doubled.get(), 10.0);
    }

    #[test]
    fn binding_clone_shares_source() {
        let obs = Observable::new(1);
        let b1 = bind_observable(&obs);
        let b2 = b1.clone();

        obs.set(99);
        assert_eq!(b1.get(), 99);
        assert_eq!(b2.get(), 99);
    }

    #[test]
    fn binding_new_evaluates_each_get() {
        let counter = Rc::new(Cell::new(0));
        let c = Rc::clone(&counter);
        let b = Binding::new(move || {
            c.set(c.get() + 1);
            c.get()
        });
        assert_eq!(b.get(), 1);
        assert_eq!(b.get(), 2);
    }
}
