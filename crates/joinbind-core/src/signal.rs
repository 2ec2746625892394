#![forbid(unsafe_code)]

//! Signal kinds and their value types.
//!
//! Every join carries exactly one kind of signal. The kind fixes the Rust
//! value type at compile time through the sealed [`Signal`] trait:
//!
//! | Kind | Marker | Value | Default | Processor term |
//! |------|--------|-------|---------|----------------|
//! | [`SignalKind::Boolean`] | [`Digital`] | `bool` | `false` | digital |
//! | [`SignalKind::Numeric`] | [`Analog`] | `f64` | `0.0` | analog |
//! | [`SignalKind::String`] | [`Serial`] | `String` | `""` | serial |
//!
//! Code that is generic over `S: Signal` never inspects a value's kind at
//! runtime. [`SignalValue`] exists only for providers whose transport is
//! untyped and need to carry any kind through one callback signature.

use core::fmt;
use core::str::FromStr;

/// The closed set of channel kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "&'static str"))]
pub enum SignalKind {
    /// On/off line (digital).
    Boolean,
    /// Numeric level (analog).
    Numeric,
    /// Text line (serial).
    String,
}

impl SignalKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Boolean, Self::Numeric, Self::String];

    /// Provider-facing name: `"boolean"`, `"number"` or `"string"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Numeric => "number",
            Self::String => "string",
        }
    }

    /// The value every binding of this kind starts from before feedback arrives.
    #[must_use]
    pub fn default_value(self) -> SignalValue {
        match self {
            Self::Boolean => SignalValue::Boolean(Digital::default_value()),
            Self::Numeric => SignalValue::Numeric(Analog::default_value()),
            Self::String => SignalValue::String(Serial::default_value()),
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SignalKind> for &'static str {
    fn from(kind: SignalKind) -> Self {
        kind.as_str()
    }
}

/// A signal kind name that matched none of the known spellings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSignalKind(pub String);

impl fmt::Display for UnknownSignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown signal kind '{}' (expected boolean, number or string)",
            self.0
        )
    }
}

impl std::error::Error for UnknownSignalKind {}

impl FromStr for SignalKind {
    type Err = UnknownSignalKind;

    /// Accepts the provider names and the processor terms, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        [
            ("boolean", Self::Boolean),
            ("digital", Self::Boolean),
            ("number", Self::Numeric),
            ("analog", Self::Numeric),
            ("string", Self::String),
            ("serial", Self::String),
        ]
        .into_iter()
        .find(|(spelling, _)| name.eq_ignore_ascii_case(spelling))
        .map(|(_, kind)| kind)
        .ok_or_else(|| UnknownSignalKind(s.to_owned()))
    }
}

impl TryFrom<String> for SignalKind {
    type Error = UnknownSignalKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A value of any signal kind, for untyped provider transports.
#[derive(Clone, Debug, PartialEq)]
pub enum SignalValue {
    Boolean(bool),
    Numeric(f64),
    String(String),
}

impl SignalValue {
    /// The kind this value belongs to.
    #[must_use]
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Boolean(_) => SignalKind::Boolean,
            Self::Numeric(_) => SignalKind::Numeric,
            Self::String(_) => SignalKind::String,
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Digital {}
    impl Sealed for super::Analog {}
    impl Sealed for super::Serial {}
}

/// Compile-time link between a signal kind and its value type.
///
/// Sealed: the set of kinds is closed, so a fourth implementation would
/// break the exhaustive [`SignalKind`] mapping.
pub trait Signal: sealed::Sealed + fmt::Debug + 'static {
    /// The Rust type carried on joins of this kind.
    type Value: Clone + PartialEq + fmt::Debug + 'static;

    /// The runtime tag for this kind.
    const KIND: SignalKind;

    /// The registry default for this kind.
    fn default_value() -> Self::Value;

    /// Erase the type for an untyped transport.
    fn into_signal_value(value: Self::Value) -> SignalValue;

    /// Recover a typed value; `None` when `value` belongs to another kind.
    fn from_signal_value(value: SignalValue) -> Option<Self::Value>;
}

/// Marker for boolean (digital) joins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Digital;

/// Marker for numeric (analog) joins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Analog;

/// Marker for string (serial) joins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Serial;

impl Signal for Digital {
    type Value = bool;
    const KIND: SignalKind = SignalKind::Boolean;

    fn default_value() -> bool {
        false
    }

    fn into_signal_value(value: bool) -> SignalValue {
        SignalValue::Boolean(value)
    }

    fn from_signal_value(value: SignalValue) -> Option<bool> {
        match value {
            SignalValue::Boolean(v) => Some(v),
            _ => None,
        }
    }
}

impl Signal for Analog {
    type Value = f64;
    const KIND: SignalKind = SignalKind::Numeric;

    fn default_value() -> f64 {
        0.0
    }

    fn into_signal_value(value: f64) -> SignalValue {
        SignalValue::Numeric(value)
    }

    fn from_signal_value(value: SignalValue) -> Option<f64> {
        match value {
            SignalValue::Numeric(v) => Some(v),
            _ => None,
        }
    }
}

impl Signal for Serial {
    type Value = String;
    const KIND: SignalKind = SignalKind::String;

    fn default_value() -> String {
        String::new()
    }

    fn into_signal_value(value: String) -> SignalValue {
        SignalValue::String(value)
    }

    fn from_signal_value(value: SignalValue) -> Option<String> {
        match value {
            SignalValue::String(v) => Some(v),
            _ => None,
        }
    }
}
