#![forbid(unsafe_code)]

//! Named join declarations loaded from TOML or JSON.
//!
//! A join map keeps join numbers out of UI code: the processor program and
//! the panel agree on names, and the map says which kind and number each
//! name uses.
//!
//! ```toml
//! [joins.power]
//! kind = "boolean"
//! join = 3
//!
//! [joins.volume]
//! kind = "number"
//! join = 7
//! read_only = true
//! ```
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Bad kind name | Typo in `kind` | `Parse` error at load |
//! | Same (kind, join) twice | Copy-paste in the map | `DuplicateIdentity` at load |
//! | Name not declared | Map out of date | `UnknownJoin` at lookup |
//! | Kind differs from `S` | Wrong marker at call site | `KindMismatch` at lookup |
//! | Writable bind of read-only entry | Map says `read_only` | `ReadOnlyJoin` at lookup |

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use joinbind_core::{ChannelIdentity, JoinNumber, JoinProvider, Signal, SignalKind};
use serde::{Deserialize, Serialize};

use crate::join_binding::{JoinBinding, ReadOnly, ReadWrite};

/// One declared join.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinEntry {
    pub kind: SignalKind,
    pub join: JoinNumber,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JoinEntry {
    #[must_use]
    pub fn identity(&self) -> ChannelIdentity {
        ChannelIdentity::new(self.kind, self.join)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct JoinMapFile {
    #[serde(default)]
    joins: BTreeMap<String, JoinEntry>,
}

/// Errors from loading or querying a [`JoinMap`].
#[derive(Debug)]
pub enum JoinMapError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The document did not parse.
    Parse { format: &'static str, message: String },
    /// The file extension is neither `.toml` nor `.json`.
    UnsupportedFormat(PathBuf),
    /// Two names declare the same channel.
    DuplicateIdentity {
        identity: ChannelIdentity,
        first: String,
        second: String,
    },
    /// No entry with this name.
    UnknownJoin(String),
    /// The entry exists with a different kind.
    KindMismatch {
        name: String,
        expected: SignalKind,
        found: SignalKind,
    },
    /// A writable binding was requested for a read-only entry.
    ReadOnlyJoin(String),
}

impl fmt::Display for JoinMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse { format, message } => write!(f, "invalid {format} join map: {message}"),
            Self::UnsupportedFormat(path) => {
                write!(f, "unsupported join map format: {}", path.display())
            }
            Self::DuplicateIdentity {
                identity,
                first,
                second,
            } => write!(f, "joins '{first}' and '{second}' both declare {identity}"),
            Self::UnknownJoin(name) => write!(f, "unknown join '{name}'"),
            Self::KindMismatch {
                name,
                expected,
                found,
            } => write!(f, "join '{name}' is {found}, not {expected}"),
            Self::ReadOnlyJoin(name) => write!(f, "join '{name}' is declared read-only"),
        }
    }
}

impl std::error::Error for JoinMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Validated name → join declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoinMap {
    entries: BTreeMap<String, JoinEntry>,
}

impl JoinMap {
    /// Build a map from entries, rejecting duplicate identities.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, JoinEntry)>,
    ) -> Result<Self, JoinMapError> {
        let entries: BTreeMap<_, _> = entries.into_iter().collect();
        let mut seen: BTreeMap<ChannelIdentity, &str> = BTreeMap::new();
        for (name, entry) in &entries {
            if let Some(first) = seen.insert(entry.identity(), name.as_str()) {
                return Err(JoinMapError::DuplicateIdentity {
                    identity: entry.identity(),
                    first: first.to_owned(),
                    second: name.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, JoinMapError> {
        let file: JoinMapFile = toml::from_str(text).map_err(|e| JoinMapError::Parse {
            format: "TOML",
            message: e.to_string(),
        })?;
        Self::from_entries(file.joins)
    }

    pub fn from_json_str(text: &str) -> Result<Self, JoinMapError> {
        let file: JoinMapFile = serde_json::from_str(text).map_err(|e| JoinMapError::Parse {
            format: "JSON",
            message: e.to_string(),
        })?;
        Self::from_entries(file.joins)
    }

    /// Load a map, picking the format from the file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, JoinMapError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, JoinMapError> = match ext.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(JoinMapError::UnsupportedFormat(path.to_path_buf())),
        };
        let text = std::fs::read_to_string(path).map_err(|source| JoinMapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map = parse(&text)?;
        tracing::debug!(path = %path.display(), joins = map.len(), "join map loaded");
        Ok(map)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, JoinMapError> {
        let file = JoinMapFile {
            joins: self.entries.clone(),
        };
        toml::to_string(&file).map_err(|e| JoinMapError::Parse {
            format: "TOML",
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JoinEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JoinEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Join number of `name`, checked against the kind `S`.
    pub fn join<S: Signal>(&self, name: &str) -> Result<JoinNumber, JoinMapError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| JoinMapError::UnknownJoin(name.to_owned()))?;
        if entry.kind != S::KIND {
            return Err(JoinMapError::KindMismatch {
                name: name.to_owned(),
                expected: S::KIND,
                found: entry.kind,
            });
        }
        Ok(entry.join)
    }

    /// Bind `name` read-write. Fails for entries marked `read_only`.
    pub fn bind<S: Signal, P: JoinProvider>(
        &self,
        provider: &Rc<P>,
        name: &str,
    ) -> Result<JoinBinding<S, P, ReadWrite>, JoinMapError> {
        let join = self.join::<S>(name)?;
        if self.entries.get(name).is_some_and(|e| e.read_only) {
            return Err(JoinMapError::ReadOnlyJoin(name.to_owned()));
        }
        Ok(JoinBinding::new(provider, join))
    }

    /// Bind `name` read-only.
    pub fn bind_read_only<S: Signal, P: JoinProvider>(
        &self,
        provider: &Rc<P>,
        name: &str,
    ) -> Result<JoinBinding<S, P, ReadOnly>, JoinMapError> {
        let join = self.join::<S>(name)?;
        Ok(JoinBinding::new(provider, join))
    }
}
