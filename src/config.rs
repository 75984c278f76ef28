//! Deprecation policy registry: the known-categories source.
//!
//! Every valid deprecation category, together with its configured handling
//! policy, lives in a JSON policy document:
//!
//! ```json
//! {
//!   "file_version": "1.0.0",
//!   "unknown_group_action": "ignore",
//!   "groups": {
//!     "mount": { "action": "warn", "prefix": "The mount resource is deprecated." },
//!     "old_cli": { "action": "exit", "exit_status": 3 }
//!   }
//! }
//! ```
//!
//! [`CategoryRegistry`] is the loaded form of that document. The harness
//! queries it once per scope for the complete category universe; the
//! recording sink consults it for each category's configured action. Tests
//! that only care about names can skip the document entirely and build a
//! registry with [`CategoryRegistry::with_categories`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::DepscopeError;

/// Policy file versions this loader understands.
pub const SUPPORTED_FILE_VERSIONS: [&str; 1] = ["1.0.0"];

/// The handling action a category is configured to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Drop the deprecated use silently.
    Ignore,
    /// Emit a warning and continue.
    Warn,
    /// Mark the surrounding control as failed.
    FailControl,
    /// Abort the run with the category's exit status.
    Exit,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Ignore => "ignore",
            Action::Warn => "warn",
            Action::FailControl => "fail_control",
            Action::Exit => "exit",
        }
    }
}

impl Default for Action {
    fn default() -> Self {
        Action::Warn
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handling policy for a single category, as written in the policy document.
///
/// Every field is optional; a policy with no `action` warns. Unrecognized
/// fields in the document are rejected during loading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPolicy {
    pub action: Option<Action>,
    /// Text prepended to the deprecation message when it is surfaced.
    pub prefix: Option<String>,
    /// Text appended to the deprecation message when it is surfaced.
    pub suffix: Option<String>,
    /// Process exit status used by the exit action.
    pub exit_status: Option<i32>,
    /// Maintainer note; never surfaced to users.
    pub comment: Option<String>,
}

impl CategoryPolicy {
    /// Configured action, defaulting to [`Action::Warn`] when unset.
    pub fn action_or_default(&self) -> Action {
        self.action.unwrap_or_default()
    }
}

/// Wire format of the policy document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    file_version: String,
    #[serde(default)]
    unknown_group_action: Option<Action>,
    #[serde(default)]
    groups: BTreeMap<String, CategoryPolicy>,
}

/// The complete set of known deprecation categories and their policies.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    groups: BTreeMap<String, CategoryPolicy>,
    fallback_action: Action,
}

impl CategoryRegistry {
    /// Load a registry from policy document text.
    pub fn from_json_str(text: &str) -> Result<Self, DepscopeError> {
        let doc: ConfigDocument =
            serde_json::from_str(text).map_err(|e| DepscopeError::InvalidConfig {
                message: "failed to parse policy document".to_string(),
                source: Some(e),
            })?;
        Self::from_document(doc)
    }

    /// Load a registry from any reader yielding policy document text.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, DepscopeError> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .map_err(|e| DepscopeError::InvalidConfig {
                message: format!("failed to read policy document: {}", e),
                source: None,
            })?;
        Self::from_json_str(&text)
    }

    /// Load a registry from a policy document on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DepscopeError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DepscopeError::InvalidConfig {
            message: format!("failed to read policy document at {}: {}", path.display(), e),
            source: None,
        })?;
        Self::from_json_str(&text)
    }

    fn from_document(doc: ConfigDocument) -> Result<Self, DepscopeError> {
        if !SUPPORTED_FILE_VERSIONS.contains(&doc.file_version.as_str()) {
            return Err(DepscopeError::UnsupportedFileVersion {
                found: doc.file_version,
            });
        }
        Ok(Self {
            groups: doc.groups,
            fallback_action: doc.unknown_group_action.unwrap_or_default(),
        })
    }

    /// Build a registry in memory from explicit (name, policy) pairs.
    pub fn from_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (S, CategoryPolicy)>,
        S: Into<String>,
    {
        Self {
            groups: groups
                .into_iter()
                .map(|(name, policy)| (name.into(), policy))
                .collect(),
            fallback_action: Action::default(),
        }
    }

    /// Build a minimal registry: the given names, each with a default policy.
    pub fn with_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_groups(names.into_iter().map(|n| (n, CategoryPolicy::default())))
    }

    /// Every known category name, in sorted order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn policy(&self, name: &str) -> Option<&CategoryPolicy> {
        self.groups.get(name)
    }

    /// Configured action for a category. Names absent from the registry get
    /// the document's `unknown_group_action` (default: warn).
    pub fn action_for(&self, name: &str) -> Action {
        self.policy(name)
            .map(CategoryPolicy::action_or_default)
            .unwrap_or(self.fallback_action)
    }

    /// The action applied to categories the document does not name.
    pub fn fallback_action(&self) -> Action {
        self.fallback_action
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
