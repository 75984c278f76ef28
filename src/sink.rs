//! The deprecation-handling collaborator seam and its recording test double.
//!
//! Systems under test never talk to a process-wide deprecator. They receive a
//! [`DeprecationSink`] and call its entry points when a deprecated feature is
//! used; the caller decides which implementation to wire in. Inside a
//! depscope scope that implementation is a [`SpySink`], which records every
//! call per (category, entry point) so the scope can verify expectations
//! afterward. [`NullSink`] is available for code paths that need a sink but
//! no observation at all.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::{Action, CategoryRegistry};

// ============================================================================
// COLLABORATOR SURFACE
// ============================================================================

/// The deprecation-handling collaborator's entry points.
///
/// `handle` is the generic entry point: a conforming implementation looks up
/// the category's configured action and invokes the matching specific entry
/// point. The four narrow entry points perform one action each. Every method
/// takes the category name first; the message is free-form.
pub trait DeprecationSink {
    /// Handle a deprecation event for `category`, taking whatever action the
    /// category is configured for.
    fn handle(&self, category: &str, message: &str);
    /// Emit a warning for the deprecated use.
    fn warn(&self, category: &str, message: &str);
    /// Mark the surrounding control as failed.
    fn fail_control(&self, category: &str, message: &str);
    /// Drop the deprecated use silently.
    fn ignore(&self, category: &str, message: &str);
    /// Abort the run.
    fn exit(&self, category: &str, message: &str);
}

/// A sink that drops everything.
pub struct NullSink;

impl DeprecationSink for NullSink {
    fn handle(&self, _category: &str, _message: &str) {}
    fn warn(&self, _category: &str, _message: &str) {}
    fn fail_control(&self, _category: &str, _message: &str) {}
    fn ignore(&self, _category: &str, _message: &str) {}
    fn exit(&self, _category: &str, _message: &str) {}
}

/// One observable entry point of the collaborator surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryPoint {
    Handle,
    Warn,
    FailControl,
    Ignore,
    Exit,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Handle => "handle",
            EntryPoint::Warn => "warn",
            EntryPoint::FailControl => "fail_control",
            EntryPoint::Ignore => "ignore",
            EntryPoint::Exit => "exit",
        }
    }

    /// The specific entry point a conforming `handle` dispatches to.
    fn for_action(action: Action) -> EntryPoint {
        match action {
            Action::Ignore => EntryPoint::Ignore,
            Action::Warn => EntryPoint::Warn,
            Action::FailControl => EntryPoint::FailControl,
            Action::Exit => EntryPoint::Exit,
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RECORDING TEST DOUBLE
// ============================================================================

#[derive(Debug, Default)]
struct Ledger {
    calls: BTreeMap<(String, EntryPoint), usize>,
}

#[derive(Debug, Default)]
struct SpyInner {
    ledger: Mutex<Ledger>,
    policies: Option<CategoryRegistry>,
}

/// Recording implementation of [`DeprecationSink`].
///
/// Clones share one ledger: however many handles to the collaborator the
/// system under test ends up holding during a scope, they all record into
/// the same place. The ledger lives and dies with the spy, so nothing is
/// observable once the scope that created it ends.
///
/// A spy built with [`SpySink::with_policies`] mirrors the collaborator
/// dispatch contract: `handle` records the generic call and then the entry
/// point of the category's configured action. A [`SpySink::detached`] spy
/// records only what is literally called.
#[derive(Debug, Clone, Default)]
pub struct SpySink {
    inner: Arc<SpyInner>,
}

impl SpySink {
    /// Spy that dispatches `handle` calls according to `registry`.
    pub fn with_policies(registry: CategoryRegistry) -> Self {
        Self {
            inner: Arc::new(SpyInner {
                ledger: Mutex::default(),
                policies: Some(registry),
            }),
        }
    }

    /// Spy with no policy snapshot; `handle` records only itself.
    pub fn detached() -> Self {
        Self::default()
    }

    fn record(&self, category: &str, entry: EntryPoint) {
        // Each bump is a single statement; a ledger poisoned by a panicking
        // block is still consistent, so verification proceeds on it.
        let mut ledger = self
            .inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *ledger
            .calls
            .entry((category.to_string(), entry))
            .or_insert(0) += 1;
    }

    fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        let ledger = self
            .inner
            .ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&ledger)
    }

    /// Recorded calls to one entry point for a category.
    pub fn calls(&self, category: &str, entry: EntryPoint) -> usize {
        self.read(|ledger| {
            ledger
                .calls
                .get(&(category.to_string(), entry))
                .copied()
                .unwrap_or(0)
        })
    }

    /// Recorded calls for a category across all entry points.
    pub fn total_for(&self, category: &str) -> usize {
        self.read(|ledger| {
            ledger
                .calls
                .iter()
                .filter(|((name, _), _)| name == category)
                .map(|(_, count)| count)
                .sum()
        })
    }

    /// True when any entry point was reached for the category.
    pub fn was_invoked(&self, category: &str) -> bool {
        self.total_for(category) > 0
    }

    /// Every (category, entry point, count) recorded so far, sorted.
    pub fn snapshot(&self) -> Vec<(String, EntryPoint, usize)> {
        self.read(|ledger| {
            ledger
                .calls
                .iter()
                .map(|((name, entry), count)| (name.clone(), *entry, *count))
                .collect()
        })
    }
}

impl DeprecationSink for SpySink {
    fn handle(&self, category: &str, _message: &str) {
        self.record(category, EntryPoint::Handle);
        if let Some(policies) = &self.inner.policies {
            self.record(category, EntryPoint::for_action(policies.action_for(category)));
        }
    }

    fn warn(&self, category: &str, _message: &str) {
        self.record(category, EntryPoint::Warn);
    }

    fn fail_control(&self, category: &str, _message: &str) {
        self.record(category, EntryPoint::FailControl);
    }

    fn ignore(&self, category: &str, _message: &str) {
        self.record(category, EntryPoint::Ignore);
    }

    fn exit(&self, category: &str, _message: &str) {
        self.record(category, EntryPoint::Exit);
    }
}
