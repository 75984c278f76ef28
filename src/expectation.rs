//! Expectation vocabulary and the resolver.
//!
//! A test supplies a sparse [`ExpectationOptions`]: a handful of category
//! names, each with an [`Expectation`], plus the pseudo-keys `all` and
//! `all_others`. [`resolve`] turns that into a complete [`ExpectationMap`]
//! covering every category the registry knows, applying the default cascade:
//!
//! 1. `all` rewrites to `all_others` when it is the only key supplied.
//! 2. `all_others` is popped as the default; absent, the default is
//!    [`Expectation::Tolerate`].
//! 3. Explicit keys keep their values verbatim.
//! 4. Every remaining known category gets the default.
//!
//! `all_others` is consumed by the cascade and is never a key of the result.

use std::collections::BTreeMap;
use std::fmt;

use crate::config::CategoryRegistry;
use crate::diagnostics::DepscopeError;

/// Blanket-default pseudo-key, honored only when it is the sole key.
pub const ALL: &str = "all";
/// Fallback pseudo-key filling every category not named explicitly.
pub const ALL_OTHERS: &str = "all_others";

/// What must happen for one deprecation category during a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// No opinion; the category may or may not be handled.
    Tolerate,
    /// Some handling entry point must be reached at least once, whichever
    /// action ends up being taken.
    ExpectSomething,
    /// The warn entry point must be reached at least once.
    ExpectWarn,
    /// The fail-control entry point must be reached at least once.
    ExpectFail,
    /// The ignore entry point must be reached at least once.
    ExpectIgnore,
    /// The exit entry point must be reached at least once.
    ExpectExit,
}

impl Expectation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Expectation::Tolerate => "tolerate",
            Expectation::ExpectSomething => "expect_something",
            Expectation::ExpectWarn => "expect_warn",
            Expectation::ExpectFail => "expect_fail",
            Expectation::ExpectIgnore => "expect_ignore",
            Expectation::ExpectExit => "expect_exit",
        }
    }

    /// Human description of what has to be observed to satisfy this
    /// expectation. Used by verification failures.
    pub fn observed_surface(&self) -> &'static str {
        match self {
            Expectation::Tolerate => "no entry point",
            Expectation::ExpectSomething => "any handling entry point",
            Expectation::ExpectWarn => "the warn entry point",
            Expectation::ExpectFail => "the fail-control entry point",
            Expectation::ExpectIgnore => "the ignore entry point",
            Expectation::ExpectExit => "the exit entry point",
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sparse, author-supplied expectations.
///
/// Keys are category names or the literal pseudo-keys [`ALL`] and
/// [`ALL_OTHERS`]. Built by chaining:
///
/// ```
/// use depscope::{Expectation, ExpectationOptions};
///
/// let options = ExpectationOptions::new()
///     .category("mount", Expectation::ExpectWarn)
///     .all_others(Expectation::Tolerate);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpectationOptions {
    entries: BTreeMap<String, Expectation>,
    strict: bool,
}

impl ExpectationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `expectation` for one named category.
    pub fn category(mut self, name: impl Into<String>, expectation: Expectation) -> Self {
        self.entries.insert(name.into(), expectation);
        self
    }

    /// Blanket default for every known category.
    ///
    /// Only honored when it is the sole key supplied. Combined with any
    /// other key, `all` degrades to an ordinary (unknown, inert) category
    /// key in permissive mode and is rejected in strict mode; use
    /// [`ExpectationOptions::all_others`] next to explicit categories.
    pub fn all(self, expectation: Expectation) -> Self {
        self.category(ALL, expectation)
    }

    /// Default for every known category not named explicitly.
    pub fn all_others(self, expectation: Expectation) -> Self {
        self.category(ALL_OTHERS, expectation)
    }

    /// Reject unknown category keys and ambiguous `all` usage at resolution
    /// time instead of passing them through.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<String, Expectation> {
        &self.entries
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.strict
    }
}

/// Complete category-to-expectation mapping produced by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpectationMap {
    entries: BTreeMap<String, Expectation>,
}

impl ExpectationMap {
    pub fn get(&self, category: &str) -> Option<Expectation> {
        self.entries.get(category).copied()
    }

    /// Entries in sorted category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Expectation)> {
        self.entries.iter().map(|(name, exp)| (name.as_str(), *exp))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve sparse options into a complete expectation map.
///
/// Permissive mode (the default) never fails: caller-supplied keys the
/// registry does not know pass through unvalidated, and `all` alongside
/// other keys is just another such key. Strict mode turns both into errors.
pub fn resolve(
    options: &ExpectationOptions,
    registry: &CategoryRegistry,
) -> Result<ExpectationMap, DepscopeError> {
    let mut working = options.entries().clone();

    // `all` is a blanket only when it stands alone.
    if working.len() == 1 {
        if let Some(blanket) = working.remove(ALL) {
            working.insert(ALL_OTHERS.to_string(), blanket);
        }
    }

    if options.is_strict() {
        if working.contains_key(ALL) {
            let extra_keys = working
                .keys()
                .filter(|k| k.as_str() != ALL)
                .cloned()
                .collect();
            return Err(DepscopeError::AmbiguousAll { extra_keys });
        }
        for name in working.keys() {
            if name.as_str() != ALL_OTHERS && !registry.contains(name) {
                return Err(DepscopeError::UnknownCategory {
                    category: name.clone(),
                });
            }
        }
    }

    let default = working.remove(ALL_OTHERS).unwrap_or(Expectation::Tolerate);

    let mut entries = working;
    for name in registry.category_names() {
        entries.entry(name.to_string()).or_insert(default);
    }

    Ok(ExpectationMap { entries })
}
