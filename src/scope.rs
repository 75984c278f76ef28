//! Scoped wiring and verification.
//!
//! [`handle_deprecations`] is the low-level entry point: it resolves the
//! author's sparse expectations into a complete map, hands the block one
//! fresh recording [`SpySink`], and verifies the map against the spy's
//! ledger once the block returns. The spy is scope-local, so every exit
//! path (normal return, verification failure, or a panic unwinding out of
//! the block) drops all observation state; nothing leaks into the next
//! scope.
//!
//! Three wrappers cover the common cases:
//!
//! - [`tolerate_all_deprecations`] absorbs everything while unrelated
//!   functionality is under test.
//! - [`expect_deprecation_warning`] requires a warn for one category.
//! - [`expect_deprecation`] requires that one category is handled at all.

use crate::config::CategoryRegistry;
use crate::diagnostics::DepscopeError;
use crate::expectation::{resolve, Expectation, ExpectationMap, ExpectationOptions};
use crate::sink::{EntryPoint, SpySink};

/// Run `block` under the expectations in `options`.
///
/// The block receives the scope's [`SpySink`]; wire it into the system under
/// test however is convenient (clone it freely, every clone records into the
/// same ledger). Returns the block's value once every expectation holds, or
/// the first unmet expectation in sorted category order.
///
/// ```
/// use depscope::{handle_deprecations, CategoryRegistry, DeprecationSink, Expectation,
///                ExpectationOptions};
///
/// let registry = CategoryRegistry::with_categories(["mount"]);
/// let options = ExpectationOptions::new()
///     .category("mount", Expectation::ExpectWarn)
///     .all_others(Expectation::Tolerate);
///
/// let value = handle_deprecations(&registry, options, |sink| {
///     sink.warn("mount", "the mount resource is deprecated");
///     42
/// })
/// .unwrap();
/// assert_eq!(value, 42);
/// ```
pub fn handle_deprecations<T, F>(
    registry: &CategoryRegistry,
    options: ExpectationOptions,
    block: F,
) -> Result<T, DepscopeError>
where
    F: FnOnce(&SpySink) -> T,
{
    let map = resolve(&options, registry)?;
    let spy = SpySink::with_policies(registry.clone());
    let value = block(&spy);
    verify(&map, &spy, registry)?;
    Ok(value)
}

/// Check every entry of the resolved map against the spy's ledger.
///
/// Categories absent from the registry are skipped: permissive resolution
/// let them through as inert keys, and no real entry point is ever scoped
/// to them.
fn verify(
    map: &ExpectationMap,
    spy: &SpySink,
    registry: &CategoryRegistry,
) -> Result<(), DepscopeError> {
    for (category, expectation) in map.iter() {
        if !registry.contains(category) {
            continue;
        }
        let met = match expectation {
            Expectation::Tolerate => true,
            Expectation::ExpectSomething => spy.was_invoked(category),
            Expectation::ExpectWarn => spy.calls(category, EntryPoint::Warn) > 0,
            Expectation::ExpectFail => spy.calls(category, EntryPoint::FailControl) > 0,
            Expectation::ExpectIgnore => spy.calls(category, EntryPoint::Ignore) > 0,
            Expectation::ExpectExit => spy.calls(category, EntryPoint::Exit) > 0,
        };
        if !met {
            return Err(DepscopeError::UnmetExpectation {
                category: category.to_string(),
                expectation,
            });
        }
    }
    Ok(())
}

/// Absorb every deprecation: no category can fail the scope.
///
/// Use this to silence incidental deprecations while testing unrelated
/// functionality.
pub fn tolerate_all_deprecations<T, F>(
    registry: &CategoryRegistry,
    block: F,
) -> Result<T, DepscopeError>
where
    F: FnOnce(&SpySink) -> T,
{
    handle_deprecations(
        registry,
        ExpectationOptions::new().all(Expectation::Tolerate),
        block,
    )
}

/// Require at least one warn for `category`; everything else is tolerated.
pub fn expect_deprecation_warning<T, F>(
    registry: &CategoryRegistry,
    category: &str,
    block: F,
) -> Result<T, DepscopeError>
where
    F: FnOnce(&SpySink) -> T,
{
    handle_deprecations(
        registry,
        ExpectationOptions::new()
            .category(category, Expectation::ExpectWarn)
            .all_others(Expectation::Tolerate),
        block,
    )
}

/// Require that `category` is handled at all; which action is taken is free.
pub fn expect_deprecation<T, F>(
    registry: &CategoryRegistry,
    category: &str,
    block: F,
) -> Result<T, DepscopeError>
where
    F: FnOnce(&SpySink) -> T,
{
    handle_deprecations(
        registry,
        ExpectationOptions::new()
            .category(category, Expectation::ExpectSomething)
            .all_others(Expectation::Tolerate),
        block,
    )
}
