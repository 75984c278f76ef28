//! End-to-end scope behavior: wiring, verification, wrappers, and
//! cross-scope independence.
//!
//! Each scope builds its registry from scratch so the tests double as a
//! demonstration of the caller-side wiring: the block receives the scope's
//! spy and drives it the way a system under test would drive its injected
//! deprecation sink.

use std::panic::{catch_unwind, AssertUnwindSafe};

use depscope::{
    expect_deprecation, expect_deprecation_warning, handle_deprecations,
    tolerate_all_deprecations, CategoryRegistry, DeprecationSink, DepscopeError, Expectation,
    ExpectationOptions,
};

fn registry() -> CategoryRegistry {
    CategoryRegistry::with_categories(["aws_profile", "cli_option", "mount"])
}

mod wrapper_scopes {
    use super::*;

    #[test]
    fn test_expected_warning_fires_and_scope_passes() {
        let value = expect_deprecation_warning(&registry(), "mount", |sink| {
            sink.warn("mount", "the mount resource is deprecated");
            42
        })
        .unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_wrong_action_fails_the_warning_expectation() {
        let err = expect_deprecation_warning(&registry(), "mount", |sink| {
            sink.fail_control("mount", "the mount resource is deprecated");
        })
        .unwrap_err();

        match err {
            DepscopeError::UnmetExpectation {
                category,
                expectation,
            } => {
                assert_eq!(category, "mount");
                assert_eq!(expectation, Expectation::ExpectWarn);
            }
            other => panic!("expected UnmetExpectation, got {other:?}"),
        }
    }

    #[test]
    fn test_untouched_category_fails_the_warning_expectation() {
        let err = expect_deprecation_warning(&registry(), "mount", |_sink| {}).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mount"));
        assert!(msg.contains("warn entry point"));
    }

    #[test]
    fn test_expect_deprecation_accepts_any_specific_action() {
        expect_deprecation(&registry(), "mount", |sink| {
            sink.ignore("mount", "quietly dropped");
        })
        .unwrap();
    }

    #[test]
    fn test_expect_deprecation_accepts_the_generic_entry_point() {
        expect_deprecation(&registry(), "mount", |sink| {
            sink.handle("mount", "handled generically");
        })
        .unwrap();
    }

    #[test]
    fn test_expect_deprecation_fails_when_nothing_happens() {
        let err = expect_deprecation(&registry(), "mount", |_sink| {}).unwrap_err();
        assert!(err.to_string().contains("any handling entry point"));
    }

    #[test]
    fn test_tolerate_all_with_zero_deprecations() {
        let value = tolerate_all_deprecations(&registry(), |_sink| "done").unwrap();
        assert_eq!(value, "done");
    }

    #[test]
    fn test_tolerate_all_with_many_deprecations() {
        tolerate_all_deprecations(&registry(), |sink| {
            sink.warn("mount", "one");
            sink.exit("cli_option", "two");
            sink.handle("aws_profile", "three");
            sink.handle("not_even_registered", "four");
        })
        .unwrap();
    }
}

mod expectation_mixes {
    use super::*;

    #[test]
    fn test_explicit_category_with_all_others_default() {
        handle_deprecations(
            &registry(),
            ExpectationOptions::new()
                .category("mount", Expectation::ExpectFail)
                .all_others(Expectation::ExpectSomething),
            |sink| {
                sink.fail_control("mount", "broken");
                sink.warn("aws_profile", "renamed");
                sink.handle("cli_option", "handled");
            },
        )
        .unwrap();
    }

    #[test]
    fn test_tolerated_category_never_fails_by_omission() {
        handle_deprecations(
            &registry(),
            ExpectationOptions::new().category("mount", Expectation::Tolerate),
            |_sink| {},
        )
        .unwrap();
    }

    #[test]
    fn test_exit_expectation_matches_only_the_exit_entry_point() {
        let options = || {
            ExpectationOptions::new()
                .category("cli_option", Expectation::ExpectExit)
                .all_others(Expectation::Tolerate)
        };

        handle_deprecations(&registry(), options(), |sink| {
            sink.exit("cli_option", "gone in the next major");
        })
        .unwrap();

        let err = handle_deprecations(&registry(), options(), |sink| {
            sink.warn("cli_option", "gone in the next major");
        })
        .unwrap_err();
        assert!(err.to_string().contains("exit entry point"));
    }

    #[test]
    fn test_unknown_category_key_is_inert_by_default() {
        handle_deprecations(
            &registry(),
            ExpectationOptions::new()
                .category("not_a_category", Expectation::ExpectWarn)
                .all_others(Expectation::Tolerate),
            |_sink| {},
        )
        .unwrap();
    }

    #[test]
    fn test_strict_scope_rejects_unknown_category_key() {
        let err = handle_deprecations(
            &registry(),
            ExpectationOptions::new()
                .category("not_a_category", Expectation::ExpectWarn)
                .strict(),
            |_sink| {},
        )
        .unwrap_err();
        assert!(matches!(err, DepscopeError::UnknownCategory { .. }));
    }

    #[test]
    fn test_strict_scope_rejects_all_mixed_with_other_keys() {
        let err = handle_deprecations(
            &registry(),
            ExpectationOptions::new()
                .all(Expectation::ExpectWarn)
                .category("mount", Expectation::Tolerate)
                .strict(),
            |_sink| {},
        )
        .unwrap_err();
        assert!(matches!(err, DepscopeError::AmbiguousAll { .. }));
    }
}

mod sink_wiring {
    use super::*;

    // Stand-in for a system under test that owns its sink handle.
    struct Subsystem {
        sink: depscope::SpySink,
    }

    impl Subsystem {
        fn deprecated_mount(&self) {
            self.sink.warn("mount", "the mount resource is deprecated");
        }
    }

    #[test]
    fn test_every_clone_of_the_scope_sink_is_observed() {
        expect_deprecation_warning(&registry(), "mount", |sink| {
            let subsystem = Subsystem { sink: sink.clone() };
            subsystem.deprecated_mount();
        })
        .unwrap();
    }

    #[test]
    fn test_generic_handle_dispatches_to_the_configured_action() {
        use depscope::{Action, CategoryPolicy};

        let registry = CategoryRegistry::from_groups([(
            "mount",
            CategoryPolicy {
                action: Some(Action::Warn),
                ..CategoryPolicy::default()
            },
        )]);

        // The warn expectation is satisfied through dispatch alone.
        expect_deprecation_warning(&registry, "mount", |sink| {
            sink.handle("mount", "the mount resource is deprecated");
        })
        .unwrap();
    }
}

mod scope_independence {
    use super::*;

    #[test]
    fn test_failed_scope_leaves_nothing_behind() {
        let err = expect_deprecation_warning(&registry(), "mount", |sink| {
            sink.ignore("mount", "wrong action");
        });
        assert!(err.is_err());

        // A fresh scope starts with an empty ledger and its own rules.
        tolerate_all_deprecations(&registry(), |sink| {
            sink.warn("cli_option", "unrelated");
        })
        .unwrap();

        let err = expect_deprecation_warning(&registry(), "mount", |_sink| {}).unwrap_err();
        assert!(matches!(err, DepscopeError::UnmetExpectation { .. }));
    }

    #[test]
    fn test_panicking_block_unwinds_and_later_scopes_work() {
        let registry = registry();
        let result = catch_unwind(AssertUnwindSafe(|| {
            tolerate_all_deprecations(&registry, |sink| {
                sink.warn("mount", "about to blow up");
                panic!("boom");
            })
        }));
        assert!(result.is_err());

        expect_deprecation_warning(&registry, "mount", |sink| {
            sink.warn("mount", "recorded in a fresh ledger");
        })
        .unwrap();
    }

    #[test]
    fn test_scope_returns_the_block_value_untouched() {
        let value = tolerate_all_deprecations(&registry(), |_sink| vec![1, 2, 3]).unwrap();
        assert_eq!(value, vec![1, 2, 3]);
    }
}
