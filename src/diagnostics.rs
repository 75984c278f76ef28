//! Unified diagnostics for the harness.
//!
//! Every failure mode in the crate is a [`DepscopeError`]: configuration
//! loading, strict-mode resolution, and scope verification all surface
//! through this one enum. Each variant carries a stable diagnostic code
//! (`depscope::<phase>::<kind>`) and, where there is something actionable to
//! say, a help message. Errors render through `miette` reports.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::SUPPORTED_FILE_VERSIONS;
use crate::expectation::Expectation;

/// Unified error type for all harness failure modes.
#[derive(Debug, Error)]
pub enum DepscopeError {
    /// An `expect_*` category's required entry point was never reached
    /// while the scope's block ran.
    #[error(
        "deprecation category '{category}' never reached {} during the scope",
        .expectation.observed_surface()
    )]
    UnmetExpectation {
        category: String,
        expectation: Expectation,
    },

    /// Strict resolution saw a category key the registry does not know.
    #[error("unknown deprecation category '{category}' in expectation options")]
    UnknownCategory { category: String },

    /// Strict resolution saw `all` combined with other keys.
    #[error(
        "'all' cannot be combined with other expectation keys: {}",
        .extra_keys.join(", ")
    )]
    AmbiguousAll { extra_keys: Vec<String> },

    /// The policy document could not be read or parsed.
    #[error("invalid deprecation policy document: {message}")]
    InvalidConfig {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The policy document declares a version this loader does not speak.
    #[error(
        "unsupported deprecation policy file version '{found}' (supported: {})",
        SUPPORTED_FILE_VERSIONS.join(", ")
    )]
    UnsupportedFileVersion { found: String },
}

impl Diagnostic for DepscopeError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            DepscopeError::UnmetExpectation { .. } => "depscope::scope::unmet_expectation",
            DepscopeError::UnknownCategory { .. } => "depscope::resolve::unknown_category",
            DepscopeError::AmbiguousAll { .. } => "depscope::resolve::ambiguous_all",
            DepscopeError::InvalidConfig { .. } => "depscope::config::invalid",
            DepscopeError::UnsupportedFileVersion { .. } => {
                "depscope::config::unsupported_file_version"
            }
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            DepscopeError::UnmetExpectation {
                category,
                expectation,
            } => format!(
                "make the block trigger {} for '{category}', or relax the category to tolerate",
                expectation.observed_surface()
            ),
            DepscopeError::UnknownCategory { .. } => {
                "strict resolution only accepts categories present in the registry; \
                 check the spelling or drop strict()"
                    .to_string()
            }
            DepscopeError::AmbiguousAll { .. } => {
                "'all' is a blanket default only when it is the sole key; \
                 use all_others alongside explicit categories"
                    .to_string()
            }
            DepscopeError::UnsupportedFileVersion { .. } => format!(
                "regenerate the policy document against a supported version ({})",
                SUPPORTED_FILE_VERSIONS.join(", ")
            ),
            DepscopeError::InvalidConfig { .. } => return None,
        };
        Some(Box::new(help))
    }
}

#[cfg(test)]
mod diagnostics_tests {
    use super::*;

    #[test]
    fn test_unmet_expectation_names_category_and_action() {
        let err = DepscopeError::UnmetExpectation {
            category: "mount".to_string(),
            expectation: Expectation::ExpectWarn,
        };
        let msg = err.to_string();
        assert!(msg.contains("mount"));
        assert!(msg.contains("warn entry point"));

        let code = format!("{}", err.code().unwrap());
        assert_eq!(code, "depscope::scope::unmet_expectation");

        let help = format!("{}", err.help().unwrap());
        assert!(help.contains("the warn entry point"));
        assert!(help.contains("tolerate"));
    }

    #[test]
    fn test_ambiguous_all_lists_the_extra_keys() {
        let err = DepscopeError::AmbiguousAll {
            extra_keys: vec!["mount".to_string(), "old_cli".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("mount, old_cli"));
    }

    #[test]
    fn test_invalid_config_has_no_help() {
        let err = DepscopeError::InvalidConfig {
            message: "failed to parse policy document".to_string(),
            source: None,
        };
        assert!(err.help().is_none());
        let code = format!("{}", err.code().unwrap());
        assert_eq!(code, "depscope::config::invalid");
    }
}
