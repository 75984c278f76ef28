pub use crate::config::{Action, CategoryPolicy, CategoryRegistry};
pub use crate::diagnostics::DepscopeError;
pub use crate::expectation::{resolve, Expectation, ExpectationMap, ExpectationOptions};
pub use crate::scope::{
    expect_deprecation, expect_deprecation_warning, handle_deprecations,
    tolerate_all_deprecations,
};
pub use crate::sink::{DeprecationSink, EntryPoint, NullSink, SpySink};

pub mod config;
pub mod diagnostics;
pub mod expectation;
pub mod scope;
pub mod sink;
