//! sharpfix-rules: Lint rule implementations and the rule pipeline
//!
//! Available rules:
//! - NullEqualityAnalyzer: Convert `a == b` / `a != b` on value types to `a is b` / `a is not b`
//! - TryReturnTypeAnalyzer: Convert `T TryX(...)` to `bool TryX(..., out T value)`

pub mod error;
pub mod null_equality;
pub mod pipeline;
pub mod registry;
pub mod try_method;

pub use error::{PipelineError, RuleError};
pub use null_equality::NullEqualityRule;
pub use pipeline::{BatchOutcome, Pipeline};
pub use registry::{scan, Category, Finding, Rule, RuleRegistry, Severity};
pub use try_method::TryMethodRule;
