pub mod ast;
pub mod catalog;
pub mod config;
pub mod error;
pub mod sheet;
pub mod suggest;

use ast::{EvaluationOutcome, Evaluator};
use catalog::Catalog;

pub use catalog::Suggestion;
pub use error::EvalError;

/// Evaluates one formula without caching its parse.
pub fn evaluate<S: AsRef<str>>(tokens: &[S], catalog: &Catalog) -> EvaluationOutcome {
    Evaluator::new(0).evaluate(tokens, catalog)
}
