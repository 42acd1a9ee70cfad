use crate::ast::{ASTNode, Parser};
use crate::catalog::Catalog;
use crate::error::EvalError;
use log::{debug, trace};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Result of evaluating one formula.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// The formula has no tokens yet.
    Empty,
    Value(f64),
    Error(EvalError),
}

impl EvaluationOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, EvaluationOutcome::Empty)
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            EvaluationOutcome::Value(value) => Some(*value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&EvalError> {
        match self {
            EvaluationOutcome::Error(err) => Some(err),
            _ => None,
        }
    }

    /// `None` for an empty formula.
    pub fn into_result(self) -> Option<Result<f64, EvalError>> {
        match self {
            EvaluationOutcome::Empty => None,
            EvaluationOutcome::Value(value) => Some(Ok(value)),
            EvaluationOutcome::Error(err) => Some(Err(err)),
        }
    }
}

impl From<Result<f64, EvalError>> for EvaluationOutcome {
    fn from(result: Result<f64, EvalError>) -> Self {
        match result {
            Ok(value) => EvaluationOutcome::Value(value),
            Err(err) => EvaluationOutcome::Error(err),
        }
    }
}

type ParseCache = Mutex<LruCache<Vec<String>, Arc<ASTNode>>>;

/// Evaluates formulas against a catalog snapshot.
///
/// Parsed trees are cached by token sequence. The cache never holds
/// resolved values, so every call reads the catalog it is given.
pub struct Evaluator {
    parse_cache: Option<ParseCache>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Evaluator {
    /// Creates a new `Evaluator` with a given maximum cache size. Zero disables the cache.
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            parse_cache: NonZeroUsize::new(max_cache_size)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Parse a token sequence into an AST.
    pub fn parse_formula<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Arc<ASTNode>, EvalError> {
        let Some(cache) = &self.parse_cache else {
            return Parser::parse_formula(tokens).map(Arc::new);
        };

        let key: Vec<String> = tokens.iter().map(|token| token.as_ref().to_string()).collect();
        if let Some(ast) = Self::lock(cache).get(&key) {
            trace!("Parse cache hit for {:?}", key);
            return Ok(Arc::clone(ast));
        }

        let ast = Arc::new(Parser::parse_formula(tokens)?);
        Self::lock(cache).put(key, Arc::clone(&ast));
        Ok(ast)
    }

    /// Evaluates a token sequence against a catalog.
    ///
    /// # Returns
    ///
    /// * `EvaluationOutcome::Empty` if there are no tokens.
    /// * `EvaluationOutcome::Value(f64)` if parsing and evaluation succeed.
    /// * `EvaluationOutcome::Error(EvalError)` otherwise.
    pub fn evaluate<S: AsRef<str>>(&self, tokens: &[S], catalog: &Catalog) -> EvaluationOutcome {
        if tokens.is_empty() {
            return EvaluationOutcome::Empty;
        }

        let outcome: EvaluationOutcome = self
            .parse_formula(tokens)
            .and_then(|ast| self.evaluate_ast(&ast, catalog))
            .into();
        debug!("Evaluated formula of {} tokens: {:?}", tokens.len(), outcome);
        outcome
    }

    /// Evaluates an `ASTNode`, resolving identifiers against the catalog.
    pub fn evaluate_ast(&self, ast: &ASTNode, catalog: &Catalog) -> Result<f64, EvalError> {
        let value = match ast {
            ASTNode::Number(value) => *value,

            ASTNode::Identifier(ident) => catalog
                .lookup(ident)
                .ok_or_else(|| EvalError::UnknownIdentifier(ident.clone()))?,

            ASTNode::Negate(inner) => -self.evaluate_ast(inner, catalog)?,

            ASTNode::BinaryOperation {
                left,
                operator,
                right,
            } => {
                let left_value = self.evaluate_ast(left, catalog)?;
                let right_value = self.evaluate_ast(right, catalog)?;
                operator.apply(left_value, right_value)?
            }

            ASTNode::Group(inner) => self.evaluate_ast(inner, catalog)?,
        };

        // Literals and catalog values can be non-finite too.
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::InvalidOperation(format!(
                "non-finite operand {}",
                value
            )))
        }
    }

    pub fn cached_formulas(&self) -> usize {
        self.parse_cache
            .as_ref()
            .map_or(0, |cache| Self::lock(cache).len())
    }

    fn lock(cache: &ParseCache) -> std::sync::MutexGuard<'_, LruCache<Vec<String>, Arc<ASTNode>>> {
        cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
