use crate::error::EvalError;

mod evaluator;
mod parser;
mod token;

pub use evaluator::{EvaluationOutcome, Evaluator};
pub use parser::{FormulaParser as Parser, MAX_DEPTH};
pub use token::{parse_literal, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(f64),
    Identifier(String),
    Negate(Box<ASTNode>),
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    Group(Box<ASTNode>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
        }
    }

    /// Applies the operator, rejecting results that are not finite real numbers.
    pub fn apply(&self, left: f64, right: f64) -> Result<f64, EvalError> {
        let result = match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => {
                if right == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                left / right
            }
            Operator::Power => {
                if left < 0.0 && right.fract() != 0.0 {
                    return Err(EvalError::InvalidOperation(format!(
                        "{} ^ {} is not a real number",
                        left, right
                    )));
                }
                left.powf(right)
            }
        };

        if result.is_finite() {
            Ok(result)
        } else {
            Err(EvalError::InvalidOperation(format!(
                "{} {} {} is not finite",
                left,
                self.symbol(),
                right
            )))
        }
    }
}

impl TryFrom<&str> for Operator {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Subtract),
            "*" => Ok(Operator::Multiply),
            "/" => Ok(Operator::Divide),
            "^" => Ok(Operator::Power),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}
