use crate::ast::Operator;
use log::trace;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "ast/literal.pest"]
struct LiteralGrammar;

/// A formula token after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Operator(Operator),
    OpenParen,
    CloseParen,
    Number(f64),
    Identifier(&'a str),
}

impl<'a> Token<'a> {
    /// Classifies a caller-supplied token. Anything that is neither an
    /// operator, a parenthesis nor a plain numeric literal is an identifier.
    pub fn classify(text: &'a str) -> Token<'a> {
        match text {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            _ => {
                if let Ok(operator) = Operator::try_from(text) {
                    Token::Operator(operator)
                } else if let Some(value) = parse_literal(text) {
                    Token::Number(value)
                } else {
                    Token::Identifier(text)
                }
            }
        }
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Identifier(_))
    }
}

/// Parses an unsigned integer or decimal literal such as `42`, `4.` or `.5`.
///
/// Signs, exponents, `inf`/`NaN` and surrounding whitespace are not
/// literals; such tokens are looked up as names instead.
pub fn parse_literal(text: &str) -> Option<f64> {
    let pair = LiteralGrammar::parse(Rule::literal, text).ok()?.next()?;
    trace!("Literal token: {:?}", pair);
    pair.as_str().parse::<f64>().ok()
}
