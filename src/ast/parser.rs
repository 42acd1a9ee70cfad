use crate::ast::{ASTNode, Operator, Token};
use crate::error::EvalError;
use log::debug;

/// Deepest nesting a formula may have, counting groups, negations and
/// operator chains. Deeper input is rejected at the token that crosses it.
pub const MAX_DEPTH: usize = 256;

/// Builds an [`ASTNode`] from an already segmented token sequence.
///
/// Precedence, from loosest to tightest: `+ -`, `* /`, unary `-`, `^`.
/// Binary `+ - * /` associate to the left, `^` to the right.
pub struct FormulaParser;

/// A subtree with its height.
type Built = (ASTNode, usize);

struct TokenStream<'a> {
    tokens: Vec<(&'a str, Token<'a>)>,
    cursor: usize,
    depth: usize,
}

impl<'a> TokenStream<'a> {
    fn peek(&self) -> Option<&(&'a str, Token<'a>)> {
        self.tokens.get(self.cursor)
    }

    fn next(&mut self) -> Option<(usize, &'a str, Token<'a>)> {
        let position = self.cursor;
        let (text, token) = self.tokens.get(position)?.clone();
        self.cursor += 1;
        Some((position, text, token))
    }

    /// Consumes the next token if it is one of `operators`, returning it with its position.
    fn eat_operator(&mut self, operators: &[Operator]) -> Option<(usize, Operator)> {
        match self.peek() {
            Some((_, Token::Operator(operator))) if operators.contains(operator) => {
                let operator = *operator;
                self.cursor += 1;
                Some((self.cursor - 1, operator))
            }
            _ => None,
        }
    }

    fn follows_open_paren(&self, position: usize) -> bool {
        position > 0 && matches!(self.tokens[position - 1].1, Token::OpenParen)
    }

    fn too_deep(&self, position: usize) -> EvalError {
        EvalError::unexpected(self.tokens[position].0, position)
    }

    /// Recursion guard, paired with `leave`.
    fn enter(&mut self, position: usize) -> Result<(), EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep(position));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Left-associative chains are built in a loop, so their height is checked here.
    fn node(&self, ast: ASTNode, height: usize, position: usize) -> Result<Built, EvalError> {
        if height > MAX_DEPTH {
            return Err(self.too_deep(position));
        }
        Ok((ast, height))
    }
}

impl FormulaParser {
    pub fn parse_formula<S: AsRef<str>>(tokens: &[S]) -> Result<ASTNode, EvalError> {
        debug!("Parsing formula of {} tokens", tokens.len());
        let classified: Vec<(&str, Token)> = tokens
            .iter()
            .map(|text| {
                let text = text.as_ref();
                (text, Token::classify(text))
            })
            .collect();

        Self::check_balance(&classified)?;

        let mut stream = TokenStream {
            tokens: classified,
            cursor: 0,
            depth: 0,
        };
        let (node, _) = Self::build_arithmetic_expression(&mut stream)?;

        // Anything left over follows a complete operand.
        if let Some((position, text, _)) = stream.next() {
            return Err(EvalError::unexpected(text, position));
        }

        debug!("Parse result: {:?}", node);
        Ok(node)
    }

    fn check_balance(tokens: &[(&str, Token)]) -> Result<(), EvalError> {
        let mut open = Vec::new();
        for (position, (_, token)) in tokens.iter().enumerate() {
            match token {
                Token::OpenParen => open.push(position),
                Token::CloseParen => {
                    if open.pop().is_none() {
                        return Err(EvalError::UnbalancedParens { position });
                    }
                }
                _ => {}
            }
        }
        match open.first() {
            Some(&position) => Err(EvalError::UnbalancedParens { position }),
            None => Ok(()),
        }
    }

    fn build_arithmetic_expression(stream: &mut TokenStream) -> Result<Built, EvalError> {
        let (mut node, mut height) = Self::build_term(stream)?;

        while let Some((position, operator)) =
            stream.eat_operator(&[Operator::Add, Operator::Subtract])
        {
            let (right, right_height) = Self::build_term(stream)?;
            (node, height) = stream.node(
                ASTNode::BinaryOperation {
                    left: Box::new(node),
                    operator,
                    right: Box::new(right),
                },
                height.max(right_height) + 1,
                position,
            )?;
        }

        Ok((node, height))
    }

    fn build_term(stream: &mut TokenStream) -> Result<Built, EvalError> {
        let (mut node, mut height) = Self::build_unary(stream)?;

        while let Some((position, operator)) =
            stream.eat_operator(&[Operator::Multiply, Operator::Divide])
        {
            let (right, right_height) = Self::build_unary(stream)?;
            (node, height) = stream.node(
                ASTNode::BinaryOperation {
                    left: Box::new(node),
                    operator,
                    right: Box::new(right),
                },
                height.max(right_height) + 1,
                position,
            )?;
        }

        Ok((node, height))
    }

    /// A `-` in operand position negates what follows.
    fn build_unary(stream: &mut TokenStream) -> Result<Built, EvalError> {
        if let Some((position, _)) = stream.eat_operator(&[Operator::Subtract]) {
            stream.enter(position)?;
            let (inner, height) = Self::build_unary(stream)?;
            stream.leave();
            return stream.node(ASTNode::Negate(Box::new(inner)), height + 1, position);
        }
        Self::build_power(stream)
    }

    fn build_power(stream: &mut TokenStream) -> Result<Built, EvalError> {
        let (base, base_height) = Self::build_primary_expression(stream)?;

        if let Some((position, operator)) = stream.eat_operator(&[Operator::Power]) {
            // Recursing through unary keeps `^` right-associative and allows `2 ^ - 1`.
            stream.enter(position)?;
            let (exponent, exponent_height) = Self::build_unary(stream)?;
            stream.leave();
            return stream.node(
                ASTNode::BinaryOperation {
                    left: Box::new(base),
                    operator,
                    right: Box::new(exponent),
                },
                base_height.max(exponent_height) + 1,
                position,
            );
        }

        Ok((base, base_height))
    }

    fn build_primary_expression(stream: &mut TokenStream) -> Result<Built, EvalError> {
        let (position, text, token) = stream.next().ok_or(EvalError::IncompleteExpression)?;

        match token {
            Token::Number(value) => Ok((ASTNode::Number(value), 0)),
            Token::Identifier(name) => Ok((ASTNode::Identifier(name.to_string()), 0)),
            Token::OpenParen => {
                stream.enter(position)?;
                let (inner, height) = Self::build_arithmetic_expression(stream)?;
                stream.leave();
                match stream.next() {
                    Some((_, _, Token::CloseParen)) => {
                        stream.node(ASTNode::Group(Box::new(inner)), height + 1, position)
                    }
                    Some((position, text, _)) => Err(EvalError::unexpected(text, position)),
                    None => Err(EvalError::UnbalancedParens { position }),
                }
            }
            // `( )` has nothing to group, `( 1 + )` stops mid-operator.
            Token::CloseParen if stream.follows_open_paren(position) => {
                Err(EvalError::unexpected(text, position))
            }
            Token::CloseParen => Err(EvalError::IncompleteExpression),
            Token::Operator(_) => Err(EvalError::unexpected(text, position)),
        }
    }
}
