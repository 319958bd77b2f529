use thiserror::Error;

use crate::ast::{BinaryOperator, Block, Expression, Program, Statement, UnaryOperator};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// A recorded parse failure. Parsing never aborts on one of these; callers
/// inspect [`Parser::errors`] after `parse_program` returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// Binding strength for the expression grammar, weakest first. Equal-strength
/// operators fold left because each infix rule recurses with its own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Member,
}

fn precedence_of(kind: &TokenKind<'_>) -> Precedence {
    match kind {
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Less | TokenKind::Greater => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Star | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::Dot => Precedence::Member,
        _ => Precedence::Lowest,
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    peek: Token<'a>,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            errors: Vec::new(),
        }
    }

    /// Parses the whole input on a best-effort basis. A failed statement
    /// records an error and produces no node; check [`errors`](Self::errors)
    /// before trusting the returned program.
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !matches!(self.current.kind, TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance();
        }
        Program { statements }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.kind {
            TokenKind::Identifier(_)
                if matches!(self.peek.kind, TokenKind::Assign | TokenKind::Colon) =>
            {
                self.parse_variable_declaration()
            }
            TokenKind::Spellbook => self.parse_spellbook_declaration(),
            TokenKind::Spell => self.parse_spell_declaration(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Newline => None,
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_variable_declaration(&mut self) -> Option<Statement> {
        let name = match self.current.kind {
            TokenKind::Identifier(name) => name.to_string(),
            _ => return None,
        };
        self.advance();

        let mut type_hint = None;
        if matches!(self.current.kind, TokenKind::Colon) {
            self.advance();
            match self.current.kind {
                TokenKind::Identifier(hint) => {
                    type_hint = Some(hint.to_string());
                    self.advance();
                }
                _ => {
                    self.error_at_current("expected type identifier after ':'");
                    return None;
                }
            }
        }

        if !matches!(self.current.kind, TokenKind::Assign) {
            self.error_at_current("expected '=' after variable declaration");
            return None;
        }
        self.advance();

        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::VariableDeclaration {
            name,
            type_hint,
            value,
        })
    }

    fn parse_spellbook_declaration(&mut self) -> Option<Statement> {
        self.advance();
        let name = match self.current.kind {
            TokenKind::Identifier(name) => name.to_string(),
            _ => {
                self.error_at_current("expected identifier after 'spellbook'");
                return None;
            }
        };
        self.advance();

        if !matches!(self.current.kind, TokenKind::Colon) {
            self.error_at_current("expected ':' after spellbook name");
            return None;
        }
        self.advance();

        if !matches!(self.current.kind, TokenKind::Newline) {
            self.error_at_current("expected newline after ':'");
            return None;
        }
        self.advance();

        if !matches!(self.current.kind, TokenKind::Indent) {
            self.error_at_current("expected indentation after spellbook declaration");
            return None;
        }
        self.advance();

        let mut body = Vec::new();
        while !matches!(self.current.kind, TokenKind::Dedent | TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                body.push(statement);
            }
            self.advance();
        }

        Some(Statement::SpellbookDeclaration { name, body })
    }

    fn parse_spell_declaration(&mut self) -> Option<Statement> {
        self.advance();
        let name = match self.current.kind {
            TokenKind::Identifier(name) => name.to_string(),
            _ => {
                self.error_at_current("expected spell name after 'spell'");
                return None;
            }
        };
        self.advance();

        if !matches!(self.current.kind, TokenKind::LParen) {
            self.error_at_current("expected '(' after spell name");
            return None;
        }
        let params = self.parse_spell_parameters()?;

        let mut return_type = None;
        if matches!(self.peek.kind, TokenKind::Arrow) {
            self.advance();
            self.advance();
            match self.current.kind {
                TokenKind::Identifier(name) => return_type = Some(name.to_string()),
                _ => {
                    self.error_at_current("expected return type identifier after '->'");
                    return None;
                }
            }
        }

        if !self.expect_peek(TokenKind::Colon) {
            return None;
        }
        if !self.expect_peek(TokenKind::Newline) {
            return None;
        }
        if !self.expect_peek(TokenKind::Indent) {
            return None;
        }
        self.advance();

        let body = self.parse_block();
        Some(Statement::SpellDeclaration {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_spell_parameters(&mut self) -> Option<Vec<String>> {
        let mut params = Vec::new();

        if matches!(self.peek.kind, TokenKind::RParen) {
            self.advance();
            return Some(params);
        }

        self.advance();
        params.push(self.parameter_name()?);

        while matches!(self.peek.kind, TokenKind::Comma) {
            self.advance();
            self.advance();
            params.push(self.parameter_name()?);
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(params)
    }

    fn parameter_name(&mut self) -> Option<String> {
        match self.current.kind {
            TokenKind::Identifier(name) => Some(name.to_string()),
            _ => {
                self.error_at_current("expected parameter name");
                None
            }
        }
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        if matches!(
            self.peek.kind,
            TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
        ) {
            return Some(Statement::Return(None));
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Return(Some(value)))
    }

    fn parse_block(&mut self) -> Block {
        let mut statements = Vec::new();
        while !matches!(self.current.kind, TokenKind::Dedent | TokenKind::Eof) {
            if let Some(statement) = self.parse_statement() {
                statements.push(statement);
            }
            self.advance();
        }
        Block { statements }
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        Some(Statement::Expr(expression))
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !matches!(self.peek.kind, TokenKind::Newline)
            && precedence < precedence_of(&self.peek.kind)
        {
            left = match self.peek.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::Eq
                | TokenKind::NotEq => {
                    self.advance();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LParen => {
                    self.advance();
                    self.parse_call_expression(left)?
                }
                TokenKind::Dot => {
                    self.advance();
                    self.parse_member_expression(left)?
                }
                _ => break,
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.current.kind {
            TokenKind::Identifier(name) => Some(Expression::Identifier(name.to_string())),
            TokenKind::Int(text) => match text.parse::<i64>() {
                Ok(value) => Some(Expression::Integer(value)),
                Err(_) => {
                    self.error_at_current(format!("could not parse {text} as integer"));
                    None
                }
            },
            TokenKind::Str(value) => Some(Expression::Str(value.to_string())),
            TokenKind::Minus => self.parse_prefix_expression(UnaryOperator::Neg),
            TokenKind::Bang => self.parse_prefix_expression(UnaryOperator::Not),
            kind => {
                self.error_at_current(format!("no prefix parse function for {kind} found"));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self, op: UnaryOperator) -> Option<Expression> {
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix {
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let op = match self.current.kind {
            TokenKind::Plus => BinaryOperator::Add,
            TokenKind::Minus => BinaryOperator::Sub,
            TokenKind::Star => BinaryOperator::Mul,
            TokenKind::Slash => BinaryOperator::Div,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::Eq => BinaryOperator::Eq,
            TokenKind::NotEq => BinaryOperator::NotEq,
            _ => return None,
        };
        let precedence = precedence_of(&self.current.kind);
        self.advance();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix {
            left: Box::new(left),
            op,
            right: Box::new(right),
        })
    }

    fn parse_call_expression(&mut self, callee: Expression) -> Option<Expression> {
        let args = self.parse_call_arguments()?;
        Some(Expression::Call {
            callee: Box::new(callee),
            args,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut args = Vec::new();

        if matches!(self.peek.kind, TokenKind::RParen) {
            self.advance();
            return Some(args);
        }

        self.advance();
        args.push(self.parse_expression(Precedence::Lowest)?);

        while matches!(self.peek.kind, TokenKind::Comma) {
            self.advance();
            self.advance();
            args.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(args)
    }

    fn parse_member_expression(&mut self, object: Expression) -> Option<Expression> {
        match self.peek.kind {
            TokenKind::Identifier(property) => {
                let property = property.to_string();
                self.advance();
                Some(Expression::Member {
                    object: Box::new(object),
                    property,
                })
            }
            _ => {
                self.error_at_current("expected identifier after '.'");
                None
            }
        }
    }

    fn expect_peek(&mut self, expected: TokenKind<'_>) -> bool {
        if std::mem::discriminant(&self.peek.kind) == std::mem::discriminant(&expected) {
            self.advance();
            true
        } else {
            self.errors.push(ParseError {
                message: format!(
                    "expected next token to be {expected}, got {} instead",
                    self.peek.kind
                ),
                line: self.peek.span.line,
                column: self.peek.span.column,
            });
            false
        }
    }

    fn error_at_current(&mut self, message: impl Into<String>) {
        self.errors.push(ParseError {
            message: message.into(),
            line: self.current.span.line,
            column: self.current.span.column,
        });
    }

    fn advance(&mut self) {
        self.current = self.peek;
        self.peek = self.lexer.next_token();
    }
}

/// Convenience wrapper: parse `input` and fail with the accumulated error
/// list if anything went wrong.
pub fn parse(input: &str) -> Result<Program, Vec<ParseError>> {
    let mut parser = Parser::new(input);
    let program = parser.parse_program();
    if parser.errors().is_empty() {
        Ok(program)
    } else {
        Err(parser.errors.clone())
    }
}
