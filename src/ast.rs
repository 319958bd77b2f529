//! Syntax tree produced by the parser and walked by the evaluator.
//!
//! Every node renders back to source-shaped text via `Display`; the rendering
//! is used for diagnostics and is stable enough to re-parse for simple
//! statements and expressions.

use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    VariableDeclaration {
        name: String,
        type_hint: Option<String>,
        value: Expression,
    },
    SpellbookDeclaration {
        name: String,
        body: Vec<Statement>,
    },
    SpellDeclaration {
        name: String,
        params: Vec<String>,
        return_type: Option<String>,
        body: Block,
    },
    Return(Option<Expression>),
    Expr(Expression),
}

/// Ordered statements between an INDENT and its matching DEDENT.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(String),
    Integer(i64),
    Str(String),
    Prefix {
        op: UnaryOperator,
        right: Box<Expression>,
    },
    Infix {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    Member {
        object: Box<Expression>,
        property: String,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Less,
    Greater,
    Eq,
    NotEq,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOperator {
    Neg,
    Not,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Not => "!",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::VariableDeclaration {
                name,
                type_hint,
                value,
            } => {
                if let Some(hint) = type_hint {
                    write!(f, "{name}:{hint} = {value}")
                } else {
                    write!(f, "{name} = {value}")
                }
            }
            Statement::SpellbookDeclaration { name, body } => {
                writeln!(f, "spellbook {name}:")?;
                for statement in body {
                    writeln!(f, "    {statement}")?;
                }
                Ok(())
            }
            Statement::SpellDeclaration {
                name,
                params,
                return_type,
                body,
            } => {
                write!(f, "spell {name}({})", params.join(", "))?;
                if let Some(return_type) = return_type {
                    write!(f, " -> {return_type}")?;
                }
                writeln!(f, ":")?;
                for statement in &body.statements {
                    writeln!(f, "    {statement}")?;
                }
                Ok(())
            }
            Statement::Return(None) => f.write_str("return"),
            Statement::Return(Some(value)) => write!(f, "return {value}"),
            Statement::Expr(expression) => write!(f, "{expression}"),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => f.write_str(name),
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Str(value) => write!(f, "\"{value}\""),
            // The grammar has no parenthesized-expression rule, so renderings
            // stay paren-free; precedence alone reproduces the tree on
            // re-parse.
            Expression::Prefix { op, right } => write!(f, "{op}{right}"),
            Expression::Infix { left, op, right } => write!(f, "{left} {op} {right}"),
            Expression::Call { callee, args } => {
                let rendered = args
                    .iter()
                    .map(Expression::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{callee}({rendered})")
            }
            Expression::Member { object, property } => write!(f, "{object}.{property}"),
        }
    }
}
