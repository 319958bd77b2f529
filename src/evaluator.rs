//! Tree-walking evaluation with error-as-value propagation.
//!
//! Runtime failures never unwind: they become [`Value::Error`] and flow back
//! through every composition point, so the first failure in a subexpression
//! is the result of the whole statement.

use std::rc::Rc;

use crate::ast::{BinaryOperator, Block, Expression, Program, Statement, UnaryOperator};
use crate::builtins::Registry;

pub mod error;
pub mod scope;
pub mod value;

pub use error::EvalError;
pub use scope::{Scope, ScopeRef};
pub use value::Value;

use value::{ClassValue, FunctionValue};

pub struct Evaluator {
    builtins: Registry,
}

impl Evaluator {
    pub fn new(builtins: Registry) -> Self {
        Self { builtins }
    }

    /// Runs a whole program in `scope` and yields the last statement's value.
    ///
    /// A `return` at the top level terminates the program with the returned
    /// value; statements after it never run.
    pub fn eval_program(&self, program: &Program, scope: &ScopeRef) -> Value {
        let mut result = Value::Null;
        for statement in &program.statements {
            result = self.eval_statement(statement, scope);
            match result {
                Value::Return(inner) => return *inner,
                Value::Error(_) => return result,
                _ => {}
            }
        }
        result
    }

    fn eval_statement(&self, statement: &Statement, scope: &ScopeRef) -> Value {
        match statement {
            Statement::VariableDeclaration { name, value, .. } => {
                let value = self.eval_expression(value, scope);
                if value.is_error() {
                    return value;
                }
                scope.borrow_mut().set(name.clone(), value.clone());
                value
            }
            Statement::SpellDeclaration {
                name, params, body, ..
            } => {
                // The declaration scope is captured live, not snapshotted:
                // later writes to it are visible through the closure.
                let function = Value::Function(Rc::new(FunctionValue {
                    params: params.clone(),
                    body: body.clone(),
                    scope: Rc::clone(scope),
                }));
                scope.borrow_mut().set(name.clone(), function.clone());
                function
            }
            Statement::SpellbookDeclaration { name, body } => {
                let class_scope = Scope::enclosed(scope);
                for statement in body {
                    let value = self.eval_statement(statement, &class_scope);
                    if value.is_error() {
                        return value;
                    }
                }
                let class = Value::Class(Rc::new(ClassValue {
                    name: name.clone(),
                    scope: class_scope,
                }));
                scope.borrow_mut().set(name.clone(), class.clone());
                class
            }
            Statement::Return(expression) => {
                let value = match expression {
                    Some(expression) => self.eval_expression(expression, scope),
                    None => Value::Null,
                };
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
            Statement::Expr(expression) => self.eval_expression(expression, scope),
        }
    }

    /// Evaluates a block to its last statement's value, short-circuiting on
    /// `Return` and `Error` so they reach the call boundary unwrapped.
    fn eval_block(&self, block: &Block, scope: &ScopeRef) -> Value {
        let mut result = Value::Null;
        for statement in &block.statements {
            result = self.eval_statement(statement, scope);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }
        result
    }

    fn eval_expression(&self, expression: &Expression, scope: &ScopeRef) -> Value {
        match expression {
            Expression::Identifier(name) => self.eval_identifier(name, scope),
            Expression::Integer(value) => Value::Integer(*value),
            Expression::Str(value) => Value::Str(value.clone()),
            Expression::Prefix { op, right } => {
                let right = self.eval_expression(right, scope);
                if right.is_error() {
                    return right;
                }
                eval_prefix(*op, right)
            }
            Expression::Infix { left, op, right } => {
                let left = self.eval_expression(left, scope);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, scope);
                if right.is_error() {
                    return right;
                }
                eval_infix(left, *op, right)
            }
            Expression::Call { callee, args } => {
                let callee = self.eval_expression(callee, scope);
                if callee.is_error() {
                    return callee;
                }
                let args = match self.eval_expressions(args, scope) {
                    Ok(args) => args,
                    Err(error) => return error,
                };
                self.apply_function(callee, args)
            }
            Expression::Member { object, property } => {
                let object = self.eval_expression(object, scope);
                if object.is_error() {
                    return object;
                }
                eval_property_access(object, property)
            }
        }
    }

    /// User bindings shadow builtins of the same name.
    fn eval_identifier(&self, name: &str, scope: &ScopeRef) -> Value {
        if let Some(value) = scope.borrow().get(name) {
            return value;
        }
        if let Some(value) = self.builtins.lookup(name) {
            return value;
        }
        Value::Error(EvalError::IdentifierNotFound {
            name: name.to_string(),
        })
    }

    /// Evaluates arguments left to right, stopping at the first error.
    fn eval_expressions(
        &self,
        expressions: &[Expression],
        scope: &ScopeRef,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.eval_expression(expression, scope);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn apply_function(&self, callee: Value, args: Vec<Value>) -> Value {
        match callee {
            Value::Function(function) => {
                let scope = Scope::enclosed(&function.scope);
                // Arity is permissive: extra arguments are dropped, missing
                // parameters bind to null.
                for (index, param) in function.params.iter().enumerate() {
                    let value = args.get(index).cloned().unwrap_or(Value::Null);
                    scope.borrow_mut().set(param.clone(), value);
                }
                match self.eval_block(&function.body, &scope) {
                    Value::Return(value) => *value,
                    other => other,
                }
            }
            Value::Builtin(builtin) => builtin.call(&args),
            other => Value::Error(EvalError::NotAFunction { kind: other.kind() }),
        }
    }
}

fn eval_prefix(op: UnaryOperator, right: Value) -> Value {
    match (op, right) {
        (UnaryOperator::Neg, Value::Integer(value)) => Value::Integer(value.wrapping_neg()),
        (op, right) => Value::Error(EvalError::UnknownPrefixOperator {
            operator: op.to_string(),
            kind: right.kind(),
        }),
    }
}

/// Anything other than integer-with-integer or string-with-string is a type
/// mismatch, even when the kinds agree.
fn eval_infix(left: Value, op: BinaryOperator, right: Value) -> Value {
    match (left, right) {
        (Value::Integer(left), Value::Integer(right)) => eval_integer_infix(left, op, right),
        (Value::Str(left), Value::Str(right)) => match op {
            BinaryOperator::Add => Value::Str(left + &right),
            op => Value::Error(EvalError::UnknownOperator {
                operator: op.to_string(),
            }),
        },
        (left, right) => Value::Error(EvalError::TypeMismatch {
            left: left.kind(),
            operator: op.to_string(),
            right: right.kind(),
        }),
    }
}

/// Integer arithmetic wraps on overflow. Comparison operators parse but have
/// no evaluation rule, so they report an unknown operator.
fn eval_integer_infix(left: i64, op: BinaryOperator, right: i64) -> Value {
    match op {
        BinaryOperator::Add => Value::Integer(left.wrapping_add(right)),
        BinaryOperator::Sub => Value::Integer(left.wrapping_sub(right)),
        BinaryOperator::Mul => Value::Integer(left.wrapping_mul(right)),
        BinaryOperator::Div => {
            if right == 0 {
                Value::Error(EvalError::DivisionByZero)
            } else {
                Value::Integer(left.wrapping_div(right))
            }
        }
        op => Value::Error(EvalError::UnknownOperator {
            operator: op.to_string(),
        }),
    }
}

fn eval_property_access(object: Value, property: &str) -> Value {
    match object {
        Value::Namespace(namespace) => match namespace.get(property) {
            Some(value) => value.clone(),
            None => Value::Error(EvalError::PropertyNotFound {
                property: property.to_string(),
            }),
        },
        Value::Instance(_) => Value::Error(EvalError::PropertyAccessUnimplemented {
            kind: "instances",
        }),
        Value::Class(_) => Value::Error(EvalError::PropertyAccessUnimplemented { kind: "classes" }),
        other => Value::Error(EvalError::PropertyUnsupported {
            property: property.to_string(),
            kind: other.kind(),
        }),
    }
}
