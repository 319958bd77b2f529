use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::ast::Block;

use super::error::EvalError;
use super::scope::ScopeRef;

/// Runtime value kinds. All are immutable once constructed; sharing happens
/// through `Rc` so values stay cheap to clone.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Str(String),
    Function(Rc<FunctionValue>),
    Builtin(Builtin),
    Namespace(Rc<Namespace>),
    Class(Rc<ClassValue>),
    Instance(Rc<InstanceValue>),
    Null,
    /// Control-flow carrier that unwinds to the nearest call boundary.
    /// Never observable outside evaluation.
    Return(Box<Value>),
    Error(EvalError),
}

impl Value {
    /// Legacy type-tag name used inside error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Str(_) => "STRING",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Namespace(_) => "BUILTIN_OBJECT",
            Value::Class(_) => "CLASS",
            Value::Instance(_) => "INSTANCE",
            Value::Null => "NULL",
            Value::Return(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Str(value) => f.write_str(value),
            Value::Function(function) => {
                write!(f, "spell({}):\n{}", function.params.join(", "), function.body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Namespace(_) => f.write_str("builtin object"),
            Value::Class(class) => write!(f, "<class {}>", class.name),
            Value::Instance(instance) => write!(f, "<instance of {}>", instance.class.name),
            Value::Null => f.write_str("null"),
            Value::Return(value) => write!(f, "{value}"),
            Value::Error(error) => write!(f, "ERROR: {error}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(left), Value::Integer(right)) => left == right,
            (Value::Str(left), Value::Str(right)) => left == right,
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            (Value::Builtin(left), Value::Builtin(right)) => left == right,
            (Value::Namespace(left), Value::Namespace(right)) => Rc::ptr_eq(left, right),
            (Value::Class(left), Value::Class(right)) => Rc::ptr_eq(left, right),
            (Value::Instance(left), Value::Instance(right)) => Rc::ptr_eq(left, right),
            (Value::Null, Value::Null) => true,
            (Value::Return(left), Value::Return(right)) => left == right,
            (Value::Error(left), Value::Error(right)) => left == right,
            _ => false,
        }
    }
}

/// A user-declared spell: parameters, body, and the scope that was live at
/// its declaration site. The scope reference is what makes it a closure.
pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Block,
    pub scope: ScopeRef,
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The captured scope can point back at this function; skip it.
        f.debug_struct("FunctionValue")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Native callback registered by the host, keyed by name.
#[derive(Clone)]
pub struct Builtin {
    name: &'static str,
    func: Rc<dyn Fn(&[Value]) -> Value>,
}

impl Builtin {
    pub fn new(name: &'static str, func: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            name,
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Arguments pass through verbatim; builtins do their own checking.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Rc::ptr_eq(&self.func, &other.func)
    }
}

/// Host-provided object exposing named members, e.g. the `munin` facility.
#[derive(Debug, Default)]
pub struct Namespace {
    name: &'static str,
    properties: FxHashMap<String, Value>,
}

impl Namespace {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            properties: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn insert(&mut self, property: impl Into<String>, value: Value) {
        self.properties.insert(property.into(), value);
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }
}

/// Result of evaluating a spellbook declaration: the body's bindings live on
/// in `scope` for the class's lifetime.
pub struct ClassValue {
    pub name: String,
    pub scope: ScopeRef,
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassValue")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Modeled but never constructed: instantiation has no defined evaluation
/// behavior yet, so property access on instances reports unimplemented.
pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    pub scope: ScopeRef,
}

impl fmt::Debug for InstanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceValue")
            .field("class", &self.class.name)
            .finish_non_exhaustive()
    }
}
