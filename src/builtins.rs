//! Host facilities exposed to programs as global names.
//!
//! The registry is consulted when a name misses every scope in the chain, so
//! programs can shadow any builtin with their own binding.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::evaluator::value::{Builtin, Namespace};
use crate::evaluator::Value;

/// Shared output sink for builtins that print. Tests hand in an in-memory
/// buffer; the CLI hands in stdout.
pub type SharedWriter = Rc<RefCell<dyn Write>>;

#[derive(Debug, Default)]
pub struct Registry {
    entries: FxHashMap<String, Value>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.entries.get(name).cloned()
    }

    /// The standard set: the `munin` object with its `print` spell, writing
    /// to `out`.
    ///
    /// `print` renders each argument's inspect form with no separator,
    /// appends a single newline, and returns null. Write failures are
    /// swallowed; printing has no error channel in the language.
    pub fn standard(out: SharedWriter) -> Self {
        let mut registry = Registry::new();
        let mut munin = Namespace::new("munin");
        munin.insert(
            "print",
            Value::Builtin(Builtin::new("print", move |args| {
                let mut out = out.borrow_mut();
                for arg in args {
                    let _ = write!(out, "{arg}");
                }
                let _ = writeln!(out);
                Value::Null
            })),
        );
        registry.register("munin", Value::Namespace(Rc::new(munin)));
        registry
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn capture() -> (Registry, Rc<RefCell<Vec<u8>>>) {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        let writer: SharedWriter = buffer.clone();
        (Registry::standard(writer), buffer)
    }

    fn print_from(registry: &Registry) -> Builtin {
        let munin = match registry.lookup("munin") {
            Some(Value::Namespace(namespace)) => namespace,
            other => panic!("expected munin namespace, got {other:?}"),
        };
        match munin.get("print") {
            Some(Value::Builtin(builtin)) => builtin.clone(),
            other => panic!("expected print builtin, got {other:?}"),
        }
    }

    #[test]
    fn standard_registry_exposes_munin_print() {
        let (registry, _) = capture();
        assert_eq!(print_from(&registry).name(), "print");
        assert_eq!(registry.lookup("huginn"), None);
    }

    #[test]
    fn print_concatenates_inspect_forms_and_ends_the_line() {
        let (registry, buffer) = capture();
        let print = print_from(&registry);
        let result = print.call(&[
            Value::Str("mana: ".to_string()),
            Value::Integer(42),
            Value::Null,
        ]);
        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8(buffer.borrow().clone()).unwrap(), "mana: 42null\n");
    }

    #[test]
    fn print_with_no_arguments_emits_a_bare_newline() {
        let (registry, buffer) = capture();
        print_from(&registry).call(&[]);
        assert_eq!(String::from_utf8(buffer.borrow().clone()).unwrap(), "\n");
    }
}
