use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::value::Value;

/// Shared handle to a scope. Closures keep their declaration scope alive
/// through this handle, so a scope can outlive the frame that created it.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// Chained name-to-value environment. Reads walk outward through enclosing
/// scopes; writes always land in the innermost scope.
#[derive(Debug, Default)]
pub struct Scope {
    store: FxHashMap<String, Value>,
    outer: Option<ScopeRef>,
}

impl Scope {
    pub fn root() -> ScopeRef {
        Rc::new(RefCell::new(Scope::default()))
    }

    pub fn enclosed(outer: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            store: FxHashMap::default(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward_through_enclosing_scopes() {
        let root = Scope::root();
        root.borrow_mut().set("x", Value::Integer(1));
        let inner = Scope::enclosed(&root);
        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(1)));
        assert_eq!(inner.borrow().get("y"), None);
    }

    #[test]
    fn writes_stay_in_the_innermost_scope() {
        let root = Scope::root();
        root.borrow_mut().set("x", Value::Integer(1));
        let inner = Scope::enclosed(&root);
        inner.borrow_mut().set("x", Value::Integer(2));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(2)));
        assert_eq!(root.borrow().get("x"), Some(Value::Integer(1)));
    }

    #[test]
    fn reads_observe_later_writes_to_enclosing_scopes() {
        let root = Scope::root();
        let inner = Scope::enclosed(&root);
        root.borrow_mut().set("n", Value::Integer(1));
        assert_eq!(inner.borrow().get("n"), Some(Value::Integer(1)));
        root.borrow_mut().set("n", Value::Integer(2));
        assert_eq!(inner.borrow().get("n"), Some(Value::Integer(2)));
    }
}
