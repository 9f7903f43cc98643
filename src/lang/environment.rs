use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::value::Value;

/// Shared handle to a scope. Function values capture one of these.
pub type Env = Rc<RefCell<Environment>>;

/// A variable scope linked to its enclosing scope.
///
/// Lookups walk outward through `outer`; bindings always land in the
/// innermost scope.
#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a child scope whose lookups fall back to `outer`.
    pub fn enclosed(outer: &Env) -> Env {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref().and_then(|o| o.borrow().get(name)),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Value {
        self.store.insert(name.into(), value.clone());
        value
    }
}

impl fmt::Debug for Environment {
    // Values may hold functions that capture this very scope, so only the
    // names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.store.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("has_outer", &self.outer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let env = Environment::new();
        env.borrow_mut().set("x", Value::Integer(5));
        assert_eq!(env.borrow().get("x"), Some(Value::Integer(5)));
        assert_eq!(env.borrow().get("y"), None);
    }

    #[test]
    fn test_enclosed_falls_back_to_outer() {
        let outer = Environment::new();
        outer.borrow_mut().set("x", Value::Integer(1));
        outer.borrow_mut().set("y", Value::Integer(2));

        let inner = Environment::enclosed(&outer);
        inner.borrow_mut().set("x", Value::Integer(10));

        assert_eq!(inner.borrow().get("x"), Some(Value::Integer(10)));
        assert_eq!(inner.borrow().get("y"), Some(Value::Integer(2)));
        // shadowing never leaks outward
        assert_eq!(outer.borrow().get("x"), Some(Value::Integer(1)));
    }
}
