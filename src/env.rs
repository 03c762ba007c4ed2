use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    callable::{Builtins, Clock},
    value::Value,
};

pub(crate) type EnvironmentRef = Rc<RefCell<Environment>>;

/// One scope record. Environments chain from the innermost scope out to the
/// globals; closures and instances share them, which is why they live behind
/// `Rc<RefCell<..>>`.
#[derive(Debug)]
pub(crate) struct Environment {
    enclosing: Option<EnvironmentRef>,
    values: HashMap<Rc<str>, Value>,
}

impl Environment {
    pub(crate) fn new() -> Self {
        Self {
            enclosing: None,
            values: HashMap::new(),
        }
    }

    pub(crate) fn with_enclosing(enclosing: EnvironmentRef) -> Self {
        Self {
            enclosing: Some(enclosing),
            values: HashMap::new(),
        }
    }

    pub(crate) fn define(&mut self, name: Rc<str>, value: Value) {
        let _ = self.values.insert(name, value);
    }

    /// Looks only in this scope's own map. Resolved variables climb the
    /// chain with `get_at`; unresolved ones go straight to the globals.
    pub(crate) fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    pub(crate) fn assign(&mut self, name: &str, value: Value) -> bool {
        match self.values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Climbs exactly `distance` parents and reads that scope's own map.
    pub(crate) fn get_at(&self, name: &str, distance: usize) -> Option<Value> {
        match distance {
            0 => self.get(name),
            d => match &self.enclosing {
                Some(enclosing) => enclosing.borrow().get_at(name, d - 1),
                None => None,
            },
        }
    }

    pub(crate) fn assign_at(&mut self, name: &str, value: Value, distance: usize) -> bool {
        match distance {
            0 => self.assign(name, value),
            d => match &self.enclosing {
                Some(enclosing) => enclosing.borrow_mut().assign_at(name, value, d - 1),
                None => false,
            },
        }
    }
}

impl From<Environment> for EnvironmentRef {
    fn from(env: Environment) -> Self {
        Rc::new(RefCell::new(env))
    }
}

impl Default for Environment {
    fn default() -> Self {
        let mut globals = Environment::new();
        globals.define(
            Rc::from(Clock.name()),
            Value::Builtin(Rc::new(Builtins::Clock(Clock))),
        );
        globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define() {
        let mut env = Environment::new();

        assert_eq!(env.get("foo"), None);
        env.define(Rc::from("foo"), Value::Number(42.0));
        assert_eq!(env.get("foo"), Some(Value::Number(42.0)));
        env.define(Rc::from("foo"), Value::Nil);
        assert_eq!(env.get("foo"), Some(Value::Nil));
    }

    #[test]
    fn test_assign() {
        let mut env = Environment::new();

        assert!(!env.assign("foo", Value::Boolean(true)));
        env.define(Rc::from("foo"), Value::Boolean(false));
        assert!(env.assign("foo", Value::Boolean(true)));
        assert_eq!(env.get("foo"), Some(Value::Boolean(true)));
    }

    #[test]
    fn test_get_at_climbs_exactly() {
        let mut outer = Environment::new();
        outer.define(Rc::from("foo"), Value::Number(1.0));
        let outer = EnvironmentRef::from(outer);

        let middle = EnvironmentRef::from(Environment::with_enclosing(outer.clone()));
        let inner = Environment::with_enclosing(middle.clone());

        // the name is two hops out, not one and not zero
        assert_eq!(inner.get_at("foo", 2), Some(Value::Number(1.0)));
        assert_eq!(inner.get_at("foo", 1), None);
        assert_eq!(inner.get_at("foo", 0), None);
    }

    #[test]
    fn test_assign_at_targets_one_scope() {
        let mut outer = Environment::new();
        outer.define(Rc::from("foo"), Value::Number(1.0));
        let outer = EnvironmentRef::from(outer);

        let mut inner = Environment::with_enclosing(outer.clone());
        inner.define(Rc::from("foo"), Value::Number(2.0));

        assert!(inner.assign_at("foo", Value::Number(3.0), 1));
        assert_eq!(outer.borrow().get("foo"), Some(Value::Number(3.0)));
        // the shadowing binding is untouched
        assert_eq!(inner.get("foo"), Some(Value::Number(2.0)));
    }

    #[test]
    fn test_default_globals_hold_clock() {
        let globals = Environment::default();
        assert!(matches!(globals.get("clock"), Some(Value::Builtin(_))));
    }
}
