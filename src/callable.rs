use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::env::{Environment, EnvironmentRef};
use crate::error::{LoxideError, RuntimeError};
use crate::expr::NameNode;
use crate::interp::{InterpreterContext, InterpreterError, InterpreterOps};
use crate::stmt::{FunctionDeclaration, StmtNode};
use crate::token::Span;
use crate::value::Value;

type CallResult = Result<Value, LoxideError>;

#[derive(Clone, Debug)]
pub(crate) enum Callables {
    Fn(Rc<Function>),
    Builtin(Rc<Builtins>),
    Clazz(Rc<Class>),
}

impl Callables {
    pub(crate) fn call(
        &self,
        context: &mut InterpreterContext,
        args: &[Value],
        span: Span,
    ) -> CallResult {
        match self {
            Callables::Fn(f) => f.call(context, args, span),
            Callables::Builtin(b) => b.call(context, args, span),
            Callables::Clazz(c) => Class::construct(c, context, args, span),
        }
    }

    pub(crate) fn arity(&self) -> usize {
        match self {
            Callables::Fn(f) => f.arity(),
            Callables::Builtin(b) => b.arity(),
            Callables::Clazz(c) => c.arity(),
        }
    }
}

#[derive(Clone)]
pub struct Function {
    name: Rc<str>,
    params: Rc<[NameNode]>,
    body: Rc<[StmtNode]>,
    closure: EnvironmentRef,
    is_init: bool,
}

impl Function {
    pub(crate) fn new(
        declaration: &FunctionDeclaration,
        closure: EnvironmentRef,
        is_init: bool,
    ) -> Self {
        Self {
            name: Rc::clone(&declaration.name.item),
            params: Rc::clone(&declaration.params),
            body: Rc::clone(&declaration.body),
            closure,
            is_init,
        }
    }

    /// A bound method is a fresh function value whose closure is a child of
    /// the original closure with `this` defined to the instance.
    pub(crate) fn bind(&self, instance: Rc<Instance>) -> Self {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define(Rc::from("this"), Value::Instance(instance));
        Self {
            name: Rc::clone(&self.name),
            params: Rc::clone(&self.params),
            body: Rc::clone(&self.body),
            closure: environment.into(),
            is_init: self.is_init,
        }
    }

    pub(crate) fn call(
        &self,
        context: &mut InterpreterContext,
        args: &[Value],
        span: Span,
    ) -> CallResult {
        // Each call gets its own environment under the captured closure,
        // so recursive calls don't share parameter bindings.
        let mut fun_environment = Environment::with_enclosing(self.closure.clone());
        for (param, arg) in self.params.iter().zip(args) {
            fun_environment.define(Rc::clone(&param.item), arg.clone());
        }

        match InterpreterOps::eval_stmts(context, &self.body, fun_environment.into()) {
            Ok(()) => {
                if self.is_init {
                    self.this(span)
                } else {
                    Ok(Value::Nil)
                }
            }
            Err(InterpreterError::Return(value)) => {
                // an initializer returns the instance even on a bare `return;`
                if self.is_init {
                    self.this(span)
                } else {
                    Ok(value)
                }
            }
            Err(InterpreterError::Err(error)) => Err(error),
        }
    }

    pub(crate) fn arity(&self) -> usize {
        self.params.len()
    }

    // An initializer's closure is the binding environment, so `this` sits
    // at distance zero.
    fn this(&self, span: Span) -> CallResult {
        self.closure
            .borrow()
            .get_at("this", 0)
            .ok_or_else(|| RuntimeError::internal("'this' missing from initializer closure", span))
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

impl Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

pub struct Class {
    name: Rc<str>,
    superclass: Option<Rc<Class>>,
    methods: HashMap<Rc<str>, Function>,
}

impl Class {
    pub(crate) fn new(
        name: Rc<str>,
        superclass: Option<Rc<Class>>,
        methods: HashMap<Rc<str>, Function>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Methods are looked up on the class first, then up the superclass
    /// chain.
    pub(crate) fn find_method(&self, name: &str) -> Option<&Function> {
        match self.methods.get(name) {
            Some(method) => Some(method),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }

    /// Calling a class builds an instance and runs `init` on it when the
    /// class (or an ancestor) declares one.
    fn construct(
        class: &Rc<Class>,
        context: &mut InterpreterContext,
        args: &[Value],
        span: Span,
    ) -> CallResult {
        let instance = Rc::new(Instance::new(Rc::clone(class)));
        if let Some(initializer) = class.find_method("init") {
            initializer
                .bind(Rc::clone(&instance))
                .call(context, args, span)?;
        }
        Ok(instance.into())
    }

    pub(crate) fn arity(&self) -> usize {
        self.find_method("init").map_or(0, Function::arity)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

pub struct Instance {
    class: Rc<Class>,
    fields: RefCell<HashMap<Rc<str>, Value>>,
}

impl Instance {
    fn new(class: Rc<Class>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    /// Fields shadow methods. A method read off an instance comes back
    /// bound to that same shared instance, which is why lookup takes the
    /// `Rc` rather than `&self`.
    pub(crate) fn get(instance: &Rc<Instance>, name: &str) -> Option<Value> {
        if let Some(field) = instance.fields.borrow().get(name) {
            return Some(field.clone());
        }
        instance
            .class
            .find_method(name)
            .map(|method| Value::Fun(Rc::new(method.bind(Rc::clone(instance)))))
    }

    pub(crate) fn set(&self, name: Rc<str>, value: Value) {
        self.fields.borrow_mut().insert(name, value);
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.name())
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Builtins {
    Clock(Clock),
}

impl Builtins {
    fn call(&self, context: &mut InterpreterContext, args: &[Value], span: Span) -> CallResult {
        match self {
            Builtins::Clock(c) => c.call(context, args, span),
        }
    }

    fn arity(&self) -> usize {
        match self {
            Builtins::Clock(c) => c.arity(),
        }
    }
}

impl Display for Builtins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<native fun>")
    }
}

// Built-in function (the only one really)
#[derive(Copy, Clone, PartialEq)]
pub struct Clock;

impl Clock {
    pub(crate) fn name(&self) -> &str {
        "clock"
    }

    fn call(&self, _: &mut InterpreterContext, _args: &[Value], _span: Span) -> CallResult {
        Ok(SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64())
            .into())
    }

    fn arity(&self) -> usize {
        0
    }
}

impl Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fun>")
    }
}
