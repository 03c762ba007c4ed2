use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxideError, ResolveError};
use crate::expr::{Expr, ExprNode, NameNode};
use crate::interp::InterpreterContext;
use crate::node::ExprId;
use crate::stmt::{ClassDeclaration, FunctionDeclaration, Stmt, StmtNode};

/// Walks the statement list once, recording the hop distance of every local
/// variable use into the interpreter's side-table and collecting placement
/// errors. All resolver errors are non-synchronizing: the walk always
/// continues, and the caller decides whether to execute.
pub fn resolve(statements: &[StmtNode], context: &mut InterpreterContext) -> Vec<LoxideError> {
    let mut resolver = Resolver::new(&mut context.locals);
    for statement in statements {
        resolver.resolve_stmt(statement);
    }
    debug!(
        "resolved {} statement(s), {} error(s)",
        statements.len(),
        resolver.errors.len()
    );
    resolver.errors
}

struct Resolver<'ctx> {
    locals: &'ctx mut HashMap<ExprId, usize>,
    // A scope maps names to their state. Variables are declared first and
    // defined once their initializer has been resolved; the two states are
    // not necessarily entered in the same statement.
    scopes: Vec<HashMap<Rc<str>, VarState>>,
    current_function: FunctionKind,
    current_class: ClassKind,
    errors: Vec<LoxideError>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum VarState {
    Declared,
    Defined,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassKind {
    None,
    Class,
    Subclass,
}

impl<'ctx> Resolver<'ctx> {
    fn new(locals: &'ctx mut HashMap<ExprId, usize>) -> Self {
        Self {
            locals,
            scopes: Vec::new(),
            current_function: FunctionKind::None,
            current_class: ClassKind::None,
            errors: Vec::new(),
        }
    }

    fn resolve_stmt(&mut self, stmt: &StmtNode) {
        match &*stmt.item {
            Stmt::Block(statements) => {
                self.begin_scope();
                for statement in statements {
                    self.resolve_stmt(statement);
                }
                self.end_scope();
            }
            Stmt::Class(declaration) => self.resolve_class(declaration),
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Function(declaration) => {
                // declared and defined up front so the body may recurse
                self.declare(&declaration.name);
                self.define(&declaration.name.item);
                self.resolve_function(declaration, FunctionKind::Function);
            }
            Stmt::If(condition, then_branch, else_branch) => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.errors.push(ResolveError::top_level_return(*keyword));
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.errors
                            .push(ResolveError::return_from_initializer(*keyword));
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var(name, initializer) => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&name.item);
            }
            Stmt::While(condition, body) => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
        }
    }

    fn resolve_class(&mut self, class: &ClassDeclaration) {
        let enclosing = self.current_class;
        self.current_class = ClassKind::Class;

        self.declare(&class.name);
        self.define(&class.name.item);

        if let Some(superclass) = &class.superclass {
            if let Expr::Variable { name } = &*superclass.item {
                if *name == class.name.item {
                    self.errors
                        .push(ResolveError::inherit_from_self(superclass.span));
                }
            }
            self.current_class = ClassKind::Subclass;
            self.resolve_expr(superclass);
            // methods of a subclass see `super` one scope outside `this`
            self.begin_scope();
            self.define_keyword("super");
        }

        self.begin_scope();
        self.define_keyword("this");
        for method in &class.methods {
            let kind = if &*method.name.item == "init" {
                FunctionKind::Initializer
            } else {
                FunctionKind::Method
            };
            self.resolve_function(method, kind);
        }
        self.end_scope();

        if class.superclass.is_some() {
            self.end_scope();
        }
        self.current_class = enclosing;
    }

    fn resolve_function(&mut self, declaration: &FunctionDeclaration, kind: FunctionKind) {
        let enclosing = std::mem::replace(&mut self.current_function, kind);
        self.begin_scope();
        for param in declaration.params.iter() {
            self.declare(param);
            self.define(&param.item);
        }
        for statement in declaration.body.iter() {
            self.resolve_stmt(statement);
        }
        self.end_scope();
        self.current_function = enclosing;
    }

    fn resolve_expr(&mut self, expr: &ExprNode) {
        match &*expr.item {
            Expr::Unary { expr: inner, .. } => self.resolve_expr(inner),
            Expr::Binary { lhs, rhs, .. } | Expr::Logical { lhs, rhs, .. } => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
            Expr::Group { expr: inner } => self.resolve_expr(inner),
            Expr::Literal { .. } => {}
            Expr::Call { callee, args } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::Variable { name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&**name).copied() == Some(VarState::Declared) {
                        self.errors.push(ResolveError::own_initializer(expr.span));
                    }
                }
                self.resolve_local(expr, name);
            }
            Expr::Assign { name, value } => {
                self.resolve_expr(value);
                self.resolve_local(expr, &name.item);
            }
            Expr::This => {
                if self.current_class == ClassKind::None {
                    self.errors.push(ResolveError::this_outside_class(expr.span));
                    return;
                }
                self.resolve_local(expr, "this");
            }
            Expr::Super { .. } => {
                match self.current_class {
                    ClassKind::None => {
                        self.errors.push(ResolveError::super_outside_class(expr.span));
                        return;
                    }
                    ClassKind::Class => {
                        self.errors
                            .push(ResolveError::super_without_superclass(expr.span));
                        return;
                    }
                    ClassKind::Subclass => {}
                }
                self.resolve_local(expr, "super");
            }
        }
    }

    // Finds the innermost scope containing the name and records how many
    // scopes away it is. Names found nowhere are globals and get no entry.
    fn resolve_local(&mut self, expr: &ExprNode, name: &str) {
        if let Some(depth) = self
            .scopes
            .iter()
            .rev()
            .position(|scope| scope.contains_key(name))
        {
            self.locals.insert(expr.id, depth);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    // Top-level names are globals; the scope stack is empty there and
    // declaring is a no-op.
    fn declare(&mut self, name: &NameNode) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&*name.item) {
                self.errors.push(ResolveError::already_declared(name.span));
            }
            scope.insert(Rc::clone(&name.item), VarState::Declared);
        }
    }

    fn define(&mut self, name: &Rc<str>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(Rc::clone(name), VarState::Defined);
        }
    }

    fn define_keyword(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(Rc::from(name), VarState::Defined);
        }
    }
}
