use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::callable::{Class, Function, Instance};
use crate::env::{Environment, EnvironmentRef};
use crate::error::{LoxideError, RuntimeError};
use crate::expr::{BinaryOp, Expr, ExprNode, LogicalOp, NameNode, UnaryOp};
use crate::node::ExprId;
use crate::stmt::{ClassDeclaration, Stmt, StmtNode};
use crate::token::Span;
use crate::value::Value;

pub(crate) type Output = Rc<RefCell<dyn Write>>;

/// Everything the tree walk needs: the globals, the currently active
/// environment, the resolver's side-table, and the sink `print` writes to.
pub struct InterpreterContext {
    pub(crate) globals: EnvironmentRef,
    pub(crate) environment: EnvironmentRef,
    pub(crate) locals: HashMap<ExprId, usize>,
    pub(crate) out: Output,
}

impl InterpreterContext {
    pub(crate) fn new(out: Output) -> Self {
        let globals = EnvironmentRef::from(Environment::default());
        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            out,
        }
    }
}

/// The two ways a statement can unwind: a `return` travelling back to its
/// call frame, or a runtime error travelling all the way out to the driver.
pub(crate) enum InterpreterError {
    Return(Value),
    Err(LoxideError),
}

impl From<LoxideError> for InterpreterError {
    fn from(error: LoxideError) -> Self {
        InterpreterError::Err(error)
    }
}

type StmtResult = Result<(), InterpreterError>;
type ExprResult = Result<Value, LoxideError>;

pub(crate) struct InterpreterOps;

impl InterpreterOps {
    /// Runs statements inside `env`, restoring the previous environment on
    /// the way out whether the block completed or unwound.
    pub(crate) fn eval_stmts(
        context: &mut InterpreterContext,
        stmts: &[StmtNode],
        env: EnvironmentRef,
    ) -> StmtResult {
        let prev = std::mem::replace(&mut context.environment, env);
        let res = stmts
            .iter()
            .try_for_each(|stmt| Self::eval_stmt(context, stmt));
        context.environment = prev;
        res
    }

    pub(crate) fn eval_stmt(context: &mut InterpreterContext, stmt: &StmtNode) -> StmtResult {
        match &*stmt.item {
            Stmt::Expression(expr) => {
                Self::eval_expr(context, expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = Self::eval_expr(context, expr)?;
                let _ = writeln!(context.out.borrow_mut(), "{value}");
                Ok(())
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => Self::eval_expr(context, expr)?,
                    None => Value::Nil,
                };
                context
                    .environment
                    .borrow_mut()
                    .define(Rc::clone(&name.item), value);
                Ok(())
            }
            Stmt::Block(stmts) => {
                let env = Environment::with_enclosing(context.environment.clone());
                Self::eval_stmts(context, stmts, env.into())
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if Self::eval_expr(context, condition)?.is_truthy() {
                    Self::eval_stmt(context, then_branch)
                } else if let Some(else_branch) = else_branch {
                    Self::eval_stmt(context, else_branch)
                } else {
                    Ok(())
                }
            }
            Stmt::While(condition, body) => {
                while Self::eval_expr(context, condition)?.is_truthy() {
                    Self::eval_stmt(context, body)?;
                }
                Ok(())
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => Self::eval_expr(context, expr)?,
                    None => Value::Nil,
                };
                Err(InterpreterError::Return(value))
            }
            Stmt::Function(declaration) => {
                let function = Function::new(declaration, context.environment.clone(), false);
                context
                    .environment
                    .borrow_mut()
                    .define(Rc::clone(&declaration.name.item), function.into());
                Ok(())
            }
            Stmt::Class(declaration) => {
                Self::eval_class(context, declaration)?;
                Ok(())
            }
        }
    }

    // Classes are defined in two steps: the name is bound to nil before the
    // methods are built, so methods can refer to the class by name.
    fn eval_class(
        context: &mut InterpreterContext,
        declaration: &ClassDeclaration,
    ) -> Result<(), LoxideError> {
        let superclass = match &declaration.superclass {
            Some(expr) => match Self::eval_expr(context, expr)? {
                Value::Clazz(superclass) => Some(superclass),
                _ => return Err(RuntimeError::superclass_not_class(expr.span)),
            },
            None => None,
        };

        context
            .environment
            .borrow_mut()
            .define(Rc::clone(&declaration.name.item), Value::Nil);

        // With a superclass, methods close over an extra environment that
        // binds `super`; the resolver mirrors this scope layout.
        let method_environment = match &superclass {
            Some(superclass) => {
                let mut env = Environment::with_enclosing(context.environment.clone());
                env.define(Rc::from("super"), Value::Clazz(Rc::clone(superclass)));
                EnvironmentRef::from(env)
            }
            None => context.environment.clone(),
        };

        let methods = declaration
            .methods
            .iter()
            .map(|method| {
                let is_init = &*method.name.item == "init";
                let function = Function::new(method, method_environment.clone(), is_init);
                (Rc::clone(&method.name.item), function)
            })
            .collect();

        let class = Class::new(Rc::clone(&declaration.name.item), superclass, methods);
        context
            .environment
            .borrow_mut()
            .define(Rc::clone(&declaration.name.item), Value::Clazz(Rc::new(class)));
        Ok(())
    }

    pub(crate) fn eval_expr(context: &mut InterpreterContext, expr: &ExprNode) -> ExprResult {
        let span = expr.span;
        let value = match &*expr.item {
            Expr::Literal { lit } => Value::from(lit),
            Expr::Group { expr } => Self::eval_expr(context, expr)?,
            Expr::Unary { op, expr } => {
                let value = Self::eval_expr(context, expr)?;
                match op {
                    UnaryOp::Neg => value.neg(span)?,
                    UnaryOp::Not => value.not(),
                }
            }
            Expr::Binary { lhs, op, rhs } => {
                let lhs = Self::eval_expr(context, lhs)?;
                let rhs = Self::eval_expr(context, rhs)?;
                match op {
                    BinaryOp::Equals => lhs.eq(&rhs),
                    BinaryOp::NotEquals => lhs.neq(&rhs),
                    BinaryOp::LessThan => lhs.lt(&rhs, span)?,
                    BinaryOp::LessThanOrEqual => lhs.lte(&rhs, span)?,
                    BinaryOp::GreaterThan => lhs.gt(&rhs, span)?,
                    BinaryOp::GreaterThanOrEqual => lhs.gte(&rhs, span)?,
                    BinaryOp::Add => lhs.add(&rhs, span)?,
                    BinaryOp::Sub => lhs.sub(&rhs, span)?,
                    BinaryOp::Mul => lhs.mul(&rhs, span)?,
                    BinaryOp::Div => lhs.div(&rhs, span)?,
                }
            }
            // `and`/`or` return the operand that decided them, not a bool
            Expr::Logical { lhs, op, rhs } => {
                let lhs = Self::eval_expr(context, lhs)?;
                match op {
                    LogicalOp::Or if lhs.is_truthy() => lhs,
                    LogicalOp::And if !lhs.is_truthy() => lhs,
                    _ => Self::eval_expr(context, rhs)?,
                }
            }
            Expr::Variable { name } => Self::lookup_variable(context, name, expr.id, span)?,
            Expr::Assign { name, value } => {
                let value = Self::eval_expr(context, value)?;
                Self::assign_variable(context, &name.item, expr.id, value.clone(), name.span)?;
                value
            }
            Expr::Call { callee, args } => {
                let callee = Self::eval_expr(context, callee)?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(Self::eval_expr(context, arg)?);
                }

                let callable = callee.as_callable(span)?;
                if arguments.len() != callable.arity() {
                    return Err(RuntimeError::arity_mismatch(
                        callable.arity(),
                        arguments.len(),
                        span,
                    ));
                }
                callable.call(context, &arguments, span)?
            }
            Expr::Get { object, name } => match Self::eval_expr(context, object)? {
                Value::Instance(instance) => Instance::get(&instance, &name.item)
                    .ok_or_else(|| RuntimeError::undefined_property(&name.item, name.span))?,
                _ => return Err(RuntimeError::no_properties(name.span)),
            },
            Expr::Set {
                object,
                name,
                value,
            } => match Self::eval_expr(context, object)? {
                Value::Instance(instance) => {
                    let value = Self::eval_expr(context, value)?;
                    instance.set(Rc::clone(&name.item), value.clone());
                    value
                }
                _ => return Err(RuntimeError::no_fields(name.span)),
            },
            Expr::This => Self::lookup_variable(context, "this", expr.id, span)?,
            Expr::Super { method } => Self::eval_super(context, expr.id, method, span)?,
        };

        Ok(value)
    }

    fn lookup_variable(
        context: &InterpreterContext,
        name: &str,
        id: ExprId,
        span: Span,
    ) -> ExprResult {
        let value = match context.locals.get(&id) {
            Some(distance) => context.environment.borrow().get_at(name, *distance),
            None => context.globals.borrow().get(name),
        };
        value.ok_or_else(|| RuntimeError::undefined_variable(name, span))
    }

    fn assign_variable(
        context: &mut InterpreterContext,
        name: &str,
        id: ExprId,
        value: Value,
        span: Span,
    ) -> Result<(), LoxideError> {
        let assigned = match context.locals.get(&id) {
            Some(distance) => context
                .environment
                .borrow_mut()
                .assign_at(name, value, *distance),
            None => context.globals.borrow_mut().assign(name, value),
        };
        if assigned {
            Ok(())
        } else {
            Err(RuntimeError::undefined_variable(name, span))
        }
    }

    // The resolver nests the `this` scope directly inside the `super`
    // scope, so given the recorded hop for `super`, `this` is one closer.
    fn eval_super(
        context: &mut InterpreterContext,
        id: ExprId,
        method: &NameNode,
        span: Span,
    ) -> ExprResult {
        let distance = *context
            .locals
            .get(&id)
            .ok_or_else(|| RuntimeError::internal("unresolved 'super' expression", span))?;

        let superclass = match context.environment.borrow().get_at("super", distance) {
            Some(Value::Clazz(superclass)) => superclass,
            _ => return Err(RuntimeError::internal("'super' is not a class", span)),
        };
        let instance = match context.environment.borrow().get_at("this", distance - 1) {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(RuntimeError::internal("'this' missing from method scope", span)),
        };

        superclass
            .find_method(&method.item)
            .map(|found| Value::Fun(Rc::new(found.bind(Rc::clone(&instance)))))
            .ok_or_else(|| RuntimeError::undefined_property(&method.item, method.span))
    }
}
