use std::rc::Rc;

use crate::expr::{ExprNode, NameNode};
use crate::node::Node;
use crate::token::Span;

pub type StmtNode = Node<Box<Stmt>>;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Block(Vec<StmtNode>),
    Class(ClassDeclaration),
    Expression(ExprNode),
    Function(FunctionDeclaration),
    If(ExprNode, StmtNode, Option<StmtNode>),
    Print(ExprNode),
    Return {
        keyword: Span,
        value: Option<ExprNode>,
    },
    Var(NameNode, Option<ExprNode>),
    While(ExprNode, StmtNode),
}

impl Stmt {
    pub fn at(self, span: impl Into<Span>) -> StmtNode {
        StmtNode::new(Box::new(self), span)
    }
}

impl Stmt {
    pub fn block(stmts: impl Into<Vec<StmtNode>>) -> Self {
        Self::Block(stmts.into())
    }

    pub fn expression(expr: ExprNode) -> Self {
        Self::Expression(expr)
    }

    pub fn print(expr: ExprNode) -> Self {
        Self::Print(expr)
    }

    pub fn var(name: NameNode, init_expr: Option<ExprNode>) -> Self {
        Self::Var(name, init_expr)
    }

    pub fn if_(condition: ExprNode, then_: StmtNode, else_: Option<StmtNode>) -> Self {
        Self::If(condition, then_, else_)
    }

    pub fn while_(condition: ExprNode, stmt: StmtNode) -> Self {
        Self::While(condition, stmt)
    }

    pub fn return_(keyword: Span, value: Option<ExprNode>) -> Self {
        Self::Return { keyword, value }
    }
}

/// Shared between `fun` declarations and class methods. Params and body sit
/// behind `Rc` so function values can keep the AST alive past the statement
/// that declared them.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDeclaration {
    pub name: NameNode,
    pub params: Rc<[NameNode]>,
    pub body: Rc<[StmtNode]>,
}

/// The superclass, when present, is an `Expr::Variable` node so the resolver
/// and the evaluator treat it like any other variable use.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDeclaration {
    pub name: NameNode,
    pub superclass: Option<ExprNode>,
    pub methods: Vec<FunctionDeclaration>,
}
