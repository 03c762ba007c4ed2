use std::fmt::Display;
use std::rc::Rc;

use crate::node::{ExprId, Node};
use crate::token::Span;

pub type NameNode = Node<Rc<str>>;

/// An expression together with its span and its session-unique id. The id is
/// what the resolver keys its side-table by.
#[derive(Clone, Debug, PartialEq)]
pub struct ExprNode {
    pub item: Box<Expr>,
    pub span: Span,
    pub id: ExprId,
}

impl ExprNode {
    pub fn new(item: Expr, span: impl Into<Span>, id: ExprId) -> Self {
        Self {
            item: Box::new(item),
            span: span.into(),
            id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Unary {
        op: UnaryOp,
        expr: ExprNode,
    },
    Binary {
        lhs: ExprNode,
        op: BinaryOp,
        rhs: ExprNode,
    },
    Logical {
        lhs: ExprNode,
        op: LogicalOp,
        rhs: ExprNode,
    },
    Group {
        expr: ExprNode,
    },
    Literal {
        lit: Literal,
    },
    Variable {
        name: Rc<str>,
    },
    Assign {
        name: NameNode,
        value: ExprNode,
    },
    Call {
        callee: ExprNode,
        args: Vec<ExprNode>,
    },
    Get {
        object: ExprNode,
        name: NameNode,
    },
    Set {
        object: ExprNode,
        name: NameNode,
        value: ExprNode,
    },
    This,
    Super {
        method: NameNode,
    },
}

impl Expr {
    pub fn at(self, span: impl Into<Span>, id: ExprId) -> ExprNode {
        ExprNode::new(self, span, id)
    }
}

impl Expr {
    pub fn unary(op: UnaryOp, expr: ExprNode) -> Self {
        Self::Unary { op, expr }
    }

    pub fn binary(lhs: ExprNode, op: BinaryOp, rhs: ExprNode) -> Self {
        Self::Binary { lhs, op, rhs }
    }

    pub fn logical(lhs: ExprNode, op: LogicalOp, rhs: ExprNode) -> Self {
        Self::Logical { lhs, op, rhs }
    }

    pub fn group(expr: ExprNode) -> Self {
        Self::Group { expr }
    }

    pub fn literal(lit: Literal) -> Self {
        Self::Literal { lit }
    }

    pub fn variable(name: Rc<str>) -> Self {
        Self::Variable { name }
    }

    pub fn assign(name: NameNode, value: ExprNode) -> Self {
        Self::Assign { name, value }
    }

    pub fn call(callee: ExprNode, args: Vec<ExprNode>) -> Self {
        Self::Call { callee, args }
    }

    pub fn get(object: ExprNode, name: NameNode) -> Self {
        Self::Get { object, name }
    }

    pub fn set(object: ExprNode, name: NameNode, value: ExprNode) -> Self {
        Self::Set { object, name, value }
    }

    pub fn this() -> Self {
        Self::This
    }

    pub fn super_(method: NameNode) -> Self {
        Self::Super { method }
    }

    pub fn string(s: Rc<str>) -> Self {
        Self::Literal {
            lit: Literal::String(s),
        }
    }

    pub fn number(num: f64) -> Self {
        Self::Literal {
            lit: Literal::Number(num),
        }
    }

    pub fn tru() -> Self {
        Self::Literal { lit: Literal::True }
    }

    pub fn fals() -> Self {
        Self::Literal {
            lit: Literal::False,
        }
    }

    pub fn nil() -> Self {
        Self::Literal { lit: Literal::Nil }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    String(Rc<str>),
    Number(f64),
    True,
    False,
    Nil,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Neg => f.write_str("-"),
            Self::Not => f.write_str("!"),
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals => f.write_str("=="),
            Self::NotEquals => f.write_str("!="),
            Self::LessThan => f.write_str("<"),
            Self::LessThanOrEqual => f.write_str("<="),
            Self::GreaterThan => f.write_str(">"),
            Self::GreaterThanOrEqual => f.write_str(">="),
            Self::Add => f.write_str("+"),
            Self::Sub => f.write_str("-"),
            Self::Mul => f.write_str("*"),
            Self::Div => f.write_str("/"),
        }
    }
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalOp::And => f.write_str("and"),
            LogicalOp::Or => f.write_str("or"),
        }
    }
}
