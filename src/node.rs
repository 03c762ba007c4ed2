use crate::token::Span;

/// A syntax item together with the span it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Node<T> {
    pub item: T,
    pub span: Span,
}

impl<T> Node<T> {
    pub fn new(item: T, span: impl Into<Span>) -> Self {
        Self {
            item,
            span: span.into(),
        }
    }
}

/// Identifies an expression across a whole session. The resolver keys its
/// side-table by this id, so ids must never repeat between parses that feed
/// the same interpreter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u64);

#[derive(Debug, Default)]
pub struct ExprIdGen {
    next: u64,
}

impl ExprIdGen {
    pub fn next_id(&mut self) -> ExprId {
        let id = ExprId(self.next);
        self.next += 1;
        id
    }
}
