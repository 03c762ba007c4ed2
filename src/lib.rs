pub mod callable;
pub mod env;
pub mod error;
pub mod expr;
pub mod interp;
pub mod node;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use log::debug;

use error::{LoxideError, LoxideErrors};
use interp::{InterpreterContext, InterpreterError, InterpreterOps};
use node::ExprIdGen;
use parser::Parser;
pub use scanner::Source;

pub type LoxideResult = Result<(), LoxideErrors>;

/// Runs a source string once against a fresh interpreter.
pub fn run<T>(code: T) -> LoxideResult
where
    T: AsRef<str>,
{
    Session::new().run(code.as_ref())
}

/// A persistent interpreter. Globals, the resolution side-table, and the
/// expression-id counter all survive across [`Session::run`] calls, so a
/// REPL can feed one line per turn and closures or classes from earlier
/// turns keep working.
pub struct Session {
    context: InterpreterContext,
    ids: ExprIdGen,
    source: String,
}

impl Session {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// All `print` output goes to `out`; tests pass a shared buffer here.
    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            context: InterpreterContext::new(out),
            ids: ExprIdGen::default(),
            source: String::new(),
        }
    }

    /// Scans, parses, resolves, and executes one unit of source. Static
    /// errors (of any number) abort the turn before execution; the first
    /// runtime error aborts the remainder of the turn. The session itself
    /// stays usable either way.
    pub fn run(&mut self, code: &str) -> LoxideResult {
        // Turns accumulate into a single buffer so spans minted in earlier
        // turns stay valid when an old closure fails later on.
        if !self.source.is_empty() && !self.source.ends_with('\n') {
            self.source.push('\n');
        }
        let start = self.source.len();
        self.source.push_str(code);

        let source = Source::continued(&self.source, start);
        let (tokens, mut static_errors) = source.scan_all();
        debug!("scanned {} token(s)", tokens.len());

        let parser = Parser::new(&self.source, tokens, &mut self.ids);
        let (statements, parse_errors) = parser.parse_all();
        debug!("parsed {} statement(s)", statements.len());
        static_errors.extend(parse_errors);

        if static_errors.is_empty() {
            static_errors = resolver::resolve(&statements, &mut self.context);
        }
        if !static_errors.is_empty() {
            return Err(self.errors(static_errors));
        }

        for statement in &statements {
            match InterpreterOps::eval_stmt(&mut self.context, statement) {
                Ok(()) => {}
                // the resolver rejects top-level returns
                Err(InterpreterError::Return(_)) => break,
                Err(InterpreterError::Err(error)) => return Err(self.errors(vec![error])),
            }
        }
        Ok(())
    }

    fn errors(&self, nested: Vec<LoxideError>) -> LoxideErrors {
        LoxideErrors {
            src: self.source.clone(),
            nested,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
