//! Library crate for minipeg.
//!
//! A minimal embedded parser-combinator engine: recursive-descent rules
//! built from composable values with PEG-style ordered choice, attribute
//! synthesis and chaining, backtracking with copy-on-success cursors, and a
//! generic precedence-climbing extension for binary-operator grammars. A
//! small calculator grammar demonstrates the engine end to end.

#![forbid(unsafe_code)]

pub mod calc;
pub mod cursor;
pub mod engine;
pub mod tokenizer;

pub use cursor::Cursor;
pub use engine::{
    Attr, Climber, Combine, Frame, NamedRule, PrecEntry, PrecTable, Rule, Step, TraceNode, rule,
};
pub use tokenizer::{Span, TokenKind, tokenize};
