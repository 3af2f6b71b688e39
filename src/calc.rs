//! Demonstration calculator grammar built on the combinator engine.
//!
//! A program is a sequence of statements separated by `;`, each either a
//! bare expression or `print <expr>`. Expressions are parsed by a single
//! [`Climber`] over an operator table: `=` (assignment, right-associative),
//! `+`/`-`, and `*`/`/`. Assignments bind variables in an environment that
//! rides in the chained attribute part, threading across statements; every
//! statement's value is appended to a results list the same way.
//!
//! This module is a client of the engine and contributes no parsing
//! machinery of its own.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::cursor::Cursor;
use crate::engine::{Attr, Climber, Frame, PrecEntry, PrecTable, Rule, TraceNode, rule};
use crate::tokenizer::{TokenKind, tokenize};

/// Attribute value for the calculator.
///
/// `num` and `var` are synthesized per expression; `env` and `results` live
/// in the chained part and accumulate across sibling statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalcValue {
    pub num: i64,
    pub var: Option<String>,
    pub env: BTreeMap<String, i64>,
    pub results: Vec<i64>,
}

type CalcAttr = Attr<CalcValue>;

const fn left(prec: u8) -> PrecEntry {
    PrecEntry {
        prec,
        right_assoc: false,
    }
}

static OPERATORS: PrecTable = PrecTable::new(&[
    (
        TokenKind::Eq,
        PrecEntry {
            prec: 1,
            right_assoc: true,
        },
    ),
    (TokenKind::Plus, left(2)),
    (TokenKind::Minus, left(2)),
    (TokenKind::Star, left(3)),
    (TokenKind::Slash, left(3)),
]);

/// Fold one binary operator into the running value.
///
/// Division by zero (and `i64::MIN / -1`) rejects, as does assignment to
/// anything but a bare variable; both propagate as plain parse failures.
fn combine_op(op: TokenKind, value: &mut CalcAttr, right: &CalcAttr) -> bool {
    let result = match op {
        TokenKind::Plus => value.synth.num.wrapping_add(right.synth.num),
        TokenKind::Minus => value.synth.num.wrapping_sub(right.synth.num),
        TokenKind::Star => value.synth.num.wrapping_mul(right.synth.num),
        TokenKind::Slash => {
            let Some(quotient) = value.synth.num.checked_div(right.synth.num) else {
                return false;
            };
            quotient
        }
        TokenKind::Eq => {
            let Some(name) = value.synth.var.take() else {
                return false;
            };
            value.chained.env.insert(name, right.synth.num);
            right.synth.num
        }
        _ => return false,
    };
    value.synth.num = result;
    value.synth.var = None;
    true
}

fn expr() -> impl Rule<CalcValue> {
    Climber::new("expr", rule("factor", factor_body), &OPERATORS, combine_op)
}

fn factor() -> impl Rule<CalcValue> {
    rule("factor", factor_body)
}

fn factor_body(f: &mut Frame<'_, CalcValue>) -> bool {
    let choices: &[&dyn Rule<CalcValue>] = &[
        &rule("paren_term", paren_body),
        &rule("num", num_body),
        &rule("var", var_body),
        &rule("unary_minus", neg_body),
    ];
    let Some((_, node)) = f.choice(choices) else {
        return false;
    };
    f.attr.synth.num = node.synth.num;
    // Keep the variable name so a bare variable stays a valid assignment
    // target one climb level up.
    f.attr.synth.var = node.synth.var;
    true
}

fn paren_body(f: &mut Frame<'_, CalcValue>) -> bool {
    if !f.expect(TokenKind::LParen) {
        return false;
    }
    let Some(inner) = f.invoke(&expr()) else {
        return false;
    };
    if !f.expect(TokenKind::RParen) {
        return false;
    }
    f.attr.synth.num = inner.synth.num;
    true
}

fn num_body(f: &mut Frame<'_, CalcValue>) -> bool {
    let Some(text) = f.expect_text(TokenKind::Int) else {
        return false;
    };
    let Ok(num) = text.parse::<i64>() else {
        return false;
    };
    f.attr.synth.num = num;
    true
}

// A variable evaluates to its binding, or 0 when unbound, and synthesizes
// its name for assignment targets.
fn var_body(f: &mut Frame<'_, CalcValue>) -> bool {
    let Some(name) = f.expect_text(TokenKind::Ident) else {
        return false;
    };
    f.attr.synth.num = f.attr.chained.env.get(name).copied().unwrap_or_default();
    f.attr.synth.var = Some(name.to_string());
    true
}

fn neg_body(f: &mut Frame<'_, CalcValue>) -> bool {
    if !f.expect(TokenKind::Minus) {
        return false;
    }
    let Some(value) = f.invoke(&factor()) else {
        return false;
    };
    f.attr.synth.num = value.synth.num.wrapping_neg();
    true
}

fn print_body(f: &mut Frame<'_, CalcValue>) -> bool {
    if !f.expect(TokenKind::KwPrint) {
        return false;
    }
    let Some(value) = f.invoke(&expr()) else {
        return false;
    };
    f.attr.chained.results.push(value.synth.num);
    true
}

fn expr_stmt_body(f: &mut Frame<'_, CalcValue>) -> bool {
    let Some(value) = f.invoke(&expr()) else {
        return false;
    };
    f.attr.chained.results.push(value.synth.num);
    true
}

fn stmt_body(f: &mut Frame<'_, CalcValue>) -> bool {
    let choices: &[&dyn Rule<CalcValue>] = &[
        &rule("print_stmt", print_body),
        &rule("expr_stmt", expr_stmt_body),
    ];
    if f.choice(choices).is_none() {
        return false;
    }
    matches!(f.next_tok(), TokenKind::Semi | TokenKind::Eof)
}

fn block() -> impl Rule<CalcValue> {
    rule("block", |f: &mut Frame<'_, CalcValue>| {
        f.repeat(&rule("stmt", stmt_body));
        true
    })
}

/// Outcome of evaluating a program: statement values in source order, the
/// final variable environment, and the diagnostic trace tree.
#[derive(Debug)]
pub struct Evaluation {
    pub results: Vec<i64>,
    pub env: BTreeMap<String, i64>,
    pub trace: TraceNode,
}

/// Failure to evaluate a program.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// The statement list stopped before the end of the input.
    #[error("cannot parse input past byte {offset}")]
    Unparsed { offset: usize },
}

/// Tokenize and run `src` through the statement grammar.
///
/// # Errors
/// Returns [`EvalError::Unparsed`] when any input remains after the last
/// parsable statement, including input that never matched at all.
pub fn evaluate(src: &str) -> Result<Evaluation, EvalError> {
    let tokens = tokenize(src);
    let cursor = Cursor::new(&tokens, src);
    let step = block().apply(cursor, Attr::root());
    if !step.matched || !step.cursor.at_end() {
        return Err(EvalError::Unparsed {
            offset: step.cursor.offset(),
        });
    }
    Ok(Evaluation {
        results: step.attr.chained.results,
        env: step.attr.chained.env,
        trace: step.trace,
    })
}
