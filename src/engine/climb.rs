//! Generic precedence-climbing engine for binary-operator grammars.
//!
//! One algorithm, parameterized by an atom rule, an operator table, and a
//! combine capability, replaces a hand-written ladder of
//! left-recursion-eliminated rules (sum/sum-tail/product/product-tail). The
//! minimum-precedence threshold enforces binding order: a left-associative
//! operator raises the threshold for its right-hand side above its own
//! precedence, a right-associative operator keeps it equal.

use log::warn;

use crate::cursor::Cursor;
use crate::tokenizer::TokenKind;

use super::{Attr, Frame, Rule, Step};

/// Binding strength and associativity of one operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecEntry {
    pub prec: u8,
    pub right_assoc: bool,
}

const NON_OPERATOR: PrecEntry = PrecEntry {
    prec: 0,
    right_assoc: false,
};

/// Operator table mapping token kinds to precedence entries.
///
/// Tokens absent from the table get precedence 0, which is below every
/// climbing threshold and therefore always terminates the loop. That covers
/// parentheses, literals, statement terminators, and end of input without
/// any special casing.
pub struct PrecTable {
    entries: &'static [(TokenKind, PrecEntry)],
}

impl PrecTable {
    #[must_use]
    pub const fn new(entries: &'static [(TokenKind, PrecEntry)]) -> Self {
        Self { entries }
    }

    /// Lookup the entry for `kind`, defaulting to the non-operator entry.
    #[must_use]
    pub fn lookup(&self, kind: TokenKind) -> PrecEntry {
        self.entries
            .iter()
            .find_map(|(k, entry)| (kind == *k).then_some(*entry))
            .unwrap_or(NON_OPERATOR)
    }
}

/// Capability that folds an operator's right-hand value into the running
/// left-hand value.
///
/// A rejection propagates exactly like a mandatory-invoke failure; the
/// engine draws no distinction between syntax errors and semantic
/// rejections.
pub trait Combine<V> {
    fn combine(&self, op: TokenKind, value: &mut Attr<V>, right: &Attr<V>) -> bool;
}

impl<V, F> Combine<V> for F
where
    F: Fn(TokenKind, &mut Attr<V>, &Attr<V>) -> bool,
{
    fn combine(&self, op: TokenKind, value: &mut Attr<V>, right: &Attr<V>) -> bool {
        self(op, value, right)
    }
}

impl<V: Clone + Default> Frame<'_, V> {
    /// Parse a full binary-operator expression into the frame's own
    /// attribute record.
    ///
    /// Parses one atom as the running value, then repeatedly peeks the next
    /// token: an operator at or above `min_prec` is committed and its
    /// right-hand side parsed recursively at threshold
    /// `prec + (right_assoc ? 0 : 1)` before the combine capability folds it
    /// in. A below-threshold token ends the loop successfully without being
    /// consumed. A recursive parse that makes no cursor progress stops the
    /// loop instead of diverging.
    pub fn climb(
        &mut self,
        name: &'static str,
        atom: &dyn Rule<V>,
        table: &PrecTable,
        combine: &dyn Combine<V>,
        min_prec: u8,
    ) -> bool {
        let Some(first) = self.invoke(atom) else {
            return false;
        };
        self.attr.synth = first.synth;

        loop {
            let (op, after_op) = self.cursor.next_token();
            let entry = table.lookup(op);
            if entry.prec < min_prec {
                return true;
            }
            self.cursor = after_op;

            let tail = ClimbLevel {
                name,
                atom,
                table,
                combine,
                min_prec: entry.prec.saturating_add(u8::from(!entry.right_assoc)),
            };
            let before = self.cursor;
            let Some(right) = self.invoke(&tail) else {
                return false;
            };
            if self.cursor.at_same_position(&before) {
                warn!("{name}: right-hand side of {op:?} consumed no input, stopping");
                return true;
            }
            // invoke already adopted the right side's chained state.
            if !combine.combine(op, &mut self.attr, &right) {
                return false;
            }
        }
    }
}

// One recursion level of the climbing loop, traced like any other rule
// invocation.
struct ClimbLevel<'r, V> {
    name: &'static str,
    atom: &'r dyn Rule<V>,
    table: &'r PrecTable,
    combine: &'r dyn Combine<V>,
    min_prec: u8,
}

impl<V: Clone + Default> Rule<V> for ClimbLevel<'_, V> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'a>(&self, cursor: Cursor<'a>, attr: Attr<V>) -> Step<'a, V> {
        let mut frame = Frame::new(cursor, attr);
        let matched = frame.climb(self.name, self.atom, self.table, self.combine, self.min_prec);
        frame.finish(self.name, matched, cursor)
    }
}

/// A [`Rule`] for full binary-operator expressions over a given atom.
///
/// The entry threshold is 1: any real operator participates, precedence 0
/// being reserved for non-operator terminators.
pub struct Climber<R, C> {
    name: &'static str,
    atom: R,
    table: &'static PrecTable,
    combine: C,
}

impl<R, C> Climber<R, C> {
    #[must_use]
    pub fn new(name: &'static str, atom: R, table: &'static PrecTable, combine: C) -> Self {
        Self {
            name,
            atom,
            table,
            combine,
        }
    }
}

impl<V, R, C> Rule<V> for Climber<R, C>
where
    V: Clone + Default,
    R: Rule<V>,
    C: Combine<V>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'a>(&self, cursor: Cursor<'a>, attr: Attr<V>) -> Step<'a, V> {
        let level = ClimbLevel {
            name: self.name,
            atom: &self.atom,
            table: self.table,
            combine: &self.combine,
            min_prec: 1,
        };
        level.apply(cursor, attr)
    }
}
