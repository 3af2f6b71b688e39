//! Rule-invocation protocol and combinator layer.
//!
//! A grammar is built from [`Rule`] values. Each invocation runs against a
//! copy of the caller's [`Cursor`] and an attribute record seeded with the
//! caller's chained state; the caller adopts the advanced cursor and the
//! child's chained state only on success. Failure restores the cursor to the
//! exact entry position, so alternatives and repetitions can backtrack
//! without corrupting outer parser state.
//!
//! Failure is purely structural: there is no error channel, no message, and
//! no partial success. Position information is implicit in the unchanged
//! cursor.

pub mod climb;
pub mod trace;

use crate::cursor::Cursor;
use crate::tokenizer::TokenKind;

pub use climb::{Climber, Combine, PrecEntry, PrecTable};
pub use trace::TraceNode;

/// A rule's working state: a synthesized result and the chained state
/// threaded across sibling and child invocations.
///
/// A fresh child record always starts with `chained` copied from its
/// predecessor's current `chained` value, never from `synth`. Threading is
/// value copy; siblings never share mutable attribute state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attr<V> {
    pub synth: V,
    pub chained: V,
}

impl<V: Clone + Default> Attr<V> {
    /// Record for a top-level invocation: both parts default.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Fresh record for a child invocation, inheriting the parent's current
    /// chained state.
    #[must_use]
    pub fn inheriting(parent: &Self) -> Self {
        Self {
            synth: V::default(),
            chained: parent.chained.clone(),
        }
    }
}

/// Explicit result record of one rule invocation.
///
/// On failure `cursor` equals the cursor the rule was applied to and the
/// attribute contents are unspecified; callers must discard them.
#[derive(Debug)]
pub struct Step<'a, V> {
    pub matched: bool,
    pub cursor: Cursor<'a>,
    pub attr: Attr<V>,
    pub trace: TraceNode,
}

/// The atomic unit of grammar: anything that can be invoked with a cursor
/// and a pre-populated attribute record and report an outcome.
pub trait Rule<V> {
    /// Name recorded in the trace tree.
    fn name(&self) -> &'static str;

    /// Run the rule from `cursor` with inherited attribute state.
    fn apply<'a>(&self, cursor: Cursor<'a>, attr: Attr<V>) -> Step<'a, V>;
}

/// A named rule built from a body closure over a [`Frame`].
///
/// Function items work as bodies, so mutually recursive rules are written as
/// plain `fn` constructors referring to each other.
pub struct NamedRule<F> {
    name: &'static str,
    body: F,
}

/// Wrap `body` into a [`Rule`] recorded under `name`.
pub fn rule<V, F>(name: &'static str, body: F) -> NamedRule<F>
where
    V: Clone + Default,
    F: Fn(&mut Frame<'_, V>) -> bool,
{
    NamedRule { name, body }
}

impl<V, F> Rule<V> for NamedRule<F>
where
    V: Clone + Default,
    F: Fn(&mut Frame<'_, V>) -> bool,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply<'a>(&self, cursor: Cursor<'a>, attr: Attr<V>) -> Step<'a, V> {
        let mut frame = Frame::new(cursor, attr);
        let matched = (self.body)(&mut frame);
        log::trace!("{} -> {}", self.name, matched);
        frame.finish(self.name, matched, cursor)
    }
}

/// One invocation's scratch state: the local cursor copy, the rule's own
/// attribute record, and the child trace nodes in invocation order.
///
/// A body mutates the frame freely; the copy-on-success discipline is
/// enforced by [`Frame::finish`], which discards the local cursor when the
/// body reports failure.
pub struct Frame<'a, V> {
    cursor: Cursor<'a>,
    pub attr: Attr<V>,
    children: Vec<TraceNode>,
}

impl<'a, V: Clone + Default> Frame<'a, V> {
    fn new(cursor: Cursor<'a>, attr: Attr<V>) -> Self {
        Self {
            cursor,
            attr,
            children: Vec::new(),
        }
    }

    fn finish(self, name: &'static str, matched: bool, entry: Cursor<'a>) -> Step<'a, V> {
        Step {
            matched,
            cursor: if matched { self.cursor } else { entry },
            attr: self.attr,
            trace: TraceNode {
                rule_name: name,
                matched,
                children: self.children,
            },
        }
    }

    /// Current cursor position.
    #[must_use]
    pub fn cursor(&self) -> Cursor<'a> {
        self.cursor
    }

    /// Kind of the next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> TokenKind {
        self.cursor.peek()
    }

    /// Consume one token and return its kind.
    pub fn next_tok(&mut self) -> TokenKind {
        let (kind, next) = self.cursor.next_token();
        self.cursor = next;
        kind
    }

    /// Consume the next token if it has the expected kind.
    pub fn expect(&mut self, kind: TokenKind) -> bool {
        if self.peek() == kind {
            self.next_tok();
            true
        } else {
            false
        }
    }

    /// Consume the next token if it has the expected kind and return its
    /// source text.
    pub fn expect_text(&mut self, kind: TokenKind) -> Option<&'a str> {
        if self.peek() != kind {
            return None;
        }
        let text = self.cursor.token_text();
        self.next_tok();
        text
    }

    fn run_child(&mut self, child: &dyn Rule<V>) -> Option<Attr<V>> {
        let step = child.apply(self.cursor, Attr::inheriting(&self.attr));
        let matched = step.matched;
        self.children.push(step.trace);
        if matched {
            self.cursor = step.cursor;
            self.attr.chained = step.attr.chained.clone();
            Some(step.attr)
        } else {
            None
        }
    }

    /// Run a mandatory child rule. On `None` the enclosing body must fail.
    pub fn invoke(&mut self, child: &dyn Rule<V>) -> Option<Attr<V>> {
        let result = self.run_child(child);
        if result.is_none() {
            log::debug!("{} failed at byte {}", child.name(), self.cursor.offset());
        }
        result
    }

    /// Run an optional child rule; failure is non-fatal and leaves the
    /// cursor where it was.
    pub fn attempt(&mut self, child: &dyn Rule<V>) -> Option<Attr<V>> {
        self.run_child(child)
    }

    /// Try alternatives in declared order; the first success wins and its
    /// index is reported. Fails only when every alternative fails.
    pub fn choice(&mut self, alternatives: &[&dyn Rule<V>]) -> Option<(usize, Attr<V>)> {
        for (index, alternative) in alternatives.iter().enumerate() {
            if let Some(attr) = self.attempt(*alternative) {
                return Some((index, attr));
            }
        }
        None
    }

    /// Greedily repeat a rule until its first failure and return the match
    /// count. Always succeeds; zero matches is a valid empty match and the
    /// cursor rests where the last success stopped.
    pub fn repeat(&mut self, child: &dyn Rule<V>) -> usize {
        let mut count = 0;
        while self.attempt(child).is_some() {
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn consume_int(f: &mut Frame<'_, i64>) -> bool {
        f.expect(TokenKind::Int)
    }

    fn consume_then_fail(f: &mut Frame<'_, i64>) -> bool {
        f.expect(TokenKind::Int);
        f.expect(TokenKind::Plus);
        false
    }

    // Records the inherited chained value in synth, then advances it.
    fn observe_and_bump(f: &mut Frame<'_, i64>) -> bool {
        f.attr.synth = f.attr.chained;
        f.attr.chained += 1;
        true
    }

    #[test]
    fn failed_rule_leaves_the_cursor_untouched() {
        let src = "1 + 2";
        let tokens = tokenize(src);
        let entry = Cursor::new(&tokens, src);
        let step = rule("broken", consume_then_fail).apply(entry, Attr::root());
        assert!(!step.matched);
        assert!(step.cursor.at_same_position(&entry));
    }

    #[test]
    fn successful_rule_commits_the_advanced_cursor() {
        let src = "7 ;";
        let tokens = tokenize(src);
        let entry = Cursor::new(&tokens, src);
        let step = rule("num", consume_int).apply(entry, Attr::root());
        assert!(step.matched);
        assert_eq!(step.cursor.peek(), TokenKind::Semi);
    }

    #[test]
    fn siblings_inherit_the_previous_chained_value() {
        let tokens = tokenize("");
        let mut frame: Frame<'_, i64> = Frame::new(Cursor::new(&tokens, ""), Attr::root());
        let sibling = rule("bump", observe_and_bump);
        let inherited: Vec<i64> = (0..3)
            .map(|_| frame.invoke(&sibling).map_or(-1, |attr| attr.synth))
            .collect();
        assert_eq!(inherited, vec![0, 1, 2]);
        assert_eq!(frame.attr.chained, 3);
        // The parent's synthesized part is never involved in inheritance.
        assert_eq!(frame.attr.synth, 0);
    }

    #[test]
    fn choice_is_deterministic_on_overlapping_alternatives() {
        fn first(f: &mut Frame<'_, i64>) -> bool {
            let matched = f.expect(TokenKind::Ident);
            if matched {
                f.attr.synth = 1;
            }
            matched
        }
        fn second(f: &mut Frame<'_, i64>) -> bool {
            let matched = f.expect(TokenKind::Ident);
            if matched {
                f.attr.synth = 2;
            }
            matched
        }
        let src = "overlap";
        let tokens = tokenize(src);
        let mut frame = Frame::new(Cursor::new(&tokens, src), Attr::root());
        let picked = frame.choice(&[&rule("first", first), &rule("second", second)]);
        let Some((index, attr)) = picked else {
            panic!("choice should match");
        };
        assert_eq!(index, 0);
        assert_eq!(attr.synth, 1);
    }

    #[test]
    fn choice_fails_when_every_alternative_fails() {
        let src = "+";
        let tokens = tokenize(src);
        let entry = Cursor::new(&tokens, src);
        let mut frame: Frame<'_, i64> = Frame::new(entry, Attr::root());
        assert!(frame.choice(&[&rule("num", consume_int)]).is_none());
        assert!(frame.cursor().at_same_position(&entry));
    }

    #[test]
    fn repeat_is_total_on_a_never_matching_rule() {
        let src = "+ +";
        let tokens = tokenize(src);
        let entry = Cursor::new(&tokens, src);
        let mut frame: Frame<'_, i64> = Frame::new(entry, Attr::root());
        assert_eq!(frame.repeat(&rule("num", consume_int)), 0);
        assert!(frame.cursor().at_same_position(&entry));
    }

    #[test]
    fn repeat_stops_at_the_first_failure() {
        let src = "1 2 3 +";
        let tokens = tokenize(src);
        let mut frame: Frame<'_, i64> = Frame::new(Cursor::new(&tokens, src), Attr::root());
        assert_eq!(frame.repeat(&rule("num", consume_int)), 3);
        assert_eq!(frame.peek(), TokenKind::Plus);
    }

    #[test]
    fn failed_attempts_are_recorded_in_the_trace() {
        let src = "+";
        let tokens = tokenize(src);
        let mut frame: Frame<'_, i64> = Frame::new(Cursor::new(&tokens, src), Attr::root());
        assert!(frame.attempt(&rule("num", consume_int)).is_none());
        let step = frame.finish("parent", true, Cursor::new(&tokens, src));
        assert_eq!(step.trace.children.len(), 1);
        let child = step.trace.children.first();
        assert!(child.is_some_and(|node| !node.matched && node.rule_name == "num"));
    }
}
