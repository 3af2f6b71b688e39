//! Immutable cursor over a tokenized source.
//!
//! A [`Cursor`] is a cheap `Copy` view of the remaining input. Advancing
//! never mutates in place: rules work on local copies and a caller only
//! adopts an advanced copy when the rule succeeds, which is what makes
//! unlimited backtracking safe.

use crate::tokenizer::{Span, TokenKind};

/// Position into a pre-lexed token sequence.
///
/// Past the end of the sequence the cursor reports [`TokenKind::Eof`] and
/// stops advancing, so lookahead at end of input is always well defined.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    tokens: &'a [(TokenKind, Span)],
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Cursor at the start of `tokens`, which were lexed from `src`.
    #[must_use]
    pub fn new(tokens: &'a [(TokenKind, Span)], src: &'a str) -> Self {
        Self { tokens, src, pos: 0 }
    }

    /// Kind of the token under the cursor without consuming it.
    #[must_use]
    pub fn peek(&self) -> TokenKind {
        self.tokens.get(self.pos).map_or(TokenKind::Eof, |(k, _)| *k)
    }

    /// Classify the current token and return the advanced cursor.
    ///
    /// This is the token-source contract: pure and deterministic, a function
    /// of position only. At end of input it reports [`TokenKind::Eof`] and
    /// the returned cursor sits at the same position.
    #[must_use]
    pub fn next_token(self) -> (TokenKind, Self) {
        match self.tokens.get(self.pos) {
            Some((kind, _)) => (*kind, Self { pos: self.pos + 1, ..self }),
            None => (TokenKind::Eof, self),
        }
    }

    /// Source text of the token under the cursor, if any.
    #[must_use]
    pub fn token_text(&self) -> Option<&'a str> {
        let (_, span) = self.tokens.get(self.pos)?;
        self.src.get(span.clone())
    }

    /// Whether both cursors sit at the same position in the same input.
    ///
    /// Used by the climbing engine to detect recursive parses that made no
    /// progress.
    #[must_use]
    pub fn at_same_position(&self, other: &Self) -> bool {
        self.pos == other.pos
    }

    /// Whether every token has been consumed.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the current token in the source, or the source length
    /// once the input is exhausted. Diagnostic use only.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self.tokens.get(self.pos) {
            Some((_, span)) => span.start,
            None => self.src.len(),
        }
    }
}
