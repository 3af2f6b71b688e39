//! Lexical analysis for calculator programs.
//!
//! This module exposes a `tokenize` function which converts raw source text
//! into a sequence of `(TokenKind, Span)` pairs. It uses the `logos` crate to
//! recognise tokens; whitespace is dropped before the parser sees the stream.
//!
//! The scanner honours the keyword/identifier boundary rule: a fixed token
//! whose text is a prefix of a longer identifier never matches, because
//! identifiers are recognised by maximal munch and only complete identifier
//! matches are looked up in the keyword table. Unrecognised input becomes a
//! [`TokenKind::Error`] token rather than a fault; it matches no expectation
//! and terminates operator climbing, leaving recovery to the caller.

use logos::Logos;
use phf::phf_map;

/// Byte range for a token within the source.
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum RawToken {
    #[regex(r"[ \t\r\n]+")]
    Whitespace,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[regex(r"[0-9]+")]
    Int,
    #[regex(r#""[^"]*""#)]
    Str,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semi,
    #[token("=")]
    Eq,
}

/// Classified token kind as seen by the parser.
///
/// `Eof` is synthesised by the cursor past the end of the token sequence and
/// never appears in the tokenizer output. `Error` marks a span of input the
/// scanner could not classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Error,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Semi,
    Eq,
    KwPrint,
    Ident,
    Int,
    Str,
}

/// Maps identifier strings to their keyword `TokenKind`.
///
/// Only complete identifier matches are looked up here, so a keyword spelled
/// as a prefix of a longer identifier stays an identifier.
static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "print" => TokenKind::KwPrint,
};

fn keyword_kind(ident: &str) -> Option<TokenKind> {
    KEYWORDS.get(ident).copied()
}

/// Tokenize `src` into parser-visible tokens with byte spans.
///
/// Whitespace is skipped. Unknown characters produce [`TokenKind::Error`]
/// tokens covering the unrecognised span.
#[must_use]
pub fn tokenize(src: &str) -> Vec<(TokenKind, Span)> {
    let mut lexer = RawToken::lexer(src);
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "rough capacity estimate"
    )]
    let estimated_tokens = src.len() / 2;
    let mut out = Vec::with_capacity(estimated_tokens);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let Ok(token) = result else {
            out.push((TokenKind::Error, span));
            continue;
        };
        let kind = match token {
            RawToken::Whitespace => continue,
            RawToken::Ident => {
                let text = src.get(span.clone()).unwrap_or("");
                keyword_kind(text).unwrap_or(TokenKind::Ident)
            }
            RawToken::Int => TokenKind::Int,
            RawToken::Str => TokenKind::Str,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Eq => TokenKind::Eq,
        };
        out.push((kind, span));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn classifies_operators_and_literals() {
        assert_eq!(
            kinds("a = 1 + 2 * (3 - 4) / 5;"),
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::Int,
                TokenKind::Plus,
                TokenKind::Int,
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Int,
                TokenKind::Minus,
                TokenKind::Int,
                TokenKind::RParen,
                TokenKind::Slash,
                TokenKind::Int,
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn keyword_requires_identifier_boundary() {
        assert_eq!(kinds("print"), vec![TokenKind::KwPrint]);
        assert_eq!(kinds("printx"), vec![TokenKind::Ident]);
        assert_eq!(kinds("print x"), vec![TokenKind::KwPrint, TokenKind::Ident]);
    }

    #[test]
    fn unknown_input_becomes_error_token() {
        assert_eq!(
            kinds("1 ? 2"),
            vec![TokenKind::Int, TokenKind::Error, TokenKind::Int]
        );
    }

    #[test]
    fn string_literals_are_single_tokens() {
        assert_eq!(kinds("\"hello world\""), vec![TokenKind::Str]);
    }

    #[test]
    fn spans_cover_token_text() {
        let src = "count = 42";
        let tokens = tokenize(src);
        let texts: Vec<&str> = tokens
            .iter()
            .map(|(_, sp)| src.get(sp.clone()).unwrap_or(""))
            .collect();
        assert_eq!(texts, vec!["count", "=", "42"]);
    }
}
