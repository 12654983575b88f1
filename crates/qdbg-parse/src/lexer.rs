//! Structural scanner for comments and braces.
//!
//! The preprocessor never builds a full token stream. It only needs to find
//! line comments and brace pairs, so everything else collapses into [`Token::Text`].

use std::ops::Range;

use logos::Logos;

/// Tokens relevant to comment stripping and block extraction.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `//` up to, not including, the next newline.
    #[regex(r"//[^\n]*")]
    Comment,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    /// A lone slash, e.g. in `rx(pi/2)`.
    #[token("/")]
    Slash,

    /// Any run of other characters, newlines included.
    #[regex(r"[^/{}]+")]
    Text,
}

/// A token with its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Range<usize>,
}

/// Scan `source` into structural tokens.
///
/// Every byte of `source` is covered by exactly one token, in order.
pub fn tokenize(source: &str) -> Vec<SpannedToken> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        // The token set is total, but degrade to text rather than drop bytes.
        let token = result.unwrap_or(Token::Text);
        tokens.push(SpannedToken { token, span });
    }

    tokens
}
