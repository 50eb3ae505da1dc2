//! C# tokenizer.
//!
//! Only the shape of declarations matters to the parser, so the token set is
//! small: structural keywords, identifiers, literals and punctuation.
//! Comments and preprocessor lines are skipped, and characters that fit no
//! token are dropped.

use logos::Logos;
use std::ops::Range;

/// C# token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// Keyword `using`
    #[token("using")]
    Using,
    /// Keyword `namespace`
    #[token("namespace")]
    Namespace,
    /// Keyword `class`
    #[token("class")]
    Class,
    /// Keyword `struct`
    #[token("struct")]
    Struct,
    /// Keyword `interface`
    #[token("interface")]
    Interface,
    /// Keyword `enum`
    #[token("enum")]
    Enum,
    /// Keyword `delegate`
    #[token("delegate")]
    Delegate,
    /// Keyword `event`
    #[token("event")]
    Event,

    /// Identifier or contextual keyword, optionally `@`-escaped.
    #[regex(r"@?[_\p{L}][_\p{L}\p{N}]*")]
    Ident,

    /// String literal of any flavour.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    #[regex(r#"\$"([^"\\\n]|\\.)*""#)]
    #[regex(r#"(\$@|@\$)"([^"]|"")*""#)]
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#)]
    Str,
    /// Character literal.
    #[regex(r"'([^'\\\n]|\\[^\n][^'\n]*)'")]
    Char,
    /// Numeric literal.
    #[regex(r"[0-9][0-9A-Za-z_.]*")]
    Number,

    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `<`
    #[token("<")]
    Lt,
    /// `>`
    #[token(">")]
    Gt,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `:`
    #[token(":")]
    Colon,
    /// `.`
    #[token(".")]
    Dot,
    /// `=`
    #[token("=")]
    Eq,
    /// `?`
    #[token("?")]
    Question,
    /// `*`
    #[token("*")]
    Star,
    /// Any other operator character.
    #[regex(r"[+\-/%!~^|&$\\]")]
    Operator,
}

impl Token {
    /// Returns true for tokens that open a bracketed region.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::LBrace | Self::LParen | Self::LBracket)
    }

    /// Returns true for tokens that close a bracketed region.
    #[must_use]
    pub const fn is_close(&self) -> bool {
        matches!(self, Self::RBrace | Self::RParen | Self::RBracket)
    }
}

/// A token with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    /// Token kind.
    pub token: Token,
    /// Byte range in the source.
    pub span: Range<usize>,
    /// 1-based line of the first byte.
    pub line: usize,
}

/// Tokenizes `source`, dropping characters that fit no token.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Lexeme> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect();
    let line_of = |offset: usize| line_starts.partition_point(|&start| start <= offset);

    let mut lexer = Token::lexer(source);
    let mut lexemes = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(token) => lexemes.push(Lexeme {
                token,
                line: line_of(span.start),
                span,
            }),
            Err(()) => {
                tracing::trace!(
                    "skipping unrecognized input {:?} at line {}",
                    lexer.slice(),
                    line_of(span.start)
                );
            }
        }
    }
    lexemes
}
