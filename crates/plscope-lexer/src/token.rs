//! Token definitions for the procedural-SQL dialect
//!
//! Keywords are not separate token kinds: PL/SQL has hundreds of non-reserved
//! keywords that are also valid identifiers, so the parser matches words by
//! their upper-cased text.

use logos::{FilterResult, Lexer, Logos};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]                   // Skip whitespace
#[logos(skip r"--[^\n]*")]                       // Skip line comments
pub enum TokenKind {
    // === Operators ===
    #[token(":=")]
    Assign,
    #[token("=>")]
    Arrow,
    #[token("..")]
    DotDot,
    #[token("||")]
    Concat,
    #[token("=")]
    Eq,
    #[token("<>")]
    #[token("!=")]
    #[token("^=")]
    #[token("~=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("@")]
    At,
    #[token("<<")]
    LabelOpen,
    #[token(">>")]
    LabelClose,

    // === Literals ===
    #[regex(r"[0-9]+", priority = 2)]
    Int,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Float,

    #[regex(r"'([^']|'')*'")]
    String,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_$#]*")]
    Ident,

    #[regex(r#""[^"]+""#)]
    QuotedIdent,

    // === Special ===
    /// Never emitted: the callback skips the comment or fails if it is unterminated
    #[token("/*", block_comment)]
    BlockComment,
    Error,
    Eof,
}

impl TokenKind {
    pub fn is_word(&self) -> bool {
        matches!(self, TokenKind::Ident | TokenKind::QuotedIdent)
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            TokenKind::Eq | TokenKind::Ne | TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge
        )
    }

    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Assign => "':='",
            TokenKind::Arrow => "'=>'",
            TokenKind::DotDot => "'..'",
            TokenKind::Concat => "'||'",
            TokenKind::Eq => "'='",
            TokenKind::Ne => "'<>'",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Dot => "'.'",
            TokenKind::Colon => "':'",
            TokenKind::At => "'@'",
            TokenKind::LabelOpen => "'<<'",
            TokenKind::LabelClose => "'>>'",
            TokenKind::Int => "integer",
            TokenKind::Float => "number",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::QuotedIdent => "quoted identifier",
            TokenKind::BlockComment => "comment",
            TokenKind::Error => "invalid character",
            TokenKind::Eof => "end of input",
        }
    }
}

/// Skip a `/* ... */` comment, which may span lines
fn block_comment(lex: &mut Lexer<'_, TokenKind>) -> FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            FilterResult::Error(())
        }
    }
}
