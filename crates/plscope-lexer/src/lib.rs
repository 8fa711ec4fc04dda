//! plscope Lexer - Tokenization using logos
//!
//! Handles the dialect's lexical quirks:
//! - `:=` is assignment, `=` is comparison
//! - `'it''s'` doubles quotes inside strings
//! - `"Quoted"` identifiers keep their case
//! - `1..10` lexes as two integers around `..`

mod token;

pub use token::*;

use logos::Logos;
use plscope_ast::Span;

/// Tokenize a source string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }

    // Add EOF token
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

/// Identifier text with surrounding double quotes removed
pub fn identifier_text(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(raw)
}

/// String literal contents with quotes removed and `''` collapsed
pub fn string_literal_text(raw: &str) -> String {
    let inner = raw
        .strip_prefix('\'')
        .and_then(|inner| inner.strip_suffix('\''))
        .unwrap_or(raw);
    inner.replace("''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_assignment_vs_equality() {
        assert_eq!(
            kinds("x := 5"),
            vec![TokenKind::Ident, TokenKind::Assign, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(kinds("x = 5")[1], TokenKind::Eq);
    }

    #[test]
    fn test_range_is_not_a_float() {
        assert_eq!(
            kinds("1..10"),
            vec![TokenKind::Int, TokenKind::DotDot, TokenKind::Int, TokenKind::Eof]
        );
        assert_eq!(kinds("3.14")[0], TokenKind::Float);
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "-- header\nbegin /* inline\n comment */ null; end;";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Ident,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_line_block_comment() {
        let source = "BEGIN /* one line */ NULL; /**/ END; /* a * b / c **/";
        let tokens = tokenize(source);
        let words: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text(source))
            .collect();
        assert_eq!(words, vec!["BEGIN", "NULL", "END"]);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Error));
    }

    #[test]
    fn test_unterminated_block_comment_is_an_error() {
        let kinds = kinds("x /* never closed");
        assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::Error, TokenKind::Eof]);
    }

    #[test]
    fn test_slash_and_star_still_lex_apart() {
        assert_eq!(
            kinds("a / b * c"),
            vec![
                TokenKind::Ident,
                TokenKind::Slash,
                TokenKind::Ident,
                TokenKind::Star,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_identifier_and_string() {
        let source = r#"NTHIS."DATA_ROW" 'it''s'"#;
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::QuotedIdent);
        assert_eq!(identifier_text(tokens[2].text(source)), "DATA_ROW");
        assert_eq!(tokens[3].kind, TokenKind::String);
        assert_eq!(string_literal_text(tokens[3].text(source)), "it's");
    }

    #[test]
    fn test_not_equal_spellings() {
        for op in ["<>", "!=", "^=", "~="] {
            assert_eq!(kinds(&format!("a {op} b"))[1], TokenKind::Ne, "operator {op}");
        }
    }

    #[test]
    fn test_keywords_are_case_insensitive_words() {
        let source = "BeGiN";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert!(tokens[0].text(source).eq_ignore_ascii_case("begin"));
    }
}
