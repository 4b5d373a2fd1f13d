//! Lexer built on logos
//!
//! Raw tokens come out of a `logos`-derived scanner; [`tokenize`] turns them
//! into [`Token`]s with resolved text and 1-based line/column positions.

use std::ops::Range;
use std::rc::Rc;

use logos::Logos;

use crate::error::{EvalError, Location};
use crate::token::{Token, TokenKind, KEYWORDS};

/// Raw token from logos (before classification).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"#[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,

    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    Variable,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+")]
    Decimal,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    Str,

    #[token("->")]
    #[token("::")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("&&")]
    #[token("||")]
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("++")]
    #[token("--")]
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("<")]
    #[token(">")]
    #[token("!")]
    #[token("=")]
    Operator,

    #[token("(")]
    #[token(")")]
    #[token("{")]
    #[token("}")]
    #[token("[")]
    #[token("]")]
    #[token(",")]
    #[token(";")]
    #[token(":")]
    Punctuation,
}

/// Byte offsets of line starts, for offset → line/column mapping.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn position(&self, source: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let start = self.starts[line - 1];
        let column = source[start..offset].chars().count() + 1;
        (line, column)
    }
}

/// Tokenize a whole source text.
pub fn tokenize(source: &str, file: &str) -> Result<Vec<Token>, EvalError> {
    tokenize_range(source, 0..source.len(), file)
}

/// Tokenize `source[range]`, reporting positions relative to all of
/// `source`. Used for code segments embedded in templates.
pub fn tokenize_range(
    source: &str,
    range: Range<usize>,
    file: &str,
) -> Result<Vec<Token>, EvalError> {
    let file: Rc<str> = Rc::from(file);
    let index = LineIndex::new(source);
    let base = range.start;
    let segment = &source[range];

    let mut tokens = Vec::new();
    let mut lex = RawToken::lexer(segment);
    while let Some(raw) = lex.next() {
        let span = lex.span();
        let (line, column) = index.position(source, base + span.start);
        let location = Location::new(Rc::clone(&file), line, column);
        let slice = lex.slice();

        let raw = raw.map_err(|()| {
            EvalError::syntax(format!("unexpected character {:?}", slice), location.clone())
        })?;

        let token = match raw {
            RawToken::Comment => continue,
            RawToken::Variable => Token::new(TokenKind::Variable, &slice[1..], location),
            RawToken::Word if KEYWORDS.contains(&slice) => {
                Token::new(TokenKind::Keyword, slice, location)
            }
            RawToken::Word => Token::new(TokenKind::Identifier, slice, location),
            RawToken::Integer => Token::new(TokenKind::Integer, slice, location),
            RawToken::Decimal => Token::new(TokenKind::Decimal, slice, location),
            RawToken::Str => {
                let text = unescape(&slice[1..slice.len() - 1]);
                Token::new(TokenKind::String, text, location)
            }
            RawToken::Operator => Token::new(TokenKind::Operator, slice, location),
            RawToken::Punctuation => Token::new(TokenKind::Punctuation, slice, location),
        };
        tokens.push(token);
    }

    let (line, column) = index.position(source, base + segment.len());
    tokens.push(Token::new(
        TokenKind::EndOfFile,
        "",
        Location::new(file, line, column),
    ));
    Ok(tokens)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src, "t").unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_declaration_tokens() {
        let tokens = tokenize("int $a = 10;", "t").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].text, "a");
        assert!(tokens[2].is_operator("="));
        assert_eq!(tokens[3].kind, TokenKind::Integer);
        assert!(tokens[4].is_punct(";"));
        assert!(tokens[5].is_eof());
    }

    #[test]
    fn test_positions_are_one_based() {
        let tokens = tokenize("int $a;\n  $a = 2;", "t").unwrap();
        assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
        let a = &tokens[3];
        assert_eq!(a.text, "a");
        assert_eq!((a.location.line, a.location.column), (2, 3));
    }

    #[test]
    fn test_comments_are_skipped() {
        let src = "// one\n# two\n/* three\n four */ $x";
        assert_eq!(kinds(src), vec![TokenKind::Variable, TokenKind::EndOfFile]);
    }

    #[test]
    fn test_multi_char_operators() {
        let tokens = tokenize("$a->b == c :: d && e ++", "t").unwrap();
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Operator)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec!["->", "==", "::", "&&", "++"]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\"b\n" 'c'"#, "t").unwrap();
        assert_eq!(tokens[0].text, "a\"b\n");
        assert_eq!(tokens[1].text, "c");
    }

    #[test]
    fn test_decimal_vs_integer() {
        assert_eq!(
            kinds("1 1.5"),
            vec![TokenKind::Integer, TokenKind::Decimal, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn test_unexpected_character_is_syntax_error() {
        let err = tokenize("int $a = @;", "t").unwrap_err();
        assert!(matches!(err, EvalError::SyntaxError { .. }));
        assert_eq!(err.location().column, 10);
    }

    #[test]
    fn test_range_keeps_absolute_positions() {
        let src = "hello\n<?void $x ?>";
        let start = src.find("$x").unwrap();
        let tokens = tokenize_range(src, start..start + 2, "t").unwrap();
        assert_eq!(tokens[0].location.line, 2);
        assert_eq!(tokens[0].location.column, 7);
    }
}
