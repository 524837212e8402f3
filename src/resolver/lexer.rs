//! Minimal ECMAScript/TypeScript lexer.
//!
//! Tokenizes just enough of the language for root-scope export discovery:
//! identifiers, literals, template strings, comments, and punctuation.
//! Tokens carry byte spans into the original source so expression text can
//! be recovered verbatim.

use crate::error::{DtsgenError, DtsgenResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Punct,
    Str,
    Template,
    Num,
}

#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// A line terminator appears between this token and the previous one.
    pub newline_before: bool,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }
}

/// Multi-character punctuators, longest first so greedy matching is correct.
const PUNCTS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>",
];

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$' || c >= 0x80
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$' || c >= 0x80
}

fn parse_err(offset: usize, message: &str) -> DtsgenError {
    DtsgenError::Parse {
        offset,
        message: message.to_string(),
    }
}

pub fn lex(src: &str) -> DtsgenResult<Vec<Token>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut newline = false;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'\n' => {
                newline = true;
                i += 1;
            }
            b' ' | b'\t' | b'\r' | 0x0c => i += 1,
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = src[i + 2..]
                    .find("*/")
                    .ok_or_else(|| parse_err(i, "unterminated block comment"))?;
                if src[i + 2..i + 2 + close].contains('\n') {
                    newline = true;
                }
                i += close + 4;
            }
            b'\'' | b'"' => {
                let start = i;
                i += 1;
                loop {
                    match bytes.get(i) {
                        Some(b'\\') => i += 2,
                        Some(&q) if q == c => {
                            i += 1;
                            break;
                        }
                        Some(b'\n') | None => {
                            return Err(parse_err(start, "unterminated string literal"))
                        }
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Str,
                    start,
                    end: i,
                    newline_before: newline,
                });
                newline = false;
            }
            b'`' => {
                let start = i;
                i += 1;
                let mut brace_depth = 0usize;
                loop {
                    match bytes.get(i) {
                        Some(b'\\') => i += 2,
                        Some(b'`') if brace_depth == 0 => {
                            i += 1;
                            break;
                        }
                        Some(b'$') if brace_depth == 0 && bytes.get(i + 1) == Some(&b'{') => {
                            brace_depth = 1;
                            i += 2;
                        }
                        Some(b'{') if brace_depth > 0 => {
                            brace_depth += 1;
                            i += 1;
                        }
                        Some(b'}') if brace_depth > 0 => {
                            brace_depth -= 1;
                            i += 1;
                        }
                        None => return Err(parse_err(start, "unterminated template literal")),
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Template,
                    start,
                    end: i,
                    newline_before: newline,
                });
                newline = false;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < bytes.len() && is_ident_continue(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident,
                    start,
                    end: i,
                    newline_before: newline,
                });
                newline = false;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.' || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Num,
                    start,
                    end: i,
                    newline_before: newline,
                });
                newline = false;
            }
            _ => {
                let rest = &src[i..];
                let len = PUNCTS
                    .iter()
                    .find(|p| rest.starts_with(**p))
                    .map(|p| p.len())
                    .unwrap_or(1);
                tokens.push(Token {
                    kind: TokenKind::Punct,
                    start: i,
                    end: i + len,
                    newline_before: newline,
                });
                newline = false;
                i += len;
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        lex(src)
            .unwrap()
            .iter()
            .map(|t| t.text(src).to_string())
            .collect()
    }

    #[test]
    fn test_lex_assignment() {
        assert_eq!(
            texts("module.exports = foo;"),
            vec!["module", ".", "exports", "=", "foo", ";"]
        );
    }

    #[test]
    fn test_lex_multichar_puncts() {
        assert_eq!(texts("a === b"), vec!["a", "===", "b"]);
        assert_eq!(texts("() => x"), vec!["(", ")", "=>", "x"]);
        // `=-` is `=` then unary minus, not one operator
        assert_eq!(texts("x =-1"), vec!["x", "=", "-", "1"]);
    }

    #[test]
    fn test_lex_skips_comments() {
        assert_eq!(texts("a // trailing\nb /* mid */ c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lex_template_with_interpolation() {
        let src = "`a ${ {b: 1} } c`";
        let tokens = lex(src).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Template);
    }

    #[test]
    fn test_lex_newline_flag() {
        let src = "a\nb";
        let tokens = lex(src).unwrap();
        assert!(!tokens[0].newline_before);
        assert!(tokens[1].newline_before);
    }

    #[test]
    fn test_lex_unterminated_string_is_error() {
        assert!(lex("const a = 'oops").is_err());
        assert!(lex("/* never closed").is_err());
    }
}
