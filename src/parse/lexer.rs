use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Bare word: verbs, keywords, names, numbers, colors.
    Word(String),
    /// Double-quoted string with `\"` and `\\` unescaped.
    Str(String),
    /// Raw contents between `[` and `]`.
    List(String),
    Eq,
    Arrow,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Word(w) => format!("'{w}'"),
            Self::Str(_) => "a quoted string".to_string(),
            Self::List(inner) => format!("'[{inner}]'"),
            Self::Eq => "'='".to_string(),
            Self::Arrow => "'->'".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// 1-based column in the source line.
    pub(crate) col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexError {
    pub(crate) col: usize,
    pub(crate) message: String,
}

impl LexError {
    fn new(col: usize, message: impl Into<String>) -> Self {
        Self {
            col,
            message: message.into(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (column {})", self.message, self.col)
    }
}

/// Split the argument part of a command line into tokens.
///
/// `col_base` is the 1-based column of `input`'s first character within its line.
pub(crate) fn lex(input: &str, col_base: usize) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = Vec::new();
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let col = col_base + i;

        match c {
            '"' => {
                i += 1;
                let mut s = String::new();
                let mut closed = false;
                while i < chars.len() {
                    let ch = chars[i];
                    if ch == '\\' && i + 1 < chars.len() && matches!(chars[i + 1], '"' | '\\') {
                        s.push(chars[i + 1]);
                        i += 2;
                        continue;
                    }
                    if ch == '"' {
                        closed = true;
                        i += 1;
                        break;
                    }
                    s.push(ch);
                    i += 1;
                }
                if !closed {
                    return Err(LexError::new(col, "unterminated string literal"));
                }
                out.push(Token {
                    kind: TokenKind::Str(s),
                    col,
                });
            }
            '[' => {
                let Some(len) = chars[i + 1..].iter().position(|&ch| ch == ']') else {
                    return Err(LexError::new(col, "unterminated range (missing ']')"));
                };
                let inner: String = chars[i + 1..i + 1 + len].iter().collect();
                i += len + 2;
                out.push(Token {
                    kind: TokenKind::List(inner),
                    col,
                });
            }
            ']' => return Err(LexError::new(col, "unexpected ']'")),
            '=' => {
                i += 1;
                out.push(Token {
                    kind: TokenKind::Eq,
                    col,
                });
            }
            '-' if chars.get(i + 1) == Some(&'>') => {
                i += 2;
                out.push(Token {
                    kind: TokenKind::Arrow,
                    col,
                });
            }
            _ => {
                let start = i;
                while i < chars.len() {
                    let ch = chars[i];
                    let arrow = ch == '-' && chars.get(i + 1) == Some(&'>');
                    if ch.is_whitespace() || matches!(ch, '"' | '[' | ']' | '=') || arrow {
                        break;
                    }
                    i += 1;
                }
                out.push(Token {
                    kind: TokenKind::Word(chars[start..i].iter().collect()),
                    col,
                });
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/parse/lexer.rs"]
mod tests;
