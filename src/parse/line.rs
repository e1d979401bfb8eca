use std::collections::BTreeMap;

use crate::{
    foundation::error::{AnimError, AnimResult},
    parse::{
        lexer::{Token, TokenKind, lex},
        metadata::{MetadataEntry, parse_metadata_entry, split_header_line},
    },
    scene::{
        language::LanguageTable,
        model::{AxisRange, Color, Command, Direction, Domain, Position, RawCode, ShapeKind},
    },
};

/// Verbs understood by the line parser.
pub const VERBS: [&str; 9] = [
    "write",
    "create",
    "plot",
    "fade-in",
    "fade-out",
    "draw",
    "transform",
    "wait",
    "manim",
];

const DEFAULT_SHAPE_COLOR: Color = Color::White;
const DEFAULT_GRAPH_COLOR: Color = Color::Blue;
const DEFAULT_STROKE_WIDTH: f64 = 4.0;
const DEFAULT_AXES_LENGTH: (f64, f64) = (6.0, 4.0);

/// Classification of one source line.
#[derive(Clone, Debug, PartialEq)]
pub enum Line {
    /// Blank or `#` comment line.
    Blank,
    Metadata(MetadataEntry),
    Command(Command),
}

/// Parse a single source line. `line` is the 1-based line number used in diagnostics.
pub fn parse_line(text: &str, line: usize, table: &LanguageTable) -> AnimResult<Line> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(Line::Blank);
    }

    let indent = text.chars().count() - text.trim_start().chars().count();
    let head_len = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (head, rest) = trimmed.split_at(head_len);
    let verb = head.to_ascii_lowercase();

    if !VERBS.contains(&verb.as_str())
        && let Some((key, value)) = split_header_line(trimmed)
    {
        return parse_metadata_entry(&key, value, line).map(Line::Metadata);
    }

    if verb == "manim" {
        return parse_raw(rest, line, table).map(Line::Command);
    }

    let col_base = indent + head.chars().count() + 1;
    let tokens = lex(rest, col_base).map_err(|e| AnimError::syntax(line, e.to_string()))?;
    let mut p = LineParser {
        line,
        table,
        tokens,
        pos: 0,
    };

    let command = match verb.as_str() {
        "write" => p.write()?,
        "create" => p.create()?,
        "plot" => p.plot()?,
        "fade-in" => Command::FadeIn {
            name: p.reference("object name")?,
        },
        "fade-out" => Command::FadeOut {
            name: p.reference("object name")?,
        },
        "draw" => Command::Draw {
            name: p.reference("object name")?,
        },
        "transform" => p.transform()?,
        "wait" => p.wait()?,
        _ => {
            return Err(AnimError::syntax(
                line,
                format!(
                    "unknown verb '{head}' (expected one of: {})",
                    VERBS.join(", ")
                ),
            ));
        }
    };
    p.expect_end()?;
    Ok(Line::Command(command))
}

/// `manim CODE as NAME`: everything before the trailing `as NAME` is kept verbatim.
fn parse_raw(rest: &str, line: usize, table: &LanguageTable) -> AnimResult<Command> {
    let usage = "expected 'manim <code> as NAME'";
    let rest = rest.trim();
    let Some((before, name)) = rest.rsplit_once(char::is_whitespace) else {
        return Err(AnimError::syntax(line, usage));
    };
    let before = before.trim_end();
    let code = match before.strip_suffix("as") {
        Some(code) if code.ends_with(char::is_whitespace) => code.trim(),
        _ => return Err(AnimError::syntax(line, usage)),
    };
    if code.is_empty() {
        return Err(AnimError::syntax(line, "manim escape has no code before 'as'"));
    }
    check_name(name, line, table)?;
    Ok(Command::RawEscape {
        code: RawCode::new(code),
        name: name.to_string(),
    })
}

fn check_name(name: &str, line: usize, table: &LanguageTable) -> AnimResult<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(AnimError::syntax(
            line,
            format!(
                "invalid name '{name}' (letters, digits and '_', not starting with a digit)"
            ),
        ));
    }
    if table.is_reserved(name) {
        return Err(AnimError::syntax(
            line,
            format!("'{name}' is reserved by the animation backend"),
        ));
    }
    Ok(())
}

/// Value of a `key=value` option.
#[derive(Clone, Debug)]
struct OptionValue {
    kind: TokenKind,
    col: usize,
}

struct LineParser<'a> {
    line: usize,
    table: &'a LanguageTable,
    tokens: Vec<Token>,
    pos: usize,
}

impl LineParser<'_> {
    fn err(&self, msg: impl Into<String>) -> AnimError {
        AnimError::syntax(self.line, msg)
    }

    fn err_at(&self, col: usize, msg: impl AsRef<str>) -> AnimError {
        AnimError::syntax(self.line, format!("{} (column {col})", msg.as_ref()))
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_word(&self) -> Option<&str> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Word(w),
                ..
            }) => Some(w),
            _ => None,
        }
    }

    fn next(&mut self, expected: &str) -> AnimResult<Token> {
        let Some(tok) = self.tokens.get(self.pos).cloned() else {
            return Err(self.err(format!("expected {expected}, found end of line")));
        };
        self.pos += 1;
        Ok(tok)
    }

    fn word(&mut self, expected: &str) -> AnimResult<(String, usize)> {
        let tok = self.next(expected)?;
        match tok.kind {
            TokenKind::Word(w) => Ok((w, tok.col)),
            other => Err(self.err_at(
                tok.col,
                format!("expected {expected}, found {}", other.describe()),
            )),
        }
    }

    fn keyword(&mut self, kw: &str) -> AnimResult<()> {
        let (w, col) = self.word(&format!("'{kw}'"))?;
        if w != kw {
            return Err(self.err_at(col, format!("expected '{kw}', found '{w}'")));
        }
        Ok(())
    }

    fn string(&mut self, expected: &str) -> AnimResult<String> {
        let tok = self.next(expected)?;
        match tok.kind {
            TokenKind::Str(s) => Ok(s),
            other => Err(self.err_at(
                tok.col,
                format!("expected {expected}, found {}", other.describe()),
            )),
        }
    }

    /// A name being declared.
    fn declaration(&mut self) -> AnimResult<String> {
        self.keyword("as")?;
        let (name, _) = self.word("a name after 'as'")?;
        check_name(&name, self.line, self.table)?;
        Ok(name)
    }

    /// A name referring to an earlier declaration.
    fn reference(&mut self, expected: &str) -> AnimResult<String> {
        let (name, _) = self.word(expected)?;
        check_name(&name, self.line, self.table)?;
        Ok(name)
    }

    fn expect_end(&self) -> AnimResult<()> {
        match self.peek() {
            None => Ok(()),
            Some(tok) => Err(self.err_at(
                tok.col,
                format!("unexpected {} at end of command", tok.kind.describe()),
            )),
        }
    }

    /// Consume `key=value` pairs while they are present.
    fn options(
        &mut self,
        context: &str,
        allowed: &[&str],
    ) -> AnimResult<BTreeMap<String, OptionValue>> {
        let mut out = BTreeMap::new();
        loop {
            let Some(Token {
                kind: TokenKind::Word(key),
                col,
            }) = self.tokens.get(self.pos).cloned()
            else {
                break;
            };
            if !matches!(
                self.tokens.get(self.pos + 1),
                Some(Token {
                    kind: TokenKind::Eq,
                    ..
                })
            ) {
                break;
            }
            if !allowed.contains(&key.as_str()) {
                return Err(self.err_at(
                    col,
                    format!(
                        "unknown option '{key}' for {context} (expected one of: {})",
                        allowed.join(", ")
                    ),
                ));
            }
            if out.contains_key(&key) {
                return Err(self.err_at(col, format!("option '{key}' given twice")));
            }
            self.pos += 2;
            let value = self.next(&format!("a value for '{key}'"))?;
            out.insert(
                key,
                OptionValue {
                    kind: value.kind,
                    col: value.col,
                },
            );
        }
        Ok(out)
    }

    fn color_option(
        &self,
        opts: &BTreeMap<String, OptionValue>,
        default: Color,
    ) -> AnimResult<Color> {
        let Some(v) = opts.get("color") else {
            return Ok(default);
        };
        let TokenKind::Word(name) = &v.kind else {
            return Err(self.err_at(
                v.col,
                format!("expected a color name, found {}", v.kind.describe()),
            ));
        };
        self.table.color(name).ok_or_else(|| {
            self.err_at(
                v.col,
                format!(
                    "unknown color '{name}' (expected one of: {})",
                    self.table.color_names().collect::<Vec<_>>().join(", ")
                ),
            )
        })
    }

    fn list_option(
        &self,
        opts: &BTreeMap<String, OptionValue>,
        key: &str,
        context: &str,
    ) -> AnimResult<(Vec<f64>, usize)> {
        let Some(v) = opts.get(key) else {
            return Err(self.err(format!("{context} requires {key}=[...]")));
        };
        let TokenKind::List(inner) = &v.kind else {
            return Err(self.err_at(
                v.col,
                format!(
                    "expected a range like [min,max] for '{key}', found {}",
                    v.kind.describe()
                ),
            ));
        };
        let values = self.numbers(inner, v.col)?;
        Ok((values, v.col))
    }

    fn numbers(&self, text: &str, col: usize) -> AnimResult<Vec<f64>> {
        text.split(',')
            .map(str::trim)
            .map(|part| match part.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(self.err_at(col, format!("'{part}' is not a number"))),
            })
            .collect()
    }

    fn formula(&mut self) -> AnimResult<String> {
        let formula = self.string("a quoted formula")?;
        if formula.trim().is_empty() {
            return Err(self.err("formula must not be empty"));
        }
        Ok(formula)
    }

    fn position(&mut self) -> AnimResult<Position> {
        let Some(w) = self.peek_word().map(str::to_string) else {
            return match self.peek() {
                None => Ok(Position::Auto),
                Some(tok) => Err(self.err_at(
                    tok.col,
                    format!("expected a position, found {}", tok.kind.describe()),
                )),
            };
        };
        self.pos += 1;
        if w == "at" {
            self.keyword("center")?;
            return Ok(Position::Center);
        }
        let Some(direction) = Direction::from_keyword(&w) else {
            return Err(self.err(format!(
                "expected a position ('at center', 'above NAME', 'below NAME', 'left-of NAME' \
                 or 'right-of NAME'), found '{w}'"
            )));
        };
        let anchor = self.reference(&format!("a name after '{w}'"))?;
        Ok(Position::Relative { anchor, direction })
    }

    fn write(&mut self) -> AnimResult<Command> {
        let (kind, col) = self.word("'equation' or 'text'")?;
        let is_equation = match kind.as_str() {
            "equation" => true,
            "text" => false,
            other => {
                return Err(self.err_at(
                    col,
                    format!("expected 'equation' or 'text' after 'write', found '{other}'"),
                ));
            }
        };
        let text = self.string(&format!("a quoted {kind}"))?;
        let name = self.declaration()?;
        let position = self.position()?;
        Ok(if is_equation {
            Command::WriteEquation {
                text,
                name,
                position,
            }
        } else {
            Command::WriteText {
                text,
                name,
                position,
            }
        })
    }

    fn create(&mut self) -> AnimResult<Command> {
        let (kind, col) = self.word("an object kind")?;
        let shape = match kind.as_str() {
            "circle" => ShapeKind::Circle,
            "square" => ShapeKind::Square,
            "arrow" => ShapeKind::Arrow,
            "axes" => return self.axes(),
            "graph" => return self.graph(),
            other => {
                return Err(self.err_at(
                    col,
                    format!(
                        "unknown object kind '{other}' (expected circle, square, arrow, axes \
                         or graph)"
                    ),
                ));
            }
        };
        let opts = self.options(&format!("create {kind}"), &["color"])?;
        let color = self.color_option(&opts, DEFAULT_SHAPE_COLOR)?;
        let name = self.declaration()?;
        let position = self.position()?;
        Ok(Command::CreateShape {
            kind: shape,
            color,
            name,
            position,
        })
    }

    fn axes(&mut self) -> AnimResult<Command> {
        let opts = self.options("create axes", &["x", "y", "length"])?;
        let x_range = self.axis_range(&opts, "x")?;
        let y_range = self.axis_range(&opts, "y")?;
        let (x_length, y_length) = match opts.get("length") {
            None => DEFAULT_AXES_LENGTH,
            Some(v) => {
                let usage = "expected length=WIDTH,HEIGHT with two positive numbers";
                let TokenKind::Word(text) = &v.kind else {
                    return Err(self.err_at(v.col, usage));
                };
                match self.numbers(text, v.col)?[..] {
                    [w, h] if w > 0.0 && h > 0.0 => (w, h),
                    _ => return Err(self.err_at(v.col, usage)),
                }
            }
        };
        let name = self.declaration()?;
        Ok(Command::CreateAxes {
            x_range,
            y_range,
            x_length,
            y_length,
            name,
        })
    }

    fn axis_range(
        &self,
        opts: &BTreeMap<String, OptionValue>,
        key: &str,
    ) -> AnimResult<AxisRange> {
        let (values, col) = self.list_option(opts, key, "create axes")?;
        let [min, max, step] = values[..] else {
            return Err(self.err_at(col, format!("axis range '{key}' must be [min,max,step]")));
        };
        if min >= max {
            return Err(self.err_at(col, format!("axis range '{key}' has min >= max")));
        }
        if step <= 0.0 {
            return Err(self.err_at(
                col,
                format!("axis range '{key}' must have a positive step"),
            ));
        }
        Ok(AxisRange { min, max, step })
    }

    fn domain(&self, opts: &BTreeMap<String, OptionValue>) -> AnimResult<Domain> {
        let (values, col) = self.list_option(opts, "x", "create graph")?;
        let [min, max] = values[..] else {
            return Err(self.err_at(col, "graph domain must be [min,max]"));
        };
        if min >= max {
            return Err(self.err_at(col, "graph domain has min >= max"));
        }
        Ok(Domain { min, max })
    }

    fn graph(&mut self) -> AnimResult<Command> {
        let formula = self.formula()?;
        let opts = self.options("create graph", &["x", "color"])?;
        let x_range = self.domain(&opts)?;
        let color = self.color_option(&opts, DEFAULT_GRAPH_COLOR)?;
        let name = self.declaration()?;
        Ok(Command::CreateGraph {
            formula,
            x_range,
            color,
            name,
        })
    }

    fn plot(&mut self) -> AnimResult<Command> {
        let formula = self.formula()?;
        self.keyword("on")?;
        let axes = self.reference("an axes name after 'on'")?;
        let opts = self.options("plot", &["color", "stroke"])?;
        let color = self.color_option(&opts, DEFAULT_GRAPH_COLOR)?;
        let stroke_width = match opts.get("stroke") {
            None => DEFAULT_STROKE_WIDTH,
            Some(v) => {
                let parsed = match &v.kind {
                    TokenKind::Word(w) => w.parse::<f64>().ok(),
                    _ => None,
                };
                match parsed {
                    Some(s) if s.is_finite() && s > 0.0 => s,
                    _ => {
                        return Err(self.err_at(
                            v.col,
                            format!(
                                "invalid stroke width {} (expected a positive number)",
                                v.kind.describe()
                            ),
                        ));
                    }
                }
            }
        };
        let name = self.declaration()?;
        Ok(Command::Plot {
            formula,
            axes,
            color,
            stroke_width,
            name,
        })
    }

    fn transform(&mut self) -> AnimResult<Command> {
        let from = self.reference("a source name")?;
        let tok = self.next("'->'")?;
        if tok.kind != TokenKind::Arrow {
            return Err(self.err_at(
                tok.col,
                format!("expected '->', found {}", tok.kind.describe()),
            ));
        }
        let to = self.reference("a target name after '->'")?;
        Ok(Command::Transform { from, to })
    }

    fn wait(&mut self) -> AnimResult<Command> {
        let (text, col) = self.word("a duration in seconds")?;
        match text.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(Command::Wait { seconds }),
            _ => Err(self.err_at(
                col,
                format!("invalid wait duration '{text}' (expected a positive number of seconds)"),
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parse/line.rs"]
mod tests;
