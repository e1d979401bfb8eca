use std::fmt;

use serde::Serialize;

/// Direction of a relative placement (`above NAME`, `left-of NAME`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Above,
    Below,
    LeftOf,
    RightOf,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Self::Above, Self::Below, Self::LeftOf, Self::RightOf];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::LeftOf => "left-of",
            Self::RightOf => "right-of",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.keyword() == s)
    }

    /// Backend direction constant used by `next_to`.
    pub fn backend_vector(self) -> &'static str {
        match self {
            Self::Above => "UP",
            Self::Below => "DOWN",
            Self::LeftOf => "LEFT",
            Self::RightOf => "RIGHT",
        }
    }
}

/// Where a spatial object is placed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Position {
    /// No suffix; the code generator picks a deterministic placement.
    Auto,
    /// `at center`
    Center,
    /// `above NAME`, `below NAME`, `left-of NAME`, `right-of NAME`
    Relative { anchor: String, direction: Direction },
}

impl Position {
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::Relative { anchor, .. } => Some(anchor),
            Self::Auto | Self::Center => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Circle,
    Square,
    Arrow,
}

impl ShapeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Arrow => "arrow",
        }
    }

    pub fn backend_class(self) -> &'static str {
        match self {
            Self::Circle => "Circle",
            Self::Square => "Square",
            Self::Arrow => "Arrow",
        }
    }
}

/// A palette color. Surface names are mapped onto these by the
/// [`LanguageTable`](crate::LanguageTable).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Blue,
    Red,
    Green,
    Yellow,
    Orange,
    White,
    Black,
}

impl Color {
    pub fn backend_name(self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Orange => "ORANGE",
            Self::White => "WHITE",
            Self::Black => "BLACK",
        }
    }
}

/// `[min,max,step]` range of an axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

/// `[min,max]` domain of a function graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

/// Backend code captured verbatim from a `manim ... as NAME` line.
///
/// This is deliberately opaque: nothing in the compiler parses or validates it, so a block
/// using it can still fail at render time (or do anything the backend allows).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawCode(String);

impl RawCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One DSL command. The set is closed: the resolver and the code generator match on it
/// exhaustively.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "verb")]
pub enum Command {
    WriteEquation {
        text: String,
        name: String,
        position: Position,
    },
    WriteText {
        text: String,
        name: String,
        position: Position,
    },
    CreateShape {
        kind: ShapeKind,
        color: Color,
        name: String,
        position: Position,
    },
    CreateAxes {
        x_range: AxisRange,
        y_range: AxisRange,
        x_length: f64,
        y_length: f64,
        name: String,
    },
    CreateGraph {
        formula: String,
        x_range: Domain,
        color: Color,
        name: String,
    },
    Plot {
        formula: String,
        axes: String,
        color: Color,
        stroke_width: f64,
        name: String,
    },
    FadeIn {
        name: String,
    },
    FadeOut {
        name: String,
    },
    Draw {
        name: String,
    },
    Transform {
        from: String,
        to: String,
    },
    Wait {
        seconds: f64,
    },
    RawEscape {
        code: RawCode,
        name: String,
    },
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Self::WriteEquation { .. } | Self::WriteText { .. } => "write",
            Self::CreateShape { .. } | Self::CreateAxes { .. } | Self::CreateGraph { .. } => {
                "create"
            }
            Self::Plot { .. } => "plot",
            Self::FadeIn { .. } => "fade-in",
            Self::FadeOut { .. } => "fade-out",
            Self::Draw { .. } => "draw",
            Self::Transform { .. } => "transform",
            Self::Wait { .. } => "wait",
            Self::RawEscape { .. } => "manim",
        }
    }

    /// Name introduced by this command, if it declares one.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::WriteEquation { name, .. }
            | Self::WriteText { name, .. }
            | Self::CreateShape { name, .. }
            | Self::CreateAxes { name, .. }
            | Self::CreateGraph { name, .. }
            | Self::Plot { name, .. }
            | Self::RawEscape { name, .. } => Some(name),
            Self::FadeIn { .. }
            | Self::FadeOut { .. }
            | Self::Draw { .. }
            | Self::Transform { .. }
            | Self::Wait { .. } => None,
        }
    }
}

/// A command together with the 1-based source line it came from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Statement {
    pub line: usize,
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    Low,
    Medium,
    #[default]
    High,
}

impl Quality {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Quality flag understood by the manim CLI.
    pub fn renderer_flag(self) -> &'static str {
        match self {
            Self::Low => "-ql",
            Self::Medium => "-qm",
            Self::High => "-qh",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Block header. `height` is the embed height in the document; `width` doubles as the GIF
/// scale width when set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metadata {
    pub height: u32,
    pub width: Option<u32>,
    pub quality: Quality,
    pub scale: Option<f64>,
    pub fps: u32,
}

impl Metadata {
    pub const DEFAULT_HEIGHT: u32 = 500;
    pub const DEFAULT_FPS: u32 = 24;
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            height: Self::DEFAULT_HEIGHT,
            width: None,
            quality: Quality::High,
            scale: None,
            fps: Self::DEFAULT_FPS,
        }
    }
}

/// A parsed DSL block.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Scene {
    pub metadata: Metadata,
    pub statements: Vec<Statement>,
}

/// Kind of a declared scene object, as recorded in the symbol table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Equation,
    Text,
    Shape(ShapeKind),
    Axes,
    Graph,
    Plot,
    /// Declared by a raw backend escape; kind checks are skipped for it.
    Unknown,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equation => f.write_str("an equation"),
            Self::Text => f.write_str("a text"),
            Self::Shape(ShapeKind::Arrow) => f.write_str("an arrow"),
            Self::Shape(kind) => write!(f, "a {}", kind.keyword()),
            Self::Axes => f.write_str("axes"),
            Self::Graph => f.write_str("a graph"),
            Self::Plot => f.write_str("a plot"),
            Self::Unknown => f.write_str("a raw backend object"),
        }
    }
}
