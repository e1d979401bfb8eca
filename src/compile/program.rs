use std::fmt::Write as _;

use crate::scene::model::{AxisRange, Color, Direction, Domain, Metadata, RawCode, ShapeKind};

/// Ordered backend operations for one block.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub metadata: Metadata,
    pub ops: Vec<Op>,
}

/// One operation, tagged with the source line that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Op {
    pub line: usize,
    pub kind: OpKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum OpKind {
    Construct(Construct),
    Animate(Animation),
    Wait { seconds: f64 },
    /// Opaque backend statement `NAME = CODE`.
    Raw { name: String, code: RawCode },
}

/// Build a named scene object and, unless it is animated in later, add it to the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Construct {
    pub name: String,
    pub object: ObjectSpec,
    /// `None` for objects positioned by the backend (axes, graphs, plots).
    pub placement: Option<Placement>,
    pub display: Display,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObjectSpec {
    Equation {
        tex: String,
    },
    Text {
        text: String,
    },
    Shape {
        kind: ShapeKind,
        color: Color,
    },
    Axes {
        x_range: AxisRange,
        y_range: AxisRange,
        x_length: f64,
        y_length: f64,
    },
    Graph {
        formula: String,
        domain: Domain,
        color: Color,
    },
    Plot {
        formula: String,
        axes: String,
        color: Color,
        stroke_width: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    Center,
    NextTo { anchor: String, direction: Direction },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    /// Added to the scene right after construction.
    Immediate,
    /// Left out of the scene until a later animation brings it in.
    Deferred,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Animation {
    FadeIn { target: String },
    FadeOut { target: String },
    Create { target: String },
    Transform { from: String, to: String },
}

impl Program {
    /// Deterministic textual listing, stable across runs and platforms.
    pub fn dump(&self) -> String {
        let m = &self.metadata;
        let mut s = String::new();
        s.push_str("Program\n");
        let _ = writeln!(
            s,
            "metadata: height={} width={} quality={} scale={} fps={}",
            m.height,
            m.width.map_or_else(|| "-".to_string(), |w| w.to_string()),
            m.quality,
            m.scale.map_or_else(|| "-".to_string(), |v| format!("{v:?}")),
            m.fps
        );
        let _ = writeln!(s, "ops: {}", self.ops.len());
        for (i, op) in self.ops.iter().enumerate() {
            let _ = write!(s, "  O{i} L{}: ", op.line);
            match &op.kind {
                OpKind::Construct(c) => {
                    let _ = write!(s, "construct {} = {:?}", c.name, c.object);
                    match &c.placement {
                        None => {}
                        Some(Placement::Center) => s.push_str(" place=center"),
                        Some(Placement::NextTo { anchor, direction }) => {
                            let _ = write!(s, " place={}:{anchor}", direction.keyword());
                        }
                    }
                    let _ = write!(s, " display={:?}", c.display);
                }
                OpKind::Animate(a) => {
                    let _ = write!(s, "animate {a:?}");
                }
                OpKind::Wait { seconds } => {
                    let _ = write!(s, "wait {seconds:?}");
                }
                OpKind::Raw { name, code } => {
                    let _ = write!(s, "raw {name} = {}", code.as_str());
                }
            }
            s.push('\n');
        }
        s
    }

    pub fn constructs(&self) -> impl Iterator<Item = &Construct> + '_ {
        self.ops.iter().filter_map(|op| match &op.kind {
            OpKind::Construct(c) => Some(c),
            _ => None,
        })
    }
}
