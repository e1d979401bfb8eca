use std::collections::HashSet;

use crate::{
    compile::program::{Animation, Construct, Display, ObjectSpec, Op, OpKind, Placement, Program},
    resolve::resolver::ResolvedScene,
    scene::model::{Command, Direction, Position},
};

/// Lower a resolved scene into an ordered [`Program`].
///
/// Operations follow statement order, so every reference already points at a constructed
/// object. Auto-positioned spatial objects are centered when nothing spatial exists yet and are
/// otherwise placed below the most recently constructed spatial object.
#[tracing::instrument(skip_all, fields(statements = resolved.scene.statements.len()))]
pub fn generate(resolved: &ResolvedScene) -> Program {
    let scene = &resolved.scene;
    let animated_in = animated_in(scene.statements.iter().map(|s| &s.command));

    let mut ops = Vec::with_capacity(scene.statements.len());
    let mut last_spatial: Option<String> = None;

    for stmt in &scene.statements {
        let display = |name: &str| {
            if animated_in.contains(name) {
                Display::Deferred
            } else {
                Display::Immediate
            }
        };

        let kind = match &stmt.command {
            Command::WriteEquation {
                text,
                name,
                position,
            } => {
                let placement = place(position, &last_spatial);
                last_spatial = Some(name.clone());
                OpKind::Construct(Construct {
                    name: name.clone(),
                    object: ObjectSpec::Equation { tex: text.clone() },
                    placement: Some(placement),
                    display: display(name),
                })
            }
            Command::WriteText {
                text,
                name,
                position,
            } => {
                let placement = place(position, &last_spatial);
                last_spatial = Some(name.clone());
                OpKind::Construct(Construct {
                    name: name.clone(),
                    object: ObjectSpec::Text { text: text.clone() },
                    placement: Some(placement),
                    display: display(name),
                })
            }
            Command::CreateShape {
                kind,
                color,
                name,
                position,
            } => {
                let placement = place(position, &last_spatial);
                last_spatial = Some(name.clone());
                OpKind::Construct(Construct {
                    name: name.clone(),
                    object: ObjectSpec::Shape {
                        kind: *kind,
                        color: *color,
                    },
                    placement: Some(placement),
                    display: display(name),
                })
            }
            Command::CreateAxes {
                x_range,
                y_range,
                x_length,
                y_length,
                name,
            } => OpKind::Construct(Construct {
                name: name.clone(),
                object: ObjectSpec::Axes {
                    x_range: *x_range,
                    y_range: *y_range,
                    x_length: *x_length,
                    y_length: *y_length,
                },
                placement: None,
                display: display(name),
            }),
            Command::CreateGraph {
                formula,
                x_range,
                color,
                name,
            } => OpKind::Construct(Construct {
                name: name.clone(),
                object: ObjectSpec::Graph {
                    formula: formula.clone(),
                    domain: *x_range,
                    color: *color,
                },
                placement: None,
                display: display(name),
            }),
            Command::Plot {
                formula,
                axes,
                color,
                stroke_width,
                name,
            } => OpKind::Construct(Construct {
                name: name.clone(),
                object: ObjectSpec::Plot {
                    formula: formula.clone(),
                    axes: axes.clone(),
                    color: *color,
                    stroke_width: *stroke_width,
                },
                placement: None,
                display: display(name),
            }),
            Command::FadeIn { name } => OpKind::Animate(Animation::FadeIn {
                target: name.clone(),
            }),
            Command::FadeOut { name } => OpKind::Animate(Animation::FadeOut {
                target: name.clone(),
            }),
            Command::Draw { name } => OpKind::Animate(Animation::Create {
                target: name.clone(),
            }),
            Command::Transform { from, to } => OpKind::Animate(Animation::Transform {
                from: from.clone(),
                to: to.clone(),
            }),
            Command::Wait { seconds } => OpKind::Wait { seconds: *seconds },
            Command::RawEscape { code, name } => OpKind::Raw {
                name: name.clone(),
                code: code.clone(),
            },
        };
        ops.push(Op {
            line: stmt.line,
            kind,
        });
    }

    tracing::debug!(ops = ops.len(), "generated program");
    Program {
        metadata: scene.metadata.clone(),
        ops,
    }
}

/// Names that a later animation brings into the scene.
fn animated_in<'a>(commands: impl Iterator<Item = &'a Command>) -> HashSet<&'a str> {
    let mut out = HashSet::new();
    for command in commands {
        match command {
            Command::FadeIn { name } | Command::Draw { name } => {
                out.insert(name.as_str());
            }
            Command::Transform { to, .. } => {
                out.insert(to.as_str());
            }
            _ => {}
        }
    }
    out
}

fn place(position: &Position, last_spatial: &Option<String>) -> Placement {
    match position {
        Position::Center => Placement::Center,
        Position::Relative { anchor, direction } => Placement::NextTo {
            anchor: anchor.clone(),
            direction: *direction,
        },
        Position::Auto => match last_spatial {
            None => Placement::Center,
            Some(anchor) => Placement::NextTo {
                anchor: anchor.clone(),
                direction: Direction::Below,
            },
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/codegen.rs"]
mod tests;
