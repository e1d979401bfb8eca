use std::fmt::Write as _;

use crate::compile::program::{Animation, Display, ObjectSpec, OpKind, Placement, Program};

/// Class name of the generated scene; the renderer asks the backend for this scene.
pub const SCENE_NAME: &str = "AnimateScene";

const INDENT: &str = "        ";

// White background and black default color; the GIF post-process keys out near-white pixels.
const BASE_SCENE: &str = "\
class BaseScene(Scene):
    def setup(self):
        self.camera.background_color = WHITE
        Mobject.set_default(color=BLACK)
";

/// Print `program` as a complete Manim scene script.
pub fn emit_manim(program: &Program) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# scene: {SCENE_NAME}");
    let _ = writeln!(out, "# height: {}", program.metadata.height);
    let _ = writeln!(out, "# quality: {}", program.metadata.quality);
    out.push_str("from manim import *\n\n\n");
    out.push_str(BASE_SCENE);
    out.push_str("\n\n");
    let _ = writeln!(out, "class {SCENE_NAME}(BaseScene):");
    out.push_str("    def construct(self):\n");

    if program.ops.is_empty() {
        let _ = writeln!(out, "{INDENT}pass");
        return out;
    }

    for op in &program.ops {
        match &op.kind {
            OpKind::Construct(c) => {
                let _ = writeln!(out, "{INDENT}{} = {}", c.name, object_expr(&c.object));
                match &c.placement {
                    None => {}
                    Some(Placement::Center) => {
                        let _ = writeln!(out, "{INDENT}{}.move_to(ORIGIN)", c.name);
                    }
                    Some(Placement::NextTo { anchor, direction }) => {
                        let _ = writeln!(
                            out,
                            "{INDENT}{}.next_to({anchor}, {})",
                            c.name,
                            direction.backend_vector()
                        );
                    }
                }
                if c.display == Display::Immediate {
                    let _ = writeln!(out, "{INDENT}self.add({})", c.name);
                }
            }
            OpKind::Animate(a) => {
                let call = match a {
                    Animation::FadeIn { target } => format!("FadeIn({target})"),
                    Animation::FadeOut { target } => format!("FadeOut({target})"),
                    Animation::Create { target } => format!("Create({target})"),
                    Animation::Transform { from, to } => format!("Transform({from}, {to})"),
                };
                let _ = writeln!(out, "{INDENT}self.play({call})");
            }
            OpKind::Wait { seconds } => {
                let _ = writeln!(out, "{INDENT}self.wait({seconds:?})");
            }
            OpKind::Raw { name, code } => {
                let _ = writeln!(out, "{INDENT}{name} = {}", code.as_str());
            }
        }
    }
    out
}

fn object_expr(object: &ObjectSpec) -> String {
    match object {
        ObjectSpec::Equation { tex } => format!("MathTex({})", py_str(tex)),
        ObjectSpec::Text { text } => format!("Text({})", py_str(text)),
        ObjectSpec::Shape { kind, color } => {
            format!("{}(color={})", kind.backend_class(), color.backend_name())
        }
        ObjectSpec::Axes {
            x_range,
            y_range,
            x_length,
            y_length,
        } => format!(
            "Axes(x_range=[{:?}, {:?}, {:?}], y_range=[{:?}, {:?}, {:?}], x_length={x_length:?}, \
             y_length={y_length:?})",
            x_range.min, x_range.max, x_range.step, y_range.min, y_range.max, y_range.step
        ),
        ObjectSpec::Graph {
            formula,
            domain,
            color,
        } => format!(
            "FunctionGraph(lambda x: {formula}, x_range=[{:?}, {:?}], color={})",
            domain.min,
            domain.max,
            color.backend_name()
        ),
        ObjectSpec::Plot {
            formula,
            axes,
            color,
            stroke_width,
        } => format!(
            "{axes}.plot(lambda x: {formula}, color={}, stroke_width={stroke_width:?})",
            color.backend_name()
        ),
    }
}

/// Double-quoted Python string literal.
fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compile/emit.rs"]
mod tests;
