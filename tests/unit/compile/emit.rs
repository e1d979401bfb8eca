use super::*;
use crate::{
    compile::codegen::generate, parse::block::parse_block, resolve::resolver::resolve,
    scene::language::LanguageTable,
};

fn script(src: &str) -> String {
    let table = LanguageTable::standard();
    emit_manim(&generate(
        &resolve(parse_block(src, table).unwrap(), table).unwrap(),
    ))
}

fn body(script: &str) -> Vec<&str> {
    let start = script
        .find("    def construct(self):\n")
        .expect("construct method");
    script[start..]
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

#[test]
fn empty_program_emits_pass() {
    let s = script("quality: low\n");
    assert!(s.starts_with("# scene: AnimateScene\n# height: 500\n# quality: low\n"));
    assert!(s.contains("from manim import *"));
    assert!(s.contains("self.camera.background_color = WHITE"));
    assert!(s.contains("Mobject.set_default(color=BLACK)"));
    assert!(s.contains("class AnimateScene(BaseScene):"));
    assert_eq!(body(&s), ["pass"]);
}

#[test]
fn equation_fade_in() {
    let s = script("write equation \"\\frac{1}{2}\" as eq at center\nfade-in eq\n");
    assert_eq!(
        body(&s),
        [
            r#"eq = MathTex("\\frac{1}{2}")"#,
            "eq.move_to(ORIGIN)",
            "self.play(FadeIn(eq))",
        ]
    );
}

#[test]
fn immediate_objects_are_added() {
    let s = script("create circle color=blue as c\nwrite text \"say \\\"hi\\\"\" as t above c\n");
    assert_eq!(
        body(&s),
        [
            "c = Circle(color=BLUE)",
            "c.move_to(ORIGIN)",
            "self.add(c)",
            r#"t = Text("say \"hi\"")"#,
            "t.next_to(c, UP)",
            "self.add(t)",
        ]
    );
}

#[test]
fn axes_plot_graph_and_animations() {
    let src = "\
create axes x=[-3,3,1] y=[-1,1,0.5] as ax
plot \"np.sin(x)\" on ax color=red stroke=2 as wave
create graph \"x**2\" x=[-1,1] as g
draw ax
draw wave
transform wave -> g
wait 0.5
manim Dot(color=RED) as d
";
    assert_eq!(
        body(&script(src)),
        [
            "ax = Axes(x_range=[-3.0, 3.0, 1.0], y_range=[-1.0, 1.0, 0.5], x_length=6.0, \
             y_length=4.0)",
            "wave = ax.plot(lambda x: np.sin(x), color=RED, stroke_width=2.0)",
            "g = FunctionGraph(lambda x: x**2, x_range=[-1.0, 1.0], color=BLUE)",
            "self.play(Create(ax))",
            "self.play(Create(wave))",
            "self.play(Transform(wave, g))",
            "self.wait(0.5)",
            "d = Dot(color=RED)",
        ]
    );
}
