use super::*;
use crate::{
    compile::program::Program,
    parse::block::parse_block,
    resolve::resolver::resolve,
    scene::{language::LanguageTable, model::Color},
};

fn program(src: &str) -> Program {
    let table = LanguageTable::standard();
    generate(&resolve(parse_block(src, table).unwrap(), table).unwrap())
}

fn construct(p: &Program, name: &str) -> Construct {
    p.constructs()
        .find(|c| c.name == name)
        .cloned()
        .unwrap_or_else(|| panic!("no construct named {name}"))
}

#[test]
fn centered_equation_with_fade_in_is_two_operations() {
    let p = program("write equation \"E = mc^2\" as eq at center\nfade-in eq\n");
    assert_eq!(p.ops.len(), 2);
    assert_eq!(
        p.ops[0],
        Op {
            line: 1,
            kind: OpKind::Construct(Construct {
                name: "eq".to_string(),
                object: ObjectSpec::Equation {
                    tex: "E = mc^2".to_string()
                },
                placement: Some(Placement::Center),
                display: Display::Deferred,
            }),
        }
    );
    assert_eq!(
        p.ops[1],
        Op {
            line: 2,
            kind: OpKind::Animate(Animation::FadeIn {
                target: "eq".to_string()
            }),
        }
    );
}

#[test]
fn objects_without_an_entrance_are_immediate() {
    let p = program("create circle as c\nwait 1\nfade-out c\n");
    assert_eq!(construct(&p, "c").display, Display::Immediate);
}

#[test]
fn draw_and_transform_target_defer_display() {
    let src = "\
create axes x=[0,1,0.5] y=[0,1,0.5] as ax
plot \"x\" on ax as p
write equation \"a\" as a
write equation \"b\" as b
draw ax
draw p
fade-in a
transform a -> b
";
    let p = program(src);
    for name in ["ax", "p", "a", "b"] {
        assert_eq!(construct(&p, name).display, Display::Deferred, "{name}");
    }
    assert_eq!(
        p.ops.last().map(|op| &op.kind),
        Some(&OpKind::Animate(Animation::Transform {
            from: "a".to_string(),
            to: "b".to_string(),
        }))
    );
}

#[test]
fn auto_placement_stacks_below_the_previous_spatial_object() {
    let src = "\
write equation \"a\" as first
create axes x=[0,1,0.5] y=[0,1,0.5] as ax
create square color=red as second
write text \"note\" as third right-of first
write text \"tail\" as fourth
";
    let p = program(src);
    assert_eq!(construct(&p, "first").placement, Some(Placement::Center));
    assert_eq!(construct(&p, "ax").placement, None);
    assert_eq!(
        construct(&p, "second").placement,
        Some(Placement::NextTo {
            anchor: "first".to_string(),
            direction: Direction::Below,
        })
    );
    assert_eq!(
        construct(&p, "third").placement,
        Some(Placement::NextTo {
            anchor: "first".to_string(),
            direction: Direction::RightOf,
        })
    );
    assert_eq!(
        construct(&p, "fourth").placement,
        Some(Placement::NextTo {
            anchor: "third".to_string(),
            direction: Direction::Below,
        })
    );
    assert_eq!(
        construct(&p, "second").object,
        ObjectSpec::Shape {
            kind: crate::ShapeKind::Square,
            color: Color::Red,
        }
    );
}

#[test]
fn raw_escapes_keep_their_position() {
    let p = program("wait 0.5\nmanim Dot() as d\nfade-in d\n");
    assert_eq!(p.ops[0].kind, OpKind::Wait { seconds: 0.5 });
    assert!(matches!(&p.ops[1].kind, OpKind::Raw { name, .. } if name == "d"));
    assert_eq!(p.ops[1].line, 2);
}

#[test]
fn dump_is_deterministic() {
    let src = "height: 240\nwrite text \"hi\" as t\nwait 2\n";
    let a = program(src).dump();
    let b = program(src).dump();
    assert_eq!(a, b);
    assert!(a.starts_with("Program\nmetadata: height=240 width=- quality=high scale=- fps=24\n"));
    assert!(a.contains("ops: 2\n"));
    assert!(a.contains("  O1 L3: wait 2.0\n"), "{a}");
}
