use super::*;
use crate::parse::block::parse_block;

fn run(src: &str) -> AnimResult<ResolvedScene> {
    let table = LanguageTable::standard();
    resolve(parse_block(src, table).unwrap(), table)
}

#[test]
fn backward_references_resolve() {
    let src = "\
write equation \"a^2\" as eq at center
write text \"note\" as t below eq
create axes x=[-3,3,1] y=[-1,1,0.5] as ax
plot \"np.sin(x)\" on ax as wave
create graph \"x\" x=[0,1] as g
draw ax
draw wave
draw g
fade-in eq
transform eq -> t
fade-out t
wait 1
";
    let resolved = run(src).unwrap();
    let names: Vec<&str> = resolved.symbols.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["eq", "t", "ax", "wave", "g"]);
    let wave = resolved.symbols.get("wave").unwrap();
    assert_eq!(wave.kind, ObjectKind::Plot);
    assert_eq!(wave.index, 3);
    assert_eq!(wave.line, 4);
}

#[test]
fn duplicate_name_reports_the_second_line() {
    let err = run("write equation \"a\" as x\ncreate circle color=blue as x\n").unwrap_err();
    match err {
        AnimError::DuplicateName {
            name,
            line,
            first_line,
        } => {
            assert_eq!(name, "x");
            assert_eq!(line, 2);
            assert_eq!(first_line, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn plot_on_undeclared_axes_is_undefined() {
    let err = run("plot \"np.sin(x)\" on ax color=blue as wave\n").unwrap_err();
    assert!(matches!(
        err,
        AnimError::UndefinedReference { ref name, line: 1 } if name == "ax"
    ));
}

#[test]
fn forward_references_are_undefined() {
    let err = run("fade-in eq\nwrite equation \"a\" as eq\n").unwrap_err();
    assert!(matches!(err, AnimError::UndefinedReference { line: 1, .. }));

    let err = run("write text \"a\" as t below t\n").unwrap_err();
    assert!(matches!(
        err,
        AnimError::UndefinedReference { ref name, .. } if name == "t"
    ));

    let err = run("create circle as c\ntransform c -> d\ncreate square as d\n").unwrap_err();
    assert!(matches!(
        err,
        AnimError::UndefinedReference { ref name, line: 2 } if name == "d"
    ));
}

#[test]
fn plot_requires_axes() {
    let err = run("create graph \"x\" x=[0,1] as g\nplot \"x\" on g as p\n").unwrap_err();
    match err {
        AnimError::Type {
            name,
            line,
            expected,
            found,
        } => {
            assert_eq!(name, "g");
            assert_eq!(line, 2);
            assert_eq!(expected, "axes");
            assert_eq!(found, "a graph");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn draw_requires_a_drawable_kind() {
    let err = run("create circle as c\ndraw c\n").unwrap_err();
    assert!(matches!(err, AnimError::Type { line: 2, .. }));
    assert!(err.to_string().contains("'c' is a circle"));
}

#[test]
fn raw_objects_skip_kind_checks() {
    let src = "\
manim NumberPlane() as plane
draw plane
plot \"x\" on plane as p
write text \"t\" as label above plane
";
    let resolved = run(src).unwrap();
    assert_eq!(
        resolved.symbols.get("plane").map(|s| s.kind),
        Some(ObjectKind::Unknown)
    );
}
