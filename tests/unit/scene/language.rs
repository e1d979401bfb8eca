use super::*;

#[test]
fn standard_palette_matches_backend_constants() {
    let table = LanguageTable::standard();
    assert_eq!(table.color("blue"), Some(Color::Blue));
    assert_eq!(table.color("black"), Some(Color::Black));
    assert_eq!(table.color("purple"), None);
    assert_eq!(table.color("Blue"), None);
    assert_eq!(table.color_names().count(), 7);
}

#[test]
fn only_axes_and_graphs_are_drawable() {
    let table = LanguageTable::standard();
    assert!(table.is_drawable(ObjectKind::Axes));
    assert!(table.is_drawable(ObjectKind::Graph));
    assert!(table.is_drawable(ObjectKind::Plot));
    assert!(!table.is_drawable(ObjectKind::Equation));
    assert!(!table.is_drawable(ObjectKind::Shape(crate::ShapeKind::Circle)));
}

#[test]
fn backend_identifiers_are_reserved() {
    let table = LanguageTable::standard();
    assert!(table.is_reserved("self"));
    assert!(table.is_reserved("lambda"));
    assert!(table.is_reserved("MathTex"));
    assert!(!table.is_reserved("eq1"));
    assert!(!table.is_reserved("x"));
}

#[test]
fn standard_table_is_shared() {
    assert!(std::ptr::eq(
        LanguageTable::standard(),
        LanguageTable::standard()
    ));
}

#[test]
fn shape_kinds_are_ordered_inside_object_kinds() {
    use crate::ShapeKind;
    assert!(ShapeKind::Circle < ShapeKind::Square);
    assert!(ObjectKind::Shape(ShapeKind::Circle) < ObjectKind::Shape(ShapeKind::Arrow));
    let kinds = std::collections::BTreeSet::from([
        ObjectKind::Shape(ShapeKind::Arrow),
        ObjectKind::Shape(ShapeKind::Circle),
        ObjectKind::Equation,
    ]);
    assert_eq!(kinds.first(), Some(&ObjectKind::Equation));
}
