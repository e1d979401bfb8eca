use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use crate::scene::model::{Color, ObjectKind};

static STANDARD: LazyLock<LanguageTable> = LazyLock::new(LanguageTable::build_standard);

/// Immutable vocabulary shared by the parser and the resolver.
///
/// Built once per process ([`LanguageTable::standard`]) and passed explicitly; nothing mutates
/// it after construction.
#[derive(Clone, Debug)]
pub struct LanguageTable {
    colors: BTreeMap<&'static str, Color>,
    drawable: BTreeSet<ObjectKind>,
    reserved: BTreeSet<&'static str>,
}

impl LanguageTable {
    pub fn standard() -> &'static LanguageTable {
        &STANDARD
    }

    fn build_standard() -> Self {
        let colors = BTreeMap::from([
            ("blue", Color::Blue),
            ("red", Color::Red),
            ("green", Color::Green),
            ("yellow", Color::Yellow),
            ("orange", Color::Orange),
            ("white", Color::White),
            ("black", Color::Black),
        ]);

        let drawable = BTreeSet::from([ObjectKind::Axes, ObjectKind::Graph, ObjectKind::Plot]);

        // Python keywords plus every identifier the emitted scene script relies on; a scene
        // object with one of these names would shadow it.
        let reserved = BTreeSet::from([
            "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
            "continue", "def", "del", "elif", "else", "except", "finally", "for", "from",
            "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass",
            "raise", "return", "try", "while", "with", "yield", "self", "np", "AnimateScene",
            "BaseScene", "Scene", "Mobject", "MathTex", "Text", "Circle", "Square", "Arrow",
            "Axes", "FunctionGraph", "Create", "FadeIn", "FadeOut", "Transform", "ORIGIN", "UP",
            "DOWN", "LEFT", "RIGHT", "BLUE", "RED", "GREEN", "YELLOW", "ORANGE", "WHITE",
            "BLACK",
        ]);

        Self {
            colors,
            drawable,
            reserved,
        }
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn color_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.colors.keys().copied()
    }

    /// Whether `draw NAME` is meaningful for objects of this kind.
    pub fn is_drawable(&self, kind: ObjectKind) -> bool {
        self.drawable.contains(&kind)
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/language.rs"]
mod tests;
