use crate::{
    foundation::error::{AnimError, AnimResult},
    resolve::symbols::{Symbol, SymbolTable},
    scene::{
        language::LanguageTable,
        model::{Command, ObjectKind, Scene},
    },
};

/// A scene whose references have all been checked, with its symbol table.
#[derive(Clone, Debug)]
pub struct ResolvedScene {
    pub scene: Scene,
    pub symbols: SymbolTable,
}

/// Check declare-before-use, uniqueness and reference kinds in one in-order walk.
///
/// References are checked before the statement's own declaration, so a command can never
/// refer to the name it introduces.
#[tracing::instrument(skip_all, fields(statements = scene.statements.len()))]
pub fn resolve(scene: Scene, table: &LanguageTable) -> AnimResult<ResolvedScene> {
    let mut r = Resolver {
        symbols: SymbolTable::new(),
        line: 0,
    };

    for (index, stmt) in scene.statements.iter().enumerate() {
        r.line = stmt.line;
        match &stmt.command {
            Command::WriteEquation { name, position, .. } => {
                if let Some(anchor) = position.anchor() {
                    r.reference(anchor)?;
                }
                r.declare(name, ObjectKind::Equation, index)?;
            }
            Command::WriteText { name, position, .. } => {
                if let Some(anchor) = position.anchor() {
                    r.reference(anchor)?;
                }
                r.declare(name, ObjectKind::Text, index)?;
            }
            Command::CreateShape {
                kind,
                name,
                position,
                ..
            } => {
                if let Some(anchor) = position.anchor() {
                    r.reference(anchor)?;
                }
                r.declare(name, ObjectKind::Shape(*kind), index)?;
            }
            Command::CreateAxes { name, .. } => r.declare(name, ObjectKind::Axes, index)?,
            Command::CreateGraph { name, .. } => r.declare(name, ObjectKind::Graph, index)?,
            Command::Plot { axes, name, .. } => {
                let found = r.reference(axes)?;
                if !matches!(found, ObjectKind::Axes | ObjectKind::Unknown) {
                    return Err(r.type_error(axes, "axes", found));
                }
                r.declare(name, ObjectKind::Plot, index)?;
            }
            Command::FadeIn { name } | Command::FadeOut { name } => {
                r.reference(name)?;
            }
            Command::Draw { name } => {
                let found = r.reference(name)?;
                if found != ObjectKind::Unknown && !table.is_drawable(found) {
                    return Err(r.type_error(name, "axes, a graph or a plot", found));
                }
            }
            Command::Transform { from, to } => {
                r.reference(from)?;
                r.reference(to)?;
            }
            Command::Wait { .. } => {}
            Command::RawEscape { name, .. } => r.declare(name, ObjectKind::Unknown, index)?,
        }
    }

    tracing::debug!(symbols = r.symbols.len(), "resolved scene");
    Ok(ResolvedScene {
        scene,
        symbols: r.symbols,
    })
}

struct Resolver {
    symbols: SymbolTable,
    line: usize,
}

impl Resolver {
    fn declare(&mut self, name: &str, kind: ObjectKind, index: usize) -> AnimResult<()> {
        let symbol = Symbol {
            kind,
            index,
            line: self.line,
        };
        self.symbols
            .declare(name, symbol)
            .map_err(|first| AnimError::DuplicateName {
                name: name.to_string(),
                line: self.line,
                first_line: first.line,
            })
    }

    fn reference(&self, name: &str) -> AnimResult<ObjectKind> {
        self.symbols
            .get(name)
            .map(|s| s.kind)
            .ok_or_else(|| AnimError::UndefinedReference {
                name: name.to_string(),
                line: self.line,
            })
    }

    fn type_error(&self, name: &str, expected: &'static str, found: ObjectKind) -> AnimError {
        AnimError::Type {
            name: name.to_string(),
            line: self.line,
            expected,
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
