use crate::{
    foundation::error::{AnimError, AnimResult},
    parse::line::{Line, parse_line},
    scene::{
        language::LanguageTable,
        model::{Metadata, Scene, Statement},
    },
};

/// Parse one DSL block into a [`Scene`], stopping at the first error.
///
/// Metadata lines are only accepted before the first command.
pub fn parse_block(source: &str, table: &LanguageTable) -> AnimResult<Scene> {
    let mut builder = SceneBuilder::default();
    for (idx, text) in source.lines().enumerate() {
        builder.push(idx + 1, parse_line(text, idx + 1, table)?)?;
    }
    Ok(builder.finish())
}

/// Parse every line of `source` and collect all syntax errors instead of stopping at the first.
pub fn check_syntax(source: &str, table: &LanguageTable) -> Vec<AnimError> {
    let mut builder = SceneBuilder::default();
    let mut errors = Vec::new();
    for (idx, text) in source.lines().enumerate() {
        let line = idx + 1;
        if let Err(e) = parse_line(text, line, table).and_then(|l| builder.push(line, l)) {
            errors.push(e);
        }
    }
    errors
}

#[derive(Default)]
struct SceneBuilder {
    metadata: Metadata,
    statements: Vec<Statement>,
}

impl SceneBuilder {
    fn push(&mut self, line: usize, parsed: Line) -> AnimResult<()> {
        match parsed {
            Line::Blank => {}
            Line::Metadata(_) if !self.statements.is_empty() => {
                let first = self.statements[0].line;
                return Err(AnimError::syntax(
                    line,
                    format!("metadata must come before the first command (line {first})"),
                ));
            }
            Line::Metadata(entry) => self.metadata.apply(entry),
            Line::Command(command) => self.statements.push(Statement { line, command }),
        }
        Ok(())
    }

    fn finish(self) -> Scene {
        Scene {
            metadata: self.metadata,
            statements: self.statements,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parse/block.rs"]
mod tests;
