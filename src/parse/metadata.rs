use crate::{
    foundation::error::{AnimError, AnimResult},
    scene::model::{Metadata, Quality},
};

/// Keys accepted in a block header.
pub const METADATA_KEYS: [&str; 5] = ["height", "width", "quality", "scale", "fps"];

/// One parsed `key: value` header line.
#[derive(Clone, Debug, PartialEq)]
pub enum MetadataEntry {
    Height(u32),
    Width(u32),
    Quality(Quality),
    Scale(f64),
    Fps(u32),
}

impl Metadata {
    /// Apply a header entry. Later entries for the same key win.
    pub fn apply(&mut self, entry: MetadataEntry) {
        match entry {
            MetadataEntry::Height(v) => self.height = v,
            MetadataEntry::Width(v) => self.width = Some(v),
            MetadataEntry::Quality(q) => self.quality = q,
            MetadataEntry::Scale(s) => self.scale = Some(s),
            MetadataEntry::Fps(v) => self.fps = v,
        }
    }
}

/// If `line` has the shape `word: ...`, return the lowercased word and the value text.
pub(crate) fn split_header_line(line: &str) -> Option<(String, &str)> {
    let trimmed = line.trim_start();
    let key_len = trimmed
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    if key_len == 0 {
        return None;
    }
    let (key, rest) = trimmed.split_at(key_len);
    let value = rest.trim_start().strip_prefix(':')?;
    Some((key.to_ascii_lowercase(), value.trim()))
}

/// Whether `line` is a recognized header line (`height: 400`, `Quality: low`, ...).
pub(crate) fn is_metadata_line(line: &str) -> bool {
    split_header_line(line).is_some_and(|(key, _)| METADATA_KEYS.contains(&key.as_str()))
}

pub fn parse_metadata_entry(key: &str, value: &str, line: usize) -> AnimResult<MetadataEntry> {
    match key.to_ascii_lowercase().as_str() {
        "height" => positive_int(key, value, line, u32::MAX).map(MetadataEntry::Height),
        "width" => positive_int(key, value, line, u32::MAX).map(MetadataEntry::Width),
        "fps" => positive_int(key, value, line, 120).map(MetadataEntry::Fps),
        "quality" => Quality::from_keyword(value)
            .map(MetadataEntry::Quality)
            .ok_or_else(|| {
                AnimError::syntax(
                    line,
                    format!("invalid quality '{value}' (expected low, medium or high)"),
                )
            }),
        "scale" => match value.parse::<f64>() {
            Ok(s) if s.is_finite() && s > 0.0 => Ok(MetadataEntry::Scale(s)),
            _ => Err(AnimError::syntax(
                line,
                format!("invalid scale '{value}' (expected a positive number)"),
            )),
        },
        other => Err(AnimError::syntax(
            line,
            format!(
                "unknown metadata key '{other}' (expected one of: {})",
                METADATA_KEYS.join(", ")
            ),
        )),
    }
}

/// Parse a header made only of metadata lines. Blank and `#` lines are skipped.
pub fn parse_metadata<'a>(lines: impl IntoIterator<Item = &'a str>) -> AnimResult<Metadata> {
    let mut metadata = Metadata::default();
    for (idx, raw) in lines.into_iter().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = split_header_line(trimmed) else {
            return Err(AnimError::syntax(
                line,
                format!("expected 'key: value' metadata line, found '{trimmed}'"),
            ));
        };
        metadata.apply(parse_metadata_entry(&key, value, line)?);
    }
    Ok(metadata)
}

fn positive_int(key: &str, value: &str, line: usize, max: u32) -> AnimResult<u32> {
    match value.parse::<u32>() {
        Ok(v) if v > 0 && v <= max => Ok(v),
        _ => Err(AnimError::syntax(
            line,
            format!("invalid {key} '{value}' (expected an integer between 1 and {max})"),
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/parse/metadata.rs"]
mod tests;
