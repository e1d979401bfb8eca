use std::fmt;

use sha2::{Digest as _, Sha256};

use crate::{parse::metadata::is_metadata_line, scene::model::Metadata};

const DOMAIN_TAG: &str = "animdown.artifact.v1";

/// Content hash identifying one rendered artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for b in self.0 {
            out.push_str(&format!("{b:02x}"));
        }
        out
    }

    /// First 12 hex digits, for log lines.
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(12);
        hex
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fingerprint of a block: its normalized source, canonical metadata and the backend version.
///
/// Header metadata lines are dropped from the source part since `metadata` already carries
/// their effect.
pub fn fingerprint(source: &str, metadata: &Metadata, backend_version: &str) -> Fingerprint {
    let mut h = StableHasher::new();
    h.write_str(DOMAIN_TAG);
    h.write_str(env!("CARGO_PKG_VERSION"));
    h.write_str(&normalize_source(source));

    h.write_u64(u64::from(metadata.height));
    match metadata.width {
        Some(w) => {
            h.write_u8(1);
            h.write_u64(u64::from(w));
        }
        None => h.write_u8(0),
    }
    h.write_str(metadata.quality.keyword());
    match metadata.scale {
        Some(s) => {
            h.write_u8(1);
            h.write_u64(s.to_bits());
        }
        None => h.write_u8(0),
    }
    h.write_u64(u64::from(metadata.fps));

    h.write_str(backend_version);
    h.finish()
}

/// Source text with insignificant whitespace, comments and header lines removed.
///
/// Lines are trimmed and whitespace runs outside `"` and `'` quotes collapse to one space.
pub fn normalize_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut in_header = true;
    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if in_header && is_metadata_line(line) {
            continue;
        }
        in_header = false;
        if !out.is_empty() {
            out.push('\n');
        }
        collapse_whitespace(line, &mut out);
    }
    out
}

fn collapse_whitespace(line: &str, out: &mut String) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut pending_space = false;
    for c in line.chars() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
}

/// Length-prefixed SHA-256 writer, so adjacent fields cannot run into each other.
struct StableHasher(Sha256);

impl StableHasher {
    fn new() -> Self {
        Self(Sha256::new())
    }

    fn write_u8(&mut self, v: u8) {
        self.0.update([v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.0.update(v.to_le_bytes());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.0.update(s.as_bytes());
    }

    fn finish(self) -> Fingerprint {
        Fingerprint(self.0.finalize().into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
