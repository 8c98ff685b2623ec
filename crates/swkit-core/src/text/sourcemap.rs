//! Source Map V3 output.

use serde::{Deserialize, Serialize};

/// A V3 source map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources_content: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMap {
    /// Serialize to compact JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        // A struct of strings cannot fail to serialize.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// One mapping segment: generated position -> original position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub gen_line: u32,
    pub gen_col: u32,
    pub src_line: u32,
    pub src_col: u32,
}

/// Accumulates segments for a single-source map, in generated order.
#[derive(Debug, Default)]
pub(crate) struct MappingsBuilder {
    segments: Vec<Segment>,
}

impl MappingsBuilder {
    pub fn push(&mut self, segment: Segment) {
        // Two segments at the same generated position: the later one wins.
        if let Some(last) = self.segments.last_mut() {
            if last.gen_line == segment.gen_line && last.gen_col == segment.gen_col {
                *last = segment;
                return;
            }
        }
        self.segments.push(segment);
    }

    /// Encode the `mappings` field.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut line: u32 = 0;
        let mut prev_gen_col: i64 = 0;
        let mut prev_src_line: i64 = 0;
        let mut prev_src_col: i64 = 0;
        let mut first_on_line = true;

        for seg in &self.segments {
            while line < seg.gen_line {
                out.push(';');
                line += 1;
                prev_gen_col = 0;
                first_on_line = true;
            }
            if !first_on_line {
                out.push(',');
            }
            first_on_line = false;

            vlq_encode(i64::from(seg.gen_col) - prev_gen_col, &mut out);
            // Single source: index delta is always zero.
            vlq_encode(0, &mut out);
            vlq_encode(i64::from(seg.src_line) - prev_src_line, &mut out);
            vlq_encode(i64::from(seg.src_col) - prev_src_col, &mut out);

            prev_gen_col = i64::from(seg.gen_col);
            prev_src_line = i64::from(seg.src_line);
            prev_src_col = i64::from(seg.src_col);
        }

        out
    }
}

/// VLQ-encode a signed integer and append to output string.
fn vlq_encode(value: i64, out: &mut String) {
    const B64: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    #[allow(clippy::cast_sign_loss)]
    let mut v = (if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    }) as u64;
    loop {
        let mut digit = (v & 0x1f) as u8;
        v >>= 5;
        if v > 0 {
            digit |= 0x20; // continuation bit
        }
        out.push(B64[digit as usize] as char);
        if v == 0 {
            break;
        }
    }
}
