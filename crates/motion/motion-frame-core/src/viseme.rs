//! Viseme to blend-shape mapping.
//!
//! Fourteen canonical visemes are folded into three broad mouth channels by a
//! fixed weight table. Encoding emits one synthesized `v_<viseme>` shape per
//! non-zero weight. Decoding only drives the primary viseme of each channel
//! (weight exactly 1) and looks for a matching blend shape on the target.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Conventional first viseme channel.
pub const DEFAULT_VISEME_BASE: usize = 80;
/// Mouth channels per viseme row.
pub const VISEME_COMPONENTS: usize = 3;

/// Contribution of each viseme to the three mouth channels.
pub const VISEME_TABLE: [(&str, [f32; VISEME_COMPONENTS]); 14] = [
    ("aa", [1.0, 0.0, 0.0]),
    ("ch", [0.0, 1.0, 0.0]),
    ("dd", [0.3, 0.7, 0.0]),
    ("e", [0.0, 0.7, 0.3]),
    ("ff", [0.2, 0.4, 0.0]),
    ("ih", [0.5, 0.2, 0.0]),
    ("kk", [0.7, 0.4, 0.0]),
    ("nn", [0.2, 0.7, 0.0]),
    ("oh", [0.2, 0.0, 0.8]),
    ("ou", [0.0, 0.0, 1.0]),
    ("pp", [0.0, 0.0, 0.0]),
    ("rr", [0.0, 0.5, 0.3]),
    ("ss", [0.0, 0.8, 0.0]),
    ("th", [0.4, 0.0, 0.15]),
];

/// Name templates tried in order; `{viseme}` is replaced by the escaped
/// viseme name. Each must match at the end of the shape name, after a
/// separator or the start of the name, ignoring case.
pub const NAME_PATTERNS: &[&str] = &["v_{viseme}", "{viseme}"];

/// One shape driving (or driven by) one channel with a weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeIndex {
    pub shape: String,
    pub index: usize,
    pub weight: f32,
}

/// Result of a blend-shape name search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeMatch {
    pub name: String,
    /// Index into [`NAME_PATTERNS`] of the pattern that matched.
    pub pattern: Option<usize>,
}

impl ShapeMatch {
    /// True when nothing matched and `name` is the synthesized shape name.
    pub fn is_fallback(&self) -> bool {
        self.pattern.is_none()
    }
}

/// Synthesized shape name for a viseme.
pub fn shape_name(viseme: &str) -> String {
    format!("v_{viseme}")
}

/// Shape assignments for the encoder side.
pub fn encode_table(base_index: usize) -> Vec<ShapeIndex> {
    let mut out = Vec::new();
    for (viseme, weights) in VISEME_TABLE.iter() {
        for (i, &weight) in weights.iter().enumerate() {
            if weight != 0.0 {
                out.push(ShapeIndex {
                    shape: shape_name(viseme),
                    index: base_index + i,
                    weight,
                });
            }
        }
    }
    out
}

/// Shape assignments for the decoder side, resolved against `names`.
pub fn decode_table<S: AsRef<str>>(names: &[S], base_index: usize) -> Vec<ShapeIndex> {
    let mut out = Vec::new();
    for (viseme, weights) in VISEME_TABLE.iter() {
        for (i, &weight) in weights.iter().enumerate() {
            if weight == 1.0 {
                let found = search_viseme_name(names, viseme);
                out.push(ShapeIndex {
                    shape: found.name,
                    index: base_index + i,
                    weight,
                });
            }
        }
    }
    out
}

/// Find the blend shape for `viseme`: first pattern with any match wins, and
/// within a pattern the first name in iteration order.
pub fn search_viseme_name<S: AsRef<str>>(names: &[S], viseme: &str) -> ShapeMatch {
    for (pattern, template) in NAME_PATTERNS.iter().enumerate() {
        let Some(re) = compile_pattern(template, viseme) else {
            continue;
        };
        if let Some(name) = names.iter().map(|n| n.as_ref()).find(|n| re.is_match(n)) {
            return ShapeMatch {
                name: name.to_string(),
                pattern: Some(pattern),
            };
        }
    }
    debug!("no blend shape for viseme '{viseme}', using synthesized name");
    ShapeMatch {
        name: shape_name(viseme),
        pattern: None,
    }
}

fn compile_pattern(template: &str, viseme: &str) -> Option<Regex> {
    let body = template.replace("{viseme}", &regex::escape(viseme));
    match Regex::new(&format!(r"(?i)(?:^|[^[:alnum:]]){body}$")) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!("skipping viseme pattern '{template}': {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_pattern_beats_bare() {
        let names = ["face_aa", "Mouth_V_AA"];
        let m = search_viseme_name(&names, "aa");
        assert_eq!(m.name, "Mouth_V_AA");
        assert_eq!(m.pattern, Some(0));
    }

    #[test]
    fn match_needs_separator_before_name() {
        let names = ["baa", "mouthvaa"];
        let m = search_viseme_name(&names, "aa");
        assert!(m.is_fallback());
        assert_eq!(m.name, "v_aa");
    }

    #[test]
    fn underscore_counts_as_separator() {
        let m = search_viseme_name(&["baa", "mouthv_aa"], "aa");
        assert_eq!(m.name, "mouthv_aa");
        assert_eq!(m.pattern, Some(1));
    }

    #[test]
    fn whole_name_matches() {
        let m = search_viseme_name(&["OU"], "ou");
        assert_eq!(m.name, "OU");
        assert_eq!(m.pattern, Some(1));
    }

    #[test]
    fn first_name_in_order_wins() {
        let m = search_viseme_name(&["a.ch", "b.ch"], "ch");
        assert_eq!(m.name, "a.ch");
    }

    #[test]
    fn pp_contributes_nothing() {
        assert!(encode_table(0).iter().all(|s| s.shape != "v_pp"));
    }
}
