//! Label matching

use serde::{Deserialize, Serialize};

/// How a candidate's label must relate to the label being resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Candidate label contains the label (case-sensitive)
    #[default]
    Contains,
    /// Contains, and the normalized similarity ratio is at least `min_ratio`
    ContainsWithSimilarity { min_ratio: u8 },
}

impl MatchPolicy {
    /// Ratio used by the Library of Congress linker
    pub const LOC_MIN_RATIO: u8 = 90;

    pub fn loc() -> Self {
        MatchPolicy::ContainsWithSimilarity {
            min_ratio: Self::LOC_MIN_RATIO,
        }
    }

    pub fn matches(&self, candidate: &str, label: &str) -> bool {
        if !candidate.contains(label) {
            return false;
        }
        match self {
            MatchPolicy::Contains => true,
            MatchPolicy::ContainsWithSimilarity { min_ratio } => {
                similarity_ratio(candidate, label) >= *min_ratio
            }
        }
    }
}

/// Similarity of two strings on a 0..=100 scale
///
/// Both sides are lowercased with punctuation dropped and whitespace
/// collapsed; the ratio is `2 * LCS / (len_a + len_b)`.
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }
    let common = lcs_len(&a, &b);
    ((200 * common + total / 2) / total) as u8
}

fn normalize(s: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(s.len());
    let mut space = false;
    for c in s.chars() {
        if c.is_alphanumeric() {
            if space && !out.is_empty() {
                out.push(' ');
            }
            space = false;
            out.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            space = true;
        }
    }
    out
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}
