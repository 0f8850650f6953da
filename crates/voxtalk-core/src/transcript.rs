//! Confidence resolution for recognizer alternatives.
//!
//! Everything here is pure: the recognition session hands over a
//! [`RecognitionEvent`] and gets back either a usable transcript or nothing.

use crate::types::{RecognitionAlternative, RecognitionEvent, RecognitionResult, ResolvedTranscript};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.8;

const AMBIGUITY_SEPARATOR: &str = " OR ";

const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Outcome of resolving a single final result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The top alternative cleared the threshold.
    Resolved(String),
    /// No alternative was confident enough; every usable candidate, in recognizer order.
    Ambiguous(Vec<String>),
}

impl Resolution {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Resolution::Resolved(text) => text,
            Resolution::Ambiguous(candidates) => candidates.join(AMBIGUITY_SEPARATOR),
        }
    }
}

/// Highest-confidence alternative. Ties keep the earliest one.
pub fn best_alternative(alternatives: &[RecognitionAlternative]) -> Option<&RecognitionAlternative> {
    let mut best: Option<&RecognitionAlternative> = None;
    for alt in alternatives {
        let replace = match best {
            None => true,
            Some(current) => alt.confidence > current.confidence,
        };
        if replace {
            best = Some(alt);
        }
    }
    best
}

/// Resolve one final result against `threshold`. Returns `None` when nothing
/// usable survives normalization.
pub fn resolve_result(result: &RecognitionResult, threshold: f32) -> Option<Resolution> {
    let best = best_alternative(&result.alternatives)?;

    if best.confidence >= threshold {
        let text = normalize(&best.transcript);
        return (!text.is_empty()).then_some(Resolution::Resolved(text));
    }

    let candidates: Vec<String> = result
        .alternatives
        .iter()
        .map(|alt| normalize(&alt.transcript))
        .filter(|text| !text.is_empty())
        .collect();

    (!candidates.is_empty()).then_some(Resolution::Ambiguous(candidates))
}

/// Resolve every final result introduced by `event`.
///
/// Interim results are skipped. When an event carries several final results
/// their texts are joined with a space, and the transcript is ambiguous if any
/// of them was.
pub fn resolve(event: &RecognitionEvent, threshold: f32) -> Option<ResolvedTranscript> {
    let mut pieces = Vec::new();
    let mut ambiguous = false;

    for result in event.fresh_results().iter().filter(|r| r.is_final) {
        if let Some(resolution) = resolve_result(result, threshold) {
            ambiguous |= resolution.is_ambiguous();
            pieces.push(resolution.into_text());
        }
    }

    let text = normalize(&pieces.join(" "));
    if text.is_empty() {
        return None;
    }

    Some(ResolvedTranscript { text, ambiguous })
}

/// Best guess from the newest interim result, for live feedback only.
pub fn interim_text(event: &RecognitionEvent) -> Option<String> {
    let result = event.fresh_results().iter().rev().find(|r| !r.is_final)?;
    let text = normalize(&best_alternative(&result.alternatives)?.transcript);
    (!text.is_empty()).then_some(text)
}

/// Strip punctuation, collapse whitespace, trim, and capitalize the first character.
/// Stripping runs first so a transcript never starts with a gap or a lowercase
/// word left behind by removed punctuation.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    capitalize_first(&collapsed)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
