/*!
 * Sentence segmentation of source/target cell pairs.
 *
 * Long cells are split at sentence boundaries so translation tools can match
 * them sentence by sentence. The source and target of a row are split in
 * lock-step: boundaries are found in the source, then mapped proportionally
 * onto the target's own sentence boundaries so that the i-th source segment
 * and the i-th target segment hold the same sentence.
 *
 * All lengths are counted in characters, markup included.
 */

use log::{debug, warn};
use std::ops::Range;

use crate::codec::tokens::{marker_ranges, tagged_ranges};
use crate::errors::AssemblyError;

/// Default sentence terminators.
pub const DEFAULT_TERMINATORS: &str = ".!?。！？";

/// Closing quotes and brackets that may trail a terminator.
const TRAILING_CLOSERS: &[char] = &['"', '\'', '\u{201D}', '\u{2019}', ')', ']', '»'];

/// Length thresholds for splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentationPolicy {
    min_segment_length: usize,
    max_unsplit_length: usize,
}

impl SegmentationPolicy {
    /// Create a policy, rejecting zero thresholds or `min > max`.
    pub fn new(min_segment_length: usize, max_unsplit_length: usize) -> Result<Self, AssemblyError> {
        if min_segment_length == 0 || max_unsplit_length == 0 || min_segment_length > max_unsplit_length {
            return Err(AssemblyError::InvalidPolicy {
                min: min_segment_length,
                max: max_unsplit_length,
            });
        }
        Ok(Self {
            min_segment_length,
            max_unsplit_length,
        })
    }

    /// Shortest segment that may stand on its own.
    pub fn min_segment_length(&self) -> usize {
        self.min_segment_length
    }

    /// Longest text that is never split.
    pub fn max_unsplit_length(&self) -> usize {
        self.max_unsplit_length
    }

    /// Whether a text is long enough to be considered for splitting.
    pub fn is_split_candidate(&self, text: &str) -> bool {
        text.chars().count() > self.max_unsplit_length
    }
}

impl Default for SegmentationPolicy {
    fn default() -> Self {
        Self {
            min_segment_length: 5,
            max_unsplit_length: 70,
        }
    }
}

/// How the target side of a split was aligned with the source side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// No split was attempted or the source stayed in one piece
    Unsplit,
    /// Target split at boundaries matched to the source's
    Proportional,
    /// Target is blank; padded with empty segments
    BlankTarget,
    /// Target has fewer sentences than the source; kept whole in the first
    /// segment and padded with empty segments
    Degraded {
        /// Number of source segments
        source_segments: usize,
        /// Number of sentences found in the target
        target_sentences: usize,
    },
}

impl Alignment {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Output of a split: index-aligned segment lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub source_segments: Vec<String>,
    pub target_segments: Vec<String>,
    pub alignment: Alignment,
}

impl SplitOutcome {
    fn unsplit(source: &str, target: &str) -> Self {
        Self {
            source_segments: vec![source.to_string()],
            target_segments: vec![target.to_string()],
            alignment: Alignment::Unsplit,
        }
    }

    /// Number of segments on each side.
    pub fn len(&self) -> usize {
        self.source_segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_segments.is_empty()
    }
}

/// A candidate boundary: `end` closes the sentence, `next` starts the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Boundary {
    end: usize,
    next: usize,
}

/// Sentence splitter bound to one policy.
#[derive(Debug, Clone)]
pub struct Segmenter {
    policy: SegmentationPolicy,
    terminators: Vec<char>,
    enabled: bool,
}

impl Segmenter {
    /// Create an enabled segmenter with the default terminators.
    pub fn new(policy: SegmentationPolicy) -> Self {
        Self {
            policy,
            terminators: DEFAULT_TERMINATORS.chars().collect(),
            enabled: true,
        }
    }

    /// Replace the set of sentence terminators.
    pub fn with_terminators(mut self, terminators: &str) -> Self {
        self.terminators = terminators.chars().collect();
        self
    }

    /// Turn splitting on or off.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn policy(&self) -> &SegmentationPolicy {
        &self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Split a source/target pair into index-aligned segments.
    ///
    /// Both lists always have the same length. Short or disabled input comes
    /// back as single-element lists.
    pub fn split(&self, source: &str, target: &str) -> SplitOutcome {
        if !self.enabled || !self.policy.is_split_candidate(source) {
            return SplitOutcome::unsplit(source, target);
        }

        let boundaries = self.accepted_boundaries(source);
        if boundaries.is_empty() {
            debug!("No usable sentence boundary in {} chars of source", source.chars().count());
            return SplitOutcome::unsplit(source, target);
        }

        let source_segments = cut(source, &boundaries);
        let count = source_segments.len();

        if target.trim().is_empty() {
            return SplitOutcome {
                source_segments,
                target_segments: pad(target, count),
                alignment: Alignment::BlankTarget,
            };
        }

        let target_candidates = self.candidate_boundaries(target);
        match map_proportionally(source, &boundaries, target, &target_candidates) {
            Some(mapped) => SplitOutcome {
                source_segments,
                target_segments: cut(target, &mapped),
                alignment: Alignment::Proportional,
            },
            None => {
                warn!(
                    "Target has {} sentence(s) but source was split into {}; keeping target whole",
                    target_candidates.len() + 1,
                    count
                );
                SplitOutcome {
                    source_segments,
                    target_segments: pad(target, count),
                    alignment: Alignment::Degraded {
                        source_segments: count,
                        target_sentences: target_candidates.len() + 1,
                    },
                }
            }
        }
    }

    /// Source boundaries after the minimum-length rule is applied.
    fn accepted_boundaries(&self, text: &str) -> Vec<Boundary> {
        let min = self.policy.min_segment_length;
        let mut accepted: Vec<Boundary> = Vec::new();
        let mut start = 0;

        for candidate in self.candidate_boundaries(text) {
            // Too short: merge forward into the next segment
            if char_len(&text[start..candidate.end]) >= min {
                accepted.push(candidate);
                start = candidate.next;
            }
        }

        // A short tail is folded back into the previous segment
        if let Some(last) = accepted.last() {
            if char_len(&text[last.next..]) < min {
                accepted.pop();
            }
        }

        accepted
    }

    /// All sentence ends followed by whitespace and more text, outside tag spans.
    fn candidate_boundaries(&self, text: &str) -> Vec<Boundary> {
        let spans = tagged_ranges(text);
        let markers = marker_ranges(text);
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut boundaries = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let (pos, c) = chars[i];
            if !self.terminators.contains(&c) || inside(&markers, pos) {
                i += 1;
                continue;
            }

            // Consume runs like "?!" or "..." and any closing quotes
            let mut j = i + 1;
            while j < chars.len() && self.terminators.contains(&chars[j].1) {
                j += 1;
            }
            while j < chars.len() && TRAILING_CLOSERS.contains(&chars[j].1) {
                j += 1;
            }

            let end = chars.get(j).map_or(text.len(), |&(p, _)| p);
            let mut k = j;
            while k < chars.len() && chars[k].1.is_whitespace() {
                k += 1;
            }
            let next = chars.get(k).map_or(text.len(), |&(p, _)| p);

            let followed_by_space = k > j;
            let has_more_text = next < text.len();
            if followed_by_space && has_more_text && !inside(&spans, pos) {
                boundaries.push(Boundary { end, next });
            }

            i = j.max(i + 1);
        }

        boundaries
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentationPolicy::default())
    }
}

/// Pick, for each source boundary, the target candidate at the closest
/// relative position, keeping order and leaving room for later boundaries.
fn map_proportionally(
    source: &str,
    source_boundaries: &[Boundary],
    target: &str,
    target_candidates: &[Boundary],
) -> Option<Vec<Boundary>> {
    let needed = source_boundaries.len();
    if target_candidates.len() < needed {
        return None;
    }

    let source_len = char_len(source).max(1) as f64;
    let target_len = char_len(target).max(1) as f64;
    let target_positions: Vec<f64> = target_candidates
        .iter()
        .map(|b| char_len(&target[..b.end]) as f64 / target_len)
        .collect();

    let mut mapped = Vec::with_capacity(needed);
    let mut lower = 0;
    for (n, boundary) in source_boundaries.iter().enumerate() {
        let ratio = char_len(&source[..boundary.end]) as f64 / source_len;
        let upper = target_candidates.len() - (needed - n);
        let best = (lower..=upper).min_by(|&a, &b| {
            let da = (target_positions[a] - ratio).abs();
            let db = (target_positions[b] - ratio).abs();
            da.total_cmp(&db)
        })?;
        mapped.push(target_candidates[best]);
        lower = best + 1;
    }

    Some(mapped)
}

/// Cut text at boundaries. A single space between sentences is dropped;
/// any other separator stays at the end of the preceding segment.
fn cut(text: &str, boundaries: &[Boundary]) -> Vec<String> {
    let mut segments = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for boundary in boundaries {
        let end = if &text[boundary.end..boundary.next] == " " {
            boundary.end
        } else {
            boundary.next
        };
        segments.push(text[start..end].to_string());
        start = boundary.next;
    }
    segments.push(text[start..].to_string());
    segments
}

/// Whole text in the first slot, empty strings after it.
fn pad(text: &str, count: usize) -> Vec<String> {
    let mut segments = vec![String::new(); count.max(1)];
    segments[0] = text.to_string();
    segments
}

fn inside(ranges: &[Range<usize>], pos: usize) -> bool {
    ranges.iter().any(|r| r.contains(&pos))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
