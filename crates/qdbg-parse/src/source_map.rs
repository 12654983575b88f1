//! Mapping from transformed text positions back to the original source.

/// One contiguous stretch where working and original text advance together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    /// First working-text offset covered by the segment.
    working: usize,
    /// Matching offset in the input text of the current run.
    input: usize,
}

/// Translates working-text offsets into offsets of the original source.
///
/// Comment blanking keeps lengths intact and contributes the identity
/// segment. Each removed block contributes one segment starting right where
/// the block used to be. Gate bodies are preprocessed as separate runs whose
/// input starts at `base` inside the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    base: usize,
    segments: Vec<Segment>,
}

impl SourceMap {
    /// A map with no removed ranges, for a run starting at `base`.
    pub fn identity(base: usize) -> Self {
        Self {
            base,
            segments: vec![Segment {
                working: 0,
                input: 0,
            }],
        }
    }

    /// Record that `input_resume` is the first input offset following a
    /// range removed at working offset `working`.
    ///
    /// Removals must be recorded in working-text order.
    pub fn push_removal(&mut self, working: usize, input_resume: usize) {
        debug_assert!(
            self.segments.last().is_none_or(|s| s.working <= working),
            "removals must be recorded in order"
        );
        self.segments.push(Segment {
            working,
            input: input_resume,
        });
    }

    /// Convert an offset in the run's input text to the original source.
    pub fn input_to_original(&self, input: usize) -> usize {
        self.base + input
    }

    /// Convert a working-text offset to the original source.
    pub fn to_original(&self, working: usize) -> usize {
        let at = self.segments.partition_point(|s| s.working <= working);
        // The identity segment starts at 0, so `at` is at least 1.
        let segment = self.segments[at.saturating_sub(1)];
        self.input_to_original(segment.input + (working - segment.working))
    }
}
