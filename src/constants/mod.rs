pub mod prompts;

/// Hard token-budget guard: source content embedded in any prompt is cut to
/// this many characters. Truncation, not summarization.
pub const MAX_CONTENT_CHARS: usize = 8_000;

/// Requested question counts are clamped into this range.
pub const MIN_QUESTION_COUNT: u8 = 1;
pub const MAX_QUESTION_COUNT: u8 = 10;
