/// Highest step number a `stepN` modifier is expected to reference.
///
/// Larger values are still accepted; the parser only reports them.
pub const DEFAULT_MAX_STEP_NUMBER: u32 = 14;

/// Lines whose first non-blank character is this marker are ignored.
pub const COMMENT_MARKER: char = '#';

/// Separates the subject id from its modifiers (`105:step2:force`).
pub const MODIFIER_SEPARATOR: char = ':';

/// Prefix of a step-only modifier token (`step4`).
pub const STEP_MODIFIER_PREFIX: &str = "step";
