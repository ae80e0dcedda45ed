use std::num::ParseIntError;

/* Numerals
 * Admins type scores on phone keyboards that may produce Persian (۰-۹)
 * or Arabic-Indic (٠-٩) digits. These are mapped to ASCII before parsing.
 */

const PERSIAN_ZERO: u32 = '۰' as u32;
const ARABIC_INDIC_ZERO: u32 = '٠' as u32;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScoreParseError {
    #[error("No number provided.")]
    Empty,
    #[error("Invalid number provided: {0}")]
    Invalid(ParseIntError),
}

// Maps a Persian or Arabic-Indic digit to its ASCII counterpart.
fn to_ascii_digit(c: char) -> char {
    let code = c as u32;
    let zero = if (PERSIAN_ZERO..PERSIAN_ZERO + 10).contains(&code) {
        PERSIAN_ZERO
    } else if (ARABIC_INDIC_ZERO..ARABIC_INDIC_ZERO + 10).contains(&code) {
        ARABIC_INDIC_ZERO
    } else {
        return c;
    };

    char::from_digit(code - zero, 10).unwrap_or(c)
}

// Rewrites every localized digit in the text to ASCII, leaving everything else alone.
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(to_ascii_digit).collect()
}

/* Parses a score entered by the admin.
 * Digits are normalized first, surrounding whitespace is ignored,
 * and an optional leading sign is accepted.
 */
pub fn parse_score(text: &str) -> Result<i64, ScoreParseError> {
    let normalized = normalize_digits(text);
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return Err(ScoreParseError::Empty);
    }

    trimmed.parse::<i64>().map_err(ScoreParseError::Invalid)
}
