use crate::substitution::ConversionError;

/// Largest input, in characters, the tools accept for conversion (roughly
/// 50,000 words of text).
pub const MAX_INPUT_CHARS: usize = 500_000;

/// Number of `char`s in `s`. Meetei Mayek lives in the BMP, so this matches
/// what users see as the character count.
#[inline]
pub fn char_count(s: &str) -> usize {
    s.chars().count()
}

/// Rejects inputs longer than [`MAX_INPUT_CHARS`].
///
/// # Example
/// ```
/// use mayek_normalize::utils::{check_input_size, MAX_INPUT_CHARS};
///
/// assert!(check_input_size("ꯑꯁꯤ").is_ok());
/// assert!(check_input_size(&"ꯇ".repeat(MAX_INPUT_CHARS + 1)).is_err());
/// ```
pub fn check_input_size(s: &str) -> Result<(), ConversionError> {
    // each char is at least one byte
    if s.len() <= MAX_INPUT_CHARS {
        return Ok(());
    }
    let chars = char_count(s);
    if chars > MAX_INPUT_CHARS {
        return Err(ConversionError::InputTooLarge {
            chars,
            limit: MAX_INPUT_CHARS,
        });
    }
    Ok(())
}

/// Finds a valid UTF-8 boundary within the given string, limited by a maximum byte count.
///
/// Slicing `sv` at the returned index never splits a character, which makes it
/// safe for building previews of converted text.
///
/// # Example
/// ```rust
/// use mayek_normalize::utils::find_max_utf8_length;
///
/// let input = "ꯑꯣꯁꯤ"; // each Meetei Mayek letter takes 3 bytes
/// let safe_index = find_max_utf8_length(input, 7);
/// assert_eq!(&input[..safe_index], "ꯑꯣ");
/// ```
pub fn find_max_utf8_length(sv: &str, max_byte_count: usize) -> usize {
    if sv.len() <= max_byte_count {
        return sv.len();
    }
    let mut byte_count = max_byte_count;
    while byte_count > 0 && !sv.is_char_boundary(byte_count) {
        byte_count -= 1;
    }
    byte_count
}

/// Formats `n` with `,` thousands separators.
///
/// ```
/// assert_eq!(mayek_normalize::utils::format_thousand(1234567), "1,234,567");
/// ```
pub fn format_thousand(n: usize) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result
}
