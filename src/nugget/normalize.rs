//! Conversion of printf-style `%n` identifiers into ordinal `{n}` placeholders.

use std::borrow::Cow;

/// Parses an unsigned decimal integer without allocating.
///
/// Accepts ASCII digits only: no sign, no decimal point, no whitespace.
/// Returns `None` for empty input, any other character, or overflow.
#[must_use]
pub fn parse_decimal(digits: &str) -> Option<u64> {
    if digits.is_empty() {
        return None;
    }

    digits.bytes().try_fold(0_u64, |value, byte| {
        let digit = byte.is_ascii_digit().then(|| u64::from(byte - b'0'))?;
        value.checked_mul(10)?.checked_add(digit)
    })
}

/// Rewrites `%0`, `%1`, ... into `{0}`, `{1}`, ...
///
/// ```
/// use nugget_i18n::nugget::normalize_identifiers;
///
/// assert_eq!(
///     normalize_identifiers("Enter between %1 and %0 characters"),
///     "Enter between {1} and {0} characters"
/// );
/// ```
///
/// A `%` not followed by digits is kept as is. An occurrence whose digits do
/// not fit the scanner is also kept verbatim while the rest of the string is
/// still converted. Strings without identifiers are returned borrowed.
#[must_use]
pub fn normalize_identifiers(message: &str) -> Cow<'_, str> {
    if !message.contains('%') {
        return Cow::Borrowed(message);
    }

    let mut output = String::with_capacity(message.len() + 8);
    let mut rest = message;

    while let Some(percent) = rest.find('%') {
        let (before, from_percent) = rest.split_at(percent);
        output.push_str(before);

        let after = from_percent.get(1..).unwrap_or_default();
        let digit_count = after.bytes().take_while(u8::is_ascii_digit).count();
        let (digits, tail) = after.split_at(digit_count);

        match parse_decimal(digits) {
            Some(id) => {
                output.push('{');
                output.push_str(&id.to_string());
                output.push('}');
            }
            None => {
                output.push('%');
                output.push_str(digits);
            }
        }
        rest = tail;
    }

    output.push_str(rest);
    Cow::Owned(output)
}
