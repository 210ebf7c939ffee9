//! Ordinal placeholder formatting: `{0}`, `{1,-8}`, `{2:N2}`.
//!
//! Braces are escaped by doubling them. Arguments are plain strings, so a
//! format clause after `:` is accepted and ignored.

use thiserror::Error;

use crate::nugget::parse_decimal;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unmatched '{brace}' at byte {position}")]
    UnbalancedBrace { brace: char, position: usize },

    #[error("Invalid placeholder '{{{placeholder}}}' at byte {position}")]
    InvalidPlaceholder { placeholder: String, position: usize },

    #[error("Placeholder {{{index}}} refers past the {count} supplied argument(s)")]
    IndexOutOfRange { index: u64, count: usize },
}

/// Substitutes `{n}` placeholders in `template` with `args[n]`.
pub fn format_ordinal<S: AsRef<str>>(template: &str, args: &[S]) -> Result<String, FormatError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|(_, next)| *next == '{').is_some() {
                    output.push('{');
                    continue;
                }
                let mut placeholder = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(inner);
                }
                if !closed {
                    return Err(FormatError::UnbalancedBrace { brace: '{', position });
                }
                output.push_str(&expand_placeholder(&placeholder, position, args)?);
            }
            '}' => {
                if chars.next_if(|(_, next)| *next == '}').is_none() {
                    return Err(FormatError::UnbalancedBrace { brace: '}', position });
                }
                output.push('}');
            }
            _ => output.push(c),
        }
    }

    Ok(output)
}

/// Expands the inside of one `{...}` placeholder.
fn expand_placeholder<S: AsRef<str>>(
    placeholder: &str,
    position: usize,
    args: &[S],
) -> Result<String, FormatError> {
    let invalid =
        || FormatError::InvalidPlaceholder { placeholder: placeholder.to_string(), position };

    let without_format = placeholder.split_once(':').map_or(placeholder, |(head, _)| head);
    let (index_text, alignment_text) = match without_format.split_once(',') {
        Some((index, alignment)) => (index, Some(alignment)),
        None => (without_format, None),
    };

    let index = parse_decimal(index_text.trim()).ok_or_else(invalid)?;
    let value = usize::try_from(index)
        .ok()
        .and_then(|i| args.get(i))
        .ok_or(FormatError::IndexOutOfRange { index, count: args.len() })?
        .as_ref();

    let Some(alignment_text) = alignment_text else {
        return Ok(value.to_string());
    };

    let alignment_text = alignment_text.trim();
    let (left_align, width_text) = alignment_text
        .strip_prefix('-')
        .map_or((false, alignment_text), |width| (true, width));
    let width = parse_decimal(width_text)
        .and_then(|w| usize::try_from(w).ok())
        .ok_or_else(invalid)?;

    Ok(if left_align { format!("{value:<width$}") } else { format!("{value:>width$}") })
}
