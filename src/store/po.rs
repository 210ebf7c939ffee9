//! GNU gettext PO/POT reader and writer.
//!
//! Rendering is canonical: header first, then live entries in message id
//! order, then obsolete entries. Parsing a rendered file and rendering it
//! again yields the same bytes.

use super::types::{
    PoFile,
    PoHeader,
    TranslationItem,
};
use crate::types::Reference;

/// Opens a reference path that contains whitespace (U+2068 FIRST STRONG
/// ISOLATE), as GNU gettext writes it.
const ISOLATE_START: char = '\u{2068}';
/// Closes an isolated reference path (U+2069 POP DIRECTIONAL ISOLATE).
const ISOLATE_END: char = '\u{2069}';

/// Syntax error in a PO file, with its 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct PoParseError {
    pub line: usize,
    pub message: String,
}

impl PoParseError {
    /// Error at `line`.
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

/// Keyword the following continuation strings append to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// `msgctxt`
    Context,
    /// `msgid`
    MessageId,
    /// `msgid_plural`
    MessageIdPlural,
    /// `msgstr`
    Translation,
    /// `msgstr[n]`
    PluralTranslation(usize),
}

/// Entry being assembled while reading lines.
#[derive(Debug, Default)]
struct EntryBuilder {
    /// Comments, references and flags read so far.
    item: TranslationItem,
    /// Set by `msgid`.
    message_id: Option<String>,
    /// Set by `msgstr`.
    translation: Option<String>,
    /// `msgstr[n]` strings in file order.
    plural_translations: Vec<(usize, String)>,
    /// Field continuation strings belong to.
    last_field: Option<Field>,
}

impl EntryBuilder {
    /// True once a keyword line was read for this entry.
    const fn has_keywords(&self) -> bool {
        self.message_id.is_some() || self.last_field.is_some()
    }

    /// String the continuation lines of `field` append to.
    fn field_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Context => None,
            Field::MessageId => self.message_id.as_mut(),
            Field::MessageIdPlural => self.item.message_id_plural.as_mut(),
            Field::Translation => self.translation.as_mut(),
            Field::PluralTranslation(index) => self
                .plural_translations
                .iter_mut()
                .find(|(form, _)| *form == index)
                .map(|(_, text)| text),
        }
    }
}

/// Parses the content of a PO or POT file.
pub fn parse(content: &str) -> Result<PoFile, PoParseError> {
    let mut file = PoFile::default();
    let mut has_header = false;
    let mut entry = EntryBuilder::default();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim_end();

        if line.is_empty() {
            finish_entry(std::mem::take(&mut entry), &mut file, &mut has_header);
            continue;
        }

        let (line, obsolete) = match line.strip_prefix("#~") {
            Some(rest) => (rest.trim_start(), true),
            None => (line, false),
        };

        if line.starts_with('#') || (obsolete && line.starts_with('|')) {
            if obsolete {
                continue;
            }
            if entry.has_keywords() {
                finish_entry(std::mem::take(&mut entry), &mut file, &mut has_header);
            }
            parse_comment(line, &mut entry.item);
            continue;
        }

        if line.starts_with('"') {
            let text = unquote(line).map_err(|message| PoParseError::new(line_number, message))?;
            let field = entry
                .last_field
                .ok_or_else(|| PoParseError::new(line_number, "string without keyword"))?;
            if let Some(target) = entry.field_mut(field) {
                target.push_str(&text);
            }
            continue;
        }

        let (keyword, rest) = line.split_once(char::is_whitespace).ok_or_else(|| {
            PoParseError::new(line_number, format!("expected a quoted string after '{line}'"))
        })?;
        let text =
            unquote(rest.trim()).map_err(|message| PoParseError::new(line_number, message))?;
        let field = parse_keyword(keyword)
            .ok_or_else(|| PoParseError::new(line_number, format!("unknown keyword '{keyword}'")))?;

        if matches!(field, Field::Context | Field::MessageId) && entry.message_id.is_some() {
            finish_entry(std::mem::take(&mut entry), &mut file, &mut has_header);
        }
        if obsolete {
            entry.item.is_obsolete = true;
        }

        match field {
            Field::Context => {
                tracing::debug!(line = line_number, "Ignoring msgctxt");
            }
            Field::MessageId => entry.message_id = Some(text),
            Field::MessageIdPlural => entry.item.message_id_plural = Some(text),
            Field::Translation => entry.translation = Some(text),
            Field::PluralTranslation(index) => entry.plural_translations.push((index, text)),
        }
        entry.last_field = Some(field);
    }

    finish_entry(entry, &mut file, &mut has_header);
    Ok(file)
}

/// Field of a keyword such as `msgid` or `msgstr[1]`.
fn parse_keyword(keyword: &str) -> Option<Field> {
    match keyword {
        "msgctxt" => Some(Field::Context),
        "msgid" => Some(Field::MessageId),
        "msgid_plural" => Some(Field::MessageIdPlural),
        "msgstr" => Some(Field::Translation),
        _ => keyword
            .strip_prefix("msgstr[")
            .and_then(|rest| rest.strip_suffix(']'))
            .and_then(|index| index.parse().ok())
            .map(Field::PluralTranslation),
    }
}

/// Applies one `#` comment line to `item`.
fn parse_comment(line: &str, item: &mut TranslationItem) {
    if let Some(rest) = line.strip_prefix("#.") {
        item.extracted_comments.push(strip_one_space(rest).to_string());
    } else if let Some(rest) = line.strip_prefix("#:") {
        for token in split_references(rest) {
            match token.parse::<Reference>() {
                Ok(reference) => {
                    item.references.insert(reference);
                }
                Err(error) => tracing::debug!(%error, "Skipping reference"),
            }
        }
    } else if let Some(rest) = line.strip_prefix("#,") {
        for flag in rest.split(',').map(str::trim).filter(|flag| !flag.is_empty()) {
            if flag == "fuzzy" {
                item.is_fuzzy = true;
            } else {
                item.flags.push(flag.to_string());
            }
        }
    } else if line == "#" {
        item.translator_comments.push(String::new());
    } else if let Some(rest) = line.strip_prefix("# ") {
        item.translator_comments.push(rest.to_string());
    }
    // `#|` previous-msgid lines are dropped
}

/// Splits a `#:` line into `path:line` tokens.
///
/// Paths wrapped in isolate marks may contain whitespace; the marks are
/// removed.
fn split_references(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        let mut token = String::new();
        if c == ISOLATE_START {
            chars.next();
            token.extend(chars.by_ref().take_while(|&c| c != ISOLATE_END));
        }
        while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
            token.push(c);
        }
        tokens.push(token);
    }
    tokens
}

/// Reference as written after `#:`.
fn render_reference(reference: &Reference) -> String {
    if reference.path.contains(char::is_whitespace) {
        format!("{ISOLATE_START}{}{ISOLATE_END}:{}", reference.path, reference.line)
    } else {
        reference.to_string()
    }
}

/// `text` without one leading space.
fn strip_one_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

/// Adds the assembled entry to `file`, or takes it as the header.
fn finish_entry(entry: EntryBuilder, file: &mut PoFile, has_header: &mut bool) {
    let EntryBuilder { mut item, message_id, translation, mut plural_translations, .. } = entry;
    let Some(message_id) = message_id else {
        return;
    };

    if message_id.is_empty() {
        if !*has_header && !item.is_obsolete {
            *has_header = true;
            file.header = PoHeader {
                comments: item.translator_comments,
                fields: parse_header_fields(translation.as_deref().unwrap_or_default()),
            };
        }
        return;
    }

    plural_translations.sort_by_key(|(index, _)| *index);
    item.plural_translations = plural_translations.into_iter().map(|(_, text)| text).collect();
    item.translation = translation.filter(|text| !text.is_empty());
    item.message_id.clone_from(&message_id);

    match file.items.get(&message_id) {
        Some(existing) if !existing.is_obsolete => {
            tracing::warn!(message_id = %message_id, "Duplicate message id, keeping the first entry");
        }
        Some(_) if item.is_obsolete => {}
        _ => {
            file.items.insert(message_id, item);
        }
    }
}

/// `Name: value` lines of the header translation.
fn parse_header_fields(text: &str) -> Vec<(String, String)> {
    text.split('\n')
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

/// Decodes a quoted PO string with C escapes.
fn unquote(text: &str) -> Result<String, String> {
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| format!("malformed string {text}"))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some(other) => return Err(format!("unknown escape sequence \\{other}")),
                None => return Err("string ends with a backslash".to_string()),
            },
            '"' => return Err(format!("unescaped quote in {text}")),
            _ => result.push(c),
        }
    }
    Ok(result)
}

/// Encodes `text` with the escapes [`unquote`] reads.
fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\t' => result.push_str("\\t"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

/// Renders a PO file in canonical form.
#[must_use]
pub fn render(file: &PoFile) -> String {
    let mut out = String::new();

    for comment in &file.header.comments {
        push_comment(&mut out, "#", comment);
    }
    out.push_str("msgid \"\"\nmsgstr \"\"\n");
    for (name, value) in &file.header.fields {
        out.push('"');
        out.push_str(&escape(&format!("{name}: {value}\n")));
        out.push_str("\"\n");
    }

    let live = file.items.values().filter(|item| !item.is_obsolete);
    let obsolete = file.items.values().filter(|item| item.is_obsolete);
    for item in live.chain(obsolete) {
        out.push('\n');
        render_item(&mut out, item);
    }

    out
}

/// Appends one entry, prefixed with `#~` when obsolete.
fn render_item(out: &mut String, item: &TranslationItem) {
    for comment in &item.translator_comments {
        push_comment(out, "#", comment);
    }
    for comment in &item.extracted_comments {
        push_comment(out, "#.", comment);
    }
    for reference in &item.references {
        out.push_str("#: ");
        out.push_str(&render_reference(reference));
        out.push('\n');
    }

    let flags: Vec<&str> = item
        .is_fuzzy
        .then_some("fuzzy")
        .into_iter()
        .chain(item.flags.iter().map(String::as_str))
        .collect();
    if !flags.is_empty() {
        out.push_str("#, ");
        out.push_str(&flags.join(", "));
        out.push('\n');
    }

    let prefix = if item.is_obsolete { "#~ " } else { "" };
    push_string(out, prefix, "msgid", &item.message_id);
    if let Some(plural) = &item.message_id_plural {
        push_string(out, prefix, "msgid_plural", plural);
        if item.plural_translations.is_empty() {
            push_string(out, prefix, "msgstr[0]", "");
        }
        for (index, text) in item.plural_translations.iter().enumerate() {
            push_string(out, prefix, &format!("msgstr[{index}]"), text);
        }
    } else {
        push_string(out, prefix, "msgstr", item.translation.as_deref().unwrap_or_default());
    }
}

/// Appends a comment line with `marker`.
fn push_comment(out: &mut String, marker: &str, comment: &str) {
    out.push_str(marker);
    if !comment.is_empty() {
        out.push(' ');
        out.push_str(comment);
    }
    out.push('\n');
}

/// Appends `keyword "text"`, split after each newline.
fn push_string(out: &mut String, prefix: &str, keyword: &str, text: &str) {
    out.push_str(prefix);
    out.push_str(keyword);
    if text.contains('\n') {
        out.push_str(" \"\"\n");
        for segment in text.split_inclusive('\n') {
            out.push_str(prefix);
            out.push('"');
            out.push_str(&escape(segment));
            out.push_str("\"\n");
        }
    } else {
        out.push_str(" \"");
        out.push_str(&escape(text));
        out.push_str("\"\n");
    }
}
