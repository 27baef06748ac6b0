use std::borrow::Cow;

mod scanner;

use scanner::{
    State, is_block_comment_end, is_block_comment_start, is_line_comment_start, matches_tag,
    scan_digits, try_start_dollar_quote,
};

/// Native positional-parameter marker of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

impl PlaceholderStyle {
    fn marker(self) -> char {
        match self {
            PlaceholderStyle::Postgres => '$',
            PlaceholderStyle::Sqlite => '?',
        }
    }
}

/// Translate the portable `?` placeholder into the driver's numbered marker.
///
/// Bare `?` tokens are numbered left to right (`?`, `?` becomes `$1`, `$2` or
/// `?1`, `?2`). Already-numbered markers (`?3`, `$3`) keep their number and are
/// rewritten to the target marker.
///
/// Quoted strings, quoted identifiers, comments and dollar-quoted blocks are
/// skipped via a lightweight state machine; it may still miss edge cases in
/// complex SQL.
///
/// Returns a borrowed `Cow` when no changes are needed.
///
/// ```rust
/// use blog_orm::translation::{PlaceholderStyle, translate_placeholders};
///
/// let sql = r#"UPDATE "users" SET "name"=? WHERE "id"=?"#;
/// assert_eq!(
///     translate_placeholders(sql, PlaceholderStyle::Postgres),
///     r#"UPDATE "users" SET "name"=$1 WHERE "id"=$2"#
/// );
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle) -> Cow<'_, str> {
    let mut out: Option<String> = None;
    let mut state = State::Normal;
    let mut next_positional = 0_usize;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        // (bytes consumed, replacement text) when a placeholder is rewritten
        let mut replacement: Option<(usize, String)> = None;
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => state = State::BlockComment(1),
                b'$' => {
                    if let Some((tag, advance)) = try_start_dollar_quote(bytes, idx) {
                        state = State::DollarQuoted(tag);
                        copy_verbatim(&mut out, &sql[idx..=advance]);
                        idx = advance + 1;
                        continue;
                    } else if matches!(target, PlaceholderStyle::Sqlite)
                        && let Some((digits_end, digits)) = scan_digits(bytes, idx + 1)
                    {
                        replacement = Some((digits_end - idx, format!("?{digits}")));
                    }
                }
                b'?' => {
                    if let Some((digits_end, digits)) = scan_digits(bytes, idx + 1) {
                        if matches!(target, PlaceholderStyle::Postgres) {
                            replacement = Some((digits_end - idx, format!("${digits}")));
                        }
                    } else {
                        next_positional += 1;
                        replacement = Some((1, format!("{}{next_positional}", target.marker())));
                    }
                }
                _ => {}
            },
            State::SingleQuoted => {
                if b == b'\'' {
                    if bytes.get(idx + 1) == Some(&b'\'') {
                        copy_verbatim(&mut out, "''");
                        idx += 2; // escaped quote
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::DoubleQuoted => {
                if b == b'"' {
                    if bytes.get(idx + 1) == Some(&b'"') {
                        copy_verbatim(&mut out, "\"\"");
                        idx += 2; // escaped quote
                        continue;
                    }
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment(depth) => {
                if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment(depth + 1);
                    copy_verbatim(&mut out, "/*");
                    idx += 2;
                    continue;
                } else if is_block_comment_end(bytes, idx) {
                    state = if depth == 1 {
                        State::Normal
                    } else {
                        State::BlockComment(depth - 1)
                    };
                    copy_verbatim(&mut out, "*/");
                    idx += 2;
                    continue;
                }
            }
            State::DollarQuoted(ref tag) => {
                if b == b'$' && matches_tag(bytes, idx, tag) {
                    let end = idx + tag.len() + 1;
                    copy_verbatim(&mut out, &sql[idx..=end]);
                    state = State::Normal;
                    idx = end + 1;
                    continue;
                }
            }
        }

        match replacement {
            Some((consumed, text)) => {
                let buf = out.get_or_insert_with(|| sql[..idx].to_string());
                buf.push_str(&text);
                idx += consumed;
            }
            None => {
                let ch_len = utf8_len(b);
                copy_verbatim(&mut out, &sql[idx..idx + ch_len]);
                idx += ch_len;
            }
        }
    }

    match out {
        Some(buf) => Cow::Owned(buf),
        None => Cow::Borrowed(sql),
    }
}

fn copy_verbatim(out: &mut Option<String>, text: &str) {
    if let Some(buf) = out {
        buf.push_str(text);
    }
}

// Non-ASCII characters are copied whole so the output stays valid UTF-8.
fn utf8_len(first: u8) -> usize {
    match first {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}
