/// Lexical context of the translator while walking a statement.
#[derive(Clone)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment(u32),
    DollarQuoted(String),
}

fn pair_at(bytes: &[u8], idx: usize, first: u8, second: u8) -> bool {
    bytes.get(idx) == Some(&first) && bytes.get(idx + 1) == Some(&second)
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    pair_at(bytes, idx, b'-', b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    pair_at(bytes, idx, b'/', b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    pair_at(bytes, idx, b'*', b'/')
}

/// Digits starting at `start`, with the index one past the last digit.
pub(super) fn scan_digits(bytes: &[u8], start: usize) -> Option<(usize, &str)> {
    let len = bytes
        .get(start..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let end = start + len;
    std::str::from_utf8(&bytes[start..end])
        .ok()
        .map(|digits| (end, digits))
}

/// Recognise an opening `$tag$` (tag may be empty) at `start`.
///
/// Returns the tag and the index of the closing `$` of the opener. A `$`
/// followed by digits is a positional parameter, not a quote.
pub(super) fn try_start_dollar_quote(bytes: &[u8], start: usize) -> Option<(String, usize)> {
    let body = bytes.get(start + 1..)?;
    if body.first().is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let tag_len = body
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if body.get(tag_len) != Some(&b'$') {
        return None;
    }
    let tag = std::str::from_utf8(&body[..tag_len]).ok()?.to_string();
    Some((tag, start + 1 + tag_len))
}

/// True when the `$tag$` closer begins at `idx`.
pub(super) fn matches_tag(bytes: &[u8], idx: usize, tag: &str) -> bool {
    let close_at = idx + 1 + tag.len();
    bytes.get(idx + 1..close_at) == Some(tag.as_bytes()) && bytes.get(close_at) == Some(&b'$')
}
