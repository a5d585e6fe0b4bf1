//! Splits byte streams into line tokens.
//!
//! A token is one line including its terminator. LF, CRLF and CR all bound
//! lines; a final unterminated run of bytes is a token of its own. Tokens
//! compare byte-for-byte, terminators included, so mixed-EOL inputs only
//! match where they really are identical.

/// Splits `data` into lines, terminators attached.
pub(super) fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < data.len() {
        match data[i] {
            b'\n' => {
                lines.push(&data[start..=i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                let end = if data.get(i + 1) == Some(&b'\n') { i + 1 } else { i };
                lines.push(&data[start..=end]);
                i = end + 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}

/// True when the token carries its terminator.
pub(super) fn has_eol(line: &[u8]) -> bool {
    matches!(line.last(), Some(b'\n') | Some(b'\r'))
}
