use regex::Regex;
use std::sync::LazyLock;

static MOVE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.+").expect("static move number pattern"));

/// Removes a leading move number such as `12.` or `4...` from a fragment.
pub fn strip_move_number(fragment: &str) -> &str {
    match MOVE_NUMBER.find(fragment) {
        Some(m) => &fragment[m.end()..],
        None => fragment,
    }
}

/// Splits a repertoire line into move tokens, dropping move numbers.
///
/// `"1.e4 e5 2.Nf3 2...Nc6"` yields `["e4", "e5", "Nf3", "Nc6"]`, and a
/// detached marker such as the `3.` in `"3. Bb5"` yields nothing.
pub fn tokenize_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(strip_move_number)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
