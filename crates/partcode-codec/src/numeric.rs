/// Canonical decimal representation of an integer-looking value.
///
/// Leading zeros and a `+` sign are dropped (`"007"` -> `"7"`, `"-05"` ->
/// `"-5"`). Arbitrary length is accepted since codes are text, not machine
/// integers. Returns `None` for anything that is not an optionally signed run
/// of ASCII digits.
pub(crate) fn decimal_repr(value: &str) -> Option<String> {
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some("0".to_string());
    }
    Some(if negative {
        format!("-{significant}")
    } else {
        significant.to_string()
    })
}
