//! Naming conventions

/// Convert a name to snake_case.
///
/// Word boundaries are lower-to-upper transitions (`OrderItem`), the last capital
/// of an acronym run (`HTTPServer`), and any run of spaces, dashes or underscores.
/// Leading and trailing separators are dropped.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);
    let mut pending_separator = false;

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_separator = !out.is_empty();
            continue;
        }

        if ch.is_uppercase() && !out.is_empty() {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next.is_some_and(|n| n.is_lowercase()));
            pending_separator |= boundary;
        }

        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}
