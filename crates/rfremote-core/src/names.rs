//! Friendly snake_case names for keyword identifiers.

/// Derives the friendly name clients address a keyword by.
///
/// Scans the identifier left to right: underscores copy through, a word
/// boundary before a digit run or an uppercase letter inserts one `_`, and
/// every character copies through lowercased. Acronym runs stay joined
/// until a lowercase tail begins, so `HTTPServer` becomes `http_server`
/// and `GetKeywordNames` becomes `get_keyword_names`.
#[must_use]
pub fn friendly_name(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            out.push(ch);
        } else if ch.is_ascii_digit() {
            if i > 0 {
                let prev = chars[i - 1];
                if prev != '_' && !prev.is_ascii_digit() {
                    out.push('_');
                }
            }
            out.push(ch);
        } else if ch.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || next_is_lower) {
                    out.push('_');
                }
            }
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }

    out
}
