//! Address-token extraction from raw message text.
//!
//! Two stages. [`parse_mentions`] is role-agnostic: it greedily scans
//! each `@` token as far as the word grammar allows, without knowing
//! which roles exist. [`resolve_mentions`] then trims each raw token to
//! the longest leading word-prefix that names an existing role, so
//! trailing prose after a name never defeats the match and unknown
//! names drop out silently.

/// Extract raw address tokens from message text.
///
/// A token starts at `@` and consists of one or more words of ASCII
/// letters, digits, underscore, and hyphen, joined by exactly one
/// space. A double space, any other character, or end of input ends
/// the token. Output is de-duplicated, first occurrence wins for
/// ordering. No error path: no matches yields an empty list.
pub fn parse_mentions(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut tokens: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'@' {
            i += 1;
            continue;
        }
        i += 1;

        let mut words: Vec<&str> = Vec::new();
        loop {
            let start = i;
            while i < bytes.len() && is_word_byte(bytes[i]) {
                i += 1;
            }
            if i == start {
                break;
            }
            // Safe: the scanned range is all ASCII.
            words.push(&text[start..i]);

            // A single space followed by another word continues the
            // token; anything else (including a second space) ends it.
            if i + 1 < bytes.len() && bytes[i] == b' ' && is_word_byte(bytes[i + 1]) {
                i += 1;
            } else {
                break;
            }
        }

        if words.is_empty() {
            continue;
        }
        let token = words.join(" ");
        if !tokens.iter().any(|t| t == &token) {
            tokens.push(token);
        }
    }

    tokens
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

/// Reduce raw tokens to the roles they actually address.
///
/// For each raw token, the longest leading word-prefix that exactly
/// matches a known role name wins; a token with no matching prefix is
/// dropped without comment. Output keeps first-occurrence order and is
/// de-duplicated, so `"@A @B @A hi"` addresses `A` then `B` once each.
pub fn resolve_mentions(raw_tokens: &[String], known_roles: &[String]) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::new();

    for token in raw_tokens {
        let mut best: Option<&str> = None;
        for candidate in known_roles {
            let is_prefix = token == candidate
                || (token.starts_with(candidate.as_str())
                    && token.as_bytes().get(candidate.len()) == Some(&b' '));
            if is_prefix && best.is_none_or(|b| candidate.len() > b.len()) {
                best = Some(candidate);
            }
        }
        if let Some(name) = best {
            if !resolved.iter().any(|r| r == name) {
                resolved.push(name.to_string());
            }
        }
    }

    resolved
}
