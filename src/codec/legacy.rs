//! Support for the relaxed object-literal syntax of older generators.
//!
//! Old index writers emitted JavaScript rather than JSON: object keys that
//! are plain identifiers were left unquoted (`{docnames:["index"]}`). Strings
//! were always double-quoted, so quoting those keys yields valid JSON.

/// Quotes bare identifier keys. Text inside string literals is left untouched.
pub(crate) fn quote_bare_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.char_indices().peekable();
    let mut in_string = false;
    let mut escaped = false;
    // Last non-whitespace character outside a string; keys follow `{` or `,`.
    let mut last = None;

    while let Some((start, c)) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last = Some('"');
            }
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            continue;
        }

        if is_ident_start(c) && matches!(last, Some('{' | ',')) {
            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_ident_continue(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }

            let ident = &text[start..end];
            if text[end..].trim_start().starts_with(':') {
                out.push('"');
                out.push_str(ident);
                out.push('"');
            } else {
                // `true`, `false`, `null` inside arrays
                out.push_str(ident);
            }
            last = Some('_');
            continue;
        }

        out.push(c);
        if !c.is_whitespace() {
            last = Some(c);
        }
    }

    out
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
