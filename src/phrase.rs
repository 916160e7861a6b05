//! Date phrase expansion
//!
//! A date phrase is the user-facing shorthand for range-list
//! expressions: quoted text becomes a date cast, a `#sig#` marker
//! switches the cast signature for the rest of the phrase, `##` casts
//! the next quoted text to a record instead, and square-bracket
//! comments vanish. Everything else passes through to the script
//! evaluator untouched, so the set operators and parentheses keep
//! their ordinary meaning.

/// Expand a date phrase into a script expression.
pub fn parse_date_phrase(phrase: &str) -> String {
    let mut out = String::new();
    let mut sig: Option<String> = None;
    let mut record_next = false;
    let mut chars = phrase.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '[' => {
                let mut depth = 1;
                for c in chars.by_ref() {
                    match c {
                        '[' => depth += 1,
                        ']' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            '#' => {
                if chars.peek() == Some(&'#') {
                    chars.next();
                    record_next = true;
                    continue;
                }
                let mut marker = String::new();
                for c in chars.by_ref() {
                    if c == '#' {
                        break;
                    }
                    marker.push(c);
                }
                let marker = marker.trim();
                sig = if marker.is_empty() {
                    None
                } else {
                    Some(marker.to_string())
                };
            }
            '"' => {
                let mut text = String::new();
                while let Some(c) = chars.next() {
                    if c == '"' {
                        if chars.peek() == Some(&'"') {
                            chars.next();
                            text.push('"');
                            continue;
                        }
                        break;
                    }
                    text.push(c);
                }
                let cast = if record_next { "record" } else { "date" };
                record_next = false;
                match &sig {
                    Some(s) => out.push_str(&format!("{}.{} \"{}\"", cast, s, text)),
                    None => out.push_str(&format!("{} \"{}\"", cast, text)),
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_text_becomes_date_cast() {
        assert_eq!(
            parse_date_phrase("\"19sep1948\"..\"1950\" | \"1956\""),
            "date \"19sep1948\"..date \"1950\" | date \"1956\""
        );
    }

    #[test]
    fn test_sig_marker_qualifies_casts() {
        assert_eq!(
            parse_date_phrase("#j# \"6sep1948\""),
            " date.j \"6sep1948\""
        );
        // The marker holds for the rest of the phrase.
        assert_eq!(
            parse_date_phrase("#j# \"6sep1948\" | ## \"1948\""),
            " date.j \"6sep1948\" |  record.j \"1948\""
        );
    }

    #[test]
    fn test_record_marker() {
        assert_eq!(parse_date_phrase("## \"19sep1948\""), " record \"19sep1948\"");
    }

    #[test]
    fn test_comments_stripped() {
        assert_eq!(
            parse_date_phrase("[approximate] \"1948\""),
            " date \"1948\""
        );
        assert_eq!(parse_date_phrase("[a [nested] note] ~\"1948\""), " ~date \"1948\"");
    }

    #[test]
    fn test_operators_pass_through() {
        assert_eq!(parse_date_phrase("~(\"1948\")"), "~(date \"1948\")");
    }
}
