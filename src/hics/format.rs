//! Formats: text to and from field tuples
//!
//! A format string is a sequence of `|`-separated chunks, each holding
//! literal text around one `{field}` insert. An insert may name a
//! lexicon, `{month:m}`, and request its abbreviated words with a
//! trailing `:a`. When a date is rendered with a field unset, the
//! whole chunk containing that field is dropped, so the d-m-y pattern
//! `"{day} |{month:m:a} |{year}"` renders a year-month date as
//! "May 2030" with no stray spacing.

use std::collections::HashMap;
use std::rc::Rc;

use crate::field::{Field, F_INVALID};
use crate::hics::lexicon::Lexicon;

#[derive(Debug, Clone)]
struct FormatChunk {
    prefix: String,
    field: String,
    lexicon: Option<String>,
    abbrev: bool,
    suffix: String,
}

#[derive(Debug, Clone)]
pub struct Format {
    pub code: String,
    pub pattern: String,
    chunks: Vec<FormatChunk>,
}

pub type LexiconMap = HashMap<String, Rc<Lexicon>>;

impl Format {
    pub fn new(code: impl Into<String>, pattern: impl Into<String>) -> Result<Self, String> {
        let code = code.into();
        let pattern = pattern.into();
        let mut chunks = Vec::new();
        for part in pattern.split('|') {
            let open = part
                .find('{')
                .ok_or_else(|| format!("format \"{}\": chunk without insert.", code))?;
            let close = part[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| format!("format \"{}\": unterminated insert.", code))?;
            let mut spec = part[open + 1..close].split(':');
            let field = spec.next().unwrap_or("").to_string();
            if field.is_empty() {
                return Err(format!("format \"{}\": empty field insert.", code));
            }
            let lexicon = spec.next().map(str::to_string);
            let abbrev = spec.next() == Some("a");
            chunks.push(FormatChunk {
                prefix: part[..open].to_string(),
                field,
                lexicon,
                abbrev,
                suffix: part[close + 1..].to_string(),
            });
        }
        Ok(Self { code, pattern, chunks })
    }

    /// Field names in the order the pattern mentions them.
    pub fn field_order(&self) -> Vec<&str> {
        self.chunks.iter().map(|c| c.field.as_str()).collect()
    }

    /// Render a field tuple. `names` gives the base's field order;
    /// chunks whose field is unset are dropped whole.
    pub fn render(&self, names: &[&str], fields: &[Field], lexicons: &LexiconMap) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            let value = names
                .iter()
                .position(|&n| n == chunk.field)
                .and_then(|i| fields.get(i).copied())
                .unwrap_or(F_INVALID);
            if value == F_INVALID {
                continue;
            }
            out.push_str(&chunk.prefix);
            let word = chunk
                .lexicon
                .as_ref()
                .and_then(|code| lexicons.get(code))
                .and_then(|lex| lex.get_word(value, chunk.abbrev).map(str::to_string));
            match word {
                Some(w) => out.push_str(&w),
                None => out.push_str(&value.to_string()),
            }
            out.push_str(&chunk.suffix);
        }
        out
    }

    /// Parse text into a partial field tuple in the base's field order.
    ///
    /// The text is split into digit and letter runs; letter runs are
    /// resolved through the chunk lexicons and pin their field, while
    /// number runs are right-aligned against the pattern's field order,
    /// so a lone "1948" under d-m-y lands on the year.
    pub fn parse(&self, names: &[&str], text: &str, lexicons: &LexiconMap) -> Vec<Field> {
        let tokens = tokenize(text);
        let order = self.field_order();
        let mut assigned: Vec<Option<Field>> = vec![None; order.len()];
        let mut slot = order.len();
        for token in tokens.iter().rev() {
            match token {
                InputToken::Word(word) => {
                    let Some((field, value)) = self.resolve_word(word, lexicons) else {
                        continue;
                    };
                    if let Some(pos) = order.iter().position(|&f| f == field) {
                        assigned[pos] = Some(value);
                        slot = pos;
                    }
                }
                InputToken::Number(n) => {
                    while slot > 0 && assigned[slot - 1].is_some() {
                        slot -= 1;
                    }
                    if slot == 0 {
                        break;
                    }
                    slot -= 1;
                    assigned[slot] = Some(*n);
                }
            }
        }
        let mut fields = vec![F_INVALID; names.len()];
        for (pos, value) in assigned.iter().enumerate() {
            if let Some(v) = value {
                if let Some(i) = names.iter().position(|&n| n == order[pos]) {
                    fields[i] = *v;
                }
            }
        }
        fields
    }

    fn resolve_word(&self, word: &str, lexicons: &LexiconMap) -> Option<(String, Field)> {
        for chunk in &self.chunks {
            if let Some(lex) = chunk.lexicon.as_ref().and_then(|code| lexicons.get(code)) {
                if let Some(value) = lex.lookup(word) {
                    return Some((chunk.field.clone(), value));
                }
            }
        }
        None
    }
}

enum InputToken {
    Number(Field),
    Word(String),
}

/// Split text into digit runs and letter runs; everything else
/// separates.
fn tokenize(text: &str) -> Vec<InputToken> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();
            if let Ok(n) = run.parse() {
                tokens.push(InputToken::Number(n));
            }
        } else if chars[i].is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            tokens.push(InputToken::Word(chars[start..i].iter().collect()));
        } else {
            i += 1;
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month_lexicons() -> LexiconMap {
        let mut lex = Lexicon::new("m");
        lex.fieldname = "month".to_string();
        let names = [
            "January", "February", "March", "April", "May", "June", "July", "August",
            "September", "October", "November", "December",
        ];
        for (i, name) in names.iter().enumerate() {
            lex.add_token(i as Field + 1, *name, Some(name[..3].to_string()));
        }
        let mut map = LexiconMap::new();
        map.insert("m".to_string(), Rc::new(lex));
        map
    }

    const YMD: [&str; 3] = ["year", "month", "day"];

    #[test]
    fn test_render_full_date() {
        let lexicons = month_lexicons();
        let dmy = Format::new("dmy", "{day} |{month:m:a} |{year}").unwrap();
        assert_eq!(dmy.render(&YMD, &[2023, 8, 19], &lexicons), "19 Aug 2023");
        let mdy = Format::new("mdy", "{month:m:a} |{day}, |{year}").unwrap();
        assert_eq!(mdy.render(&YMD, &[2023, 8, 19], &lexicons), "Aug 19, 2023");
    }

    #[test]
    fn test_render_drops_unset_chunks() {
        let lexicons = month_lexicons();
        let dmy = Format::new("dmy", "{day} |{month:m:a} |{year}").unwrap();
        assert_eq!(dmy.render(&YMD, &[2030, 5, F_INVALID], &lexicons), "May 2030");
        assert_eq!(dmy.render(&YMD, &[1948, F_INVALID, F_INVALID], &lexicons), "1948");
    }

    #[test]
    fn test_parse_right_aligns() {
        let lexicons = month_lexicons();
        let dmy = Format::new("dmy", "{day} |{month:m:a} |{year}").unwrap();
        assert_eq!(dmy.parse(&YMD, "19aug2023", &lexicons), vec![2023, 8, 19]);
        assert_eq!(dmy.parse(&YMD, "1948", &lexicons), vec![1948, F_INVALID, F_INVALID]);
        assert_eq!(dmy.parse(&YMD, "may2030", &lexicons), vec![2030, 5, F_INVALID]);
    }

    #[test]
    fn test_parse_mdy_order() {
        let lexicons = month_lexicons();
        let mdy = Format::new("mdy", "{month:m:a} |{day}, |{year}").unwrap();
        assert_eq!(mdy.parse(&YMD, "Aug 19, 2023", &lexicons), vec![2023, 8, 19]);
    }

    #[test]
    fn test_bad_patterns() {
        assert!(Format::new("x", "day month year").is_err());
        assert!(Format::new("x", "{day |{month}").is_err());
    }
}
