//! Lexicons: token name tables
//!
//! A lexicon maps field values to words and back, such as month or
//! weekday names. Each entry carries a full word and an optional
//! abbreviation; lookup is case-insensitive and accepts either form.

use crate::field::Field;

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub code: String,
    pub name: String,
    /// The field this lexicon names values of, e.g. "month".
    pub fieldname: String,
    tokens: Vec<(Field, String, Option<String>)>,
}

impl Lexicon {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into(), ..Default::default() }
    }

    pub fn add_token(&mut self, value: Field, word: impl Into<String>, abbrev: Option<String>) {
        self.tokens.push((value, word.into(), abbrev));
    }

    /// Find the value named by a word, matching the full word or the
    /// abbreviation without regard to case.
    pub fn lookup(&self, word: &str) -> Option<Field> {
        let lower = word.to_ascii_lowercase();
        self.tokens
            .iter()
            .find(|(_, w, a)| {
                w.to_ascii_lowercase() == lower
                    || a.as_ref().is_some_and(|a| a.to_ascii_lowercase() == lower)
            })
            .map(|&(value, _, _)| value)
    }

    /// The word for a value; the abbreviation when asked and present.
    pub fn get_word(&self, value: Field, abbrev: bool) -> Option<&str> {
        self.tokens.iter().find(|&&(v, _, _)| v == value).map(|(_, w, a)| {
            if abbrev {
                a.as_deref().unwrap_or(w.as_str())
            } else {
                w.as_str()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months() -> Lexicon {
        let mut lex = Lexicon::new("m");
        lex.fieldname = "month".to_string();
        lex.add_token(1, "January", Some("Jan".to_string()));
        lex.add_token(8, "August", Some("Aug".to_string()));
        lex
    }

    #[test]
    fn test_lookup_either_form() {
        let lex = months();
        assert_eq!(lex.lookup("August"), Some(8));
        assert_eq!(lex.lookup("aug"), Some(8));
        assert_eq!(lex.lookup("AUGUST"), Some(8));
        assert_eq!(lex.lookup("sep"), None);
    }

    #[test]
    fn test_word_selection() {
        let lex = months();
        assert_eq!(lex.get_word(8, false), Some("August"));
        assert_eq!(lex.get_word(8, true), Some("Aug"));
        assert_eq!(lex.get_word(3, true), None);
    }
}
