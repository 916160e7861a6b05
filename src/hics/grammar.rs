//! Grammars: format and lexicon groupings
//!
//! A grammar collects the formats and lexicons belonging to one
//! calendar family and names its default input and output formats.
//! Formats are registered globally under "grammarcode:formatcode", so
//! the "dmy" format of grammar "g" is the registry entry "g:dmy".

#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub code: String,
    pub name: String,
    /// Codes of the lexicons this grammar's formats may use.
    pub lexicons: Vec<String>,
    /// Unqualified codes of this grammar's formats.
    pub formats: Vec<String>,
    pub input_format: String,
    pub output_format: String,
}

impl Grammar {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into(), ..Default::default() }
    }

    /// Registry key for one of this grammar's formats.
    pub fn format_key(&self, fcode: &str) -> String {
        format!("{}:{}", self.code, fcode)
    }

    pub fn has_format(&self, fcode: &str) -> bool {
        self.formats.iter().any(|f| f == fcode)
    }
}
