//! The Glich runtime
//!
//! Owns the variable store stack, the registries of user-defined
//! functions, commands, objects, files and calendar definitions, and
//! the mark stack that scopes their lifetimes. One runtime instance is
//! single-owner: scripts execute against it sequentially and every
//! conversion receives the registries it needs as explicit arguments.

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::rc::Rc;

use chrono::Datelike;

use crate::error::{GlichError, Result};
use crate::field::Field;
use crate::function::{FunctionDef, ObjectDef};
use crate::hics;
use crate::hics::format::{Format, LexiconMap};
use crate::hics::grammar::Grammar;
use crate::hics::julian::gregorian_to_jdn;
use crate::hics::lexicon::Lexicon;
use crate::hics::scheme::{Scheme, TextContext};
use crate::lexer::Context;
use crate::mark::{Mark, RegistryKind};
use crate::script::Script;
use crate::store::StoreStack;
use crate::value::Value;

/// Callback supplying text for the `@read` built-in.
pub type ReadHook = Box<dyn FnMut(&str) -> String>;

/// An open output file declared by a `file` statement.
pub struct FileDef {
    pub code: String,
    pub path: String,
    file: std::fs::File,
}

pub struct Runtime {
    pub stores: StoreStack,
    pub context: Context,
    /// Default signature for date and record casts, "scheme:format".
    pub in_sig: Option<String>,
    /// Default signature for text casts.
    pub out_sig: Option<String>,
    functions: HashMap<String, Rc<FunctionDef>>,
    commands: HashMap<String, Rc<FunctionDef>>,
    objects: HashMap<String, Rc<ObjectDef>>,
    files: HashMap<String, FileDef>,
    lexicons: LexiconMap,
    formats: HashMap<String, Rc<Format>>,
    grammars: HashMap<String, Rc<Grammar>>,
    schemes: HashMap<String, Rc<Scheme>>,
    marks: Vec<Mark>,
    read_hook: Option<ReadHook>,
}

impl Runtime {
    pub fn new() -> Self {
        let mut rt = Self {
            stores: StoreStack::new(),
            context: Context::Glich,
            in_sig: None,
            out_sig: None,
            functions: HashMap::new(),
            commands: HashMap::new(),
            objects: HashMap::new(),
            files: HashMap::new(),
            lexicons: LexiconMap::new(),
            formats: HashMap::new(),
            grammars: HashMap::new(),
            schemes: HashMap::new(),
            marks: vec![Mark::new("", Context::Glich, None, None)],
            read_hook: None,
        };
        rt.define_constants();
        rt
    }

    pub fn with_input(hook: ReadHook) -> Self {
        let mut rt = Self::new();
        rt.read_hook = Some(hook);
        rt
    }

    fn define_constants(&mut self) {
        use crate::field::{F_MAXIMUM, F_MINIMUM};
        let today = today_jdn();
        let constants = self.stores.constants_mut();
        constants.set("true", Value::Bool(true));
        constants.set("false", Value::Bool(false));
        constants.set("null", Value::Null);
        constants.set("empty", Value::RangeList(Vec::new()));
        constants.set("today", Value::Field(today));
        constants.set("past", Value::Field(F_MINIMUM));
        constants.set("future", Value::Field(F_MAXIMUM));
        constants.set("infinity", Value::Float(f64::INFINITY));
        constants.set("inf", Value::Float(f64::INFINITY));
        constants.set("nan", Value::Float(f64::NAN));
    }

    /// Run a script, returning everything it wrote, diagnostics
    /// included. Never fails: errors become output lines.
    pub fn run_script(&mut self, source: &str) -> String {
        Script::new(self, source).run()
    }

    /// Evaluate a single expression to a value.
    pub fn evaluate(&mut self, expression: &str) -> Value {
        Script::new(self, expression).evaluate_expression()
    }

    /// Load the bundled calendar library: lexicons, grammars and the
    /// standard schemes, defined under the bottom mark so `clear` never
    /// removes them.
    pub fn load_hics_library(&mut self) -> String {
        let out = self.run_script(hics::HICS_LIBRARY);
        debug_assert!(out.is_empty(), "library load diagnostics: {}", out);
        self.in_sig = Some("g".to_string());
        self.out_sig = Some("g".to_string());
        out
    }

    /// Text registries bundle for the scheme conversion calls.
    pub fn text_context(&self) -> TextContext<'_> {
        TextContext {
            lexicons: &self.lexicons,
            formats: &self.formats,
            grammars: &self.grammars,
        }
    }

    pub fn read_input(&mut self, prompt: &str) -> Result<String> {
        match &mut self.read_hook {
            Some(hook) => Ok(hook(prompt)),
            None => Err(GlichError::NoInputHook),
        }
    }

    // ==== Registries ====

    fn record(&mut self, kind: RegistryKind, code: &str) {
        self.marks
            .last_mut()
            .expect("mark stack is never empty")
            .record(kind, code);
    }

    pub fn create_function(&mut self, def: FunctionDef) -> std::result::Result<(), String> {
        if self.functions.contains_key(&def.code) {
            return Err(format!("function \"{}\" already exists.", def.code));
        }
        self.record(RegistryKind::Function, &def.code);
        self.functions.insert(def.code.clone(), Rc::new(def));
        Ok(())
    }

    pub fn get_function(&self, code: &str) -> Option<Rc<FunctionDef>> {
        self.functions.get(code).cloned()
    }

    pub fn create_command(&mut self, def: FunctionDef) -> std::result::Result<(), String> {
        if self.commands.contains_key(&def.code) {
            return Err(format!("command \"{}\" already exists.", def.code));
        }
        self.record(RegistryKind::Command, &def.code);
        self.commands.insert(def.code.clone(), Rc::new(def));
        Ok(())
    }

    pub fn get_command(&self, code: &str) -> Option<Rc<FunctionDef>> {
        self.commands.get(code).cloned()
    }

    pub fn create_object(&mut self, def: ObjectDef) -> std::result::Result<(), String> {
        if self.objects.contains_key(&def.code) {
            return Err(format!("object \"{}\" already exists.", def.code));
        }
        self.record(RegistryKind::Object, &def.code);
        self.objects.insert(def.code.clone(), Rc::new(def));
        Ok(())
    }

    pub fn get_object(&self, code: &str) -> Option<Rc<ObjectDef>> {
        self.objects.get(code).cloned()
    }

    pub fn create_file(
        &mut self,
        code: &str,
        path: &str,
        append: bool,
    ) -> std::result::Result<(), String> {
        if self.files.contains_key(code) {
            return Err(format!("file \"{}\" already exists.", code));
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|source| GlichError::FileOpen { path: path.to_string(), source })
            .map_err(|e| e.to_string())?;
        self.record(RegistryKind::File, code);
        self.files.insert(
            code.to_string(),
            FileDef { code: code.to_string(), path: path.to_string(), file },
        );
        Ok(())
    }

    pub fn write_file(&mut self, code: &str, text: &str) -> std::result::Result<(), String> {
        let def = self
            .files
            .get_mut(code)
            .ok_or_else(|| format!("file \"{}\" not found.", code))?;
        def.file
            .write_all(text.as_bytes())
            .map_err(|source| GlichError::FileWrite { path: def.path.clone(), source })
            .map_err(|e| e.to_string())
    }

    pub fn create_lexicon(&mut self, lexicon: Lexicon) -> std::result::Result<(), String> {
        if self.lexicons.contains_key(&lexicon.code) {
            return Err(format!("lexicon \"{}\" already exists.", lexicon.code));
        }
        self.record(RegistryKind::Lexicon, &lexicon.code);
        self.lexicons.insert(lexicon.code.clone(), Rc::new(lexicon));
        Ok(())
    }

    pub fn get_lexicon(&self, code: &str) -> Option<Rc<Lexicon>> {
        self.lexicons.get(code).cloned()
    }

    pub fn create_grammar(&mut self, grammar: Grammar) -> std::result::Result<(), String> {
        if self.grammars.contains_key(&grammar.code) {
            return Err(format!("grammar \"{}\" already exists.", grammar.code));
        }
        self.record(RegistryKind::Grammar, &grammar.code);
        self.grammars.insert(grammar.code.clone(), Rc::new(grammar));
        Ok(())
    }

    pub fn get_grammar(&self, code: &str) -> Option<Rc<Grammar>> {
        self.grammars.get(code).cloned()
    }

    /// Formats are registered under "grammarcode:formatcode".
    pub fn create_format(&mut self, key: &str, format: Format) -> std::result::Result<(), String> {
        if self.formats.contains_key(key) {
            return Err(format!("format \"{}\" already exists.", key));
        }
        self.record(RegistryKind::Format, key);
        self.formats.insert(key.to_string(), Rc::new(format));
        Ok(())
    }

    pub fn create_scheme(&mut self, scheme: Scheme) -> std::result::Result<(), String> {
        if self.schemes.contains_key(&scheme.code) {
            return Err(format!("scheme \"{}\" already exists.", scheme.code));
        }
        self.record(RegistryKind::Scheme, &scheme.code);
        self.schemes.insert(scheme.code.clone(), Rc::new(scheme));
        Ok(())
    }

    pub fn get_scheme(&self, code: &str) -> Option<Rc<Scheme>> {
        self.schemes.get(code).cloned()
    }

    /// Split a cast signature "scheme:format" into the scheme and the
    /// optional format code.
    pub fn resolve_sig(
        &self,
        sig: &str,
    ) -> std::result::Result<(Rc<Scheme>, Option<String>), String> {
        let (scode, fcode) = match sig.split_once(':') {
            Some((s, f)) => (s, Some(f.to_string())),
            None => (sig, None),
        };
        let scheme = self
            .get_scheme(scode)
            .ok_or_else(|| format!("scheme \"{}\" not found.", scode))?;
        Ok((scheme, fcode))
    }

    // ==== Marks ====

    /// Push a named checkpoint, first clearing any earlier mark with
    /// the same name.
    pub fn add_or_replace_mark(&mut self, name: &str) {
        if !name.is_empty() {
            self.clear_mark(Some(name));
        }
        self.marks
            .push(Mark::new(name, self.context, self.in_sig.clone(), self.out_sig.clone()));
    }

    /// Pop marks down to and including the first named match, erasing
    /// every registry entry each popped mark recorded. A bare `clear`
    /// pops the top mark. The bottom mark is never cleared. Returns
    /// false if the named mark does not exist.
    pub fn clear_mark(&mut self, name: Option<&str>) -> bool {
        let target = match name {
            Some(n) => match self.marks.iter().rposition(|m| m.name == n && !m.name.is_empty()) {
                Some(i) => i,
                None => return false,
            },
            None => {
                if self.marks.len() < 2 {
                    return false;
                }
                self.marks.len() - 1
            }
        };
        if target == 0 {
            return false;
        }
        while self.marks.len() > target {
            let mut mark = self.marks.pop().expect("mark stack is never empty");
            for (kind, code) in mark.drain_created() {
                self.erase(kind, &code);
            }
            self.context = mark.context;
            self.in_sig = mark.in_sig.take();
            self.out_sig = mark.out_sig.take();
        }
        true
    }

    fn erase(&mut self, kind: RegistryKind, code: &str) {
        match kind {
            RegistryKind::Function => {
                self.functions.remove(code);
            }
            RegistryKind::Command => {
                self.commands.remove(code);
            }
            RegistryKind::Object => {
                self.objects.remove(code);
            }
            RegistryKind::File => {
                self.files.remove(code);
            }
            RegistryKind::Lexicon => {
                self.lexicons.remove(code);
            }
            RegistryKind::Grammar => {
                self.grammars.remove(code);
            }
            RegistryKind::Format => {
                self.formats.remove(code);
            }
            RegistryKind::Scheme => {
                self.schemes.remove(code);
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Today's day count, from the host clock as a UTC date.
pub fn today_jdn() -> Field {
    let date = chrono::Utc::now().date_naive();
    gregorian_to_jdn(date.year() as Field, date.month() as Field, date.day() as Field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn function(code: &str) -> FunctionDef {
        FunctionDef {
            code: code.to_string(),
            params: Vec::new(),
            line: 1,
            body: String::new(),
            is_command: false,
        }
    }

    #[test]
    fn test_duplicate_definition_errors() {
        let mut rt = Runtime::new();
        rt.create_function(function("f")).unwrap();
        assert_eq!(
            rt.create_function(function("f")),
            Err("function \"f\" already exists.".to_string())
        );
    }

    #[test]
    fn test_mark_rollback() {
        let mut rt = Runtime::new();
        rt.add_or_replace_mark("x");
        rt.create_function(function("f")).unwrap();
        rt.add_or_replace_mark("y");
        rt.create_function(function("g")).unwrap();
        assert!(rt.clear_mark(Some("x")));
        // Clearing "x" also removes the later mark "y" and its entries.
        assert!(rt.get_function("f").is_none());
        assert!(rt.get_function("g").is_none());
        assert!(!rt.clear_mark(Some("x")));
    }

    #[test]
    fn test_bottom_mark_protected() {
        let mut rt = Runtime::new();
        rt.create_function(function("f")).unwrap();
        assert!(!rt.clear_mark(None));
        assert!(rt.get_function("f").is_some());
    }

    #[test]
    fn test_replacing_mark_clears_predecessor() {
        let mut rt = Runtime::new();
        rt.add_or_replace_mark("x");
        rt.create_function(function("f")).unwrap();
        rt.add_or_replace_mark("x");
        assert!(rt.get_function("f").is_none());
    }

    #[test]
    fn test_mark_restores_context() {
        let mut rt = Runtime::new();
        rt.add_or_replace_mark("x");
        rt.context = Context::Hics;
        rt.clear_mark(Some("x"));
        assert_eq!(rt.context, Context::Glich);
    }
}
