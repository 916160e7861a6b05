//! The script evaluator
//!
//! Statements are evaluated directly off the token stream, one token of
//! lookahead, no syntax tree. Control structures work on raw source
//! text: a function body or do-loop body is captured verbatim by the
//! stream and re-lexed on each entry, anchored at its original line so
//! diagnostics stay accurate. A run never fails as a whole; every
//! diagnostic becomes an output line and evaluation resumes at the next
//! semicolon.

use std::rc::Rc;

use crate::field::{fld_add, fld_sub, Field, F_INVALID};
use crate::function::{FunctionDef, ObjectDef};
use crate::hics::base::Base;
use crate::hics::format::Format;
use crate::hics::grammar::Grammar;
use crate::hics::hybrid::HybridBase;
use crate::hics::islamic::IslamicVariant;
use crate::hics::lexicon::Lexicon;
use crate::hics::scheme::Scheme;
use crate::lexer::{Context, TokenStream, MAX_LEX_ERRORS};
use crate::range::Range;
use crate::runtime::Runtime;
use crate::token::TokenKind;
use crate::value::Value;

/// Iteration cutoff for `do ... loop`.
pub const LOOP_MAX: usize = 1000;

type SResult<T> = Result<T, String>;

pub struct Script<'a> {
    rt: &'a mut Runtime,
    ts: TokenStream,
    output: String,
    /// Line the current statement started on, for diagnostics.
    line: usize,
}

impl<'a> Script<'a> {
    pub fn new(rt: &'a mut Runtime, source: &str) -> Self {
        Self { rt, ts: TokenStream::new(source), output: String::new(), line: 1 }
    }

    /// Run the whole script, collecting writes and diagnostics.
    pub fn run(mut self) -> String {
        self.ts.set_context(self.rt.context);
        self.ts.next();
        loop {
            self.drain_lex_errors();
            if self.ts.error_total() > MAX_LEX_ERRORS {
                self.output.push_str("too many errors, aborting run.\n");
                break;
            }
            if self.ts.current().kind == TokenKind::End {
                if self.ts.at_end() {
                    break;
                }
                // Error-recovery end token; resume lexing.
                self.ts.next();
                continue;
            }
            if let Err(msg) = self.statement() {
                self.diagnose(msg);
                self.recover();
            }
        }
        self.drain_lex_errors();
        self.output
    }

    /// Evaluate the source as a single expression.
    pub fn evaluate_expression(mut self) -> Value {
        self.ts.set_context(self.rt.context);
        self.ts.next();
        match self.expr() {
            Ok(v) => v,
            Err(e) => Value::error(e),
        }
    }

    fn diagnose(&mut self, msg: String) {
        self.output.push_str(&format!("line {}: {}\n", self.line, msg));
    }

    fn drain_lex_errors(&mut self) {
        for e in self.ts.take_errors() {
            self.output.push_str(&e);
            self.output.push('\n');
        }
    }

    /// Skip to just past the next semicolon.
    fn recover(&mut self) {
        loop {
            match self.ts.current().kind {
                TokenKind::Semicolon => {
                    self.ts.next();
                    return;
                }
                TokenKind::End => return,
                _ => {
                    self.ts.next();
                }
            }
        }
    }

    // ==== Token helpers ====

    fn expect(&mut self, kind: TokenKind, what: &str) -> SResult<()> {
        if self.ts.current().kind == kind {
            self.ts.next();
            Ok(())
        } else {
            Err(format!("'{}' expected.", what))
        }
    }

    fn expect_semicolon(&mut self) -> SResult<()> {
        self.expect(TokenKind::Semicolon, ";")
    }

    fn take_name(&mut self) -> SResult<String> {
        match &self.ts.current().kind {
            TokenKind::Name(n) => {
                let n = n.clone();
                self.ts.next();
                Ok(n)
            }
            _ => Err("name expected.".to_string()),
        }
    }

    fn take_string(&mut self) -> SResult<String> {
        match &self.ts.current().kind {
            TokenKind::Str(s) => {
                let s = s.clone();
                self.ts.next();
                Ok(s)
            }
            _ => Err("text string expected.".to_string()),
        }
    }

    fn take_number(&mut self) -> SResult<i64> {
        match self.ts.current().kind {
            TokenKind::Number(n) | TokenKind::Field(n) => {
                self.ts.next();
                Ok(n)
            }
            _ => Err("number expected.".to_string()),
        }
    }

    // ==== Statements ====

    /// Evaluate one statement, consuming its trailing semicolon.
    fn statement(&mut self) -> SResult<()> {
        self.line = self.ts.current().line;
        let kind = self.ts.current().kind.clone();
        match kind {
            TokenKind::Semicolon => {
                self.ts.next();
                Ok(())
            }
            TokenKind::Name(name) => match name.as_str() {
                "mark" => self.stmt_mark(),
                "clear" => self.stmt_clear(),
                "if" => self.stmt_if(),
                "do" => self.stmt_do(),
                "set" => self.stmt_set(),
                "let" => self.stmt_let(),
                "write" => self.stmt_write(false),
                "writeln" => self.stmt_write(true),
                "call" => self.stmt_call(),
                "function" => self.stmt_function(false),
                "command" => self.stmt_function(true),
                "object" => self.stmt_object(),
                "file" => self.stmt_file(),
                "lexicon" => self.stmt_lexicon(),
                "grammar" => self.stmt_grammar(),
                "scheme" => self.stmt_scheme(),
                _ => self.stmt_assign(name),
            },
            kind => Err(format!("unexpected '{}'.", kind)),
        }
    }

    fn stmt_mark(&mut self) -> SResult<()> {
        self.ts.next();
        let name = match self.ts.current().kind.clone() {
            TokenKind::Name(n) => n,
            TokenKind::Str(s) => s,
            _ => return Err("mark name expected.".to_string()),
        };
        self.ts.next();
        self.expect_semicolon()?;
        self.rt.add_or_replace_mark(&name);
        Ok(())
    }

    fn stmt_clear(&mut self) -> SResult<()> {
        self.ts.next();
        let name = match self.ts.current().kind.clone() {
            TokenKind::Name(n) => {
                self.ts.next();
                Some(n)
            }
            TokenKind::Str(s) => {
                self.ts.next();
                Some(s)
            }
            _ => None,
        };
        self.expect_semicolon()?;
        let cleared = self.rt.clear_mark(name.as_deref());
        self.ts.set_context(self.rt.context);
        if !cleared {
            // The semicolon is already consumed, so report in place
            // rather than triggering recovery.
            let msg = match name {
                Some(n) => format!("mark \"{}\" not found.", n),
                None => "no mark to clear.".to_string(),
            };
            self.diagnose(msg);
        }
        Ok(())
    }

    fn stmt_if(&mut self) -> SResult<()> {
        self.ts.next();
        loop {
            let cond = self.expr()?;
            match cond.get_bool() {
                Err(e) => {
                    self.skip_branch(false)?;
                    self.ts.next();
                    self.diagnose(e);
                    return Ok(());
                }
                Ok(true) => {
                    let stop = self.run_block(&["elseif", "else", "endif"])?;
                    if stop != "endif" {
                        self.skip_branch(false)?;
                    }
                    self.ts.next();
                    return Ok(());
                }
                Ok(false) => match self.skip_branch(true)?.as_str() {
                    "elseif" => {
                        self.ts.next();
                        continue;
                    }
                    "else" => {
                        let stop = self.run_block(&["endif", "elseif"])?;
                        if stop != "endif" {
                            self.skip_branch(false)?;
                        }
                        self.ts.next();
                        return Ok(());
                    }
                    _ => {
                        self.ts.next();
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Run statements until one of the stop keywords appears at
    /// statement position.
    fn run_block(&mut self, stops: &[&str]) -> SResult<String> {
        loop {
            match &self.ts.current().kind {
                TokenKind::End => {
                    return Err(format!("'{}' expected.", stops.last().unwrap_or(&"end")));
                }
                TokenKind::Name(n) if stops.contains(&n.as_str()) => return Ok(n.clone()),
                _ => {
                    if let Err(msg) = self.statement() {
                        self.diagnose(msg);
                        self.recover();
                    }
                }
            }
        }
    }

    /// Skip a dead branch, tracking nested ifs. When `stop_at_else`,
    /// stop at the first same-level elseif or else as well as at endif.
    fn skip_branch(&mut self, stop_at_else: bool) -> SResult<String> {
        let mut depth = 0usize;
        loop {
            match &self.ts.current().kind {
                TokenKind::End => return Err("'endif' expected.".to_string()),
                TokenKind::At => {
                    // Skip the built-in name so "@if" is not counted.
                    self.ts.next();
                    self.ts.next();
                }
                TokenKind::Name(n) => {
                    let n = n.clone();
                    match n.as_str() {
                        "if" => {
                            depth += 1;
                            self.ts.next();
                        }
                        "endif" if depth == 0 => return Ok(n),
                        "endif" => {
                            depth -= 1;
                            self.ts.next();
                        }
                        "elseif" | "else" if depth == 0 && stop_at_else => return Ok(n),
                        _ => {
                            self.ts.next();
                        }
                    }
                }
                _ => {
                    self.ts.next();
                }
            }
        }
    }

    fn stmt_do(&mut self) -> SResult<()> {
        let body_line = self.ts.current().line;
        let body = self
            .ts
            .read_until("loop", "do")
            .ok_or_else(|| "'loop' expected.".to_string())?;
        let context = self.ts.context();
        for _ in 0..LOOP_MAX {
            let mut body_ts = TokenStream::new_at(&body, body_line);
            body_ts.set_context(context);
            let saved = std::mem::replace(&mut self.ts, body_ts);
            self.ts.next();
            let again = self.run_do_body();
            self.drain_lex_errors();
            self.ts = saved;
            if !again {
                break;
            }
        }
        self.ts.next();
        Ok(())
    }

    /// One pass over a loop body. Returns false when an `until` or
    /// `while` clause (or a condition error) ends the loop.
    fn run_do_body(&mut self) -> bool {
        loop {
            match &self.ts.current().kind {
                TokenKind::End => return true,
                TokenKind::Name(n) if n == "until" || n == "while" => {
                    let until = n == "until";
                    self.line = self.ts.current().line;
                    self.ts.next();
                    let stop = match self.expr().and_then(|v| v.get_bool()) {
                        Ok(b) => {
                            if until {
                                b
                            } else {
                                !b
                            }
                        }
                        Err(msg) => {
                            self.diagnose(msg);
                            true
                        }
                    };
                    if stop {
                        return false;
                    }
                }
                _ => {
                    if let Err(msg) = self.statement() {
                        self.diagnose(msg);
                        self.recover();
                    }
                }
            }
        }
    }

    fn stmt_set(&mut self) -> SResult<()> {
        self.ts.next();
        let property = self.take_name()?;
        match property.as_str() {
            "context" => {
                let context = match self.take_name()?.as_str() {
                    "glich" => Context::Glich,
                    "hics" => Context::Hics,
                    other => return Err(format!("unknown context \"{}\".", other)),
                };
                self.rt.context = context;
                self.ts.set_context(context);
            }
            "input" => {
                let sig = self.take_name()?;
                self.rt.in_sig = Some(sig);
            }
            "output" => {
                let sig = self.take_name()?;
                self.rt.out_sig = Some(sig);
            }
            "inout" => {
                let sig = self.take_name()?;
                self.rt.in_sig = Some(sig.clone());
                self.rt.out_sig = Some(sig);
            }
            other => return Err(format!("unknown property \"{}\".", other)),
        }
        self.expect_semicolon()
    }

    fn stmt_let(&mut self) -> SResult<()> {
        self.ts.next();
        let name = self.take_name()?;
        self.expect(TokenKind::Equal, "=")?;
        let value = self.expr()?;
        self.expect_semicolon()?;
        self.rt.stores.set(name, value);
        Ok(())
    }

    /// Assignment to an existing variable, plain, compound or indexed.
    fn stmt_assign(&mut self, name: String) -> SResult<()> {
        self.ts.next();
        let mut path = Vec::new();
        while self.ts.current().kind == TokenKind::LBracket {
            self.ts.next();
            let index = self.expr()?;
            self.expect(TokenKind::RBracket, "]")?;
            path.push(index);
        }
        let op = match self.ts.current().kind {
            TokenKind::Equal => None,
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash => {
                let op = self.ts.current().kind.clone();
                self.ts.next();
                if self.ts.current().kind != TokenKind::Equal {
                    return Err("'=' expected.".to_string());
                }
                Some(op)
            }
            _ => return Err("'=' expected.".to_string()),
        };
        self.ts.next();
        let rhs = self.expr()?;
        self.expect_semicolon()?;

        let outcome = self
            .resolve_path(&name, &path)
            .and_then(|slots| assign_in_store(self.rt, &name, &slots, op, rhs));
        if let Err(msg) = outcome {
            self.diagnose(msg);
        }
        Ok(())
    }

    /// Turn subscript values into slot indexes. A name resolves through
    /// the object definition named by the type code of the value being
    /// indexed at that step, the same way subscript reads do.
    fn resolve_path(&self, name: &str, path: &[Value]) -> SResult<Vec<usize>> {
        let mut slots = Vec::with_capacity(path.len());
        let mut current = self.rt.stores.get(name);
        for index in path {
            let slot = match index {
                Value::String(slot_name) => {
                    let code = match current {
                        Some(Value::Object(values)) => match values.first() {
                            Some(Value::String(code)) => code.clone(),
                            _ => return Err("object has no type code.".to_string()),
                        },
                        _ => return Err(format!("unknown slot name \"{}\".", slot_name)),
                    };
                    self.rt
                        .get_object(&code)
                        .and_then(|d| d.slot(slot_name))
                        .ok_or_else(|| format!("unknown value \"{}\".", slot_name))?
                }
                v => v
                    .get_number()
                    .map(|n| n as usize)
                    .map_err(|_| "index must be a number.".to_string())?,
            };
            current = match current {
                Some(Value::Object(values)) => values.get(slot),
                _ => None,
            };
            slots.push(slot);
        }
        Ok(slots)
    }

    fn stmt_write(&mut self, newline: bool) -> SResult<()> {
        self.ts.next();
        let mut filecode = None;
        if self.ts.current().kind == TokenKind::Dot {
            self.ts.next();
            filecode = Some(self.take_name()?);
        }
        let mut text = String::new();
        if self.ts.current().kind != TokenKind::Semicolon {
            loop {
                let value = self.expr()?;
                text.push_str(&value.to_string());
                if self.ts.current().kind == TokenKind::Comma {
                    self.ts.next();
                    continue;
                }
                break;
            }
        }
        self.expect_semicolon()?;
        if newline {
            text.push('\n');
        }
        match filecode {
            Some(code) => {
                if let Err(msg) = self.rt.write_file(&code, &text) {
                    self.diagnose(msg);
                }
            }
            None => self.output.push_str(&text),
        }
        Ok(())
    }

    fn stmt_call(&mut self) -> SResult<()> {
        self.ts.next();
        if self.ts.current().kind == TokenKind::At {
            self.ts.next();
        }
        let name = self.take_name()?;
        let args = if self.ts.current().kind == TokenKind::LParen {
            self.parse_args()?
        } else {
            Vec::new()
        };
        self.expect_semicolon()?;
        match self
            .rt
            .get_command(&name)
            .or_else(|| self.rt.get_function(&name))
        {
            Some(def) => {
                self.invoke(def, args, None);
            }
            None => self.diagnose(format!("command \"{}\" not found.", name)),
        }
        Ok(())
    }

    fn stmt_function(&mut self, is_command: bool) -> SResult<()> {
        self.ts.next();
        let def = self.parse_function_def(is_command)?;
        let outcome = if is_command {
            self.rt.create_command(def)
        } else {
            self.rt.create_function(def)
        };
        if let Err(msg) = outcome {
            self.diagnose(msg);
        }
        Ok(())
    }

    /// Parse `name(params) { body }` with the stream positioned at the
    /// name. Parameter defaults evaluate at definition time.
    fn parse_function_def(&mut self, is_command: bool) -> SResult<FunctionDef> {
        let code = self.take_name()?;
        let mut params = Vec::new();
        if self.ts.current().kind == TokenKind::LParen {
            self.ts.next();
            while self.ts.current().kind != TokenKind::RParen {
                let pname = self.take_name()?;
                let default = if self.ts.current().kind == TokenKind::Equal {
                    self.ts.next();
                    self.expr()?
                } else {
                    Value::Null
                };
                params.push((pname, default));
                if self.ts.current().kind == TokenKind::Comma {
                    self.ts.next();
                }
            }
            self.ts.next();
        }
        if self.ts.current().kind != TokenKind::LBrace {
            return Err("'{' expected.".to_string());
        }
        let line = self.ts.current().line;
        let body = self
            .ts
            .read_until("}", "{")
            .ok_or_else(|| "'}' expected.".to_string())?;
        self.ts.next();
        Ok(FunctionDef { code, params, line, body, is_command })
    }

    fn stmt_object(&mut self) -> SResult<()> {
        self.ts.next();
        let code = self.take_name()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut def = ObjectDef::new(code);
        loop {
            match self.ts.current().kind.clone() {
                TokenKind::RBrace => {
                    self.ts.next();
                    break;
                }
                TokenKind::End => return Err("'}' expected.".to_string()),
                TokenKind::Name(n) => match n.as_str() {
                    "values" => {
                        self.ts.next();
                        while let TokenKind::Name(v) = self.ts.current().kind.clone() {
                            def.value_names.push(v);
                            self.ts.next();
                            if self.ts.current().kind == TokenKind::Comma {
                                self.ts.next();
                            }
                        }
                        self.expect_semicolon()?;
                    }
                    "function" => {
                        self.ts.next();
                        let method = self.parse_function_def(false)?;
                        def.methods.insert(method.code.clone(), Rc::new(method));
                    }
                    other => {
                        return Err(format!("unexpected \"{}\" in object block.", other))
                    }
                },
                kind => return Err(format!("unexpected '{}' in object block.", kind)),
            }
        }
        if let Err(msg) = self.rt.create_object(def) {
            self.diagnose(msg);
        }
        Ok(())
    }

    fn stmt_file(&mut self) -> SResult<()> {
        self.ts.next();
        let code = self.take_name()?;
        let path = self.take_string()?;
        let mut append = false;
        if let TokenKind::Name(mode) = self.ts.current().kind.clone() {
            match mode.as_str() {
                "append" => append = true,
                "write" => append = false,
                other => return Err(format!("unknown file mode \"{}\".", other)),
            }
            self.ts.next();
        }
        self.expect_semicolon()?;
        if let Err(msg) = self.rt.create_file(&code, &path, append) {
            self.diagnose(msg);
        }
        Ok(())
    }

    fn stmt_lexicon(&mut self) -> SResult<()> {
        self.ts.next();
        let code = self.take_name()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut lexicon = Lexicon::new(code);
        loop {
            match self.ts.current().kind.clone() {
                TokenKind::RBrace => {
                    self.ts.next();
                    break;
                }
                TokenKind::End => return Err("'}' expected.".to_string()),
                TokenKind::Name(n) => match n.as_str() {
                    "name" => {
                        self.ts.next();
                        lexicon.name = self.take_string()?;
                        self.expect_semicolon()?;
                    }
                    "fieldname" => {
                        self.ts.next();
                        lexicon.fieldname = self.take_name()?;
                        self.expect_semicolon()?;
                    }
                    "tokens" => {
                        self.ts.next();
                        self.expect(TokenKind::LBrace, "{")?;
                        while self.ts.current().kind != TokenKind::RBrace {
                            let value = self.take_number()?;
                            self.expect(TokenKind::Comma, ",")?;
                            let word = self.take_string()?;
                            let abbrev = if self.ts.current().kind == TokenKind::Comma {
                                self.ts.next();
                                Some(self.take_string()?)
                            } else {
                                None
                            };
                            self.expect_semicolon()?;
                            lexicon.add_token(value, word, abbrev);
                        }
                        self.ts.next();
                    }
                    other => {
                        return Err(format!("unexpected \"{}\" in lexicon block.", other))
                    }
                },
                kind => return Err(format!("unexpected '{}' in lexicon block.", kind)),
            }
        }
        if let Err(msg) = self.rt.create_lexicon(lexicon) {
            self.diagnose(msg);
        }
        Ok(())
    }

    fn stmt_grammar(&mut self) -> SResult<()> {
        self.ts.next();
        let code = self.take_name()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut grammar = Grammar::new(code);
        loop {
            match self.ts.current().kind.clone() {
                TokenKind::RBrace => {
                    self.ts.next();
                    break;
                }
                TokenKind::End => return Err("'}' expected.".to_string()),
                TokenKind::Name(n) => match n.as_str() {
                    "name" => {
                        self.ts.next();
                        grammar.name = self.take_string()?;
                        self.expect_semicolon()?;
                    }
                    "lexicons" => {
                        self.ts.next();
                        loop {
                            grammar.lexicons.push(self.take_name()?);
                            if self.ts.current().kind == TokenKind::Comma {
                                self.ts.next();
                                continue;
                            }
                            break;
                        }
                        self.expect_semicolon()?;
                    }
                    "format" => {
                        self.ts.next();
                        let fcode = self.take_name()?;
                        let pattern = self.take_string()?;
                        self.expect_semicolon()?;
                        let outcome = Format::new(fcode.clone(), pattern).and_then(|f| {
                            self.rt.create_format(&grammar.format_key(&fcode), f)
                        });
                        match outcome {
                            Ok(()) => grammar.formats.push(fcode),
                            Err(msg) => self.diagnose(msg),
                        }
                    }
                    "input" => {
                        self.ts.next();
                        grammar.input_format = self.take_name()?;
                        self.expect_semicolon()?;
                    }
                    "output" => {
                        self.ts.next();
                        grammar.output_format = self.take_name()?;
                        self.expect_semicolon()?;
                    }
                    other => {
                        return Err(format!("unexpected \"{}\" in grammar block.", other))
                    }
                },
                kind => return Err(format!("unexpected '{}' in grammar block.", kind)),
            }
        }
        if grammar.input_format.is_empty() {
            grammar.input_format = grammar.formats.first().cloned().unwrap_or_default();
        }
        if grammar.output_format.is_empty() {
            grammar.output_format = grammar.input_format.clone();
        }
        if let Err(msg) = self.rt.create_grammar(grammar) {
            self.diagnose(msg);
        }
        Ok(())
    }

    fn stmt_scheme(&mut self) -> SResult<()> {
        self.ts.next();
        let code = self.take_name()?;
        self.expect(TokenKind::LBrace, "{")?;
        let mut name = String::new();
        let mut grammar = String::new();
        let mut base = None;
        loop {
            match self.ts.current().kind.clone() {
                TokenKind::RBrace => {
                    self.ts.next();
                    break;
                }
                TokenKind::End => return Err("'}' expected.".to_string()),
                TokenKind::Name(n) => match n.as_str() {
                    "name" => {
                        self.ts.next();
                        name = self.take_string()?;
                        self.expect_semicolon()?;
                    }
                    "grammar" => {
                        self.ts.next();
                        grammar = self.take_name()?;
                        self.expect_semicolon()?;
                    }
                    "base" => {
                        self.ts.next();
                        base = Some(self.parse_base()?);
                        self.expect_semicolon()?;
                    }
                    other => {
                        return Err(format!("unexpected \"{}\" in scheme block.", other))
                    }
                },
                kind => return Err(format!("unexpected '{}' in scheme block.", kind)),
            }
        }
        let outcome = match base {
            Some(base) => {
                let mut scheme = Scheme::new(code, base, grammar);
                scheme.name = name;
                self.rt.create_scheme(scheme)
            }
            None => Err("scheme has no base.".to_string()),
        };
        if let Err(msg) = outcome {
            self.diagnose(msg);
        }
        Ok(())
    }

    fn parse_base(&mut self) -> SResult<Base> {
        let kind = self.take_name()?;
        Ok(match kind.as_str() {
            "jdn" => Base::Jdn,
            "julian" => Base::Julian,
            "gregorian" => Base::Gregorian,
            "hebrew" => Base::Hebrew,
            "chinese" => Base::Chinese,
            "french" => Base::French,
            "isoweek" => Base::IsoWeek,
            "ordinal" => Base::IsoOrdinal,
            "jwn" => Base::Jwn,
            "islamic" => {
                let variant = self.take_name()?;
                Base::Islamic(
                    IslamicVariant::from_code(&variant)
                        .ok_or_else(|| format!("unknown tabular variant \"{}\".", variant))?,
                )
            }
            "hybrid" => {
                // Alternating scheme codes and changeover day counts:
                // hybrid j 2299161 g;
                let mut eras = Vec::new();
                let mut start: Field = 0;
                loop {
                    match self.ts.current().kind.clone() {
                        TokenKind::Name(scode) => {
                            self.ts.next();
                            let scheme = self
                                .rt
                                .get_scheme(&scode)
                                .ok_or_else(|| format!("scheme \"{}\" not found.", scode))?;
                            eras.push((start, scheme.base.clone()));
                        }
                        TokenKind::Number(n) | TokenKind::Field(n) => {
                            self.ts.next();
                            start = n;
                        }
                        _ => break,
                    }
                }
                if eras.is_empty() {
                    return Err("hybrid base has no eras.".to_string());
                }
                Base::Hybrid(HybridBase::new(eras))
            }
            other => return Err(format!("unknown base \"{}\".", other)),
        })
    }

    // ==== Invocation ====

    fn parse_args(&mut self) -> SResult<Vec<Value>> {
        self.ts.next();
        let mut args = Vec::new();
        if self.ts.current().kind == TokenKind::RParen {
            self.ts.next();
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            match self.ts.current().kind {
                TokenKind::Comma => {
                    self.ts.next();
                }
                TokenKind::RParen => {
                    self.ts.next();
                    return Ok(args);
                }
                _ => return Err("')' expected.".to_string()),
            }
        }
    }

    /// Run a function, command or method body in a fresh store frame.
    /// The body re-lexes from its stored source, and the caller's stream
    /// is parked for the duration.
    fn invoke(
        &mut self,
        def: Rc<FunctionDef>,
        args: Vec<Value>,
        receiver: Option<(Rc<ObjectDef>, Vec<Value>)>,
    ) -> Value {
        self.rt.stores.push();
        for (i, (pname, default)) in def.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or_else(|| default.clone());
            self.rt.stores.set(pname.clone(), value);
        }
        if let Some((odef, values)) = &receiver {
            for (i, vname) in odef.value_names.iter().enumerate() {
                let value = values.get(i + 1).cloned().unwrap_or(Value::Null);
                self.rt.stores.set(vname.clone(), value);
            }
            self.rt.stores.set("this", Value::Object(values.clone()));
        }
        if !def.is_command {
            self.rt.stores.set("result", Value::Null);
        }

        let mut body_ts = TokenStream::new_at(&def.body, def.line);
        body_ts.set_context(self.ts.context());
        let saved = std::mem::replace(&mut self.ts, body_ts);
        self.ts.next();
        loop {
            if self.ts.current().kind == TokenKind::End {
                if self.ts.at_end() {
                    break;
                }
                self.ts.next();
                continue;
            }
            if let Err(msg) = self.statement() {
                self.diagnose(msg);
                self.recover();
            }
        }
        self.drain_lex_errors();
        let result = if def.is_command {
            Value::Null
        } else {
            self.rt.stores.get("result").cloned().unwrap_or(Value::Null)
        };
        self.rt.stores.pop();
        self.ts = saved;
        result
    }

    fn invoke_method(&mut self, value: Value, name: &str, args: Vec<Value>) -> Value {
        let Value::Object(values) = &value else {
            return Value::error(format!("cannot call a method on {}.", value.type_name()));
        };
        let code = match values.first() {
            Some(Value::String(s)) => s.clone(),
            _ => return Value::error("object has no type code.".to_string()),
        };
        let Some(odef) = self.rt.get_object(&code) else {
            return Value::error(format!("object \"{}\" not found.", code));
        };
        let Some(def) = odef.method(name) else {
            return Value::error(format!("method \"{}:{}\" not found.", code, name));
        };
        let values = values.clone();
        self.invoke(def, args, Some((odef, values)))
    }

    // ==== Expressions ====

    fn expr(&mut self) -> SResult<Value> {
        let mut left = self.compare()?;
        loop {
            match self.ts.current().kind {
                TokenKind::Or => {
                    self.ts.next();
                    let right = self.compare()?;
                    left.logical_or(right);
                }
                TokenKind::And => {
                    self.ts.next();
                    let right = self.compare()?;
                    left.logical_and(right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn compare(&mut self) -> SResult<Value> {
        let mut left = self.combine()?;
        loop {
            let op = match self.ts.current().kind {
                TokenKind::Equal
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::LessEq
                | TokenKind::Greater
                | TokenKind::GreaterEq => self.ts.current().kind.clone(),
                _ => return Ok(left),
            };
            self.ts.next();
            let right = self.combine()?;
            if left.is_error() {
                continue;
            }
            if right.is_error() {
                left = right;
                continue;
            }
            left = match op {
                TokenKind::Equal => bool_value(left.value_eq(&right)),
                TokenKind::NotEqual => bool_value(left.value_eq(&right).map(|b| !b)),
                TokenKind::Less => bool_value(
                    left.value_cmp(&right).map(|o| o == std::cmp::Ordering::Less),
                ),
                TokenKind::LessEq => bool_value(
                    left.value_cmp(&right).map(|o| o != std::cmp::Ordering::Greater),
                ),
                TokenKind::Greater => bool_value(
                    left.value_cmp(&right).map(|o| o == std::cmp::Ordering::Greater),
                ),
                TokenKind::GreaterEq => bool_value(
                    left.value_cmp(&right).map(|o| o != std::cmp::Ordering::Less),
                ),
                _ => unreachable!(),
            };
        }
    }

    fn combine(&mut self) -> SResult<Value> {
        let mut left = self.range_level()?;
        loop {
            match self.ts.current().kind {
                TokenKind::Vline => {
                    self.ts.next();
                    let right = self.range_level()?;
                    left.union(right);
                }
                TokenKind::Ampersand => {
                    self.ts.next();
                    let right = self.range_level()?;
                    left.intersection(right);
                }
                TokenKind::Backslash => {
                    self.ts.next();
                    let right = self.range_level()?;
                    left.rel_complement(right);
                }
                TokenKind::Caret => {
                    self.ts.next();
                    let right = self.range_level()?;
                    left.symmetric(right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn range_level(&mut self) -> SResult<Value> {
        let mut left = self.sum()?;
        while self.ts.current().kind == TokenKind::DotDot {
            self.ts.next();
            let right = self.sum()?;
            left.range_op(right);
        }
        Ok(left)
    }

    fn sum(&mut self) -> SResult<Value> {
        let mut left = self.term()?;
        loop {
            match self.ts.current().kind {
                TokenKind::Plus => {
                    self.ts.next();
                    let right = self.term()?;
                    left.plus(right);
                }
                TokenKind::Minus => {
                    self.ts.next();
                    let right = self.term()?;
                    left.minus(right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn term(&mut self) -> SResult<Value> {
        let mut left = self.unary()?;
        loop {
            match self.ts.current().kind {
                TokenKind::Star => {
                    self.ts.next();
                    let right = self.unary()?;
                    left.multiply(right);
                }
                TokenKind::Slash => {
                    self.ts.next();
                    let right = self.unary()?;
                    left.divide(right);
                }
                TokenKind::Div => {
                    self.ts.next();
                    let right = self.unary()?;
                    left.int_div(right);
                }
                TokenKind::Mod => {
                    self.ts.next();
                    let right = self.unary()?;
                    left.int_mod(right);
                }
                _ => return Ok(left),
            }
        }
    }

    fn unary(&mut self) -> SResult<Value> {
        match self.ts.current().kind {
            TokenKind::Minus => {
                self.ts.next();
                let mut value = self.unary()?;
                value.negate();
                Ok(value)
            }
            TokenKind::Plus => {
                self.ts.next();
                self.unary()
            }
            TokenKind::Not => {
                self.ts.next();
                let mut value = self.unary()?;
                value.logical_not();
                Ok(value)
            }
            TokenKind::Tilde => {
                self.ts.next();
                let mut value = self.unary()?;
                value.complement();
                Ok(value)
            }
            _ => self.postfix(),
        }
    }

    fn postfix(&mut self) -> SResult<Value> {
        let mut value = self.primary()?;
        loop {
            match self.ts.current().kind {
                TokenKind::LBracket => {
                    self.ts.next();
                    if self.ts.current().kind == TokenKind::Dot {
                        self.ts.next();
                        let name = self.take_name()?;
                        let args = if self.ts.current().kind == TokenKind::LParen {
                            self.parse_args()?
                        } else {
                            Vec::new()
                        };
                        self.expect(TokenKind::RBracket, "]")?;
                        value = self.invoke_method(value, &name, args);
                    } else {
                        let index = self.expr()?;
                        self.expect(TokenKind::RBracket, "]")?;
                        value = self.subscript(value, index);
                    }
                }
                TokenKind::Dot => {
                    self.ts.next();
                    let name = self.take_name()?;
                    value = self.property(value, &name);
                }
                _ => return Ok(value),
            }
        }
    }

    fn subscript(&mut self, value: Value, index: Value) -> Value {
        if value.is_error() {
            return value;
        }
        if let Value::Error(e) = index {
            return Value::Error(e);
        }
        match (&value, &index) {
            (Value::Object(values), Value::String(name)) => {
                let code = match values.first() {
                    Some(Value::String(s)) => s.clone(),
                    _ => return Value::error("object has no type code.".to_string()),
                };
                match self.rt.get_object(&code).and_then(|d| d.slot(name)) {
                    Some(slot) => values.get(slot).cloned().unwrap_or(Value::Null),
                    None => Value::error(format!("unknown value \"{}\".", name)),
                }
            }
            (Value::Object(values), _) => match index.get_number() {
                Ok(i) => values.get(i as usize).cloned().unwrap_or_else(|| {
                    Value::error("index out of range.".to_string())
                }),
                Err(e) => Value::Error(e),
            },
            (Value::RangeList(list), _) => match index.get_number() {
                Ok(i) => match list.get(i as usize) {
                    Some(&range) => Value::Range(range).demote(),
                    None => Value::error("index out of range.".to_string()),
                },
                Err(e) => Value::Error(e),
            },
            _ => Value::error(format!("cannot index {}.", value.type_name())),
        }
    }

    /// Built-in properties, plus named object values. Declared value
    /// names shadow the built-ins on object instances.
    fn property(&mut self, value: Value, name: &str) -> Value {
        if value.is_error() {
            return value;
        }
        if let Value::Object(values) = &value {
            let code = match values.first() {
                Some(Value::String(s)) => s.clone(),
                _ => return Value::error("object has no type code.".to_string()),
            };
            if let Some(slot) = self.rt.get_object(&code).and_then(|d| d.slot(name)) {
                return values.get(slot).cloned().unwrap_or(Value::Null);
            }
            return match name {
                "type" => Value::String("object".to_string()),
                "size" => Value::Number(values.len().saturating_sub(1) as i64),
                _ => Value::error(format!("unknown value \"{}\".", name)),
            };
        }
        match name {
            "type" => Value::String(value.type_name().to_string()),
            "size" => match &value {
                Value::String(s) => Value::Number(s.chars().count() as i64),
                Value::RangeList(list) => Value::Number(list.len() as i64),
                Value::Range(_) => Value::Number(1),
                v => Value::error(format!("{} has no size.", v.type_name())),
            },
            "low" => match value.get_low() {
                Ok(f) => Value::Field(f),
                Err(e) => Value::Error(e),
            },
            "high" => match value.get_high() {
                Ok(f) => Value::Field(f),
                Err(e) => Value::Error(e),
            },
            "span" => match (value.get_low(), value.get_high()) {
                (Ok(lo), Ok(hi)) => {
                    if lo == F_INVALID || hi == F_INVALID {
                        Value::Field(F_INVALID)
                    } else {
                        Value::Field(fld_add(fld_sub(hi, lo), 1))
                    }
                }
                (Err(e), _) | (_, Err(e)) => Value::Error(e),
            },
            "envelope" => match (value.get_low(), value.get_high()) {
                (Ok(lo), Ok(hi)) if lo != F_INVALID => {
                    Value::Range(Range::new(lo, hi)).demote()
                }
                (Ok(_), Ok(_)) => Value::Field(F_INVALID),
                (Err(e), _) | (_, Err(e)) => Value::Error(e),
            },
            _ => Value::error(format!("unknown property \"{}\".", name)),
        }
    }

    fn primary(&mut self) -> SResult<Value> {
        let token = self.ts.current().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.ts.next();
                Ok(Value::Number(n))
            }
            TokenKind::Field(f) => {
                self.ts.next();
                Ok(Value::Field(f))
            }
            TokenKind::Float(x) => {
                self.ts.next();
                Ok(Value::Float(x))
            }
            TokenKind::Str(s) => {
                self.ts.next();
                Ok(Value::String(s))
            }
            TokenKind::LParen => {
                self.ts.next();
                let value = self.expr()?;
                self.expect(TokenKind::RParen, ")")?;
                Ok(value)
            }
            TokenKind::LBrace => self.object_literal(),
            TokenKind::At => {
                self.ts.next();
                let name = self.take_name()?;
                self.call_at(&name)
            }
            TokenKind::ErrorCast => {
                self.ts.next();
                let value = self.unary()?;
                Ok(Value::Error(format!("line {}: {}", token.line, value)))
            }
            TokenKind::Name(name) => match name.as_str() {
                "date" | "text" | "record" | "element" => self.cast(&name),
                _ => {
                    self.ts.next();
                    Ok(self
                        .rt
                        .stores
                        .get(&name)
                        .cloned()
                        .unwrap_or_else(|| {
                            Value::error(format!("variable \"{}\" not found.", name))
                        }))
                }
            },
            kind => Err(format!("unexpected '{}' in expression.", kind)),
        }
    }

    /// `{code, value, ...}`: an object instance. Declared slots the
    /// literal leaves out are filled with null.
    fn object_literal(&mut self) -> SResult<Value> {
        self.ts.next();
        let code = match self.ts.current().kind.clone() {
            TokenKind::Name(n) => n,
            TokenKind::Str(s) => s,
            _ => return Err("object code expected.".to_string()),
        };
        self.ts.next();
        let mut values = vec![Value::String(code.clone())];
        while self.ts.current().kind == TokenKind::Comma {
            self.ts.next();
            values.push(self.expr()?);
        }
        self.expect(TokenKind::RBrace, "}")?;
        if let Some(def) = self.rt.get_object(&code) {
            while values.len() < def.value_names.len() + 1 {
                values.push(Value::Null);
            }
        }
        Ok(Value::Object(values))
    }

    /// The `@` built-ins, falling back to user functions.
    fn call_at(&mut self, name: &str) -> SResult<Value> {
        match name {
            "if" => {
                if self.ts.current().kind != TokenKind::LParen {
                    return Err("'(' expected.".to_string());
                }
                let args = self.parse_args()?;
                if args.len() != 3 {
                    return Err("@if needs three arguments.".to_string());
                }
                let mut args = args;
                let alt = args.pop().expect("checked length");
                let main = args.pop().expect("checked length");
                let cond = args.pop().expect("checked length");
                if cond.is_error() {
                    return Ok(cond);
                }
                Ok(match cond.get_bool() {
                    Ok(true) => main,
                    Ok(false) => alt,
                    Err(e) => Value::Error(e),
                })
            }
            "read" => {
                let args = if self.ts.current().kind == TokenKind::LParen {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                let prompt = match args.first() {
                    Some(Value::String(s)) => s.clone(),
                    _ => String::new(),
                };
                Ok(match self.rt.read_input(&prompt) {
                    Ok(text) => Value::String(text),
                    Err(e) => Value::error(e.to_string()),
                })
            }
            _ => {
                let args = if self.ts.current().kind == TokenKind::LParen {
                    self.parse_args()?
                } else {
                    Vec::new()
                };
                let Some(def) = self
                    .rt
                    .get_function(name)
                    .or_else(|| self.rt.get_command(name))
                else {
                    return Ok(Value::error(format!("function \"{}\" not found.", name)));
                };
                Ok(self.invoke(def, args, None))
            }
        }
    }

    // ==== Casts ====

    /// `date`, `text`, `record` or `element`, with an optional dotted
    /// signature: `date.g:dmy "19aug2023"`.
    fn cast(&mut self, kind: &str) -> SResult<Value> {
        self.ts.next();
        let mut sig = None;
        if self.ts.current().kind == TokenKind::Dot {
            self.ts.next();
            sig = Some(self.take_name()?);
        }
        let operand = self.unary()?;
        Ok(match kind {
            "date" => self.cast_date(sig, operand),
            "text" => self.cast_text(sig, operand),
            "record" => self.cast_record(sig, operand),
            "element" => self.cast_element(sig, operand),
            _ => unreachable!(),
        })
    }

    fn input_sig(&self, sig: Option<String>) -> Result<String, Value> {
        sig.or_else(|| self.rt.in_sig.clone())
            .ok_or_else(|| Value::error("no input scheme set."))
    }

    fn output_sig(&self, sig: Option<String>) -> Result<String, Value> {
        sig.or_else(|| self.rt.out_sig.clone())
            .ok_or_else(|| Value::error("no output scheme set."))
    }

    fn cast_date(&mut self, sig: Option<String>, value: Value) -> Value {
        if value.is_error() {
            return value;
        }
        match value {
            Value::String(text) => {
                let sig = match self.input_sig(sig) {
                    Ok(s) => s,
                    Err(e) => return e,
                };
                let (scheme, fcode) = match self.rt.resolve_sig(&sig) {
                    Ok(r) => r,
                    Err(e) => return Value::error(e),
                };
                let ctx = self.rt.text_context();
                match scheme.text_to_rlist(&ctx, &text, fcode.as_deref()) {
                    Ok(rlist) => Value::RangeList(rlist).demote(),
                    Err(e) => Value::error(e),
                }
            }
            Value::Object(values) => {
                // A record converts through its own scheme code.
                let code = match values.first() {
                    Some(Value::String(s)) => s.clone(),
                    _ => return Value::error("record has no scheme code.".to_string()),
                };
                let Some(scheme) = self.rt.get_scheme(&code) else {
                    return Value::error(format!("scheme \"{}\" not found.", code));
                };
                let fields = record_fields(&values);
                let range = scheme.base.complete_range(&fields);
                if range.is_invalid() {
                    Value::error("invalid date.".to_string())
                } else {
                    Value::Range(range).demote()
                }
            }
            v @ (Value::Field(_) | Value::Range(_) | Value::RangeList(_)) => v,
            Value::Number(n) => Value::Field(n),
            v => Value::error(format!("cannot cast {} to date.", v.type_name())),
        }
    }

    fn cast_text(&mut self, sig: Option<String>, value: Value) -> Value {
        if value.is_error() {
            return value;
        }
        if let Value::String(_) = value {
            return value;
        }
        let sig = match &value {
            // A record names its own scheme; the signature may still
            // pick the format.
            Value::Object(values) => match values.first() {
                Some(Value::String(code)) => match sig {
                    Some(s) if s.contains(':') => s,
                    Some(s) => format!("{}:{}", code, s),
                    None => code.clone(),
                },
                _ => return Value::error("record has no scheme code.".to_string()),
            },
            _ => match self.output_sig(sig) {
                Ok(s) => s,
                Err(e) => return e,
            },
        };
        let (scheme, fcode) = match self.rt.resolve_sig(&sig) {
            Ok(r) => r,
            Err(e) => return Value::error(e),
        };
        let ctx = self.rt.text_context();
        let fcode = fcode.as_deref();
        let result = match &value {
            Value::Field(f) => scheme.jdn_to_text(&ctx, *f, fcode),
            Value::Number(n) => scheme.jdn_to_text(&ctx, *n, fcode),
            Value::Range(r) => scheme.range_to_text(&ctx, *r, fcode),
            Value::RangeList(list) => scheme.rlist_to_text(&ctx, list, fcode),
            Value::Object(values) => {
                scheme.fields_to_text(&ctx, &record_fields(values), fcode)
            }
            v => Err(format!("cannot cast {} to text.", v.type_name())),
        };
        match result {
            Ok(text) => Value::String(text),
            Err(e) => Value::error(e),
        }
    }

    fn cast_record(&mut self, sig: Option<String>, value: Value) -> Value {
        if value.is_error() {
            return value;
        }
        if let Value::Object(_) = value {
            return value;
        }
        let sig = match self.input_sig(sig) {
            Ok(s) => s,
            Err(e) => return e,
        };
        let (scheme, fcode) = match self.rt.resolve_sig(&sig) {
            Ok(r) => r,
            Err(e) => return Value::error(e),
        };
        let fields = match &value {
            Value::String(text) => {
                let ctx = self.rt.text_context();
                match scheme.text_to_fields(&ctx, text, fcode.as_deref()) {
                    Ok(fields) => fields,
                    Err(e) => return Value::error(e),
                }
            }
            Value::Field(f) => scheme.base.get_fields(*f),
            Value::Number(n) => scheme.base.get_fields(*n),
            Value::Range(r) => scheme.base.get_fields(r.beg),
            v => return Value::error(format!("cannot cast {} to record.", v.type_name())),
        };
        let mut values = vec![Value::String(scheme.code.clone())];
        values.extend(fields.into_iter().map(Value::Field));
        Value::Object(values)
    }

    /// `element.m 8` renders through a lexicon; `element.m "August"`
    /// looks the word up. A `:a` suffix selects abbreviations.
    fn cast_element(&mut self, sig: Option<String>, value: Value) -> Value {
        if value.is_error() {
            return value;
        }
        let Some(sig) = sig else {
            return Value::error("element cast needs a lexicon.".to_string());
        };
        let (code, abbrev) = match sig.split_once(':') {
            Some((c, "a")) => (c.to_string(), true),
            Some((c, _)) => (c.to_string(), false),
            None => (sig, false),
        };
        let Some(lexicon) = self.rt.get_lexicon(&code) else {
            return Value::error(format!("lexicon \"{}\" not found.", code));
        };
        match value {
            Value::String(word) => match lexicon.lookup(&word) {
                Some(f) => Value::Field(f),
                None => Value::error(format!("\"{}\" not in lexicon \"{}\".", word, code)),
            },
            v => match v.get_field() {
                Ok(f) => match lexicon.get_word(f, abbrev) {
                    Some(word) => Value::String(word.to_string()),
                    None => Value::error(format!("{} not in lexicon \"{}\".", f, code)),
                },
                Err(e) => Value::Error(e),
            },
        }
    }
}

fn bool_value(result: Result<bool, String>) -> Value {
    match result {
        Ok(b) => Value::Bool(b),
        Err(e) => Value::Error(e),
    }
}

/// Field tuple from a record's value slots; null slots stay unset.
fn record_fields(values: &[Value]) -> Vec<Field> {
    values[1..]
        .iter()
        .map(|v| v.get_field().unwrap_or(F_INVALID))
        .collect()
}

fn assign_in_store(
    rt: &mut Runtime,
    name: &str,
    path: &[usize],
    op: Option<TokenKind>,
    rhs: Value,
) -> SResult<()> {
    let target = rt
        .stores
        .get_mut(name)
        .ok_or_else(|| format!("variable \"{}\" not found.", name))?;
    let target = navigate(target, path)?;
    match op {
        None => *target = rhs,
        Some(TokenKind::Plus) => target.plus(rhs),
        Some(TokenKind::Minus) => target.minus(rhs),
        Some(TokenKind::Star) => target.multiply(rhs),
        Some(TokenKind::Slash) => target.divide(rhs),
        Some(_) => unreachable!(),
    }
    Ok(())
}

fn navigate<'v>(mut value: &'v mut Value, path: &[usize]) -> SResult<&'v mut Value> {
    for &index in path {
        value = match value {
            Value::Object(values) => values
                .get_mut(index)
                .ok_or_else(|| "index out of range.".to_string())?,
            v => return Err(format!("cannot index {}.", v.type_name())),
        };
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::F_MAXIMUM;

    fn run(source: &str) -> String {
        let mut rt = Runtime::new();
        rt.run_script(source)
    }

    fn eval(source: &str) -> Value {
        let mut rt = Runtime::new();
        rt.evaluate(source)
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(eval("2 + 3 * 4"), Value::Number(14));
        assert_eq!(eval("(2 + 3) * 4"), Value::Number(20));
        assert_eq!(eval("10 div 3"), Value::Number(3));
        assert_eq!(eval("-7 mod 3"), Value::Number(2));
        assert_eq!(eval("1 / 2"), Value::Float(0.5));
    }

    #[test]
    fn test_write_and_writeln() {
        assert_eq!(run("write 1 + 1;"), "2");
        assert_eq!(run("writeln \"a\"; writeln \"b\";"), "a\nb\n");
        assert_eq!(run("write \"x = \", 5;"), "x = 5");
    }

    #[test]
    fn test_let_and_assignment() {
        assert_eq!(run("let x = 3; x = x + 1; write x;"), "4");
        assert_eq!(run("let x = 3; x += 4; write x;"), "7");
        assert_eq!(
            run("x = 1;"),
            "line 1: variable \"x\" not found.\n"
        );
    }

    #[test]
    fn test_if_elseif_else() {
        let script = "let x = 2;
            if x = 1 write \"one\"; elseif x = 2 write \"two\"; else write \"many\"; endif";
        assert_eq!(run(script), "two");
        assert_eq!(run("if false write \"no\"; endif write \"after\";"), "after");
    }

    #[test]
    fn test_if_skips_at_functions() {
        // The name after @ must not be mistaken for a nested if.
        assert_eq!(
            run("if false write @if(true, 1, 2); endif write \"ok\";"),
            "ok"
        );
    }

    #[test]
    fn test_do_until() {
        let script = "let i = 0; do i = i + 1; until i = 5; loop write i;";
        assert_eq!(run(script), "5");
    }

    #[test]
    fn test_do_while() {
        let script = "let i = 0; do while i < 3; i = i + 1; loop write i;";
        assert_eq!(run(script), "3");
    }

    #[test]
    fn test_loop_cutoff() {
        // A loop that never ends stops silently at the iteration cap.
        let script = "let i = 0; do i = i + 1; loop write i;";
        assert_eq!(run(script), LOOP_MAX.to_string());
    }

    #[test]
    fn test_function_call() {
        let script = "function double(x) { result = x * 2; } write @double(21);";
        assert_eq!(run(script), "42");
    }

    #[test]
    fn test_function_default_argument() {
        let script = "function greet(name = \"world\") { result = \"hello \" + name; }
            write @greet(), \"|\", @greet(\"moon\");";
        assert_eq!(run(script), "hello world|hello moon");
    }

    #[test]
    fn test_function_scope_is_flat() {
        // The body must not see the caller's variables.
        let script = "let x = 1; function f { result = x; } write @f();";
        assert_eq!(run(script), "Error: variable \"x\" not found.");
    }

    #[test]
    fn test_command_call() {
        let script = "command hello { writeln \"hi\"; } call hello;";
        assert_eq!(run(script), "hi\n");
    }

    #[test]
    fn test_object_values_and_methods() {
        let script = "object pair {
                values low high;
                function sum { result = low + high; }
            }
            let p = {pair, 3, 4};
            write p[.sum], \" \", p.low, \" \", p[2];";
        assert_eq!(run(script), "7 3 4");
    }

    #[test]
    fn test_at_if_is_eager_and_strict() {
        assert_eq!(eval("@if(1 < 2, \"y\", \"n\")"), Value::String("y".to_string()));
        assert!(eval("@if(1, 2, 3)").is_error());
    }

    #[test]
    fn test_error_cast_carries_line() {
        let out = run("write error \"oops\";");
        assert_eq!(out, "Error: line 1: oops");
    }

    #[test]
    fn test_error_recovery_resumes() {
        let out = run("write unknown_name; writeln \" and on\";");
        assert_eq!(out, "Error: variable \"unknown_name\" not found. and on\n");
    }

    #[test]
    fn test_mark_and_clear_in_script() {
        let script = "mark m1;
            function f { result = 1; }
            clear m1;
            write @f();";
        assert_eq!(run(script), "Error: function \"f\" not found.");
    }

    #[test]
    fn test_set_context_changes_literals() {
        assert_eq!(run("set context hics; write 5 + future;"), "+infinity");
        assert_eq!(eval("future"), Value::Field(F_MAXIMUM));
    }

    #[test]
    fn test_range_and_set_operators() {
        assert_eq!(eval("5 .. 2"), Value::Range(Range::new(2, 5)));
        assert_eq!(eval("(1..5 & 3..9)"), Value::Range(Range::new(3, 5)));
        assert_eq!(eval("(1..5 | 6..9).size"), Value::Number(1));
    }

    #[test]
    fn test_properties() {
        assert_eq!(eval("(2..7).span"), Value::Field(6));
        assert_eq!(eval("(2..7).low"), Value::Field(2));
        assert_eq!(eval("\"abc\".size"), Value::Number(3));
        assert_eq!(eval("(1..2 | 9..9).envelope"), Value::Range(Range::new(1, 9)));
        assert_eq!(eval("true.type"), Value::String("bool".to_string()));
    }
}
