//! User-definable functions, commands and objects
//!
//! A function or command owns the raw source text of its body, not a
//! parsed structure: invocation re-lexes the body against a fresh token
//! stream anchored at the stored line number. A function sets an
//! implicit `result` variable and returns it; a command does not.

use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A script function or command definition
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Registry code name
    pub code: String,
    /// Ordered (parameter name, default value) pairs
    pub params: Vec<(String, Value)>,
    /// Line the body starts on in its defining script
    pub line: usize,
    /// Raw body source text
    pub body: String,
    /// Commands run for effect only and return no value
    pub is_command: bool,
}

/// A script-level user type: named value slots plus methods.
/// Slot 0 of every instance holds the type code string.
#[derive(Debug, Clone, Default)]
pub struct ObjectDef {
    pub code: String,
    /// Declared value names, slot index is position + 1
    pub value_names: Vec<String>,
    pub methods: HashMap<String, Rc<FunctionDef>>,
}

impl ObjectDef {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            value_names: Vec::new(),
            methods: HashMap::new(),
        }
    }

    /// 1-based slot index for a declared value name.
    pub fn slot(&self, name: &str) -> Option<usize> {
        self.value_names.iter().position(|n| n == name).map(|i| i + 1)
    }

    pub fn method(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.methods.get(name).cloned()
    }

    /// A new instance with every declared slot set to null.
    pub fn blank_instance(&self) -> Vec<Value> {
        let mut vals = vec![Value::String(self.code.clone())];
        vals.extend(std::iter::repeat(Value::Null).take(self.value_names.len()));
        vals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indexing() {
        let mut def = ObjectDef::new("pair");
        def.value_names = vec!["low".to_string(), "high".to_string()];
        assert_eq!(def.slot("low"), Some(1));
        assert_eq!(def.slot("high"), Some(2));
        assert_eq!(def.slot("other"), None);
    }

    #[test]
    fn test_blank_instance() {
        let mut def = ObjectDef::new("pair");
        def.value_names = vec!["low".to_string(), "high".to_string()];
        let inst = def.blank_instance();
        assert_eq!(inst.len(), 3);
        assert_eq!(inst[0], Value::String("pair".to_string()));
        assert_eq!(inst[1], Value::Null);
    }
}
