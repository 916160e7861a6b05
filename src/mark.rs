//! Mark checkpoints for registry rollback
//!
//! A mark is a named checkpoint on a stack. It records the code of
//! every registry entry created while it was the top mark, along with
//! the context and default signatures in effect when it was pushed.
//! Clearing a mark pops the stack down to and including the first match
//! and erases everything each popped mark recorded.

use crate::lexer::Context;

/// Kinds of registry entry a mark can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    Function,
    Command,
    Object,
    File,
    Lexicon,
    Grammar,
    Format,
    Scheme,
}

/// A named checkpoint in registry creation history
#[derive(Debug, Clone)]
pub struct Mark {
    pub name: String,
    /// Context in effect when the mark was pushed, restored on clear.
    pub context: Context,
    pub in_sig: Option<String>,
    pub out_sig: Option<String>,
    /// Entries created since this mark, in creation order.
    created: Vec<(RegistryKind, String)>,
}

impl Mark {
    pub fn new(
        name: impl Into<String>,
        context: Context,
        in_sig: Option<String>,
        out_sig: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            context,
            in_sig,
            out_sig,
            created: Vec::new(),
        }
    }

    pub fn record(&mut self, kind: RegistryKind, code: impl Into<String>) {
        self.created.push((kind, code.into()));
    }

    /// Recorded entries, most recent first.
    pub fn drain_created(&mut self) -> Vec<(RegistryKind, String)> {
        let mut out = std::mem::take(&mut self.created);
        out.reverse();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_reverses_creation_order() {
        let mut mark = Mark::new("m", Context::Glich, None, None);
        mark.record(RegistryKind::Function, "f");
        mark.record(RegistryKind::Object, "o");
        let drained = mark.drain_created();
        assert_eq!(drained[0], (RegistryKind::Object, "o".to_string()));
        assert_eq!(drained[1], (RegistryKind::Function, "f".to_string()));
    }
}
