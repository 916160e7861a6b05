//! Variable stores for Glich
//!
//! A store is one flat scope frame. Frames are pushed on function and
//! command entry and popped on return. Name lookup does not chain
//! through calling frames: a miss in the current frame falls back only
//! to the distinguished constants frame at the bottom of the stack.

use std::collections::HashMap;

use crate::value::Value;

/// A single scope frame
#[derive(Debug, Default, Clone)]
pub struct Store {
    values: HashMap<String, Value>,
}

impl Store {
    pub fn new() -> Self {
        Self { values: HashMap::new() }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.values.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

/// The frame stack: index 0 holds constants, index 1 is the script's
/// global frame, higher frames belong to active invocations.
#[derive(Debug)]
pub struct StoreStack {
    frames: Vec<Store>,
}

impl StoreStack {
    pub fn new() -> Self {
        Self { frames: vec![Store::new(), Store::new()] }
    }

    /// The constants frame, shared by every scope.
    pub fn constants_mut(&mut self) -> &mut Store {
        &mut self.frames[0]
    }

    pub fn push(&mut self) {
        self.frames.push(Store::new());
    }

    /// Pop an invocation frame. The constants and global frames are
    /// never popped.
    pub fn pop(&mut self) {
        if self.frames.len() > 2 {
            self.frames.pop();
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.top().exists(name) || self.frames[0].exists(name)
    }

    /// Look up a name in the current frame, falling back to constants.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.top().get(name).or_else(|| self.frames[0].get(name))
    }

    /// Set a name in the current frame.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.top_mut().set(name, value);
    }

    /// Update an existing name in the current frame only.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let top = self.frames.len() - 1;
        self.frames[top].get_mut(name)
    }

    fn top(&self) -> &Store {
        self.frames.last().expect("store stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Store {
        self.frames.last_mut().expect("store stack is never empty")
    }
}

impl Default for StoreStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_parent_chain_fallback() {
        let mut stack = StoreStack::new();
        stack.set("x", Value::Number(1));
        stack.push();
        // A pushed frame does not see the caller's variables.
        assert!(!stack.exists("x"));
        stack.pop();
        assert!(stack.exists("x"));
    }

    #[test]
    fn test_constants_visible_everywhere() {
        let mut stack = StoreStack::new();
        stack.constants_mut().set("true", Value::Bool(true));
        stack.push();
        assert_eq!(stack.get("true"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_pop_keeps_global_frame() {
        let mut stack = StoreStack::new();
        stack.set("x", Value::Number(1));
        stack.pop();
        stack.pop();
        assert_eq!(stack.get("x"), Some(&Value::Number(1)));
    }
}
