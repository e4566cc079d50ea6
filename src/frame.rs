//! Destination frames and the parser's brace stack.

use std::collections::HashMap;
use std::rc::Rc;

use crate::registry::Handler;
use crate::token::Token;
use crate::value::Value;

/// One frame per open brace the parser has descended into.
pub struct Frame {
    /// The `{` token (and its offset) that opened this destination.
    pub open_token: Token,
    pub open_offset: usize,
    /// The destination's own control name, e.g. `fonttbl`.
    pub control_name: String,
    /// The `;`-joined path from the document root to this destination.
    pub path: String,
    /// Set when the destination was opened with a leading `\*`.
    pub ignorable: bool,
    /// The resolved, possibly-empty handler list for this frame's path.
    pub handlers: Vec<Rc<dyn Handler>>,
    /// Collaborator scratch storage (PCDATA accumulator, current font, …).
    pub user_state: HashMap<String, Value>,
}

impl Frame {
    pub fn new(
        open_token: Token,
        open_offset: usize,
        control_name: String,
        path: String,
        ignorable: bool,
        handlers: Vec<Rc<dyn Handler>>,
    ) -> Self {
        Frame {
            open_token,
            open_offset,
            control_name,
            path,
            ignorable,
            handlers,
            user_state: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.user_state.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.user_state.insert(key.into(), value.into());
    }

    pub fn entry_list(&mut self, key: &str) -> &mut Vec<String> {
        self.user_state
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()))
            .as_list_mut()
            .expect("entry_list called on a non-list key")
    }
}
