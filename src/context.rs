//! The mutable view a handler gets into the parser's live state.

use crate::document::Document;
use crate::frame::Frame;

/// Passed to every [`crate::registry::Handler::handle`] call.
///
/// Borrows the document and the whole stack rather than just the current
/// frame, since a handler like the PCDATA helper needs to write onto its
/// *parent* frame to "return" a computed value.
pub struct ParseContext<'a> {
    pub document: &'a mut Document,
    stack: &'a mut Vec<Frame>,
    frame_index: usize,
}

impl<'a> ParseContext<'a> {
    pub fn new(document: &'a mut Document, stack: &'a mut Vec<Frame>, frame_index: usize) -> Self {
        ParseContext {
            document,
            stack,
            frame_index,
        }
    }

    /// The frame this handler was resolved for.
    pub fn frame(&self) -> &Frame {
        &self.stack[self.frame_index]
    }

    /// Mutable access to the frame this handler was resolved for.
    pub fn frame_mut(&mut self) -> &mut Frame {
        &mut self.stack[self.frame_index]
    }

    /// The enclosing destination's frame, if any (the stack-path parent).
    pub fn parent(&self) -> Option<&Frame> {
        self.frame_index.checked_sub(1).map(|i| &self.stack[i])
    }

    /// Mutable access to the enclosing destination's frame.
    pub fn parent_mut(&mut self) -> Option<&mut Frame> {
        if self.frame_index == 0 {
            None
        } else {
            Some(&mut self.stack[self.frame_index - 1])
        }
    }

    /// The full stack depth (1-based); the current frame is depth - 1.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
