use ecow::EcoString;
use smallvec::SmallVec;

use crate::values::Value;

/// Activation record of a lane call.
///
/// Variables live in the frame of the lane that set them and disappear when
/// that lane returns. Lookups are a linear scan over inline storage.
#[derive(Debug)]
pub(crate) struct Frame {
    /// Ordinal of the lane this frame belongs to.
    pub lane: u32,
    /// Offset to resume at in the caller; `None` for the entry frame.
    pub return_to: Option<u32>,
    locals: SmallVec<[(EcoString, Value); 4]>,
}

impl Frame {
    pub fn new(lane: u32, return_to: Option<u32>) -> Self {
        Self {
            lane,
            return_to,
            locals: SmallVec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// Bind `name`, overwriting an existing binding.
    pub fn set(&mut self, name: EcoString, value: Value) {
        match self.locals.iter_mut().find(|(bound, _)| *bound == name) {
            Some((_, slot)) => *slot = value,
            None => self.locals.push((name, value)),
        }
    }
}
