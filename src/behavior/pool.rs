//! Behavior pool
//!
//! Keeps one retired instance per behavior kind so that recurring behaviors
//! reuse their allocation instead of boxing a new one each time.

use std::collections::HashMap;

use super::{Behavior, BehaviorKind};

#[derive(Debug, Default)]
pub struct BehaviorPool {
    retired: HashMap<BehaviorKind, Box<dyn Behavior>>,
}

impl BehaviorPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished instance for later reuse. A previously retired
    /// instance of the same kind is dropped.
    pub fn retire(&mut self, behavior: Box<dyn Behavior>) {
        self.retired.insert(behavior.kind(), behavior);
    }

    /// Take the retired instance of `kind`, if there is one
    pub fn take(&mut self, kind: BehaviorKind) -> Option<Box<dyn Behavior>> {
        self.retired.remove(&kind)
    }

    /// A reset instance of `kind`, reused when possible
    pub fn obtain(&mut self, kind: BehaviorKind) -> Box<dyn Behavior> {
        match self.take(kind) {
            Some(mut behavior) => {
                behavior.reset();
                behavior
            }
            None => kind.instantiate(),
        }
    }

    pub fn contains(&self, kind: BehaviorKind) -> bool {
        self.retired.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.retired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retired.is_empty()
    }

    pub fn clear(&mut self) {
        self.retired.clear();
    }
}
