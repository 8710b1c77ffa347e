//! Index-addressed chain of nested scopes.
//!
//! The semantic analyzer keeps one chain of declared types and the interpreter
//! keeps its own chain of runtime values; the two never share frames. Frames
//! are entered and left in strict LIFO order, so the active frame is always
//! the last one in the arena and leaving it simply truncates the vector.

use rustc_hash::FxHashMap;

#[derive(Debug)]
struct Frame<T> {
    bindings: FxHashMap<String, T>,
    parent: Option<usize>,
}

impl<T> Frame<T> {
    fn new(parent: Option<usize>) -> Self {
        Self {
            bindings: FxHashMap::default(),
            parent,
        }
    }
}

#[derive(Debug)]
pub struct ScopeChain<T> {
    frames: Vec<Frame<T>>,
    current: usize,
}

impl<T> ScopeChain<T> {
    /// Creates a chain holding only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::new(None)],
            current: 0,
        }
    }

    pub fn enter(&mut self) {
        self.frames.push(Frame::new(Some(self.current)));
        self.current = self.frames.len() - 1;
    }

    /// Drops the active frame. The global frame is never dropped.
    pub fn exit(&mut self) {
        if let Some(parent) = self.frames[self.current].parent {
            self.frames.truncate(self.current);
            self.current = parent;
        }
    }

    /// Number of frames, the global one included.
    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn define(&mut self, name: impl Into<String>, value: T) {
        self.frames[self.current]
            .bindings
            .insert(name.into(), value);
    }

    pub fn is_defined_locally(&self, name: &str) -> bool {
        self.frames[self.current].bindings.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&T> {
        let index = self.resolve(name)?;
        self.frames[index].bindings.get(name)
    }

    /// Overwrites the binding in the nearest frame that defines `name`.
    /// Hands the value back when no frame does.
    pub fn assign(&mut self, name: &str, value: T) -> Result<(), T> {
        match self.resolve(name) {
            Some(index) => {
                if let Some(slot) = self.frames[index].bindings.get_mut(name) {
                    *slot = value;
                }
                Ok(())
            }
            None => Err(value),
        }
    }

    fn resolve(&self, name: &str) -> Option<usize> {
        let mut index = Some(self.current);
        while let Some(frame_index) = index {
            let frame = &self.frames[frame_index];
            if frame.bindings.contains_key(name) {
                return Some(frame_index);
            }
            index = frame.parent;
        }
        None
    }
}

impl<T> Default for ScopeChain<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_frames_see_outer_bindings() {
        let mut chain = ScopeChain::new();
        chain.define("x", 1);
        chain.enter();
        assert_eq!(chain.lookup("x"), Some(&1));
        assert!(!chain.is_defined_locally("x"));
    }

    #[test]
    fn shadowing_ends_with_the_frame() {
        let mut chain = ScopeChain::new();
        chain.define("x", 1);
        chain.enter();
        chain.define("x", 2);
        assert_eq!(chain.lookup("x"), Some(&2));
        chain.exit();
        assert_eq!(chain.lookup("x"), Some(&1));
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn assign_updates_nearest_defining_frame() {
        let mut chain = ScopeChain::new();
        chain.define("x", 1);
        chain.enter();
        chain.enter();
        assert_eq!(chain.assign("x", 5), Ok(()));
        chain.exit();
        chain.exit();
        assert_eq!(chain.lookup("x"), Some(&5));
        assert_eq!(chain.assign("missing", 3), Err(3));
    }

    #[test]
    fn exit_never_drops_the_global_frame() {
        let mut chain: ScopeChain<i32> = ScopeChain::new();
        chain.define("g", 7);
        chain.exit();
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.lookup("g"), Some(&7));
    }

    #[test]
    fn bindings_from_a_left_frame_are_gone() {
        let mut chain = ScopeChain::new();
        chain.enter();
        chain.define("tmp", "value");
        chain.exit();
        assert_eq!(chain.lookup("tmp"), None);
    }
}
