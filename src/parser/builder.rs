//! Builder stack for tree assembly
//!
//! Grammar rules that collect children push a destination slot, completed
//! nodes are appended to whatever slot is on top, and leaving the rule pops
//! the slot to obtain the children. A node therefore always lands in its
//! syntactic parent, and exactly once.
//!
//! Misuse (popping an empty stack, popping the wrong kind of slot, setting a
//! single slot twice) is a bug in the parser and panics.

#[derive(Debug)]
enum Slot<T> {
    /// Append to an ordered list
    Sequence(Vec<T>),
    /// Hold exactly one node
    Single(Option<T>),
}

#[derive(Debug)]
pub struct Builder<T> {
    stack: Vec<Slot<T>>,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Builder<T> {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn push_sequence(&mut self) {
        self.stack.push(Slot::Sequence(Vec::new()));
    }

    pub fn push_single(&mut self) {
        self.stack.push(Slot::Single(None));
    }

    /// Insert a completed node into the slot on top of the stack.
    pub fn append(&mut self, node: T) {
        match self.stack.last_mut() {
            Some(Slot::Sequence(nodes)) => nodes.push(node),
            Some(Slot::Single(slot)) => {
                if slot.is_some() {
                    panic!("single node set twice");
                }
                *slot = Some(node);
            }
            None => panic!("append on empty builder stack"),
        }
    }

    pub fn pop_sequence(&mut self) -> Vec<T> {
        match self.stack.pop() {
            Some(Slot::Sequence(nodes)) => nodes,
            Some(Slot::Single(_)) => panic!("popped a single slot where a sequence was open"),
            None => panic!("pop on empty builder stack"),
        }
    }

    pub fn pop_single(&mut self) -> Option<T> {
        match self.stack.pop() {
            Some(Slot::Single(node)) => node,
            Some(Slot::Sequence(_)) => panic!("popped a sequence where a single slot was open"),
            None => panic!("pop on empty builder stack"),
        }
    }

    /// Close the sequence on top, build a node from its contents and hand
    /// that node to the slot below.
    pub fn pop_and_append<F>(&mut self, build: F)
    where
        F: FnOnce(Vec<T>) -> T,
    {
        let children = self.pop_sequence();
        self.append(build(children));
    }

    /// Nodes completed in the bottom sequence. Slots still open above it
    /// are discarded along with their contents.
    pub fn into_root(mut self) -> Vec<T> {
        self.stack.truncate(1);
        match self.stack.pop() {
            Some(Slot::Sequence(nodes)) => nodes,
            Some(Slot::Single(node)) => node.into_iter().collect(),
            None => Vec::new(),
        }
    }
}
