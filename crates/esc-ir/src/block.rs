//! Basic blocks
//!
//! A block holds an ordered list of instructions, at most one of which is a
//! terminator and it is always last. Each block also records the set of
//! terminators that target it.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::error::{IrError, IrResult};
use crate::function::FunctionId;
use crate::node::Meta;
use crate::value::InstrId;

/// Basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn new(id: u32) -> Self {
        BlockId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block
#[derive(Debug, Clone)]
pub struct Block {
    pub(crate) id: BlockId,
    pub(crate) label: Option<String>,
    pub(crate) instrs: Vec<InstrId>,
    pub(crate) referrers: FxHashSet<InstrId>,
    pub(crate) function: Option<FunctionId>,
    meta: Meta,
}

impl Block {
    pub(crate) fn new(id: BlockId, label: Option<String>) -> Self {
        Block {
            id,
            label,
            instrs: Vec::new(),
            referrers: FxHashSet::default(),
            function: None,
            meta: Meta::default(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Instructions in program order
    pub fn instrs(&self) -> &[InstrId] {
        &self.instrs
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    /// The last instruction
    pub fn last_instr(&self) -> IrResult<InstrId> {
        self.instrs
            .last()
            .copied()
            .ok_or(IrError::EmptyBlock { block: self.id })
    }

    /// Terminators that target this block
    pub fn referrers(&self) -> &FxHashSet<InstrId> {
        &self.referrers
    }

    /// Register a terminator as targeting this block; idempotent
    pub fn add_referrer(&mut self, instr: InstrId) {
        self.referrers.insert(instr);
    }

    /// Deregister a terminator; no-op when absent
    pub fn remove_referrer(&mut self, instr: InstrId) {
        self.referrers.remove(&instr);
    }

    /// Owning function, once linked
    pub fn function(&self) -> Option<FunctionId> {
        self.function
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: Meta) {
        self.meta = meta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referrer_set_semantics() {
        let mut block = Block::new(BlockId(0), Some("L".into()));
        block.add_referrer(InstrId(1));
        block.add_referrer(InstrId(1));
        assert_eq!(block.referrers().len(), 1);

        block.remove_referrer(InstrId(7));
        assert_eq!(block.referrers().len(), 1);

        block.remove_referrer(InstrId(1));
        assert!(block.referrers().is_empty());
    }

    #[test]
    fn test_last_instr_empty() {
        let block = Block::new(BlockId(2), None);
        assert!(matches!(
            block.last_instr(),
            Err(IrError::EmptyBlock { block }) if block == BlockId(2)
        ));
    }

    #[test]
    fn test_block_display() {
        assert_eq!(BlockId(4).to_string(), "bb4");
    }
}
