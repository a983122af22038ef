//! Functions

use std::fmt;

use crate::block::BlockId;
use crate::node::Meta;

/// Function identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn new(id: u32) -> Self {
        FunctionId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

/// A function: a named, ordered list of blocks
///
/// The first block is the entry block and always exists.
#[derive(Debug, Clone)]
pub struct Function {
    pub(crate) id: FunctionId,
    pub(crate) name: String,
    pub(crate) is_global: bool,
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) pushed: bool,
    meta: Meta,
}

impl Function {
    pub(crate) fn new(id: FunctionId, name: String, is_global: bool, entry: BlockId) -> Self {
        Function {
            id,
            name,
            is_global,
            blocks: vec![entry],
            pushed: false,
            meta: Meta::default(),
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True for the top-level program function
    pub fn is_global(&self) -> bool {
        self.is_global
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    pub fn entry_block(&self) -> BlockId {
        self.blocks[0]
    }

    /// The block new code is appended to
    pub fn last_block(&self) -> BlockId {
        self.blocks[self.blocks.len() - 1]
    }

    pub fn contains_block(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: Meta) {
        self.meta = meta;
    }
}
