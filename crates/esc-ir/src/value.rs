//! Operand handles
//!
//! Every operand in the IR is either the result of an instruction or a
//! constant. Both live in the owning [`Module`](crate::Module) and are
//! referred to by index.

use std::fmt;

/// Index of an instruction in a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub u32);

impl InstrId {
    pub fn new(id: u32) -> Self {
        InstrId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Index of a constant in a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstId(pub u32);

impl ConstId {
    pub fn new(id: u32) -> Self {
        ConstId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An operand: an instruction result or a constant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Instr(InstrId),
    Const(ConstId),
}

impl Value {
    pub fn is_constant(&self) -> bool {
        matches!(self, Value::Const(_))
    }

    pub fn as_instr(&self) -> Option<InstrId> {
        match self {
            Value::Instr(id) => Some(*id),
            Value::Const(_) => None,
        }
    }

    pub fn as_const(&self) -> Option<ConstId> {
        match self {
            Value::Const(id) => Some(*id),
            Value::Instr(_) => None,
        }
    }
}

impl From<InstrId> for Value {
    fn from(id: InstrId) -> Self {
        Value::Instr(id)
    }
}

impl From<ConstId> for Value {
    fn from(id: ConstId) -> Self {
        Value::Const(id)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Instr(id) => write!(f, "{}", id),
            Value::Const(id) => write!(f, "{}", id),
        }
    }
}
