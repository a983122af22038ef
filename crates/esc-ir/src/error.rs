//! Error types for IR construction and mutation

use thiserror::Error;

use crate::block::BlockId;
use crate::function::FunctionId;
use crate::types::Type;
use crate::value::{InstrId, Value};
use crate::verify::VerifyError;

/// Errors raised when an IR contract is violated
#[derive(Debug, Clone, Error)]
pub enum IrError {
    /// An instruction was pushed onto a block that already ends in a terminator
    #[error("cannot push an instruction onto {block}: block is already terminated")]
    PushAfterTerminator {
        /// The terminated block
        block: BlockId,
    },

    /// An operand did not have the type an instruction requires
    #[error("type mismatch in {context}: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Mnemonic of the instruction being checked
        context: &'static str,
        /// Human-readable description of the accepted types
        expected: &'static str,
        /// The type that was found
        actual: Type,
    },

    /// A block was appended after an empty block
    #[error("cannot append a block after {block}: block is empty")]
    EmptyBlock {
        /// The empty trailing block
        block: BlockId,
    },

    /// The entry block of a function cannot be removed
    #[error("cannot remove {block}: it is the entry block of {function}")]
    EntryBlock {
        /// The entry block
        block: BlockId,
        /// Owning function
        function: FunctionId,
    },

    /// A block already belongs to a function
    #[error("{block} is already linked into a function")]
    BlockAlreadyLinked {
        /// The linked block
        block: BlockId,
    },

    /// A block is not part of the given function
    #[error("{block} is not a block of {function}")]
    BlockNotInFunction {
        /// The block
        block: BlockId,
        /// The function it was looked up in
        function: FunctionId,
    },

    /// A block is still targeted by terminators outside itself
    #[error("cannot remove {block}: still referenced by {referrers} terminator(s)")]
    BlockInUse {
        /// The referenced block
        block: BlockId,
        /// Number of foreign referrers
        referrers: usize,
    },

    /// A function was pushed onto the module twice
    #[error("{function} has already been pushed onto the module")]
    FunctionAlreadyPushed {
        /// The function
        function: FunctionId,
    },

    /// A control-flow operation was applied to a non-terminator
    #[error("{instr} is not a terminator")]
    NotATerminator {
        /// The instruction
        instr: InstrId,
    },

    /// A replacement would change whether an instruction is a terminator
    #[error("replacing {instr} would change its terminator status")]
    TerminatorKindChange {
        /// The instruction being replaced
        instr: InstrId,
    },

    /// A retarget named a block the terminator does not reference
    #[error("{instr} does not target {block}")]
    TargetNotFound {
        /// The terminator
        instr: InstrId,
        /// The block that was expected among its targets
        block: BlockId,
    },

    /// An operand is not defined before the instruction that uses it
    #[error("{instr} uses {operand}, which is not defined before it")]
    UndefinedOperand {
        /// The instruction being built or replaced
        instr: InstrId,
        /// The offending operand
        operand: Value,
    },

    /// A value handle does not belong to this module
    #[error("{value} is not a value of this module")]
    UnknownValue {
        /// The handle
        value: Value,
    },

    /// A block handle does not belong to this module
    #[error("{block} is not a block of this module")]
    UnknownBlock {
        /// The handle
        block: BlockId,
    },

    /// The instruction is not hosted by any block
    #[error("{instr} is not linked into a block")]
    InstrNotLinked {
        /// The instruction
        instr: InstrId,
    },

    /// A meta instruction reached a consumer that only accepts concrete kinds
    #[error("meta instruction {kind} ({instr}) cannot be visited")]
    MetaInstruction {
        /// The instruction
        instr: InstrId,
        /// Its mnemonic
        kind: &'static str,
    },

    /// No string resource with the given id exists
    #[error("unknown resource id {id}")]
    UnknownResource {
        /// The requested id
        id: u32,
    },

    /// Configuration could not be parsed or is out of range
    #[error("invalid IR configuration: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// The module failed verification after a pass
    #[error("IR verification failed with {} error(s)", .errors.len())]
    Verification {
        /// Every violation found
        errors: Vec<VerifyError>,
    },
}

/// Result alias for IR operations
pub type IrResult<T> = Result<T, IrError>;

impl IrError {
    pub(crate) fn mismatch(context: &'static str, expected: &'static str, actual: Type) -> Self {
        IrError::TypeMismatch {
            context,
            expected,
            actual,
        }
    }
}
