//! esc IR
//!
//! The intermediate representation between the ECMAScript front end and C
//! code generation. A [`Module`] owns every node in flat arenas:
//!
//! - [`Function`] - a named, ordered list of blocks
//! - [`Block`] - a straight-line instruction sequence ending in a terminator
//! - [`InstrKind`] - the closed set of typed instructions
//! - [`Constant`] - interned constant operands
//!
//! Instructions are appended through a [`BlockBuilder`], which type checks
//! operands and keeps block referrer sets in sync with terminator targets.
//! Back ends consume the IR through the visitor traits in [`visit`].
//!
//! # Example
//!
//! ```rust,ignore
//! use esc_ir::{Module, PrettyPrint, Type};
//!
//! let mut module = Module::new();
//! let main = module.new_function("main", true);
//! let entry = module.function(main).entry_block();
//! let value = module.const_double(3.0);
//!
//! let mut b = module.builder(entry);
//! let slot = b.push_mem_alloc(Type::double())?;
//! b.push_mem_store(slot, value)?;
//! b.push_trm_ret(value)?;
//!
//! println!("{}", module.pretty_print());
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

pub mod block;
pub mod builder;
pub mod constant;
pub mod error;
pub mod function;
pub mod instr;
pub mod module;
pub mod node;
pub mod types;
pub mod value;

// ============================================================================
// Module Services
// ============================================================================

pub mod config;
pub mod key;
pub mod names;
pub mod resource;
pub mod template;

// ============================================================================
// Consumers
// ============================================================================

pub mod optimize;
pub mod pretty;
pub mod verify;
pub mod visit;

// ============================================================================
// Re-exports
// ============================================================================

pub use block::{Block, BlockId};
pub use builder::BlockBuilder;
pub use constant::{Constant, SpecialValue};
pub use error::{IrError, IrResult};
pub use function::{Function, FunctionId};
pub use instr::{
    ArrayOp, BinaryOp, CallOp, DeclarationKind, EsBinaryOp, EsUnaryOp, InstrKind, Instruction,
    LinkKind, ValueOp,
};
pub use module::Module;
pub use node::Meta;
pub use types::{Type, TypeKind};
pub use value::{ConstId, InstrId, Value};

pub use config::IrConfig;
pub use key::{str_to_index, CacheIdAllocator, PropertyKey};
pub use names::NameGenerator;
pub use resource::{Resource, StringResource};
pub use template::{
    JumpTemplateBlock, LeaveContextTemplateBlock, MultiTemplateBlock, ReturnFalseTemplateBlock,
    TemplateBlock,
};

pub use optimize::{DeadBlockEliminator, OptLevel, OptStats, Optimizer};
pub use pretty::PrettyPrint;
pub use verify::{verify_module, VerifyError};
pub use visit::{ConstVisitor, InstrVisitor, NodeVisitor, ResourceVisitor};
