//! Instruction kinds
//!
//! Every instruction is one [`InstrKind`] variant carrying a per-kind payload.
//! The kind set is closed: the visitor in [`crate::visit`] matches on it
//! exhaustively, so adding a variant is a compile error at every consumer.

use std::fmt;

use crate::block::BlockId;
use crate::error::{IrError, IrResult};
use crate::function::FunctionId;
use crate::module::Module;
use crate::types::Type;
use crate::value::Value;

// ============================================================================
// Operation enums
// ============================================================================

/// Array access direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayOp {
    Get,
    Put,
}

/// Low-level operations on the value representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Or,
    Eq,
}

impl BinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "eq",
        }
    }
}

/// Call flavor of `call`
///
/// Named calls have their own kind, [`InstrKind::CallNamed`], since they
/// carry a property key in place of a function operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallOp {
    Normal,
    New,
}

/// Conversions and tests on the dynamic value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueOp {
    ToBoolean,
    ToDouble,
    ToString,
    FromBoolean,
    FromDouble,
    FromString,
    IsNull,
    IsUndefined,
    TestCoercibility,
}

impl ValueOp {
    pub fn name(&self) -> &'static str {
        match self {
            ValueOp::ToBoolean => "to_bool",
            ValueOp::ToDouble => "to_double",
            ValueOp::ToString => "to_str",
            ValueOp::FromBoolean => "from_bool",
            ValueOp::FromDouble => "from_double",
            ValueOp::FromString => "from_str",
            ValueOp::IsNull => "is_null",
            ValueOp::IsUndefined => "is_undefined",
            ValueOp::TestCoercibility => "tst_coerc",
        }
    }

    /// True for operations that write through a result operand
    pub fn has_result(&self) -> bool {
        matches!(self, ValueOp::ToDouble | ValueOp::ToString)
    }
}

/// Language-level binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsBinaryOp {
    // Arithmetic
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Ls,
    Rss,
    Rus,

    // Relational
    Lt,
    Gt,
    Lte,
    Gte,
    In,
    InstanceOf,

    // Equality
    Eq,
    Neq,
    StrictEq,
    StrictNeq,

    // Bitwise
    BitAnd,
    BitXor,
    BitOr,
}

impl EsBinaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            EsBinaryOp::Mul => "mul",
            EsBinaryOp::Div => "div",
            EsBinaryOp::Mod => "mod",
            EsBinaryOp::Add => "add",
            EsBinaryOp::Sub => "sub",
            EsBinaryOp::Ls => "ls",
            EsBinaryOp::Rss => "rss",
            EsBinaryOp::Rus => "rus",
            EsBinaryOp::Lt => "lt",
            EsBinaryOp::Gt => "gt",
            EsBinaryOp::Lte => "lte",
            EsBinaryOp::Gte => "gte",
            EsBinaryOp::In => "in",
            EsBinaryOp::InstanceOf => "instanceof",
            EsBinaryOp::Eq => "eq",
            EsBinaryOp::Neq => "neq",
            EsBinaryOp::StrictEq => "strict_eq",
            EsBinaryOp::StrictNeq => "strict_neq",
            EsBinaryOp::BitAnd => "bit_and",
            EsBinaryOp::BitXor => "bit_xor",
            EsBinaryOp::BitOr => "bit_or",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            EsBinaryOp::Mul
                | EsBinaryOp::Div
                | EsBinaryOp::Mod
                | EsBinaryOp::Add
                | EsBinaryOp::Sub
                | EsBinaryOp::Ls
                | EsBinaryOp::Rss
                | EsBinaryOp::Rus
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            EsBinaryOp::Lt
                | EsBinaryOp::Gt
                | EsBinaryOp::Lte
                | EsBinaryOp::Gte
                | EsBinaryOp::In
                | EsBinaryOp::InstanceOf
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(
            self,
            EsBinaryOp::Eq | EsBinaryOp::Neq | EsBinaryOp::StrictEq | EsBinaryOp::StrictNeq
        )
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(self, EsBinaryOp::BitAnd | EsBinaryOp::BitXor | EsBinaryOp::BitOr)
    }
}

/// Language-level unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsUnaryOp {
    Typeof,
    Neg,
    BitNot,
    LogNot,
}

impl EsUnaryOp {
    pub fn name(&self) -> &'static str {
        match self {
            EsUnaryOp::Typeof => "typeof",
            EsUnaryOp::Neg => "neg",
            EsUnaryOp::BitNot => "bit_not",
            EsUnaryOp::LogNot => "log_not",
        }
    }
}

/// What a declaration introduces
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeclarationKind {
    Variable,
    Function { value: Value },
    Parameter { index: i32, array: Value },
}

/// What a link binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Variable,
    Function,
    Parameter,
}

// ============================================================================
// Payloads
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentsObjectInit {
    pub argc: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentsObjectLink {
    pub args: Value,
    pub index: i32,
    pub value: Value,
}

/// Fixed-index array access; `value` is present for puts only
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub op: ArrayOp,
    pub index: usize,
    pub array: Value,
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Value,
    pub right: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindExtraInit {
    pub num_extra: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindExtraPtr {
    pub hops: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: CallOp,
    pub function: Value,
    pub argc: i32,
    pub argv: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallKeyed {
    pub object: Value,
    pub key: u64,
    pub argc: i32,
    pub argv: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallKeyedSlow {
    pub object: Value,
    pub key: Value,
    pub argc: i32,
    pub argv: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallNamed {
    pub key: u64,
    pub argc: i32,
    pub argv: Value,
    pub result: Value,
}

/// Conversion or test; `result` is present for `ToDouble` and `ToString`
#[derive(Debug, Clone, PartialEq)]
pub struct ValueConversion {
    pub op: ValueOp,
    pub value: Value,
    pub result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub cond: Value,
    pub true_block: BlockId,
    pub false_block: BlockId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Jump {
    pub block: BlockId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryAlloc {
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    pub dst: Value,
    pub src: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryElementPointer {
    pub value: Value,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextSetStrict {
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEnterCatch {
    pub key: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextEnterWith {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextGet {
    pub key: u64,
    pub result: Value,
    pub cache_id: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextPut {
    pub key: u64,
    pub value: Value,
    pub cache_id: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContextDelete {
    pub key: u64,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionLoadState {
    pub state: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionSet {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitArguments {
    pub dst: Value,
    pub prmc: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitArgumentsObject {
    pub prmc: i32,
    pub prmv: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub key: u64,
    pub is_strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub kind: LinkKind,
    pub key: u64,
    pub is_strict: bool,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefineData {
    pub object: Value,
    pub key: Value,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefineAccessor {
    pub object: Value,
    pub key: u64,
    pub function: Value,
    pub is_setter: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIteratorNew {
    pub object: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyIteratorNext {
    pub iterator: Value,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGet {
    pub object: Value,
    pub key: u64,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGetSlow {
    pub object: Value,
    pub key: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPut {
    pub object: Value,
    pub key: u64,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPutSlow {
    pub object: Value,
    pub key: Value,
    pub value: Value,
}

/// Property delete; a missing object deletes from the global object
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDelete {
    pub object: Option<Value>,
    pub key: u64,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeleteSlow {
    pub object: Option<Value>,
    pub key: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsNewArray {
    pub length: usize,
    pub values: Value,
}

/// Function object creation, shared by declarations and expressions
#[derive(Debug, Clone, PartialEq)]
pub struct EsNewFunction {
    pub function: FunctionId,
    pub parameter_count: i32,
    pub is_strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsNewRegex {
    pub pattern: String,
    pub flags: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsBinary {
    pub op: EsBinaryOp,
    pub left: Value,
    pub right: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsUnary {
    pub op: EsUnaryOp,
    pub value: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaContextLoad {
    pub key: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetaPropertyLoad {
    pub object: Value,
    pub key: Value,
}

// ============================================================================
// Instruction kind
// ============================================================================

/// The closed set of instruction kinds
#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    ArgumentsObjectInit(ArgumentsObjectInit),
    ArgumentsObjectLink(ArgumentsObjectLink),
    Array(ArrayAccess),
    Binary(Binary),
    BindExtraInit(BindExtraInit),
    BindExtraPtr(BindExtraPtr),
    Call(Call),
    CallKeyed(CallKeyed),
    CallKeyedSlow(CallKeyedSlow),
    CallNamed(CallNamed),
    Value(ValueConversion),
    Branch(Branch),
    Jump(Jump),
    Return(Return),
    MemoryAlloc(MemoryAlloc),
    MemoryStore(MemoryStore),
    MemoryElementPointer(MemoryElementPointer),
    ContextSetStrict(ContextSetStrict),
    ContextEnterCatch(ContextEnterCatch),
    ContextEnterWith(ContextEnterWith),
    ContextLeave,
    ContextThis,
    ContextGet(ContextGet),
    ContextPut(ContextPut),
    ContextDelete(ContextDelete),
    ExceptionSaveState,
    ExceptionLoadState(ExceptionLoadState),
    ExceptionSet(ExceptionSet),
    ExceptionClear,
    InitArguments(InitArguments),
    InitArgumentsObject(InitArgumentsObject),
    Declaration(Declaration),
    Link(Link),
    PropertyDefineData(PropertyDefineData),
    PropertyDefineAccessor(PropertyDefineAccessor),
    PropertyIteratorNew(PropertyIteratorNew),
    PropertyIteratorNext(PropertyIteratorNext),
    PropertyGet(PropertyGet),
    PropertyGetSlow(PropertyGetSlow),
    PropertyPut(PropertyPut),
    PropertyPutSlow(PropertyPutSlow),
    PropertyDelete(PropertyDelete),
    PropertyDeleteSlow(PropertyDeleteSlow),
    EsNewArray(EsNewArray),
    EsNewFunctionDeclaration(EsNewFunction),
    EsNewFunctionExpression(EsNewFunction),
    EsNewObject,
    EsNewRegex(EsNewRegex),
    EsBinary(EsBinary),
    EsUnary(EsUnary),
    MetaContextLoad(MetaContextLoad),
    MetaPropertyLoad(MetaPropertyLoad),
}

impl InstrKind {
    /// Branch, jump and return end a block
    pub fn is_terminating(&self) -> bool {
        matches!(
            self,
            InstrKind::Branch(_) | InstrKind::Jump(_) | InstrKind::Return(_)
        )
    }

    /// Meta instructions must be lowered away before code generation
    pub fn is_meta(&self) -> bool {
        matches!(
            self,
            InstrKind::MetaContextLoad(_) | InstrKind::MetaPropertyLoad(_)
        )
    }

    /// Kind name, matching the visitor method suffix
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InstrKind::ArgumentsObjectInit(_) => "args_obj_init",
            InstrKind::ArgumentsObjectLink(_) => "args_obj_link",
            InstrKind::Array(_) => "arr",
            InstrKind::Binary(_) => "bin",
            InstrKind::BindExtraInit(_) => "bnd_extra_init",
            InstrKind::BindExtraPtr(_) => "bnd_extra_ptr",
            InstrKind::Call(_) => "call",
            InstrKind::CallKeyed(_) => "call_keyed",
            InstrKind::CallKeyedSlow(_) => "call_keyed_slow",
            InstrKind::CallNamed(_) => "call_named",
            InstrKind::Value(_) => "val",
            InstrKind::Branch(_) => "br",
            InstrKind::Jump(_) => "jmp",
            InstrKind::Return(_) => "ret",
            InstrKind::MemoryAlloc(_) => "mem_alloc",
            InstrKind::MemoryStore(_) => "mem_store",
            InstrKind::MemoryElementPointer(_) => "mem_elm_ptr",
            InstrKind::ContextSetStrict(_) => "ctx_set_strict",
            InstrKind::ContextEnterCatch(_) => "ctx_enter_catch",
            InstrKind::ContextEnterWith(_) => "ctx_enter_with",
            InstrKind::ContextLeave => "ctx_leave",
            InstrKind::ContextThis => "ctx_this",
            InstrKind::ContextGet(_) => "ctx_get",
            InstrKind::ContextPut(_) => "ctx_put",
            InstrKind::ContextDelete(_) => "ctx_del",
            InstrKind::ExceptionSaveState => "ex_save_state",
            InstrKind::ExceptionLoadState(_) => "ex_load_state",
            InstrKind::ExceptionSet(_) => "ex_set",
            InstrKind::ExceptionClear => "ex_clear",
            InstrKind::InitArguments(_) => "init_args",
            InstrKind::InitArgumentsObject(_) => "init_args_obj",
            InstrKind::Declaration(_) => "decl",
            InstrKind::Link(_) => "link",
            InstrKind::PropertyDefineData(_) => "prp_def_data",
            InstrKind::PropertyDefineAccessor(_) => "prp_def_accessor",
            InstrKind::PropertyIteratorNew(_) => "prp_it_new",
            InstrKind::PropertyIteratorNext(_) => "prp_it_next",
            InstrKind::PropertyGet(_) => "prp_get",
            InstrKind::PropertyGetSlow(_) => "prp_get_slow",
            InstrKind::PropertyPut(_) => "prp_put",
            InstrKind::PropertyPutSlow(_) => "prp_put_slow",
            InstrKind::PropertyDelete(_) => "prp_del",
            InstrKind::PropertyDeleteSlow(_) => "prp_del_slow",
            InstrKind::EsNewArray(_) => "es_new_arr",
            InstrKind::EsNewFunctionDeclaration(_) => "es_new_fun_decl",
            InstrKind::EsNewFunctionExpression(_) => "es_new_fun_expr",
            InstrKind::EsNewObject => "es_new_obj",
            InstrKind::EsNewRegex(_) => "es_new_rex",
            InstrKind::EsBinary(_) => "es_bin",
            InstrKind::EsUnary(_) => "es_unary",
            InstrKind::MetaContextLoad(_) => "meta_ctx_load",
            InstrKind::MetaPropertyLoad(_) => "meta_prp_load",
        }
    }

    /// Blocks this instruction transfers control to
    pub fn targets(&self) -> Vec<BlockId> {
        match self {
            InstrKind::Branch(br) => vec![br.true_block, br.false_block],
            InstrKind::Jump(jmp) => vec![jmp.block],
            _ => Vec::new(),
        }
    }

    /// Value operands in payload order
    pub fn operands(&self) -> Vec<Value> {
        match self {
            InstrKind::ArgumentsObjectInit(_)
            | InstrKind::BindExtraInit(_)
            | InstrKind::BindExtraPtr(_)
            | InstrKind::Jump(_)
            | InstrKind::MemoryAlloc(_)
            | InstrKind::ContextSetStrict(_)
            | InstrKind::ContextEnterCatch(_)
            | InstrKind::ContextLeave
            | InstrKind::ContextThis
            | InstrKind::ExceptionSaveState
            | InstrKind::ExceptionClear
            | InstrKind::EsNewFunctionDeclaration(_)
            | InstrKind::EsNewFunctionExpression(_)
            | InstrKind::EsNewObject
            | InstrKind::EsNewRegex(_)
            | InstrKind::MetaContextLoad(_) => Vec::new(),
            InstrKind::ArgumentsObjectLink(i) => vec![i.args, i.value],
            InstrKind::Array(i) => {
                let mut ops = vec![i.array];
                ops.extend(i.value);
                ops
            }
            InstrKind::Binary(i) => vec![i.left, i.right],
            InstrKind::Call(i) => vec![i.function, i.argv, i.result],
            InstrKind::CallKeyed(i) => vec![i.object, i.argv, i.result],
            InstrKind::CallKeyedSlow(i) => vec![i.object, i.key, i.argv, i.result],
            InstrKind::CallNamed(i) => vec![i.argv, i.result],
            InstrKind::Value(i) => {
                let mut ops = vec![i.value];
                ops.extend(i.result);
                ops
            }
            InstrKind::Branch(i) => vec![i.cond],
            InstrKind::Return(i) => vec![i.value],
            InstrKind::MemoryStore(i) => vec![i.dst, i.src],
            InstrKind::MemoryElementPointer(i) => vec![i.value],
            InstrKind::ContextEnterWith(i) => vec![i.value],
            InstrKind::ContextGet(i) => vec![i.result],
            InstrKind::ContextPut(i) => vec![i.value],
            InstrKind::ContextDelete(i) => vec![i.result],
            InstrKind::ExceptionLoadState(i) => vec![i.state],
            InstrKind::ExceptionSet(i) => vec![i.value],
            InstrKind::InitArguments(i) => vec![i.dst],
            InstrKind::InitArgumentsObject(i) => vec![i.prmv],
            InstrKind::Declaration(i) => match i.kind {
                DeclarationKind::Variable => Vec::new(),
                DeclarationKind::Function { value } => vec![value],
                DeclarationKind::Parameter { array, .. } => vec![array],
            },
            InstrKind::Link(i) => vec![i.value],
            InstrKind::PropertyDefineData(i) => vec![i.object, i.key, i.value],
            InstrKind::PropertyDefineAccessor(i) => vec![i.object, i.function],
            InstrKind::PropertyIteratorNew(i) => vec![i.object],
            InstrKind::PropertyIteratorNext(i) => vec![i.iterator, i.value],
            InstrKind::PropertyGet(i) => vec![i.object, i.result],
            InstrKind::PropertyGetSlow(i) => vec![i.object, i.key, i.result],
            InstrKind::PropertyPut(i) => vec![i.object, i.value],
            InstrKind::PropertyPutSlow(i) => vec![i.object, i.key, i.value],
            InstrKind::PropertyDelete(i) => {
                let mut ops: Vec<Value> = i.object.into_iter().collect();
                ops.push(i.result);
                ops
            }
            InstrKind::PropertyDeleteSlow(i) => {
                let mut ops: Vec<Value> = i.object.into_iter().collect();
                ops.push(i.key);
                ops.push(i.result);
                ops
            }
            InstrKind::EsNewArray(i) => vec![i.values],
            InstrKind::EsBinary(i) => vec![i.left, i.right, i.result],
            InstrKind::EsUnary(i) => vec![i.value, i.result],
            InstrKind::MetaPropertyLoad(i) => vec![i.object, i.key],
        }
    }

    /// Static result type
    pub fn result_type(&self, module: &Module) -> Type {
        match self {
            InstrKind::ArgumentsObjectInit(_)
            | InstrKind::ContextThis
            | InstrKind::ExceptionSaveState
            | InstrKind::EsNewArray(_)
            | InstrKind::EsNewFunctionDeclaration(_)
            | InstrKind::EsNewFunctionExpression(_)
            | InstrKind::EsNewObject
            | InstrKind::EsNewRegex(_) => Type::value(),

            InstrKind::ArgumentsObjectLink(_)
            | InstrKind::Branch(_)
            | InstrKind::Jump(_)
            | InstrKind::Return(_)
            | InstrKind::MemoryStore(_)
            | InstrKind::ContextSetStrict(_)
            | InstrKind::ContextLeave
            | InstrKind::ExceptionLoadState(_)
            | InstrKind::ExceptionSet(_)
            | InstrKind::ExceptionClear
            | InstrKind::InitArguments(_)
            | InstrKind::InitArgumentsObject(_)
            | InstrKind::Link(_) => Type::void(),

            InstrKind::Call(_)
            | InstrKind::CallKeyed(_)
            | InstrKind::CallKeyedSlow(_)
            | InstrKind::CallNamed(_)
            | InstrKind::ContextEnterCatch(_)
            | InstrKind::ContextEnterWith(_)
            | InstrKind::ContextGet(_)
            | InstrKind::ContextPut(_)
            | InstrKind::ContextDelete(_)
            | InstrKind::Declaration(_)
            | InstrKind::PropertyDefineData(_)
            | InstrKind::PropertyDefineAccessor(_)
            | InstrKind::PropertyIteratorNext(_)
            | InstrKind::PropertyGet(_)
            | InstrKind::PropertyGetSlow(_)
            | InstrKind::PropertyPut(_)
            | InstrKind::PropertyPutSlow(_)
            | InstrKind::PropertyDelete(_)
            | InstrKind::PropertyDeleteSlow(_)
            | InstrKind::EsBinary(_)
            | InstrKind::EsUnary(_) => Type::boolean(),

            InstrKind::Value(i) => match i.op {
                ValueOp::FromBoolean | ValueOp::FromDouble | ValueOp::FromString => {
                    Type::value()
                }
                _ => Type::boolean(),
            },

            InstrKind::Array(i) => match i.op {
                ArrayOp::Put => Type::void(),
                ArrayOp::Get => module
                    .type_of(i.array)
                    .element()
                    .cloned()
                    .unwrap_or(Type::Void),
            },
            InstrKind::Binary(i) => match i.op {
                BinaryOp::Eq => Type::boolean(),
                _ => module.type_of(i.left),
            },
            InstrKind::BindExtraInit(_) | InstrKind::BindExtraPtr(_) => {
                Type::pointer(Type::value())
            }
            InstrKind::MemoryAlloc(i) => i.ty.clone(),
            InstrKind::MemoryElementPointer(i) => {
                let elem = module
                    .type_of(i.value)
                    .element()
                    .cloned()
                    .unwrap_or(Type::Void);
                Type::pointer(elem)
            }
            InstrKind::PropertyIteratorNew(_) => Type::opaque("EsPropertyIterator"),
            InstrKind::MetaContextLoad(_) | InstrKind::MetaPropertyLoad(_) => {
                Type::reference("")
            }
        }
    }

    /// Check operand types against the kind's signature
    pub fn check(&self, module: &Module) -> IrResult<()> {
        let context = self.mnemonic();
        let expect =
            |value: Value, ok: fn(&Type) -> bool, expected: &'static str| -> IrResult<()> {
                expect_type(module, context, value, ok, expected)
            };

        match self {
            InstrKind::Array(i) => {
                expect(i.array, Type::is_array, "array")?;
                if i.op == ArrayOp::Put && i.value.is_none() {
                    return Err(IrError::mismatch(context, "put value", Type::void()));
                }
                Ok(())
            }
            InstrKind::Branch(i) => expect(i.cond, Type::is_boolean, "boolean"),
            InstrKind::MemoryElementPointer(i) => {
                expect(i.value, is_array_or_pointer, "array or pointer")
            }
            InstrKind::Value(i) => {
                match i.op {
                    ValueOp::FromBoolean => expect(i.value, Type::is_boolean, "boolean")?,
                    ValueOp::FromDouble => expect(i.value, Type::is_double, "double")?,
                    ValueOp::FromString => expect(i.value, Type::is_string, "string")?,
                    _ => expect(i.value, Type::is_value, "value")?,
                }
                match (i.op, i.result) {
                    (ValueOp::ToDouble, Some(res)) => expect(res, Type::is_double, "double"),
                    (ValueOp::ToString, Some(res)) => expect(res, Type::is_string, "string"),
                    (ValueOp::ToDouble | ValueOp::ToString, None) => {
                        Err(IrError::mismatch(context, "result operand", Type::void()))
                    }
                    _ => Ok(()),
                }
            }
            InstrKind::ContextDelete(i) => expect(i.result, Type::is_value, "value"),
            InstrKind::PropertyDelete(i) => {
                if let Some(obj) = i.object {
                    expect(obj, Type::is_value, "value")?;
                }
                expect(i.result, Type::is_value, "value")
            }
            InstrKind::PropertyDeleteSlow(i) => {
                if let Some(obj) = i.object {
                    expect(obj, Type::is_value, "value")?;
                }
                expect(i.key, Type::is_value, "value")?;
                expect(i.result, Type::is_value, "value")
            }
            InstrKind::ExceptionLoadState(i) => expect(i.state, Type::is_value, "value"),
            InstrKind::ExceptionSet(i) => {
                expect(i.value, is_value_or_reference, "value or reference")
            }
            InstrKind::Link(i) => expect(i.value, Type::is_value_pointer, "value*"),
            _ => Ok(()),
        }
    }
}

fn expect_type(
    module: &Module,
    context: &'static str,
    value: Value,
    ok: fn(&Type) -> bool,
    expected: &'static str,
) -> IrResult<()> {
    let ty = module.type_of(value);
    if ok(&ty) {
        Ok(())
    } else {
        Err(IrError::mismatch(context, expected, ty))
    }
}

pub(crate) fn is_array_or_pointer(ty: &Type) -> bool {
    ty.is_array() || ty.is_pointer()
}

fn is_value_or_reference(ty: &Type) -> bool {
    ty.is_value() || ty.is_reference()
}

impl fmt::Display for InstrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// An instruction as stored in the module arena
#[derive(Debug, Clone)]
pub struct Instruction {
    pub(crate) kind: InstrKind,
    pub(crate) block: Option<BlockId>,
    pub(crate) persistent: bool,
}

impl Instruction {
    pub(crate) fn new(kind: InstrKind, block: BlockId) -> Self {
        Instruction {
            kind,
            block: Some(block),
            persistent: false,
        }
    }

    pub fn kind(&self) -> &InstrKind {
        &self.kind
    }

    /// Hosting block, `None` once removed
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    /// True if the value must outlive temporary storage in generated code
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn is_terminating(&self) -> bool {
        self.kind.is_terminating()
    }
}
