//! Module: the arena that owns every IR node
//!
//! Instructions, constants, blocks and functions are stored in flat vectors
//! and referenced by index. Removing a node unlinks it from its containing
//! sequence; the storage itself lives until the module is dropped.

use crate::block::{Block, BlockId};
use crate::builder::BlockBuilder;
use crate::constant::{ConstData, Constant, SpecialValue};
use crate::error::{IrError, IrResult};
use crate::function::{Function, FunctionId};
use crate::instr::{is_array_or_pointer, InstrKind, Instruction};
use crate::node::Meta;
use crate::resource::ResourceTable;
use crate::types::Type;
use crate::value::{ConstId, InstrId, Value};

/// A compilation unit
///
/// Accessors taking an id panic if the id was not created by this module.
#[derive(Debug, Clone, Default)]
pub struct Module {
    instrs: Vec<Instruction>,
    consts: Vec<ConstData>,
    blocks: Vec<Block>,
    functions: Vec<Function>,
    order: Vec<FunctionId>,
    pub(crate) resources: ResourceTable,
    meta: Meta,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn set_meta(&mut self, meta: Meta) {
        self.meta = meta;
    }

    // ------------------------------------------------------------------------
    // Functions
    // ------------------------------------------------------------------------

    /// Create a function seeded with one empty block and push it
    pub fn new_function(&mut self, name: impl Into<String>, is_global: bool) -> FunctionId {
        let id = self.create_function(name, is_global);
        self.functions[id.index()].pushed = true;
        self.order.push(id);
        id
    }

    /// Create a function without pushing it onto the module
    pub fn create_function(&mut self, name: impl Into<String>, is_global: bool) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        let entry = self.new_block(Some("entry"));
        self.blocks[entry.index()].function = Some(id);
        self.functions.push(Function::new(id, name.into(), is_global, entry));
        id
    }

    /// Append a function created with [`Module::create_function`]
    pub fn push_function(&mut self, fun: FunctionId) -> IrResult<()> {
        let function = &mut self.functions[fun.index()];
        if function.pushed {
            return Err(IrError::FunctionAlreadyPushed { function: fun });
        }
        function.pushed = true;
        self.order.push(fun);
        Ok(())
    }

    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut Function {
        &mut self.functions[id.index()]
    }

    /// Pushed functions in push order
    pub fn functions(&self) -> impl Iterator<Item = &Function> + '_ {
        self.order.iter().map(move |id| &self.functions[id.index()])
    }

    pub fn function_ids(&self) -> &[FunctionId] {
        &self.order
    }

    // ------------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------------

    /// Create a detached block
    pub fn new_block(&mut self, label: Option<&str>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::new(id, label.map(str::to_string)));
        id
    }

    /// Append a detached block to a function
    pub fn push_block(&mut self, fun: FunctionId, block: BlockId) -> IrResult<()> {
        if self.blocks[block.index()].function.is_some() {
            return Err(IrError::BlockAlreadyLinked { block });
        }

        let last = self.functions[fun.index()].last_block();
        if self.blocks[last.index()].is_empty() {
            return Err(IrError::EmptyBlock { block: last });
        }

        self.blocks[block.index()].function = Some(fun);
        self.functions[fun.index()].blocks.push(block);
        Ok(())
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Every block in the arena, linked or not
    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.blocks.iter()
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }

    /// Builder that appends instructions to `block`
    pub fn builder(&mut self, block: BlockId) -> BlockBuilder<'_> {
        BlockBuilder::new(self, block)
    }

    /// Unlink a block from its function
    ///
    /// Only blocks without referrers from other blocks can be removed. The
    /// block's own instructions are unlinked with it.
    pub fn remove_block(&mut self, fun: FunctionId, block: BlockId) -> IrResult<()> {
        let function = &self.functions[fun.index()];
        let Some(pos) = function.blocks.iter().position(|b| *b == block) else {
            return Err(IrError::BlockNotInFunction {
                block,
                function: fun,
            });
        };
        if pos == 0 {
            return Err(IrError::EntryBlock {
                block,
                function: fun,
            });
        }

        let foreign = self.blocks[block.index()]
            .referrers
            .iter()
            .filter(|r| self.instrs[r.index()].block != Some(block))
            .count();
        if foreign > 0 {
            return Err(IrError::BlockInUse {
                block,
                referrers: foreign,
            });
        }

        let instrs = std::mem::take(&mut self.blocks[block.index()].instrs);
        for id in instrs {
            self.deregister_targets(id);
            self.instrs[id.index()].block = None;
        }

        self.functions[fun.index()].blocks.remove(pos);
        self.blocks[block.index()].function = None;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Instructions
    // ------------------------------------------------------------------------

    pub fn instr(&self, id: InstrId) -> &Instruction {
        &self.instrs[id.index()]
    }

    pub(crate) fn push_instr(&mut self, block: BlockId, kind: InstrKind) -> IrResult<Value> {
        if let Some(last) = self.blocks[block.index()].instrs.last() {
            if self.instrs[last.index()].is_terminating() {
                return Err(IrError::PushAfterTerminator { block });
            }
        }
        let id = InstrId(self.instrs.len() as u32);
        self.check_operands(id, &kind)?;
        kind.check(self)?;

        self.instrs.push(Instruction::new(kind, block));
        self.blocks[block.index()].instrs.push(id);
        self.register_targets(id);
        self.apply_persistence(id);
        Ok(Value::Instr(id))
    }

    /// Unlink an instruction from its block
    pub fn remove_instr(&mut self, id: InstrId) -> IrResult<()> {
        let block = self.instrs[id.index()]
            .block
            .ok_or(IrError::InstrNotLinked { instr: id })?;

        self.deregister_targets(id);
        self.blocks[block.index()].instrs.retain(|i| *i != id);
        self.instrs[id.index()].block = None;
        Ok(())
    }

    /// Replace an instruction in place
    ///
    /// A terminator can only be replaced by a terminator and a
    /// non-terminator only by a non-terminator.
    pub fn replace_instr(&mut self, id: InstrId, kind: InstrKind) -> IrResult<()> {
        let old = &self.instrs[id.index()];
        if old.is_terminating() != kind.is_terminating() {
            return Err(IrError::TerminatorKindChange { instr: id });
        }
        self.check_operands(id, &kind)?;
        kind.check(self)?;

        let linked = old.block.is_some();
        if linked {
            self.deregister_targets(id);
        }
        self.instrs[id.index()].kind = kind;
        if linked {
            self.register_targets(id);
        }
        self.apply_persistence(id);
        Ok(())
    }

    /// Redirect every edge of a terminator from `old` to `new`
    pub fn retarget(&mut self, id: InstrId, old: BlockId, new: BlockId) -> IrResult<()> {
        let instr = &mut self.instrs[id.index()];
        let linked = instr.block.is_some();
        let found = match &mut instr.kind {
            InstrKind::Branch(br) => {
                let mut found = false;
                if br.true_block == old {
                    br.true_block = new;
                    found = true;
                }
                if br.false_block == old {
                    br.false_block = new;
                    found = true;
                }
                found
            }
            InstrKind::Jump(jmp) => {
                let found = jmp.block == old;
                if found {
                    jmp.block = new;
                }
                found
            }
            InstrKind::Return(_) => false,
            _ => return Err(IrError::NotATerminator { instr: id }),
        };
        if !found {
            return Err(IrError::TargetNotFound {
                instr: id,
                block: old,
            });
        }

        if linked {
            self.blocks[old.index()].remove_referrer(id);
            self.blocks[new.index()].add_referrer(id);
        }
        Ok(())
    }

    /// Reject operands defined at or after `id`, and unknown targets
    ///
    /// Every instruction operand, including one reached through an
    /// array-element constant, must precede `id`, so the operand graph stays
    /// acyclic.
    fn check_operands(&self, id: InstrId, kind: &InstrKind) -> IrResult<()> {
        for operand in kind.operands() {
            self.check_value(operand)?;
            if self.operand_root(operand).is_some_and(|root| root >= id) {
                return Err(IrError::UndefinedOperand { instr: id, operand });
            }
        }
        for block in kind.targets() {
            if block.index() >= self.blocks.len() {
                return Err(IrError::UnknownBlock { block });
            }
        }
        Ok(())
    }

    fn check_value(&self, value: Value) -> IrResult<()> {
        let known = match value {
            Value::Instr(id) => id.index() < self.instrs.len(),
            Value::Const(id) => id.index() < self.consts.len(),
        };
        if known {
            Ok(())
        } else {
            Err(IrError::UnknownValue { value })
        }
    }

    /// Instruction an operand ultimately reads from
    fn operand_root(&self, value: Value) -> Option<InstrId> {
        match value {
            Value::Instr(id) => Some(id),
            Value::Const(id) => match &self.consts[id.index()].constant {
                Constant::ArrayElement { array, .. } => self.operand_root(*array),
                _ => None,
            },
        }
    }

    fn register_targets(&mut self, id: InstrId) {
        for target in self.instrs[id.index()].kind.targets() {
            self.blocks[target.index()].add_referrer(id);
        }
    }

    fn deregister_targets(&mut self, id: InstrId) {
        for target in self.instrs[id.index()].kind.targets() {
            self.blocks[target.index()].remove_referrer(id);
        }
    }

    fn apply_persistence(&mut self, id: InstrId) {
        let target = match &self.instrs[id.index()].kind {
            InstrKind::MemoryElementPointer(i) => Some(i.value),
            InstrKind::PropertyIteratorNew(_) => Some(Value::Instr(id)),
            _ => None,
        };
        if let Some(value) = target {
            self.make_persistent(value);
        }
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    /// Static type of an operand
    pub fn type_of(&self, value: Value) -> Type {
        match value {
            Value::Instr(id) => self.instrs[id.index()].kind.result_type(self),
            Value::Const(id) => match &self.consts[id.index()].constant {
                Constant::ArrayElement { array, .. } => self
                    .type_of(*array)
                    .element()
                    .cloned()
                    .unwrap_or(Type::Void),
                Constant::Callee | Constant::Return | Constant::Value(_) => Type::value(),
                Constant::Null(ty) => ty.clone(),
                Constant::Boolean(_) => Type::boolean(),
                Constant::Double(_) | Constant::StringifiedDouble(_) => Type::double(),
                Constant::String(_) => Type::string(),
            },
        }
    }

    pub fn is_constant(&self, value: Value) -> bool {
        value.is_constant()
    }

    /// Mark a value as outliving temporary storage
    pub fn make_persistent(&mut self, value: Value) {
        match value {
            Value::Instr(id) => self.instrs[id.index()].persistent = true,
            Value::Const(id) => self.consts[id.index()].persistent = true,
        }
    }

    pub fn is_persistent(&self, value: Value) -> bool {
        match value {
            Value::Instr(id) => self.instrs[id.index()].persistent,
            Value::Const(id) => self.consts[id.index()].persistent,
        }
    }

    // ------------------------------------------------------------------------
    // Constants
    // ------------------------------------------------------------------------

    pub fn constant(&self, id: ConstId) -> &Constant {
        &self.consts[id.index()].constant
    }

    fn add_const(&mut self, constant: Constant) -> Value {
        let id = ConstId(self.consts.len() as u32);
        self.consts.push(ConstData::new(constant));
        Value::Const(id)
    }

    /// Element `index` of an array or pointer operand
    pub fn const_array_element(&mut self, array: Value, index: usize) -> IrResult<Value> {
        self.check_value(array)?;
        let ty = self.type_of(array);
        if !is_array_or_pointer(&ty) {
            return Err(IrError::mismatch("array_elm", "array or pointer", ty));
        }
        Ok(self.add_const(Constant::ArrayElement { array, index }))
    }

    pub fn const_callee(&mut self) -> Value {
        self.add_const(Constant::Callee)
    }

    pub fn const_return(&mut self) -> Value {
        self.add_const(Constant::Return)
    }

    pub fn const_null(&mut self, ty: Type) -> Value {
        self.add_const(Constant::Null(ty))
    }

    pub fn const_bool(&mut self, value: bool) -> Value {
        self.add_const(Constant::Boolean(value))
    }

    pub fn const_double(&mut self, value: f64) -> Value {
        self.add_const(Constant::Double(value))
    }

    pub fn const_stringified_double(&mut self, text: impl Into<String>) -> Value {
        self.add_const(Constant::StringifiedDouble(text.into()))
    }

    pub fn const_str(&mut self, text: impl Into<String>) -> Value {
        self.add_const(Constant::String(text.into()))
    }

    pub fn const_value(&mut self, value: SpecialValue) -> Value {
        self.add_const(Constant::Value(value))
    }
}
