//! Visitor protocol
//!
//! Passes traverse the IR by implementing these traits. [`InstrVisitor`] has
//! one required method per concrete instruction kind and [`visit_instr`]
//! dispatches to them with an exhaustive match. Meta instructions have no
//! method: reaching one through [`visit_instr`] is an error.

use crate::block::BlockId;
use crate::constant::{Constant, SpecialValue};
use crate::error::{IrError, IrResult};
use crate::function::FunctionId;
use crate::instr::*;
use crate::module::Module;
use crate::resource::{Resource, StringResource};
use crate::types::Type;
use crate::value::{ConstId, InstrId, Value};

/// Visits modules, functions and blocks
pub trait NodeVisitor {
    fn visit_module(&mut self, module: &Module) -> IrResult<()>;
    fn visit_fun(&mut self, module: &Module, fun: FunctionId) -> IrResult<()>;
    fn visit_block(&mut self, module: &Module, block: BlockId) -> IrResult<()>;
}

/// Visits module resources
pub trait ResourceVisitor {
    fn visit_str_res(&mut self, module: &Module, res: &StringResource);
}

/// Visits constants
pub trait ConstVisitor {
    fn visit_const_arr_elm(&mut self, module: &Module, id: ConstId, array: Value, index: usize);
    fn visit_const_callee(&mut self, module: &Module, id: ConstId);
    fn visit_const_ret(&mut self, module: &Module, id: ConstId);
    fn visit_const_null(&mut self, module: &Module, id: ConstId, ty: &Type);
    fn visit_const_bool(&mut self, module: &Module, id: ConstId, value: bool);
    fn visit_const_double(&mut self, module: &Module, id: ConstId, value: f64);
    fn visit_const_strdouble(&mut self, module: &Module, id: ConstId, text: &str);
    fn visit_const_str(&mut self, module: &Module, id: ConstId, text: &str);
    fn visit_const_val(&mut self, module: &Module, id: ConstId, value: SpecialValue);
}

/// Visits concrete instructions
#[rustfmt::skip]
pub trait InstrVisitor {
    fn visit_instr_args_obj_init(&mut self, module: &Module, id: InstrId, instr: &ArgumentsObjectInit);
    fn visit_instr_args_obj_link(&mut self, module: &Module, id: InstrId, instr: &ArgumentsObjectLink);
    fn visit_instr_arr(&mut self, module: &Module, id: InstrId, instr: &ArrayAccess);
    fn visit_instr_bin(&mut self, module: &Module, id: InstrId, instr: &Binary);
    fn visit_instr_bnd_extra_init(&mut self, module: &Module, id: InstrId, instr: &BindExtraInit);
    fn visit_instr_bnd_extra_ptr(&mut self, module: &Module, id: InstrId, instr: &BindExtraPtr);
    fn visit_instr_call(&mut self, module: &Module, id: InstrId, instr: &Call);
    fn visit_instr_call_keyed(&mut self, module: &Module, id: InstrId, instr: &CallKeyed);
    fn visit_instr_call_keyed_slow(&mut self, module: &Module, id: InstrId, instr: &CallKeyedSlow);
    fn visit_instr_call_named(&mut self, module: &Module, id: InstrId, instr: &CallNamed);
    fn visit_instr_val(&mut self, module: &Module, id: InstrId, instr: &ValueConversion);
    fn visit_instr_br(&mut self, module: &Module, id: InstrId, instr: &Branch);
    fn visit_instr_jmp(&mut self, module: &Module, id: InstrId, instr: &Jump);
    fn visit_instr_ret(&mut self, module: &Module, id: InstrId, instr: &Return);
    fn visit_instr_mem_alloc(&mut self, module: &Module, id: InstrId, instr: &MemoryAlloc);
    fn visit_instr_mem_store(&mut self, module: &Module, id: InstrId, instr: &MemoryStore);
    fn visit_instr_mem_elm_ptr(&mut self, module: &Module, id: InstrId, instr: &MemoryElementPointer);
    fn visit_instr_ctx_set_strict(&mut self, module: &Module, id: InstrId, instr: &ContextSetStrict);
    fn visit_instr_ctx_enter_catch(&mut self, module: &Module, id: InstrId, instr: &ContextEnterCatch);
    fn visit_instr_ctx_enter_with(&mut self, module: &Module, id: InstrId, instr: &ContextEnterWith);
    fn visit_instr_ctx_leave(&mut self, module: &Module, id: InstrId);
    fn visit_instr_ctx_this(&mut self, module: &Module, id: InstrId);
    fn visit_instr_ctx_get(&mut self, module: &Module, id: InstrId, instr: &ContextGet);
    fn visit_instr_ctx_put(&mut self, module: &Module, id: InstrId, instr: &ContextPut);
    fn visit_instr_ctx_del(&mut self, module: &Module, id: InstrId, instr: &ContextDelete);
    fn visit_instr_ex_save_state(&mut self, module: &Module, id: InstrId);
    fn visit_instr_ex_load_state(&mut self, module: &Module, id: InstrId, instr: &ExceptionLoadState);
    fn visit_instr_ex_set(&mut self, module: &Module, id: InstrId, instr: &ExceptionSet);
    fn visit_instr_ex_clear(&mut self, module: &Module, id: InstrId);
    fn visit_instr_init_args(&mut self, module: &Module, id: InstrId, instr: &InitArguments);
    fn visit_instr_init_args_obj(&mut self, module: &Module, id: InstrId, instr: &InitArgumentsObject);
    fn visit_instr_decl(&mut self, module: &Module, id: InstrId, instr: &Declaration);
    fn visit_instr_link(&mut self, module: &Module, id: InstrId, instr: &Link);
    fn visit_instr_prp_def_data(&mut self, module: &Module, id: InstrId, instr: &PropertyDefineData);
    fn visit_instr_prp_def_accessor(&mut self, module: &Module, id: InstrId, instr: &PropertyDefineAccessor);
    fn visit_instr_prp_it_new(&mut self, module: &Module, id: InstrId, instr: &PropertyIteratorNew);
    fn visit_instr_prp_it_next(&mut self, module: &Module, id: InstrId, instr: &PropertyIteratorNext);
    fn visit_instr_prp_get(&mut self, module: &Module, id: InstrId, instr: &PropertyGet);
    fn visit_instr_prp_get_slow(&mut self, module: &Module, id: InstrId, instr: &PropertyGetSlow);
    fn visit_instr_prp_put(&mut self, module: &Module, id: InstrId, instr: &PropertyPut);
    fn visit_instr_prp_put_slow(&mut self, module: &Module, id: InstrId, instr: &PropertyPutSlow);
    fn visit_instr_prp_del(&mut self, module: &Module, id: InstrId, instr: &PropertyDelete);
    fn visit_instr_prp_del_slow(&mut self, module: &Module, id: InstrId, instr: &PropertyDeleteSlow);
    fn visit_instr_es_new_arr(&mut self, module: &Module, id: InstrId, instr: &EsNewArray);
    fn visit_instr_es_new_fun_decl(&mut self, module: &Module, id: InstrId, instr: &EsNewFunction);
    fn visit_instr_es_new_fun_expr(&mut self, module: &Module, id: InstrId, instr: &EsNewFunction);
    fn visit_instr_es_new_obj(&mut self, module: &Module, id: InstrId);
    fn visit_instr_es_new_rex(&mut self, module: &Module, id: InstrId, instr: &EsNewRegex);
    fn visit_instr_es_bin(&mut self, module: &Module, id: InstrId, instr: &EsBinary);
    fn visit_instr_es_unary(&mut self, module: &Module, id: InstrId, instr: &EsUnary);
}

/// Dispatch an instruction to its visitor method
pub fn visit_instr<V: InstrVisitor + ?Sized>(
    visitor: &mut V,
    module: &Module,
    id: InstrId,
) -> IrResult<()> {
    let m = module;
    match module.instr(id).kind() {
        InstrKind::ArgumentsObjectInit(i) => visitor.visit_instr_args_obj_init(m, id, i),
        InstrKind::ArgumentsObjectLink(i) => visitor.visit_instr_args_obj_link(m, id, i),
        InstrKind::Array(i) => visitor.visit_instr_arr(m, id, i),
        InstrKind::Binary(i) => visitor.visit_instr_bin(m, id, i),
        InstrKind::BindExtraInit(i) => visitor.visit_instr_bnd_extra_init(m, id, i),
        InstrKind::BindExtraPtr(i) => visitor.visit_instr_bnd_extra_ptr(m, id, i),
        InstrKind::Call(i) => visitor.visit_instr_call(m, id, i),
        InstrKind::CallKeyed(i) => visitor.visit_instr_call_keyed(m, id, i),
        InstrKind::CallKeyedSlow(i) => visitor.visit_instr_call_keyed_slow(m, id, i),
        InstrKind::CallNamed(i) => visitor.visit_instr_call_named(m, id, i),
        InstrKind::Value(i) => visitor.visit_instr_val(m, id, i),
        InstrKind::Branch(i) => visitor.visit_instr_br(m, id, i),
        InstrKind::Jump(i) => visitor.visit_instr_jmp(m, id, i),
        InstrKind::Return(i) => visitor.visit_instr_ret(m, id, i),
        InstrKind::MemoryAlloc(i) => visitor.visit_instr_mem_alloc(m, id, i),
        InstrKind::MemoryStore(i) => visitor.visit_instr_mem_store(m, id, i),
        InstrKind::MemoryElementPointer(i) => visitor.visit_instr_mem_elm_ptr(m, id, i),
        InstrKind::ContextSetStrict(i) => visitor.visit_instr_ctx_set_strict(m, id, i),
        InstrKind::ContextEnterCatch(i) => visitor.visit_instr_ctx_enter_catch(m, id, i),
        InstrKind::ContextEnterWith(i) => visitor.visit_instr_ctx_enter_with(m, id, i),
        InstrKind::ContextLeave => visitor.visit_instr_ctx_leave(m, id),
        InstrKind::ContextThis => visitor.visit_instr_ctx_this(m, id),
        InstrKind::ContextGet(i) => visitor.visit_instr_ctx_get(m, id, i),
        InstrKind::ContextPut(i) => visitor.visit_instr_ctx_put(m, id, i),
        InstrKind::ContextDelete(i) => visitor.visit_instr_ctx_del(m, id, i),
        InstrKind::ExceptionSaveState => visitor.visit_instr_ex_save_state(m, id),
        InstrKind::ExceptionLoadState(i) => visitor.visit_instr_ex_load_state(m, id, i),
        InstrKind::ExceptionSet(i) => visitor.visit_instr_ex_set(m, id, i),
        InstrKind::ExceptionClear => visitor.visit_instr_ex_clear(m, id),
        InstrKind::InitArguments(i) => visitor.visit_instr_init_args(m, id, i),
        InstrKind::InitArgumentsObject(i) => visitor.visit_instr_init_args_obj(m, id, i),
        InstrKind::Declaration(i) => visitor.visit_instr_decl(m, id, i),
        InstrKind::Link(i) => visitor.visit_instr_link(m, id, i),
        InstrKind::PropertyDefineData(i) => visitor.visit_instr_prp_def_data(m, id, i),
        InstrKind::PropertyDefineAccessor(i) => visitor.visit_instr_prp_def_accessor(m, id, i),
        InstrKind::PropertyIteratorNew(i) => visitor.visit_instr_prp_it_new(m, id, i),
        InstrKind::PropertyIteratorNext(i) => visitor.visit_instr_prp_it_next(m, id, i),
        InstrKind::PropertyGet(i) => visitor.visit_instr_prp_get(m, id, i),
        InstrKind::PropertyGetSlow(i) => visitor.visit_instr_prp_get_slow(m, id, i),
        InstrKind::PropertyPut(i) => visitor.visit_instr_prp_put(m, id, i),
        InstrKind::PropertyPutSlow(i) => visitor.visit_instr_prp_put_slow(m, id, i),
        InstrKind::PropertyDelete(i) => visitor.visit_instr_prp_del(m, id, i),
        InstrKind::PropertyDeleteSlow(i) => visitor.visit_instr_prp_del_slow(m, id, i),
        InstrKind::EsNewArray(i) => visitor.visit_instr_es_new_arr(m, id, i),
        InstrKind::EsNewFunctionDeclaration(i) => visitor.visit_instr_es_new_fun_decl(m, id, i),
        InstrKind::EsNewFunctionExpression(i) => visitor.visit_instr_es_new_fun_expr(m, id, i),
        InstrKind::EsNewObject => visitor.visit_instr_es_new_obj(m, id),
        InstrKind::EsNewRegex(i) => visitor.visit_instr_es_new_rex(m, id, i),
        InstrKind::EsBinary(i) => visitor.visit_instr_es_bin(m, id, i),
        InstrKind::EsUnary(i) => visitor.visit_instr_es_unary(m, id, i),
        kind @ (InstrKind::MetaContextLoad(_) | InstrKind::MetaPropertyLoad(_)) => {
            return Err(IrError::MetaInstruction {
                instr: id,
                kind: kind.mnemonic(),
            });
        }
    }
    Ok(())
}

/// Dispatch a constant to its visitor method
pub fn visit_const<V: ConstVisitor + ?Sized>(visitor: &mut V, module: &Module, id: ConstId) {
    match module.constant(id) {
        Constant::ArrayElement { array, index } => {
            visitor.visit_const_arr_elm(module, id, *array, *index)
        }
        Constant::Callee => visitor.visit_const_callee(module, id),
        Constant::Return => visitor.visit_const_ret(module, id),
        Constant::Null(ty) => visitor.visit_const_null(module, id, ty),
        Constant::Boolean(value) => visitor.visit_const_bool(module, id, *value),
        Constant::Double(value) => visitor.visit_const_double(module, id, *value),
        Constant::StringifiedDouble(text) => visitor.visit_const_strdouble(module, id, text),
        Constant::String(text) => visitor.visit_const_str(module, id, text),
        Constant::Value(value) => visitor.visit_const_val(module, id, *value),
    }
}

/// Dispatch a resource to its visitor method
pub fn visit_resource<V: ResourceVisitor + ?Sized>(
    visitor: &mut V,
    module: &Module,
    resource: &Resource,
) {
    match resource {
        Resource::String(res) => visitor.visit_str_res(module, res),
    }
}

/// Visit every resource, then every pushed function
pub fn walk_module<V>(visitor: &mut V, module: &Module) -> IrResult<()>
where
    V: NodeVisitor + ResourceVisitor + ?Sized,
{
    for resource in module.resources() {
        visit_resource(visitor, module, resource);
    }
    for fun in module.function_ids() {
        visitor.visit_fun(module, *fun)?;
    }
    Ok(())
}

/// Visit every block of a function in order
pub fn walk_fun<V: NodeVisitor + ?Sized>(
    visitor: &mut V,
    module: &Module,
    fun: FunctionId,
) -> IrResult<()> {
    for block in module.function(fun).blocks() {
        visitor.visit_block(module, *block)?;
    }
    Ok(())
}

/// Visit every instruction of a block in order
pub fn walk_block<V: InstrVisitor + ?Sized>(
    visitor: &mut V,
    module: &Module,
    block: BlockId,
) -> IrResult<()> {
    for id in module.block(block).instrs() {
        visit_instr(visitor, module, *id)?;
    }
    Ok(())
}
