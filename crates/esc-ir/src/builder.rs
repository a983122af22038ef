//! Block builder
//!
//! [`BlockBuilder`] carries one `push_*` method per instruction form. Each
//! push type-checks its operands, appends the instruction to the block and,
//! for terminators, registers the instruction with every target block.

use crate::block::BlockId;
use crate::error::IrResult;
use crate::function::FunctionId;
use crate::instr::*;
use crate::module::Module;
use crate::types::Type;
use crate::value::Value;

/// Appends instructions to one block of a module
pub struct BlockBuilder<'a> {
    module: &'a mut Module,
    block: BlockId,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(module: &'a mut Module, block: BlockId) -> Self {
        Self { module, block }
    }

    /// The block instructions are appended to
    pub fn block(&self) -> BlockId {
        self.block
    }

    /// Switch to appending to another block
    pub fn switch_to(&mut self, block: BlockId) {
        self.block = block;
    }

    /// The underlying module, for creating constants and blocks mid-build
    pub fn module(&mut self) -> &mut Module {
        self.module
    }

    /// Append an instruction of any kind
    pub fn push(&mut self, kind: InstrKind) -> IrResult<Value> {
        self.module.push_instr(self.block, kind)
    }

    // ========================================================================
    // Arguments and bindings
    // ========================================================================

    pub fn push_args_obj_init(&mut self, argc: i32) -> IrResult<Value> {
        self.push(InstrKind::ArgumentsObjectInit(ArgumentsObjectInit { argc }))
    }

    pub fn push_args_obj_link(&mut self, args: Value, index: i32, value: Value) -> IrResult<Value> {
        self.push(InstrKind::ArgumentsObjectLink(ArgumentsObjectLink {
            args,
            index,
            value,
        }))
    }

    pub fn push_bnd_extra_init(&mut self, num_extra: i32) -> IrResult<Value> {
        self.push(InstrKind::BindExtraInit(BindExtraInit { num_extra }))
    }

    pub fn push_bnd_extra_ptr(&mut self, hops: i32) -> IrResult<Value> {
        self.push(InstrKind::BindExtraPtr(BindExtraPtr { hops }))
    }

    pub fn push_init_args(&mut self, dst: Value, prmc: i32) -> IrResult<Value> {
        self.push(InstrKind::InitArguments(InitArguments { dst, prmc }))
    }

    pub fn push_init_args_obj(&mut self, prmc: i32, prmv: Value) -> IrResult<Value> {
        self.push(InstrKind::InitArgumentsObject(InitArgumentsObject { prmc, prmv }))
    }

    // ========================================================================
    // Arrays and low-level arithmetic
    // ========================================================================

    pub fn push_arr_get(&mut self, index: usize, array: Value) -> IrResult<Value> {
        self.push(InstrKind::Array(ArrayAccess {
            op: ArrayOp::Get,
            index,
            array,
            value: None,
        }))
    }

    pub fn push_arr_put(&mut self, index: usize, array: Value, value: Value) -> IrResult<Value> {
        self.push(InstrKind::Array(ArrayAccess {
            op: ArrayOp::Put,
            index,
            array,
            value: Some(value),
        }))
    }

    fn push_bin(&mut self, op: BinaryOp, left: Value, right: Value) -> IrResult<Value> {
        self.push(InstrKind::Binary(Binary { op, left, right }))
    }

    pub fn push_bin_add(&mut self, left: Value, right: Value) -> IrResult<Value> {
        self.push_bin(BinaryOp::Add, left, right)
    }

    pub fn push_bin_sub(&mut self, left: Value, right: Value) -> IrResult<Value> {
        self.push_bin(BinaryOp::Sub, left, right)
    }

    pub fn push_bin_or(&mut self, left: Value, right: Value) -> IrResult<Value> {
        self.push_bin(BinaryOp::Or, left, right)
    }

    pub fn push_bin_eq(&mut self, left: Value, right: Value) -> IrResult<Value> {
        self.push_bin(BinaryOp::Eq, left, right)
    }

    // ========================================================================
    // Calls
    // ========================================================================

    pub fn push_call(
        &mut self,
        function: Value,
        argc: i32,
        argv: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::Call(Call {
            op: CallOp::Normal,
            function,
            argc,
            argv,
            result,
        }))
    }

    pub fn push_call_new(
        &mut self,
        function: Value,
        argc: i32,
        argv: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::Call(Call {
            op: CallOp::New,
            function,
            argc,
            argv,
            result,
        }))
    }

    pub fn push_call_keyed(
        &mut self,
        object: Value,
        key: u64,
        argc: i32,
        argv: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::CallKeyed(CallKeyed {
            object,
            key,
            argc,
            argv,
            result,
        }))
    }

    pub fn push_call_keyed_slow(
        &mut self,
        object: Value,
        key: Value,
        argc: i32,
        argv: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::CallKeyedSlow(CallKeyedSlow {
            object,
            key,
            argc,
            argv,
            result,
        }))
    }

    pub fn push_call_named(
        &mut self,
        key: u64,
        argc: i32,
        argv: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::CallNamed(CallNamed {
            key,
            argc,
            argv,
            result,
        }))
    }

    // ========================================================================
    // Value conversions
    // ========================================================================

    fn push_val(&mut self, op: ValueOp, value: Value, result: Option<Value>) -> IrResult<Value> {
        self.push(InstrKind::Value(ValueConversion { op, value, result }))
    }

    pub fn push_val_to_bool(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::ToBoolean, value, None)
    }

    pub fn push_val_to_double(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_val(ValueOp::ToDouble, value, Some(result))
    }

    pub fn push_val_to_str(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_val(ValueOp::ToString, value, Some(result))
    }

    pub fn push_val_from_bool(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::FromBoolean, value, None)
    }

    pub fn push_val_from_double(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::FromDouble, value, None)
    }

    pub fn push_val_from_str(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::FromString, value, None)
    }

    pub fn push_val_is_null(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::IsNull, value, None)
    }

    pub fn push_val_is_undefined(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::IsUndefined, value, None)
    }

    pub fn push_val_tst_coerc(&mut self, value: Value) -> IrResult<Value> {
        self.push_val(ValueOp::TestCoercibility, value, None)
    }

    // ========================================================================
    // Terminators
    // ========================================================================

    pub fn push_trm_br(
        &mut self,
        cond: Value,
        true_block: BlockId,
        false_block: BlockId,
    ) -> IrResult<Value> {
        self.push(InstrKind::Branch(Branch {
            cond,
            true_block,
            false_block,
        }))
    }

    pub fn push_trm_jmp(&mut self, block: BlockId) -> IrResult<Value> {
        self.push(InstrKind::Jump(Jump { block }))
    }

    pub fn push_trm_ret(&mut self, value: Value) -> IrResult<Value> {
        self.push(InstrKind::Return(Return { value }))
    }

    // ========================================================================
    // Memory
    // ========================================================================

    pub fn push_mem_alloc(&mut self, ty: Type) -> IrResult<Value> {
        self.push(InstrKind::MemoryAlloc(MemoryAlloc { ty }))
    }

    pub fn push_mem_store(&mut self, dst: Value, src: Value) -> IrResult<Value> {
        self.push(InstrKind::MemoryStore(MemoryStore { dst, src }))
    }

    pub fn push_mem_elm_ptr(&mut self, value: Value, index: usize) -> IrResult<Value> {
        self.push(InstrKind::MemoryElementPointer(MemoryElementPointer {
            value,
            index,
        }))
    }

    // ========================================================================
    // Context
    // ========================================================================

    pub fn push_ctx_set_strict(&mut self, strict: bool) -> IrResult<Value> {
        self.push(InstrKind::ContextSetStrict(ContextSetStrict { strict }))
    }

    pub fn push_ctx_enter_catch(&mut self, key: u64) -> IrResult<Value> {
        self.push(InstrKind::ContextEnterCatch(ContextEnterCatch { key }))
    }

    pub fn push_ctx_enter_with(&mut self, value: Value) -> IrResult<Value> {
        self.push(InstrKind::ContextEnterWith(ContextEnterWith { value }))
    }

    pub fn push_ctx_leave(&mut self) -> IrResult<Value> {
        self.push(InstrKind::ContextLeave)
    }

    pub fn push_ctx_this(&mut self) -> IrResult<Value> {
        self.push(InstrKind::ContextThis)
    }

    pub fn push_ctx_get(&mut self, key: u64, result: Value, cache_id: u16) -> IrResult<Value> {
        self.push(InstrKind::ContextGet(ContextGet {
            key,
            result,
            cache_id,
        }))
    }

    pub fn push_ctx_put(&mut self, key: u64, value: Value, cache_id: u16) -> IrResult<Value> {
        self.push(InstrKind::ContextPut(ContextPut {
            key,
            value,
            cache_id,
        }))
    }

    pub fn push_ctx_del(&mut self, key: u64, result: Value) -> IrResult<Value> {
        self.push(InstrKind::ContextDelete(ContextDelete { key, result }))
    }

    // ========================================================================
    // Exceptions
    // ========================================================================

    pub fn push_ex_save_state(&mut self) -> IrResult<Value> {
        self.push(InstrKind::ExceptionSaveState)
    }

    pub fn push_ex_load_state(&mut self, state: Value) -> IrResult<Value> {
        self.push(InstrKind::ExceptionLoadState(ExceptionLoadState { state }))
    }

    pub fn push_ex_set(&mut self, value: Value) -> IrResult<Value> {
        self.push(InstrKind::ExceptionSet(ExceptionSet { value }))
    }

    pub fn push_ex_clear(&mut self) -> IrResult<Value> {
        self.push(InstrKind::ExceptionClear)
    }

    // ========================================================================
    // Declarations and links
    // ========================================================================

    fn push_decl(&mut self, kind: DeclarationKind, key: u64, is_strict: bool) -> IrResult<Value> {
        self.push(InstrKind::Declaration(Declaration {
            kind,
            key,
            is_strict,
        }))
    }

    pub fn push_decl_var(&mut self, key: u64, is_strict: bool) -> IrResult<Value> {
        self.push_decl(DeclarationKind::Variable, key, is_strict)
    }

    pub fn push_decl_fun(&mut self, key: u64, is_strict: bool, value: Value) -> IrResult<Value> {
        self.push_decl(DeclarationKind::Function { value }, key, is_strict)
    }

    pub fn push_decl_prm(
        &mut self,
        key: u64,
        is_strict: bool,
        index: i32,
        array: Value,
    ) -> IrResult<Value> {
        self.push_decl(DeclarationKind::Parameter { index, array }, key, is_strict)
    }

    fn push_link(
        &mut self,
        kind: LinkKind,
        key: u64,
        is_strict: bool,
        value: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::Link(Link {
            kind,
            key,
            is_strict,
            value,
        }))
    }

    pub fn push_link_var(&mut self, key: u64, is_strict: bool, value: Value) -> IrResult<Value> {
        self.push_link(LinkKind::Variable, key, is_strict, value)
    }

    pub fn push_link_fun(&mut self, key: u64, is_strict: bool, value: Value) -> IrResult<Value> {
        self.push_link(LinkKind::Function, key, is_strict, value)
    }

    pub fn push_link_prm(&mut self, key: u64, is_strict: bool, value: Value) -> IrResult<Value> {
        self.push_link(LinkKind::Parameter, key, is_strict, value)
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn push_prp_def_data(&mut self, object: Value, key: Value, value: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyDefineData(PropertyDefineData {
            object,
            key,
            value,
        }))
    }

    pub fn push_prp_def_accessor(
        &mut self,
        object: Value,
        key: u64,
        function: Value,
        is_setter: bool,
    ) -> IrResult<Value> {
        self.push(InstrKind::PropertyDefineAccessor(PropertyDefineAccessor {
            object,
            key,
            function,
            is_setter,
        }))
    }

    pub fn push_prp_it_new(&mut self, object: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyIteratorNew(PropertyIteratorNew { object }))
    }

    pub fn push_prp_it_next(&mut self, iterator: Value, value: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyIteratorNext(PropertyIteratorNext {
            iterator,
            value,
        }))
    }

    pub fn push_prp_get(&mut self, object: Value, key: u64, result: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyGet(PropertyGet {
            object,
            key,
            result,
        }))
    }

    pub fn push_prp_get_slow(&mut self, object: Value, key: Value, result: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyGetSlow(PropertyGetSlow {
            object,
            key,
            result,
        }))
    }

    pub fn push_prp_put(&mut self, object: Value, key: u64, value: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyPut(PropertyPut { object, key, value }))
    }

    pub fn push_prp_put_slow(&mut self, object: Value, key: Value, value: Value) -> IrResult<Value> {
        self.push(InstrKind::PropertyPutSlow(PropertyPutSlow { object, key, value }))
    }

    /// Delete a property; `None` deletes from the global object
    pub fn push_prp_del(
        &mut self,
        object: Option<Value>,
        key: u64,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::PropertyDelete(PropertyDelete {
            object,
            key,
            result,
        }))
    }

    pub fn push_prp_del_slow(
        &mut self,
        object: Option<Value>,
        key: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::PropertyDeleteSlow(PropertyDeleteSlow {
            object,
            key,
            result,
        }))
    }

    // ========================================================================
    // Object creation
    // ========================================================================

    pub fn push_es_new_arr(&mut self, length: usize, values: Value) -> IrResult<Value> {
        self.push(InstrKind::EsNewArray(EsNewArray { length, values }))
    }

    /// Create the function object for a function declaration
    pub fn push_es_new_fun(
        &mut self,
        function: FunctionId,
        parameter_count: i32,
        is_strict: bool,
    ) -> IrResult<Value> {
        self.push(InstrKind::EsNewFunctionDeclaration(EsNewFunction {
            function,
            parameter_count,
            is_strict,
        }))
    }

    pub fn push_es_new_fun_expr(
        &mut self,
        function: FunctionId,
        parameter_count: i32,
        is_strict: bool,
    ) -> IrResult<Value> {
        self.push(InstrKind::EsNewFunctionExpression(EsNewFunction {
            function,
            parameter_count,
            is_strict,
        }))
    }

    pub fn push_es_new_obj(&mut self) -> IrResult<Value> {
        self.push(InstrKind::EsNewObject)
    }

    pub fn push_es_new_rex(&mut self, pattern: &str, flags: &str) -> IrResult<Value> {
        self.push(InstrKind::EsNewRegex(EsNewRegex {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
        }))
    }

    // ========================================================================
    // Language operators
    // ========================================================================

    /// Language-level binary operator; the operator result is written to `result`
    pub fn push_es_bin(
        &mut self,
        op: EsBinaryOp,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push(InstrKind::EsBinary(EsBinary {
            op,
            left,
            right,
            result,
        }))
    }

    pub fn push_es_bin_mul(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Mul, left, right, result)
    }

    pub fn push_es_bin_div(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Div, left, right, result)
    }

    pub fn push_es_bin_mod(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Mod, left, right, result)
    }

    pub fn push_es_bin_add(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Add, left, right, result)
    }

    pub fn push_es_bin_sub(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Sub, left, right, result)
    }

    pub fn push_es_bin_ls(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Ls, left, right, result)
    }

    pub fn push_es_bin_rss(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Rss, left, right, result)
    }

    pub fn push_es_bin_rus(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Rus, left, right, result)
    }

    pub fn push_es_bin_lt(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Lt, left, right, result)
    }

    pub fn push_es_bin_gt(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Gt, left, right, result)
    }

    pub fn push_es_bin_lte(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Lte, left, right, result)
    }

    pub fn push_es_bin_gte(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Gte, left, right, result)
    }

    pub fn push_es_bin_in(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::In, left, right, result)
    }

    pub fn push_es_bin_instanceof(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::InstanceOf, left, right, result)
    }

    pub fn push_es_bin_eq(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Eq, left, right, result)
    }

    pub fn push_es_bin_neq(&mut self, left: Value, right: Value, result: Value) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::Neq, left, right, result)
    }

    pub fn push_es_bin_strict_eq(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::StrictEq, left, right, result)
    }

    pub fn push_es_bin_strict_neq(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::StrictNeq, left, right, result)
    }

    pub fn push_es_bin_bit_and(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::BitAnd, left, right, result)
    }

    pub fn push_es_bin_bit_xor(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::BitXor, left, right, result)
    }

    pub fn push_es_bin_bit_or(
        &mut self,
        left: Value,
        right: Value,
        result: Value,
    ) -> IrResult<Value> {
        self.push_es_bin(EsBinaryOp::BitOr, left, right, result)
    }

    pub fn push_es_unary(&mut self, op: EsUnaryOp, value: Value, result: Value) -> IrResult<Value> {
        self.push(InstrKind::EsUnary(EsUnary { op, value, result }))
    }

    pub fn push_es_unary_typeof(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_es_unary(EsUnaryOp::Typeof, value, result)
    }

    pub fn push_es_unary_neg(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_es_unary(EsUnaryOp::Neg, value, result)
    }

    pub fn push_es_unary_bit_not(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_es_unary(EsUnaryOp::BitNot, value, result)
    }

    pub fn push_es_unary_log_not(&mut self, value: Value, result: Value) -> IrResult<Value> {
        self.push_es_unary(EsUnaryOp::LogNot, value, result)
    }

    // ========================================================================
    // Meta
    // ========================================================================

    pub fn push_meta_ctx_load(&mut self, key: u64) -> IrResult<Value> {
        self.push(InstrKind::MetaContextLoad(MetaContextLoad { key }))
    }

    pub fn push_meta_prp_load(&mut self, object: Value, key: Value) -> IrResult<Value> {
        self.push(InstrKind::MetaPropertyLoad(MetaPropertyLoad { object, key }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::SpecialValue;
    use crate::error::IrError;

    fn setup() -> (Module, BlockId) {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        (module, entry)
    }

    #[test]
    fn test_push_after_terminator() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let val = b.module().const_bool(false);
        b.push_trm_ret(val).unwrap();
        assert!(matches!(
            b.push_ctx_leave(),
            Err(IrError::PushAfterTerminator { .. })
        ));
        assert!(matches!(
            b.push_trm_ret(val),
            Err(IrError::PushAfterTerminator { .. })
        ));
        assert_eq!(module.block(entry).len(), 1);
    }

    #[test]
    fn test_not_terminated_until_terminator() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        b.push_ctx_this().unwrap();
        b.push_es_new_obj().unwrap();
        b.push_ex_clear().unwrap();
        let last = module.block(entry).last_instr().unwrap();
        assert!(!module.instr(last).is_terminating());
    }

    #[test]
    fn test_branch_requires_boolean() {
        let (mut module, entry) = setup();
        let target = module.new_block(None);
        let cond = module.const_double(1.0);
        let err = module.builder(entry).push_trm_br(cond, target, target);
        assert!(matches!(err, Err(IrError::TypeMismatch { context: "br", .. })));
        assert!(module.block(target).referrers().is_empty());
        assert!(module.block(entry).is_empty());
    }

    #[test]
    fn test_arr_requires_array() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let ptr = b.push_mem_alloc(Type::pointer(Type::value())).unwrap();
        assert!(b.push_arr_get(0, ptr).is_err());

        let arr = b.push_mem_alloc(Type::array(Type::value(), 2)).unwrap();
        let elem = b.push_arr_get(1, arr).unwrap();
        let put = b.push_arr_put(0, arr, elem).unwrap();
        assert_eq!(module.type_of(elem), Type::value());
        assert_eq!(module.type_of(put), Type::void());
    }

    #[test]
    fn test_val_conversion_signatures() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let undef = b.module().const_value(SpecialValue::Undefined);
        let num = b.module().const_double(4.0);
        let text = b.module().const_str("x");

        let boxed = b.push_val_from_double(num).unwrap();
        assert!(b.push_val_from_double(undef).is_err());
        assert!(b.push_val_from_str(num).is_err());
        b.push_val_from_str(text).unwrap();
        assert!(b.push_val_to_bool(num).is_err());

        let slot = b.push_mem_alloc(Type::double()).unwrap();
        let ok = b.push_val_to_double(boxed, slot).unwrap();
        let str_slot = b.push_mem_alloc(Type::string()).unwrap();
        assert!(b.push_val_to_str(boxed, slot).is_err());
        b.push_val_to_str(boxed, str_slot).unwrap();

        assert_eq!(module.type_of(boxed), Type::value());
        assert_eq!(module.type_of(ok), Type::boolean());
    }

    #[test]
    fn test_delete_signatures() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let res = b.push_mem_alloc(Type::value()).unwrap();
        let obj = b.push_es_new_obj().unwrap();
        let flag = b.module().const_bool(true);

        b.push_ctx_del(7, res).unwrap();
        assert!(b.push_ctx_del(7, flag).is_err());
        b.push_prp_del(None, 3, res).unwrap();
        b.push_prp_del(Some(obj), 3, res).unwrap();
        assert!(b.push_prp_del(Some(flag), 3, res).is_err());
        assert!(b.push_prp_del_slow(Some(obj), flag, res).is_err());
        b.push_prp_del_slow(Some(obj), obj, res).unwrap();
    }

    #[test]
    fn test_exception_and_link_signatures() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let state = b.push_ex_save_state().unwrap();
        b.push_ex_load_state(state).unwrap();
        let meta = b.push_meta_ctx_load(5).unwrap();
        b.push_ex_set(meta).unwrap();
        let num = b.module().const_double(1.0);
        assert!(b.push_ex_set(num).is_err());
        assert!(b.push_ex_load_state(num).is_err());

        let extra = b.push_bnd_extra_ptr(1).unwrap();
        b.push_link_var(9, false, extra).unwrap();
        assert!(b.push_link_fun(9, false, state).is_err());
    }

    #[test]
    fn test_binary_result_types() {
        let (mut module, entry) = setup();
        let mut b = module.builder(entry);
        let l = b.module().const_double(1.0);
        let r = b.module().const_double(2.0);
        let sum = b.push_bin_add(l, r).unwrap();
        let eq = b.push_bin_eq(l, r).unwrap();
        assert_eq!(module.type_of(sum), Type::double());
        assert_eq!(module.type_of(eq), Type::boolean());
    }

    #[test]
    fn test_result_types() {
        let (mut module, entry) = setup();
        let other = module.create_function("f", false);
        let mut b = module.builder(entry);
        let res = b.push_mem_alloc(Type::value()).unwrap();
        let obj = b.push_es_new_obj().unwrap();
        let fun = b.push_es_new_fun_expr(other, 2, true).unwrap();
        let iter = b.push_prp_it_new(obj).unwrap();
        let get = b.push_prp_get(obj, 1, res).unwrap();
        let bin = b.push_es_bin_strict_eq(obj, fun, res).unwrap();
        let extra = b.push_bnd_extra_init(3).unwrap();
        let meta = b.push_meta_prp_load(obj, obj).unwrap();

        assert_eq!(module.type_of(fun), Type::value());
        assert_eq!(module.type_of(iter), Type::opaque("EsPropertyIterator"));
        assert!(module.is_persistent(iter));
        assert_eq!(module.type_of(get), Type::boolean());
        assert_eq!(module.type_of(bin), Type::boolean());
        assert_eq!(module.type_of(extra), Type::pointer(Type::value()));
        assert!(module.type_of(meta).is_reference());
    }

    #[test]
    fn test_switch_to() {
        let (mut module, entry) = setup();
        let other = module.new_block(Some("other"));
        let mut b = module.builder(entry);
        b.push_trm_jmp(other).unwrap();
        b.switch_to(other);
        b.push_ctx_leave().unwrap();
        assert_eq!(b.block(), other);
        assert_eq!(module.block(other).len(), 1);
    }
}
