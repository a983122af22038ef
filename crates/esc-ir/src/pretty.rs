//! Pretty-printing for IR
//!
//! Renders a module as text for debugging and golden tests:
//!
//! ```text
//! define value %main {
//! bb0:    ; entry
//!   %0 = mem.alloc double
//!   mem.store %0 2.5
//!   ret null void
//! }
//! ```

use std::fmt::Write;

use crate::block::BlockId;
use crate::constant::SpecialValue;
use crate::error::IrResult;
use crate::function::FunctionId;
use crate::instr::*;
use crate::key::PropertyKey;
use crate::module::Module;
use crate::resource::StringResource;
use crate::types::Type;
use crate::value::{ConstId, InstrId, Value};
use crate::visit::*;

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Module {
    fn pretty_print(&self) -> String {
        let mut printer = Printer::default();
        match printer.visit_module(self) {
            Ok(()) => printer.output,
            Err(e) => format!("{}; error: {}\n", printer.output, e),
        }
    }
}

#[derive(Default)]
struct Printer {
    output: String,
    scratch: String,
}

impl Printer {
    fn operand(&mut self, module: &Module, value: Value) -> String {
        match value {
            Value::Instr(id) => id.to_string(),
            Value::Const(id) => {
                let saved = std::mem::take(&mut self.scratch);
                visit_const(self, module, id);
                std::mem::replace(&mut self.scratch, saved)
            }
        }
    }

    fn operands(&mut self, module: &Module, values: &[Value]) -> String {
        let parts: Vec<String> = values.iter().map(|v| self.operand(module, *v)).collect();
        parts.join(" ")
    }

    fn key(&self, module: &Module, raw: u64) -> String {
        match PropertyKey::decode(raw) {
            PropertyKey::Index(index) => index.to_string(),
            PropertyKey::String(id) => match module.interned_string(id) {
                Some(text) => format!("{:?}", text),
                None => format!("${}", id),
            },
        }
    }

    fn emit(&mut self, module: &Module, id: InstrId, text: String) {
        if module.type_of(Value::Instr(id)).is_void() {
            writeln!(self.output, "  {}", text).unwrap();
        } else {
            writeln!(self.output, "  {} = {}", id, text).unwrap();
        }
    }

    fn emit_meta(&mut self, module: &Module, id: InstrId) {
        let text = match module.instr(id).kind() {
            InstrKind::MetaContextLoad(i) => format!("meta.ctx_load {}", self.key(module, i.key)),
            InstrKind::MetaPropertyLoad(i) => {
                format!("meta.prp_load {}", self.operands(module, &[i.object, i.key]))
            }
            _ => return,
        };
        self.emit(module, id, text);
    }
}

fn strict(is_strict: bool) -> &'static str {
    if is_strict {
        " strict"
    } else {
        ""
    }
}

impl NodeVisitor for Printer {
    fn visit_module(&mut self, module: &Module) -> IrResult<()> {
        if !module.meta().name.is_empty() {
            writeln!(self.output, "; module {}", module.meta().name).unwrap();
        }
        if !module.resources().is_empty() {
            writeln!(self.output, "; resources").unwrap();
        }
        walk_module(self, module)
    }

    fn visit_fun(&mut self, module: &Module, fun: FunctionId) -> IrResult<()> {
        let function = module.function(fun);
        if function.is_global() {
            writeln!(self.output, "; global").unwrap();
        }
        writeln!(self.output, "define value %{} {{", function.name()).unwrap();
        walk_fun(self, module, fun)?;
        writeln!(self.output, "}}").unwrap();
        writeln!(self.output).unwrap();
        Ok(())
    }

    fn visit_block(&mut self, module: &Module, block: BlockId) -> IrResult<()> {
        let data = module.block(block);
        let mut header = format!("{}:", block);
        if let Some(label) = data.label() {
            write!(header, "    ; {}", label).unwrap();
        }
        if !data.referrers().is_empty() {
            let mut referrers: Vec<InstrId> = data.referrers().iter().copied().collect();
            referrers.sort();
            let referrers: Vec<String> = referrers.iter().map(InstrId::to_string).collect();
            write!(header, "    ; referrers: {}", referrers.join(", ")).unwrap();
        }
        writeln!(self.output, "{}", header).unwrap();

        for id in data.instrs() {
            if module.instr(*id).kind().is_meta() {
                self.emit_meta(module, *id);
            } else {
                visit_instr(self, module, *id)?;
            }
        }
        Ok(())
    }
}

impl ResourceVisitor for Printer {
    fn visit_str_res(&mut self, _module: &Module, res: &StringResource) {
        writeln!(self.output, ";   string {} {:?}", res.id(), res.text()).unwrap();
    }
}

impl ConstVisitor for Printer {
    fn visit_const_arr_elm(&mut self, module: &Module, _id: ConstId, array: Value, index: usize) {
        let base = self.operand(module, array);
        self.scratch = format!("{}[{}]", base, index);
    }

    fn visit_const_callee(&mut self, _module: &Module, _id: ConstId) {
        self.scratch = "callee".to_string();
    }

    fn visit_const_ret(&mut self, _module: &Module, _id: ConstId) {
        self.scratch = "retval".to_string();
    }

    fn visit_const_null(&mut self, _module: &Module, _id: ConstId, ty: &Type) {
        self.scratch = format!("null {}", ty);
    }

    fn visit_const_bool(&mut self, _module: &Module, _id: ConstId, value: bool) {
        self.scratch = value.to_string();
    }

    fn visit_const_double(&mut self, _module: &Module, _id: ConstId, value: f64) {
        self.scratch = format!("{:?}", value);
    }

    fn visit_const_strdouble(&mut self, _module: &Module, _id: ConstId, text: &str) {
        self.scratch = format!("double {}", text);
    }

    fn visit_const_str(&mut self, _module: &Module, _id: ConstId, text: &str) {
        self.scratch = format!("{:?}", text);
    }

    fn visit_const_val(&mut self, _module: &Module, _id: ConstId, value: SpecialValue) {
        self.scratch = format!("value.{}", value);
    }
}

impl InstrVisitor for Printer {
    fn visit_instr_args_obj_init(&mut self, m: &Module, id: InstrId, i: &ArgumentsObjectInit) {
        self.emit(m, id, format!("args_obj.init {}", i.argc));
    }

    fn visit_instr_args_obj_link(&mut self, m: &Module, id: InstrId, i: &ArgumentsObjectLink) {
        let args = self.operand(m, i.args);
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("args_obj.link {} {} {}", args, i.index, value));
    }

    fn visit_instr_arr(&mut self, m: &Module, id: InstrId, i: &ArrayAccess) {
        let array = self.operand(m, i.array);
        let text = match (i.op, i.value) {
            (ArrayOp::Put, Some(value)) => {
                format!("array put {} {} {}", array, i.index, self.operand(m, value))
            }
            _ => format!("array get {} {}", array, i.index),
        };
        self.emit(m, id, text);
    }

    fn visit_instr_bin(&mut self, m: &Module, id: InstrId, i: &Binary) {
        let ops = self.operands(m, &[i.left, i.right]);
        self.emit(m, id, format!("bin {} {}", i.op.name(), ops));
    }

    fn visit_instr_bnd_extra_init(&mut self, m: &Module, id: InstrId, i: &BindExtraInit) {
        self.emit(m, id, format!("bnd.extra_init {}", i.num_extra));
    }

    fn visit_instr_bnd_extra_ptr(&mut self, m: &Module, id: InstrId, i: &BindExtraPtr) {
        self.emit(m, id, format!("bnd.extra_ptr {}", i.hops));
    }

    fn visit_instr_call(&mut self, m: &Module, id: InstrId, i: &Call) {
        let name = match i.op {
            CallOp::Normal => "call",
            CallOp::New => "call.new",
        };
        let function = self.operand(m, i.function);
        let rest = self.operands(m, &[i.argv, i.result]);
        self.emit(m, id, format!("{} {} {} {}", name, function, i.argc, rest));
    }

    fn visit_instr_call_keyed(&mut self, m: &Module, id: InstrId, i: &CallKeyed) {
        let object = self.operand(m, i.object);
        let key = self.key(m, i.key);
        let rest = self.operands(m, &[i.argv, i.result]);
        self.emit(m, id, format!("call.keyed {} {} {} {}", object, key, i.argc, rest));
    }

    fn visit_instr_call_keyed_slow(&mut self, m: &Module, id: InstrId, i: &CallKeyedSlow) {
        let head = self.operands(m, &[i.object, i.key]);
        let rest = self.operands(m, &[i.argv, i.result]);
        self.emit(m, id, format!("call.keyed_slow {} {} {}", head, i.argc, rest));
    }

    fn visit_instr_call_named(&mut self, m: &Module, id: InstrId, i: &CallNamed) {
        let key = self.key(m, i.key);
        let rest = self.operands(m, &[i.argv, i.result]);
        self.emit(m, id, format!("call.named {} {} {}", key, i.argc, rest));
    }

    fn visit_instr_val(&mut self, m: &Module, id: InstrId, i: &ValueConversion) {
        let mut ops = vec![i.value];
        ops.extend(i.result);
        let ops = self.operands(m, &ops);
        self.emit(m, id, format!("val.{} {}", i.op.name(), ops));
    }

    fn visit_instr_br(&mut self, m: &Module, id: InstrId, i: &Branch) {
        let cond = self.operand(m, i.cond);
        self.emit(m, id, format!("br {} {} {}", cond, i.true_block, i.false_block));
    }

    fn visit_instr_jmp(&mut self, m: &Module, id: InstrId, i: &Jump) {
        self.emit(m, id, format!("jmp {}", i.block));
    }

    fn visit_instr_ret(&mut self, m: &Module, id: InstrId, i: &Return) {
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("ret {}", value));
    }

    fn visit_instr_mem_alloc(&mut self, m: &Module, id: InstrId, i: &MemoryAlloc) {
        self.emit(m, id, format!("mem.alloc {}", i.ty));
    }

    fn visit_instr_mem_store(&mut self, m: &Module, id: InstrId, i: &MemoryStore) {
        let ops = self.operands(m, &[i.dst, i.src]);
        self.emit(m, id, format!("mem.store {}", ops));
    }

    fn visit_instr_mem_elm_ptr(&mut self, m: &Module, id: InstrId, i: &MemoryElementPointer) {
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("mem.elm_ptr {} {}", value, i.index));
    }

    fn visit_instr_ctx_set_strict(&mut self, m: &Module, id: InstrId, i: &ContextSetStrict) {
        self.emit(m, id, format!("ctx.set_strict {}", i.strict));
    }

    fn visit_instr_ctx_enter_catch(&mut self, m: &Module, id: InstrId, i: &ContextEnterCatch) {
        let key = self.key(m, i.key);
        self.emit(m, id, format!("ctx.enter_catch {}", key));
    }

    fn visit_instr_ctx_enter_with(&mut self, m: &Module, id: InstrId, i: &ContextEnterWith) {
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("ctx.enter_with {}", value));
    }

    fn visit_instr_ctx_leave(&mut self, m: &Module, id: InstrId) {
        self.emit(m, id, "ctx.leave".to_string());
    }

    fn visit_instr_ctx_this(&mut self, m: &Module, id: InstrId) {
        self.emit(m, id, "ctx.this".to_string());
    }

    fn visit_instr_ctx_get(&mut self, m: &Module, id: InstrId, i: &ContextGet) {
        let key = self.key(m, i.key);
        let result = self.operand(m, i.result);
        self.emit(m, id, format!("ctx.get {} {} cid {}", key, result, i.cache_id));
    }

    fn visit_instr_ctx_put(&mut self, m: &Module, id: InstrId, i: &ContextPut) {
        let key = self.key(m, i.key);
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("ctx.put {} {} cid {}", key, value, i.cache_id));
    }

    fn visit_instr_ctx_del(&mut self, m: &Module, id: InstrId, i: &ContextDelete) {
        let key = self.key(m, i.key);
        let result = self.operand(m, i.result);
        self.emit(m, id, format!("ctx.del {} {}", key, result));
    }

    fn visit_instr_ex_save_state(&mut self, m: &Module, id: InstrId) {
        self.emit(m, id, "ex.save_state".to_string());
    }

    fn visit_instr_ex_load_state(&mut self, m: &Module, id: InstrId, i: &ExceptionLoadState) {
        let state = self.operand(m, i.state);
        self.emit(m, id, format!("ex.load_state {}", state));
    }

    fn visit_instr_ex_set(&mut self, m: &Module, id: InstrId, i: &ExceptionSet) {
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("ex.set {}", value));
    }

    fn visit_instr_ex_clear(&mut self, m: &Module, id: InstrId) {
        self.emit(m, id, "ex.clear".to_string());
    }

    fn visit_instr_init_args(&mut self, m: &Module, id: InstrId, i: &InitArguments) {
        let dst = self.operand(m, i.dst);
        self.emit(m, id, format!("init.args {} {}", dst, i.prmc));
    }

    fn visit_instr_init_args_obj(&mut self, m: &Module, id: InstrId, i: &InitArgumentsObject) {
        let prmv = self.operand(m, i.prmv);
        self.emit(m, id, format!("init.args_obj {} {}", i.prmc, prmv));
    }

    fn visit_instr_decl(&mut self, m: &Module, id: InstrId, i: &Declaration) {
        let key = self.key(m, i.key);
        let text = match i.kind {
            DeclarationKind::Variable => format!("decl.var {}", key),
            DeclarationKind::Function { value } => {
                format!("decl.fun {} {}", key, self.operand(m, value))
            }
            DeclarationKind::Parameter { index, array } => {
                format!("decl.prm {} {} {}", key, index, self.operand(m, array))
            }
        };
        self.emit(m, id, format!("{}{}", text, strict(i.is_strict)));
    }

    fn visit_instr_link(&mut self, m: &Module, id: InstrId, i: &Link) {
        let name = match i.kind {
            LinkKind::Variable => "link.var",
            LinkKind::Function => "link.fun",
            LinkKind::Parameter => "link.prm",
        };
        let key = self.key(m, i.key);
        let value = self.operand(m, i.value);
        let text = format!("{} {} {}{}", name, key, value, strict(i.is_strict));
        self.emit(m, id, text);
    }

    fn visit_instr_prp_def_data(&mut self, m: &Module, id: InstrId, i: &PropertyDefineData) {
        let ops = self.operands(m, &[i.object, i.key, i.value]);
        self.emit(m, id, format!("prp.def_data {}", ops));
    }

    fn visit_instr_prp_def_accessor(&mut self, m: &Module, id: InstrId, i: &PropertyDefineAccessor) {
        let object = self.operand(m, i.object);
        let key = self.key(m, i.key);
        let function = self.operand(m, i.function);
        let kind = if i.is_setter { "set" } else { "get" };
        let text = format!("prp.def_accessor {} {} {} {}", object, key, function, kind);
        self.emit(m, id, text);
    }

    fn visit_instr_prp_it_new(&mut self, m: &Module, id: InstrId, i: &PropertyIteratorNew) {
        let object = self.operand(m, i.object);
        self.emit(m, id, format!("prp.it_new {}", object));
    }

    fn visit_instr_prp_it_next(&mut self, m: &Module, id: InstrId, i: &PropertyIteratorNext) {
        let ops = self.operands(m, &[i.iterator, i.value]);
        self.emit(m, id, format!("prp.it_next {}", ops));
    }

    fn visit_instr_prp_get(&mut self, m: &Module, id: InstrId, i: &PropertyGet) {
        let object = self.operand(m, i.object);
        let key = self.key(m, i.key);
        let result = self.operand(m, i.result);
        self.emit(m, id, format!("prp.get {} {} {}", object, key, result));
    }

    fn visit_instr_prp_get_slow(&mut self, m: &Module, id: InstrId, i: &PropertyGetSlow) {
        let ops = self.operands(m, &[i.object, i.key, i.result]);
        self.emit(m, id, format!("prp.get_slow {}", ops));
    }

    fn visit_instr_prp_put(&mut self, m: &Module, id: InstrId, i: &PropertyPut) {
        let object = self.operand(m, i.object);
        let key = self.key(m, i.key);
        let value = self.operand(m, i.value);
        self.emit(m, id, format!("prp.put {} {} {}", object, key, value));
    }

    fn visit_instr_prp_put_slow(&mut self, m: &Module, id: InstrId, i: &PropertyPutSlow) {
        let ops = self.operands(m, &[i.object, i.key, i.value]);
        self.emit(m, id, format!("prp.put_slow {}", ops));
    }

    fn visit_instr_prp_del(&mut self, m: &Module, id: InstrId, i: &PropertyDelete) {
        let object = match i.object {
            Some(object) => self.operand(m, object),
            None => "global".to_string(),
        };
        let key = self.key(m, i.key);
        let result = self.operand(m, i.result);
        self.emit(m, id, format!("prp.del {} {} {}", object, key, result));
    }

    fn visit_instr_prp_del_slow(&mut self, m: &Module, id: InstrId, i: &PropertyDeleteSlow) {
        let object = match i.object {
            Some(object) => self.operand(m, object),
            None => "global".to_string(),
        };
        let rest = self.operands(m, &[i.key, i.result]);
        self.emit(m, id, format!("prp.del_slow {} {}", object, rest));
    }

    fn visit_instr_es_new_arr(&mut self, m: &Module, id: InstrId, i: &EsNewArray) {
        let values = self.operand(m, i.values);
        self.emit(m, id, format!("es.new_arr {} {}", i.length, values));
    }

    fn visit_instr_es_new_fun_decl(&mut self, m: &Module, id: InstrId, i: &EsNewFunction) {
        let name = m.function(i.function).name();
        let text = format!(
            "es.new_fun_decl %{} {}{}",
            name,
            i.parameter_count,
            strict(i.is_strict)
        );
        self.emit(m, id, text);
    }

    fn visit_instr_es_new_fun_expr(&mut self, m: &Module, id: InstrId, i: &EsNewFunction) {
        let name = m.function(i.function).name();
        let text = format!(
            "es.new_fun_expr %{} {}{}",
            name,
            i.parameter_count,
            strict(i.is_strict)
        );
        self.emit(m, id, text);
    }

    fn visit_instr_es_new_obj(&mut self, m: &Module, id: InstrId) {
        self.emit(m, id, "es.new_obj".to_string());
    }

    fn visit_instr_es_new_rex(&mut self, m: &Module, id: InstrId, i: &EsNewRegex) {
        self.emit(m, id, format!("es.new_rex /{}/{}", i.pattern, i.flags));
    }

    fn visit_instr_es_bin(&mut self, m: &Module, id: InstrId, i: &EsBinary) {
        let ops = self.operands(m, &[i.left, i.right, i.result]);
        self.emit(m, id, format!("es.bin {} {}", i.op.name(), ops));
    }

    fn visit_instr_es_unary(&mut self, m: &Module, id: InstrId, i: &EsUnary) {
        let ops = self.operands(m, &[i.value, i.result]);
        self.emit(m, id, format!("es.unary {} {}", i.op.name(), ops));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_memory_program() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let value = module.const_double(2.5);
        let ret = module.const_null(Type::void());

        let mut b = module.builder(entry);
        let ptr = b.push_mem_alloc(Type::double()).unwrap();
        b.push_mem_store(ptr, value).unwrap();
        b.push_trm_ret(ret).unwrap();

        let text = module.pretty_print();
        let expected = "\
; global
define value %main {
bb0:    ; entry
  %0 = mem.alloc double
  mem.store %0 2.5
  ret null void
}

";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_print_keys_and_branches() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let entry = module.function(fun).entry_block();
        let exit = module.new_block(None);
        let key = module.property_key("length");
        module.register_string_resources();

        let mut b = module.builder(entry);
        let obj = b.push_es_new_obj().unwrap();
        let res = b.push_mem_alloc(Type::value()).unwrap();
        let ok = b.push_prp_get(obj, key, res).unwrap();
        b.push_trm_br(ok, exit, exit).unwrap();
        module.push_block(fun, exit).unwrap();

        let text = module.pretty_print();
        assert!(text.contains(";   string 0 \"length\""));
        assert!(text.contains("  %2 = prp.get %0 \"length\" %1"));
        assert!(text.contains("  br %2 bb1 bb1"));
        assert!(text.contains("bb1:    ; referrers: %3"));
    }

    #[test]
    fn test_print_array_and_operators() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let entry = module.function(fun).entry_block();
        let undef = module.const_value(SpecialValue::Undefined);

        let mut b = module.builder(entry);
        let arr = b.push_mem_alloc(Type::array(Type::value(), 2)).unwrap();
        b.push_arr_put(0, arr, undef).unwrap();
        let res = b.push_mem_alloc(Type::value()).unwrap();
        b.push_es_bin(EsBinaryOp::StrictEq, undef, undef, res).unwrap();
        b.push_decl_fun(3, true, undef).unwrap();

        let text = module.pretty_print();
        assert!(text.contains("  %0 = mem.alloc value[2]"));
        assert!(text.contains("  array put %0 0 value.undefined"));
        assert!(text.contains("es.bin strict_eq value.undefined value.undefined %2"));
        assert!(text.contains("decl.fun 3 value.undefined strict"));
    }

    #[test]
    fn test_print_meta_instructions() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let entry = module.function(fun).entry_block();
        let id = module.intern_string("x");
        let key = PropertyKey::String(id).encode();
        module.builder(entry).push_meta_ctx_load(key).unwrap();

        let text = module.pretty_print();
        assert!(text.contains("  %0 = meta.ctx_load \"x\""));
    }

    #[test]
    fn test_print_array_element_constant() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let entry = module.function(fun).entry_block();
        let argv = module.const_null(Type::pointer(Type::value()));
        let elem = module.const_array_element(argv, 1).unwrap();
        module.builder(entry).push_trm_ret(elem).unwrap();

        assert!(module.pretty_print().contains("  ret null value*[1]"));
    }
}
