//! End-to-end construction, dispatch and pass scenarios

use esc_ir::instr::*;
use esc_ir::visit::{visit_instr, walk_block, walk_module};
use esc_ir::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Records every instruction callback by mnemonic suffix
#[derive(Default)]
struct Recorder {
    seen: Vec<&'static str>,
    strings: Vec<String>,
}

macro_rules! record {
    ($($method:ident: $payload:ty => $name:literal),* ; $($unit:ident => $unit_name:literal),*) => {
        $(
            fn $method(&mut self, _module: &Module, _id: InstrId, _instr: &$payload) {
                self.seen.push($name);
            }
        )*
        $(
            fn $unit(&mut self, _module: &Module, _id: InstrId) {
                self.seen.push($unit_name);
            }
        )*
    };
}

impl InstrVisitor for Recorder {
    record! {
        visit_instr_args_obj_init: ArgumentsObjectInit => "args_obj_init",
        visit_instr_args_obj_link: ArgumentsObjectLink => "args_obj_link",
        visit_instr_arr: ArrayAccess => "arr",
        visit_instr_bin: Binary => "bin",
        visit_instr_bnd_extra_init: BindExtraInit => "bnd_extra_init",
        visit_instr_bnd_extra_ptr: BindExtraPtr => "bnd_extra_ptr",
        visit_instr_call: Call => "call",
        visit_instr_call_keyed: CallKeyed => "call_keyed",
        visit_instr_call_keyed_slow: CallKeyedSlow => "call_keyed_slow",
        visit_instr_call_named: CallNamed => "call_named",
        visit_instr_val: ValueConversion => "val",
        visit_instr_br: Branch => "br",
        visit_instr_jmp: Jump => "jmp",
        visit_instr_ret: Return => "ret",
        visit_instr_mem_alloc: MemoryAlloc => "mem_alloc",
        visit_instr_mem_store: MemoryStore => "mem_store",
        visit_instr_mem_elm_ptr: MemoryElementPointer => "mem_elm_ptr",
        visit_instr_ctx_set_strict: ContextSetStrict => "ctx_set_strict",
        visit_instr_ctx_enter_catch: ContextEnterCatch => "ctx_enter_catch",
        visit_instr_ctx_enter_with: ContextEnterWith => "ctx_enter_with",
        visit_instr_ctx_get: ContextGet => "ctx_get",
        visit_instr_ctx_put: ContextPut => "ctx_put",
        visit_instr_ctx_del: ContextDelete => "ctx_del",
        visit_instr_ex_load_state: ExceptionLoadState => "ex_load_state",
        visit_instr_ex_set: ExceptionSet => "ex_set",
        visit_instr_init_args: InitArguments => "init_args",
        visit_instr_init_args_obj: InitArgumentsObject => "init_args_obj",
        visit_instr_decl: Declaration => "decl",
        visit_instr_link: Link => "link",
        visit_instr_prp_def_data: PropertyDefineData => "prp_def_data",
        visit_instr_prp_def_accessor: PropertyDefineAccessor => "prp_def_accessor",
        visit_instr_prp_it_new: PropertyIteratorNew => "prp_it_new",
        visit_instr_prp_it_next: PropertyIteratorNext => "prp_it_next",
        visit_instr_prp_get: PropertyGet => "prp_get",
        visit_instr_prp_get_slow: PropertyGetSlow => "prp_get_slow",
        visit_instr_prp_put: PropertyPut => "prp_put",
        visit_instr_prp_put_slow: PropertyPutSlow => "prp_put_slow",
        visit_instr_prp_del: PropertyDelete => "prp_del",
        visit_instr_prp_del_slow: PropertyDeleteSlow => "prp_del_slow",
        visit_instr_es_new_arr: EsNewArray => "es_new_arr",
        visit_instr_es_new_fun_decl: EsNewFunction => "es_new_fun_decl",
        visit_instr_es_new_fun_expr: EsNewFunction => "es_new_fun_expr",
        visit_instr_es_new_rex: EsNewRegex => "es_new_rex",
        visit_instr_es_bin: EsBinary => "es_bin",
        visit_instr_es_unary: EsUnary => "es_unary";
        visit_instr_ctx_leave => "ctx_leave",
        visit_instr_ctx_this => "ctx_this",
        visit_instr_ex_save_state => "ex_save_state",
        visit_instr_ex_clear => "ex_clear",
        visit_instr_es_new_obj => "es_new_obj"
    }
}

impl NodeVisitor for Recorder {
    fn visit_module(&mut self, module: &Module) -> IrResult<()> {
        walk_module(self, module)
    }

    fn visit_fun(&mut self, module: &Module, fun: FunctionId) -> IrResult<()> {
        esc_ir::visit::walk_fun(self, module, fun)
    }

    fn visit_block(&mut self, module: &Module, block: BlockId) -> IrResult<()> {
        walk_block(self, module, block)
    }
}

impl ResourceVisitor for Recorder {
    fn visit_str_res(&mut self, _module: &Module, res: &StringResource) {
        self.strings.push(res.text().to_string());
    }
}

// ============================================================================
// Construction
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn test_return_of_double_constant() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let three = module.const_double(3.0);

        let ret = module.builder(entry).push_trm_ret(three).unwrap();
        let id = ret.as_instr().unwrap();

        let last = module.block(module.function(main).last_block()).last_instr().unwrap();
        assert_eq!(last, id);
        let InstrKind::Return(payload) = module.instr(last).kind() else {
            panic!("expected ret");
        };
        assert_eq!(module.type_of(payload.value), Type::double());
        assert!(module.type_of(ret).is_void());
        assert!(module.instr(id).is_terminating());
        assert_eq!(module.instr(id).block(), Some(entry));
        assert_eq!(module.block(entry).last_instr().unwrap(), id);
    }

    #[test]
    fn test_push_after_terminator_is_rejected() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let value = module.const_bool(true);

        let mut b = module.builder(entry);
        b.push_trm_ret(value).unwrap();
        let err = b.push_ctx_this().unwrap_err();
        assert!(matches!(err, IrError::PushAfterTerminator { block } if block == entry));
        assert_eq!(module.block(entry).len(), 1);
    }

    #[test]
    fn test_removing_one_branch_keeps_other_referrer() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let first = module.function(main).entry_block();
        let second = module.new_block(Some("second"));
        let join = module.new_block(Some("join"));
        let cond = module.const_bool(true);

        let br1 = module.builder(first).push_trm_br(cond, join, second).unwrap();
        module.push_block(main, second).unwrap();
        let br2 = module.builder(second).push_trm_br(cond, join, join).unwrap();
        module.push_block(main, join).unwrap();
        assert_eq!(module.block(join).referrers().len(), 2);

        module.remove_instr(br1.as_instr().unwrap()).unwrap();

        let referrers = module.block(join).referrers();
        assert_eq!(referrers.len(), 1);
        assert!(referrers.contains(&br2.as_instr().unwrap()));
        assert!(module.block(second).referrers().is_empty());
    }

    #[test]
    fn test_type_errors_leave_block_unchanged() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let text = module.const_str("x");
        let exit = module.new_block(None);

        let err = module.builder(entry).push_trm_br(text, exit, exit).unwrap_err();
        assert!(matches!(err, IrError::TypeMismatch { context: "br", .. }));
        assert!(module.block(entry).is_empty());
        assert!(module.block(exit).referrers().is_empty());
    }
}

// ============================================================================
// Dispatch
// ============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn test_walk_visits_in_program_order() {
        init_logging();
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        module.intern_string("answer");
        module.register_string_resources();
        let value = module.const_double(2.5);
        let void = module.const_null(Type::void());

        let mut b = module.builder(entry);
        let slot = b.push_mem_alloc(Type::double()).unwrap();
        b.push_mem_store(slot, value).unwrap();
        b.push_trm_ret(void).unwrap();

        let mut recorder = Recorder::default();
        recorder.visit_module(&module).unwrap();
        assert_eq!(recorder.seen, vec!["mem_alloc", "mem_store", "ret"]);
        assert_eq!(recorder.strings, vec!["answer".to_string()]);
    }

    #[test]
    fn test_fast_and_slow_property_access_are_distinct() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let key = module.property_key("x");
        let dyn_key = module.const_str("x");

        let mut b = module.builder(entry);
        let obj = b.push_es_new_obj().unwrap();
        let res = b.push_mem_alloc(Type::value()).unwrap();
        let fast = b.push_prp_get(obj, key, res).unwrap();
        let slow = b.push_prp_get_slow(obj, dyn_key, res).unwrap();

        let mut recorder = Recorder::default();
        visit_instr(&mut recorder, &module, fast.as_instr().unwrap()).unwrap();
        visit_instr(&mut recorder, &module, slow.as_instr().unwrap()).unwrap();
        assert_eq!(recorder.seen, vec!["prp_get", "prp_get_slow"]);
    }

    #[test]
    fn test_meta_dispatch_fails() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let obj = module.const_value(SpecialValue::Undefined);
        let key = module.const_str("y");

        let meta = module.builder(entry).push_meta_prp_load(obj, key).unwrap();
        let meta = meta.as_instr().unwrap();

        let mut recorder = Recorder::default();
        let err = visit_instr(&mut recorder, &module, meta).unwrap_err();
        assert!(matches!(
            err,
            IrError::MetaInstruction { instr, kind: "meta_prp_load" } if instr == meta
        ));
        assert!(recorder.seen.is_empty());
    }

    #[test]
    fn test_meta_can_be_replaced_before_dispatch() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let key = module.property_key("z");

        let meta = module.builder(entry).push_meta_ctx_load(key).unwrap();
        let meta = meta.as_instr().unwrap();
        module.replace_instr(meta, InstrKind::ContextThis).unwrap();

        let mut recorder = Recorder::default();
        visit_instr(&mut recorder, &module, meta).unwrap();
        assert_eq!(recorder.seen, vec!["ctx_this"]);
    }
}

// ============================================================================
// Passes
// ============================================================================

mod passes {
    use super::*;

    fn branchy_module() -> (Module, FunctionId) {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let then = module.new_block(Some("then"));
        let dead = module.new_block(Some("dead"));
        let cond = module.const_bool(false);
        let ret = module.const_value(SpecialValue::Undefined);

        module.builder(entry).push_trm_br(cond, then, then).unwrap();
        module.push_block(main, then).unwrap();
        module.builder(then).push_trm_ret(ret).unwrap();
        module.push_block(main, dead).unwrap();
        module.builder(dead).push_trm_jmp(then).unwrap();
        (module, main)
    }

    #[test]
    fn test_optimizer_removes_dead_block_and_verifies() {
        init_logging();
        let (mut module, main) = branchy_module();

        let config = IrConfig::from_toml_str("verify = true").unwrap();
        let stats = Optimizer::from_config(&config).optimize(&mut module).unwrap();

        assert_eq!(stats.unreachable_blocks_removed, 1);
        assert_eq!(module.function(main).blocks().len(), 2);
        assert_eq!(verify_module(&module), Ok(()));

        let then = module.function(main).blocks()[1];
        assert_eq!(module.block(then).referrers().len(), 1);
    }

    #[test]
    fn test_pretty_output_after_optimization() {
        let (mut module, _) = branchy_module();
        Optimizer::basic().optimize(&mut module).unwrap();

        let text = module.pretty_print();
        assert!(text.starts_with("; global\ndefine value %main {\n"));
        assert!(text.contains("  br false bb1 bb1\n"));
        assert!(text.contains("  ret value.undefined\n"));
        assert!(!text.contains("dead"));
    }

    #[test]
    fn test_epilogue_template_then_verify() {
        let mut module = Module::new();
        let config = IrConfig::default();
        let main = config.new_main_function(&mut module);
        let entry = module.function(main).entry_block();
        let scope = module.const_value(SpecialValue::Undefined);
        module.builder(entry).push_ctx_enter_with(scope).unwrap();

        let mut epilogue = MultiTemplateBlock::new();
        epilogue.push(Box::new(LeaveContextTemplateBlock));
        epilogue.push(Box::new(ReturnFalseTemplateBlock));
        epilogue.inflate(&mut module, main).unwrap();

        assert_eq!(verify_module(&module), Ok(()));
        assert!(module.pretty_print().contains("define value %__es_main {"));
    }
}

// ============================================================================
// Edit sequences
// ============================================================================

mod edits {
    use super::*;
    use proptest::prelude::*;

    /// `n` linked blocks where block `i` jumps to block `(i + 1) % n`
    fn ring_module(n: usize) -> (Module, FunctionId) {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let mut blocks = vec![module.function(main).entry_block()];
        for _ in 1..n {
            blocks.push(module.new_block(None));
        }
        for (i, block) in blocks.iter().enumerate() {
            if i > 0 {
                module.push_block(main, *block).unwrap();
            }
            module.builder(*block).push_trm_jmp(blocks[(i + 1) % n]).unwrap();
        }
        (module, main)
    }

    #[test]
    fn test_retarget_replace_remove_then_verify() {
        init_logging();
        let (mut module, main) = ring_module(3);
        let blocks = module.function(main).blocks().to_vec();
        let (entry, middle, last) = (blocks[0], blocks[1], blocks[2]);
        let entry_jmp = module.block(entry).last_instr().unwrap();
        let last_jmp = module.block(last).last_instr().unwrap();

        module.retarget(entry_jmp, middle, last).unwrap();
        let cond = module.const_bool(true);
        module
            .replace_instr(
                last_jmp,
                InstrKind::Branch(Branch {
                    cond,
                    true_block: last,
                    false_block: entry,
                }),
            )
            .unwrap();
        assert!(matches!(
            module.remove_block(main, last),
            Err(IrError::BlockInUse { referrers: 1, .. })
        ));
        module.remove_block(main, middle).unwrap();

        assert_eq!(verify_module(&module), Ok(()));
        assert_eq!(module.function(main).blocks(), &[entry, last]);
        assert!(module.block(middle).referrers().is_empty());
        assert_eq!(module.block(last).referrers().len(), 2);
        assert!(module.block(entry).referrers().contains(&last_jmp));
    }

    #[derive(Debug, Clone)]
    enum Edit {
        Retarget { block: usize, to: usize },
        Jump { block: usize, to: usize },
        Branch { block: usize, on_true: usize, on_false: usize },
        Return { block: usize },
        RemoveBlock { block: usize },
        RemoveTerminator { block: usize },
    }

    fn arb_edit() -> impl Strategy<Value = Edit> {
        let pick = 0usize..16;
        prop_oneof![
            (pick.clone(), pick.clone()).prop_map(|(block, to)| Edit::Retarget { block, to }),
            (pick.clone(), pick.clone()).prop_map(|(block, to)| Edit::Jump { block, to }),
            (pick.clone(), pick.clone(), pick.clone()).prop_map(|(block, on_true, on_false)| {
                Edit::Branch {
                    block,
                    on_true,
                    on_false,
                }
            }),
            pick.clone().prop_map(|block| Edit::Return { block }),
            pick.clone().prop_map(|block| Edit::RemoveBlock { block }),
            pick.prop_map(|block| Edit::RemoveTerminator { block }),
        ]
    }

    /// Replace the block's terminator, or push one into an emptied block
    fn set_terminator(module: &mut Module, block: BlockId, kind: InstrKind) {
        match module.block(block).last_instr() {
            Ok(last) => module.replace_instr(last, kind).unwrap(),
            Err(_) => {
                module.builder(block).push(kind).unwrap();
            }
        }
    }

    fn apply(module: &mut Module, main: FunctionId, edit: &Edit, cond: Value, ret: Value) {
        let blocks = module.function(main).blocks().to_vec();
        let pick = |n: usize| blocks[n % blocks.len()];
        match *edit {
            Edit::Retarget { block, to } => {
                let Ok(last) = module.block(pick(block)).last_instr() else {
                    return;
                };
                let Some(old) = module.instr(last).kind().targets().first().copied() else {
                    return;
                };
                module.retarget(last, old, pick(to)).unwrap();
            }
            Edit::Jump { block, to } => {
                set_terminator(module, pick(block), InstrKind::Jump(Jump { block: pick(to) }))
            }
            Edit::Branch {
                block,
                on_true,
                on_false,
            } => set_terminator(
                module,
                pick(block),
                InstrKind::Branch(Branch {
                    cond,
                    true_block: pick(on_true),
                    false_block: pick(on_false),
                }),
            ),
            Edit::Return { block } => {
                set_terminator(module, pick(block), InstrKind::Return(Return { value: ret }))
            }
            Edit::RemoveBlock { block } => {
                if let Err(err) = module.remove_block(main, pick(block)) {
                    assert!(
                        matches!(err, IrError::EntryBlock { .. } | IrError::BlockInUse { .. }),
                        "{err}"
                    );
                }
            }
            Edit::RemoveTerminator { block } => {
                if let Ok(last) = module.block(pick(block)).last_instr() {
                    module.remove_instr(last).unwrap();
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_edit_sequences_keep_module_valid(
            n in 1usize..6,
            edits in prop::collection::vec(arb_edit(), 0..24),
        ) {
            let (mut module, main) = ring_module(n);
            let cond = module.const_bool(true);
            let ret = module.const_value(SpecialValue::Undefined);
            prop_assert_eq!(verify_module(&module), Ok(()));

            for edit in &edits {
                apply(&mut module, main, edit, cond, ret);
                prop_assert_eq!(verify_module(&module), Ok(()), "after {:?}", edit);
            }
        }
    }
}
