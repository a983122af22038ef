//! IR well-formedness checks
//!
//! Construction already rejects most malformed IR. The verifier re-checks the
//! structural invariants after passes have edited the graph:
//!
//! - every function has at least one block
//! - a non-empty block ends in a terminator, and terminators appear nowhere
//!   else
//! - every instruction's host is the block that lists it
//! - each block's referrer set is exactly the set of hosted terminators
//!   targeting it, and pushed functions only branch to linked blocks
//! - no meta instruction survives

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::block::BlockId;
use crate::function::FunctionId;
use crate::module::Module;
use crate::value::InstrId;

/// A violated IR invariant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("function '{function}' has no blocks")]
    NoBlocks { function: String },

    #[error("{block} of '{function}' does not end in a terminator")]
    MissingTerminator { function: String, block: BlockId },

    #[error("terminator {instr} in {block} of '{function}' is not the last instruction")]
    MisplacedTerminator {
        function: String,
        block: BlockId,
        instr: InstrId,
    },

    #[error("{instr} is listed in {block} but hosted by {host:?}")]
    HostMismatch {
        block: BlockId,
        instr: InstrId,
        host: Option<BlockId>,
    },

    #[error("{block} is targeted by {instr} but does not list it as a referrer")]
    MissingReferrer { block: BlockId, instr: InstrId },

    #[error("{block} lists {instr} as a referrer but {instr} does not target it")]
    StaleReferrer { block: BlockId, instr: InstrId },

    #[error("{instr} targets {block}, which is not linked into a function")]
    DanglingTarget { instr: InstrId, block: BlockId },

    #[error("meta instruction {kind} ({instr}) survived in '{function}'")]
    MetaInstruction {
        function: String,
        instr: InstrId,
        kind: &'static str,
    },
}

/// Check every invariant, collecting all violations
pub fn verify_module(module: &Module) -> Result<(), Vec<VerifyError>> {
    let mut verifier = Verifier::default();
    verifier.check_module(module);
    if verifier.errors.is_empty() {
        Ok(())
    } else {
        Err(verifier.errors)
    }
}

#[derive(Default)]
struct Verifier {
    errors: Vec<VerifyError>,
    /// Blocks of pushed functions
    linked: FxHashSet<BlockId>,
}

impl Verifier {
    fn check_referrers(&mut self, module: &Module) {
        let mut expected: FxHashMap<BlockId, FxHashSet<InstrId>> = FxHashMap::default();
        for block in module.blocks() {
            let host_linked = self.linked.contains(&block.id());
            for id in block.instrs() {
                let mut targets = module.instr(*id).kind().targets();
                targets.dedup();
                for target in targets {
                    expected.entry(target).or_default().insert(*id);
                    if host_linked && !self.linked.contains(&target) {
                        self.errors.push(VerifyError::DanglingTarget {
                            instr: *id,
                            block: target,
                        });
                    }
                }
            }
        }

        let empty = FxHashSet::default();
        for block in module.blocks() {
            let id = block.id();
            let expected = expected.get(&id).unwrap_or(&empty);

            let mut missing: Vec<InstrId> =
                expected.difference(block.referrers()).copied().collect();
            missing.sort();
            for instr in missing {
                self.errors.push(VerifyError::MissingReferrer { block: id, instr });
            }

            let mut stale: Vec<InstrId> =
                block.referrers().difference(expected).copied().collect();
            stale.sort();
            for instr in stale {
                self.errors.push(VerifyError::StaleReferrer { block: id, instr });
            }
        }
    }

    fn check_module(&mut self, module: &Module) {
        for fun in module.function_ids() {
            self.check_fun(module, *fun);
        }
        self.check_referrers(module);
        log::debug!(
            "verified {} function(s): {} error(s)",
            module.function_ids().len(),
            self.errors.len()
        );
    }

    fn check_fun(&mut self, module: &Module, fun: FunctionId) {
        let function = module.function(fun);
        if function.blocks().is_empty() {
            self.errors.push(VerifyError::NoBlocks {
                function: function.name().to_string(),
            });
        }
        for block in function.blocks() {
            self.linked.insert(*block);
            self.check_block(module, *block);
        }
    }

    fn check_block(&mut self, module: &Module, block: BlockId) {
        let function = module
            .block(block)
            .function()
            .map(|f| module.function(f).name().to_string())
            .unwrap_or_default();
        let instrs = module.block(block).instrs();

        for (pos, id) in instrs.iter().enumerate() {
            let instr = module.instr(*id);
            if instr.block() != Some(block) {
                self.errors.push(VerifyError::HostMismatch {
                    block,
                    instr: *id,
                    host: instr.block(),
                });
            }

            if instr.kind().is_meta() {
                self.errors.push(VerifyError::MetaInstruction {
                    function: function.clone(),
                    instr: *id,
                    kind: instr.kind().mnemonic(),
                });
            }

            if instr.is_terminating() && pos + 1 != instrs.len() {
                self.errors.push(VerifyError::MisplacedTerminator {
                    function: function.clone(),
                    block,
                    instr: *id,
                });
            }
        }

        let terminated = instrs
            .last()
            .is_some_and(|last| module.instr(*last).is_terminating());
        if !instrs.is_empty() && !terminated {
            self.errors
                .push(VerifyError::MissingTerminator { function, block });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::InstrKind;
    use crate::types::Type;

    #[test]
    fn test_well_formed_module() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let exit = module.new_block(Some("exit"));
        let cond = module.const_bool(true);
        module.builder(entry).push_trm_br(cond, exit, exit).unwrap();
        module.push_block(main, exit).unwrap();
        let ret = module.const_null(Type::void());
        module.builder(exit).push_trm_ret(ret).unwrap();

        assert_eq!(verify_module(&module), Ok(()));
    }

    #[test]
    fn test_meta_instruction_survives() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let ret = module.const_bool(true);
        let mut b = module.builder(entry);
        b.push_meta_ctx_load(1).unwrap();
        b.push_trm_ret(ret).unwrap();

        let errors = verify_module(&module).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [VerifyError::MetaInstruction { kind: "meta_ctx_load", .. }]
        ));
    }

    #[test]
    fn test_hand_edited_referrers() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let exit = module.new_block(None);
        let jmp = module.builder(entry).push_trm_jmp(exit).unwrap();
        let jmp = jmp.as_instr().unwrap();
        module.push_block(main, exit).unwrap();
        let other = module.new_block(None);

        module.block_mut(exit).remove_referrer(jmp);
        module.block_mut(other).add_referrer(jmp);

        let errors = verify_module(&module).unwrap_err();
        assert!(errors.contains(&VerifyError::MissingReferrer { block: exit, instr: jmp }));
        assert!(errors.contains(&VerifyError::StaleReferrer { block: other, instr: jmp }));
    }

    #[test]
    fn test_missing_terminator() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        module.builder(entry).push_ctx_leave().unwrap();

        assert_eq!(
            verify_module(&module),
            Err(vec![VerifyError::MissingTerminator {
                function: "main".to_string(),
                block: entry,
            }])
        );
    }

    #[test]
    fn test_dangling_target() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        let detached = module.new_block(None);
        let jmp = module.builder(entry).push_trm_jmp(detached).unwrap();

        let errors = verify_module(&module).unwrap_err();
        assert_eq!(
            errors,
            vec![VerifyError::DanglingTarget {
                instr: jmp.as_instr().unwrap(),
                block: detached,
            }]
        );
        assert!(matches!(
            module.instr(jmp.as_instr().unwrap()).kind(),
            InstrKind::Jump(_)
        ));
    }

    #[test]
    fn test_violations_collected_across_functions() {
        let mut module = Module::new();
        let main = module.new_function("main", true);
        let entry = module.function(main).entry_block();
        module.builder(entry).push_ctx_leave().unwrap();
        let helper = module.new_function("helper", false);
        let helper_entry = module.function(helper).entry_block();
        module.builder(helper_entry).push_ctx_leave().unwrap();

        assert_eq!(
            verify_module(&module),
            Err(vec![
                VerifyError::MissingTerminator {
                    function: "main".to_string(),
                    block: entry,
                },
                VerifyError::MissingTerminator {
                    function: "helper".to_string(),
                    block: helper_entry,
                },
            ])
        );
    }
}
