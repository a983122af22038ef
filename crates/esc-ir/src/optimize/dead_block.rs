//! Unreachable block elimination
//!
//! Removes every non-entry block that no other block branches to. Removing a
//! block drops its terminator's edges, which can make further blocks
//! unreachable, so the pass runs to a fixed point.

use crate::block::BlockId;
use crate::error::IrResult;
use crate::function::FunctionId;
use crate::module::Module;

/// Dead block eliminator
pub struct DeadBlockEliminator;

impl DeadBlockEliminator {
    /// Create a new pass
    pub fn new() -> Self {
        Self
    }

    /// Eliminate unreachable blocks in every function, returning how many were removed
    pub fn eliminate(&self, module: &mut Module) -> IrResult<usize> {
        let functions = module.function_ids().to_vec();
        let mut removed = 0;
        for fun in functions {
            removed += self.eliminate_function(module, fun)?;
        }
        Ok(removed)
    }

    /// Eliminate unreachable blocks in one function
    pub fn eliminate_function(&self, module: &mut Module, fun: FunctionId) -> IrResult<usize> {
        let mut removed = 0;

        // Iterate until no more changes (fixed-point)
        loop {
            let dead = self.find_dead_blocks(module, fun);
            if dead.is_empty() {
                break;
            }
            for block in dead {
                log::trace!("removing unreachable {} from {}", block, module.function(fun).name());
                module.remove_block(fun, block)?;
                removed += 1;
            }
        }

        if removed > 0 {
            log::debug!(
                "removed {} unreachable block(s) from {}",
                removed,
                module.function(fun).name()
            );
        }
        Ok(removed)
    }

    /// Non-entry blocks whose only referrers, if any, are their own terminators
    fn find_dead_blocks(&self, module: &Module, fun: FunctionId) -> Vec<BlockId> {
        module
            .function(fun)
            .blocks()
            .iter()
            .skip(1)
            .copied()
            .filter(|block| {
                module
                    .block(*block)
                    .referrers()
                    .iter()
                    .all(|r| module.instr(*r).block() == Some(*block))
            })
            .collect()
    }
}

impl Default for DeadBlockEliminator {
    fn default() -> Self {
        Self::new()
    }
}
