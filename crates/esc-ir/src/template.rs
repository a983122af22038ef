//! Template blocks
//!
//! A template is a reusable instruction sequence, such as a scope epilogue,
//! that is expanded into a function wherever control leaves the scope.

use crate::block::BlockId;
use crate::error::IrResult;
use crate::function::FunctionId;
use crate::module::Module;

/// Instruction sequence expanded on demand
pub trait TemplateBlock {
    /// Append the template to the last block of `fun`
    fn inflate(&self, module: &mut Module, fun: FunctionId) -> IrResult<()>;
}

/// `ret false`
#[derive(Debug, Clone, Default)]
pub struct ReturnFalseTemplateBlock;

impl TemplateBlock for ReturnFalseTemplateBlock {
    fn inflate(&self, module: &mut Module, fun: FunctionId) -> IrResult<()> {
        let block = module.function(fun).last_block();
        let value = module.const_bool(false);
        module.builder(block).push_trm_ret(value)?;
        Ok(())
    }
}

/// `jmp dst`
#[derive(Debug, Clone)]
pub struct JumpTemplateBlock {
    dst: BlockId,
}

impl JumpTemplateBlock {
    pub fn new(dst: BlockId) -> Self {
        Self { dst }
    }
}

impl TemplateBlock for JumpTemplateBlock {
    fn inflate(&self, module: &mut Module, fun: FunctionId) -> IrResult<()> {
        let block = module.function(fun).last_block();
        module.builder(block).push_trm_jmp(self.dst)?;
        Ok(())
    }
}

/// `ctx.leave`
#[derive(Debug, Clone, Default)]
pub struct LeaveContextTemplateBlock;

impl TemplateBlock for LeaveContextTemplateBlock {
    fn inflate(&self, module: &mut Module, fun: FunctionId) -> IrResult<()> {
        let block = module.function(fun).last_block();
        module.builder(block).push_ctx_leave()?;
        Ok(())
    }
}

/// Sequence of templates inflated in order
#[derive(Default)]
pub struct MultiTemplateBlock {
    blocks: Vec<Box<dyn TemplateBlock>>,
}

impl MultiTemplateBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Box<dyn TemplateBlock>) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl TemplateBlock for MultiTemplateBlock {
    fn inflate(&self, module: &mut Module, fun: FunctionId) -> IrResult<()> {
        for block in &self.blocks {
            block.inflate(module, fun)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IrError;
    use crate::instr::InstrKind;

    #[test]
    fn test_epilogue_sequence() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let entry = module.function(fun).entry_block();

        let mut epilogue = MultiTemplateBlock::new();
        epilogue.push(Box::new(LeaveContextTemplateBlock));
        epilogue.push(Box::new(ReturnFalseTemplateBlock));
        epilogue.inflate(&mut module, fun).unwrap();

        let kinds: Vec<&str> = module
            .block(entry)
            .instrs()
            .iter()
            .map(|id| module.instr(*id).kind().mnemonic())
            .collect();
        assert_eq!(kinds, vec!["ctx_leave", "ret"]);
    }

    #[test]
    fn test_jump_template_registers_referrer() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        let dst = module.new_block(Some("finally"));

        JumpTemplateBlock::new(dst).inflate(&mut module, fun).unwrap();
        let jmp = module.block(module.function(fun).last_block()).last_instr().unwrap();
        assert!(matches!(module.instr(jmp).kind(), InstrKind::Jump(_)));
        assert!(module.block(dst).referrers().contains(&jmp));
    }

    #[test]
    fn test_inflate_into_terminated_block() {
        let mut module = Module::new();
        let fun = module.new_function("f", false);
        ReturnFalseTemplateBlock.inflate(&mut module, fun).unwrap();
        assert!(matches!(
            LeaveContextTemplateBlock.inflate(&mut module, fun),
            Err(IrError::PushAfterTerminator { .. })
        ));
    }
}
