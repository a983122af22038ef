//! IR optimization passes
//!
//! Runs over a finished module before code generation.

mod dead_block;

pub use dead_block::DeadBlockEliminator;

use serde::{Deserialize, Serialize};

use crate::config::IrConfig;
use crate::error::{IrError, IrResult};
use crate::module::Module;
use crate::verify::verify_module;

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptLevel {
    /// No optimizations
    None,
    /// Unreachable block removal
    #[default]
    Basic,
}

/// Optimizer that runs the passes selected by its level
pub struct Optimizer {
    level: OptLevel,
    verify: bool,
}

impl Optimizer {
    /// Create a new optimizer with the given level
    pub fn new(level: OptLevel) -> Self {
        Self {
            level,
            verify: false,
        }
    }

    pub fn basic() -> Self {
        Self::new(OptLevel::Basic)
    }

    pub fn none() -> Self {
        Self::new(OptLevel::None)
    }

    pub fn from_config(config: &IrConfig) -> Self {
        Self {
            level: config.opt_level,
            verify: config.verify,
        }
    }

    /// Verify the module after the passes have run
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn level(&self) -> OptLevel {
        self.level
    }

    /// Run all optimization passes on the module
    pub fn optimize(&self, module: &mut Module) -> IrResult<OptStats> {
        let mut stats = OptStats::default();

        if self.level != OptLevel::None {
            let eliminator = DeadBlockEliminator::new();
            stats.unreachable_blocks_removed = eliminator.eliminate(module)?;
        }

        if self.verify {
            verify_module(module).map_err(|errors| IrError::Verification { errors })?;
        }

        log::debug!(
            "optimized at {:?}: {} unreachable block(s) removed",
            self.level,
            stats.unreachable_blocks_removed
        );
        Ok(stats)
    }
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::basic()
    }
}

/// Statistics about optimizations performed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptStats {
    /// Number of unreachable blocks removed
    pub unreachable_blocks_removed: usize,
}
