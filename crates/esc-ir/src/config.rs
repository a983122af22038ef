//! IR configuration (esc.toml `[ir]` table)

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};
use crate::function::FunctionId;
use crate::key::CacheIdAllocator;
use crate::module::Module;
use crate::optimize::OptLevel;

/// Settings shared by IR generation and the passes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IrConfig {
    /// Number of context inline-cache slots per scope (default: 256)
    #[serde(default = "default_cache_size")]
    pub context_cache_size: u16,

    /// Number of property inline-cache slots (default: 256)
    #[serde(default = "default_cache_size")]
    pub property_cache_size: u16,

    /// Name of the global program function (default: "__es_main")
    #[serde(default = "default_main_function_name")]
    pub main_function_name: String,

    /// Name of the function that registers module data (default: "__es_data")
    #[serde(default = "default_data_function_name")]
    pub data_function_name: String,

    /// Optimization level (default: "basic")
    #[serde(default)]
    pub opt_level: OptLevel,

    /// Verify the module after optimizing
    #[serde(default)]
    pub verify: bool,
}

fn default_cache_size() -> u16 {
    256
}

fn default_main_function_name() -> String {
    "__es_main".to_string()
}

fn default_data_function_name() -> String {
    "__es_data".to_string()
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            context_cache_size: default_cache_size(),
            property_cache_size: default_cache_size(),
            main_function_name: default_main_function_name(),
            data_function_name: default_data_function_name(),
            opt_level: OptLevel::default(),
            verify: false,
        }
    }
}

impl IrConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> IrResult<Self> {
        let config: IrConfig = toml::from_str(text).map_err(|e| IrError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> IrResult<String> {
        toml::to_string(self).map_err(|e| IrError::Config {
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> IrResult<()> {
        if self.context_cache_size == 0 {
            return Err(IrError::Config {
                message: "context_cache_size must be positive".to_string(),
            });
        }
        if self.property_cache_size == 0 {
            return Err(IrError::Config {
                message: "property_cache_size must be positive".to_string(),
            });
        }
        if self.main_function_name.is_empty() || self.data_function_name.is_empty() {
            return Err(IrError::Config {
                message: "function names must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn context_cache(&self) -> CacheIdAllocator {
        CacheIdAllocator::new(self.context_cache_size)
    }

    pub fn property_cache(&self) -> CacheIdAllocator {
        CacheIdAllocator::new(self.property_cache_size)
    }

    /// Create and push the global program function
    pub fn new_main_function(&self, module: &mut Module) -> FunctionId {
        module.new_function(self.main_function_name.as_str(), true)
    }

    /// Create and push the data registration function
    pub fn new_data_function(&self, module: &mut Module) -> FunctionId {
        module.new_function(self.data_function_name.as_str(), false)
    }
}
