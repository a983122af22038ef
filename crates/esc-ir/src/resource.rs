//! Module resources
//!
//! Strings referenced by generated code are interned once per module and
//! emitted as [`StringResource`]s. The table assigns every id: a resource's
//! id is the id of its interned string, so ids are monotonic and never
//! reused, and each string is emitted at most once.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{IrError, IrResult};
use crate::module::Module;

/// An interned string payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringResource {
    id: u32,
    text: String,
}

impl StringResource {
    pub(crate) fn new(id: u32, text: impl Into<String>) -> Self {
        StringResource {
            id,
            text: text.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// A module-level resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    String(StringResource),
}

impl Resource {
    pub fn id(&self) -> u32 {
        match self {
            Resource::String(res) => res.id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceTable {
    resources: Vec<Resource>,
    strings: Vec<String>,
    ids: FxHashMap<String, u32>,
    /// String ids that already have a resource
    registered: FxHashSet<u32>,
}

impl ResourceTable {
    fn push_string(&mut self, id: u32) -> bool {
        if !self.registered.insert(id) {
            return false;
        }
        let text = self.strings[id as usize].clone();
        self.resources.push(Resource::String(StringResource::new(id, text)));
        true
    }
}

impl Module {
    /// Intern a string and return its stable id
    pub fn intern_string(&mut self, text: &str) -> u32 {
        let table = &mut self.resources;
        if let Some(id) = table.ids.get(text) {
            return *id;
        }
        let id = table.strings.len() as u32;
        table.strings.push(text.to_string());
        table.ids.insert(text.to_string(), id);
        log::trace!("interned string {} as {}", text, id);
        id
    }

    /// Id of an already interned string
    pub fn string_id(&self, text: &str) -> Option<u32> {
        self.resources.ids.get(text).copied()
    }

    /// Interned string by id
    pub fn interned_string(&self, id: u32) -> Option<&str> {
        self.resources.strings.get(id as usize).map(String::as_str)
    }

    /// Push a string resource and return its id
    ///
    /// The string is interned first. Pushing a string that already has a
    /// resource returns the existing id without a second entry.
    pub fn push_resource(&mut self, text: &str) -> u32 {
        let id = self.intern_string(text);
        self.resources.push_string(id);
        id
    }

    /// Push a string resource for every interned string that lacks one
    pub fn register_string_resources(&mut self) {
        let table = &mut self.resources;
        let mut pending = 0;
        for id in 0..table.strings.len() as u32 {
            if table.push_string(id) {
                pending += 1;
            }
        }
        log::debug!("registered {} string resource(s)", pending);
    }

    /// Resources in push order
    pub fn resources(&self) -> &[Resource] {
        &self.resources.resources
    }

    pub fn resource_by_id(&self, id: u32) -> IrResult<&Resource> {
        self.resources
            .resources
            .iter()
            .find(|res| res.id() == id)
            .ok_or(IrError::UnknownResource { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let mut module = Module::new();
        let a = module.intern_string("length");
        let b = module.intern_string("prototype");
        assert_eq!(module.intern_string("length"), a);
        assert_eq!((a, b), (0, 1));
        assert_eq!(module.string_id("prototype"), Some(1));
        assert_eq!(module.interned_string(1), Some("prototype"));
    }

    #[test]
    fn test_register_string_resources() {
        let mut module = Module::new();
        module.intern_string("a");
        module.intern_string("b");
        module.register_string_resources();
        module.intern_string("c");
        module.register_string_resources();

        let ids: Vec<u32> = module.resources().iter().map(Resource::id).collect();
        assert_eq!(ids, vec![0, 1, 2]);

        match module.resource_by_id(2).unwrap() {
            Resource::String(res) => assert_eq!(res.text(), "c"),
        }
        assert!(matches!(
            module.resource_by_id(9),
            Err(IrError::UnknownResource { id: 9 })
        ));
    }

    #[test]
    fn test_pushed_and_registered_ids_are_distinct() {
        let mut module = Module::new();
        let manual = module.push_resource("manual");
        module.intern_string("interned");
        module.register_string_resources();
        assert_eq!(module.push_resource("manual"), manual);

        let ids: Vec<u32> = module.resources().iter().map(Resource::id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_ne!(ids[0], ids[1]);

        match module.resource_by_id(manual).unwrap() {
            Resource::String(res) => assert_eq!(res.text(), "manual"),
        }
        match module.resource_by_id(1).unwrap() {
            Resource::String(res) => assert_eq!(res.text(), "interned"),
        }
    }

    #[test]
    fn test_push_after_registration_registers_once() {
        let mut module = Module::new();
        module.intern_string("a");
        module.register_string_resources();
        let b = module.push_resource("b");
        module.register_string_resources();
        module.register_string_resources();

        let ids: Vec<u32> = module.resources().iter().map(Resource::id).collect();
        assert_eq!(ids, vec![0, b]);
        assert_eq!(module.push_resource("a"), 0);
        assert_eq!(module.resources().len(), 2);
    }
}
