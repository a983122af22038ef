//! Property keys and inline-cache ids
//!
//! A property key is a 64-bit word. Array indices are stored as themselves;
//! string keys store the interned string id with the top bit set.

use rustc_hash::FxHashMap;

use crate::module::Module;

const IS_STRING: u64 = 0x8000_0000_0000_0000;

/// Decoded property key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    /// Interned string id
    String(u32),
}

impl PropertyKey {
    pub fn encode(self) -> u64 {
        match self {
            PropertyKey::Index(index) => u64::from(index),
            PropertyKey::String(id) => u64::from(id) | IS_STRING,
        }
    }

    pub fn decode(raw: u64) -> Self {
        if raw & IS_STRING != 0 {
            PropertyKey::String((raw & !IS_STRING) as u32)
        } else {
            PropertyKey::Index(raw as u32)
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, PropertyKey::String(_))
    }
}

/// Parse a canonical array index: decimal digits, no leading zeros, within `u32`
pub fn str_to_index(text: &str) -> Option<u32> {
    let bytes = text.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 1 && bytes[0] == b'0' {
        return None;
    }
    text.parse::<u32>().ok()
}

impl Module {
    /// Encode `name` as a property key, interning it unless it is an index
    pub fn property_key(&mut self, name: &str) -> u64 {
        match str_to_index(name) {
            Some(index) => PropertyKey::Index(index).encode(),
            None => PropertyKey::String(self.intern_string(name)).encode(),
        }
    }
}

/// Hands out inline-cache ids
///
/// A key keeps its id for the allocator's lifetime. New keys get sequential
/// ids that wrap around at the cache size, so distinct keys may share a slot.
#[derive(Debug, Clone)]
pub struct CacheIdAllocator {
    size: u16,
    next: u16,
    ids: FxHashMap<u64, u16>,
}

impl CacheIdAllocator {
    pub fn new(size: u16) -> Self {
        CacheIdAllocator {
            size: size.max(1),
            next: 0,
            ids: FxHashMap::default(),
        }
    }

    /// Cache id for `key`
    pub fn get(&mut self, key: u64) -> u16 {
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        let id = self.next;
        self.next = (self.next + 1) % self.size;
        self.ids.insert(key, id);
        id
    }

    pub fn size(&self) -> u16 {
        self.size
    }
}
