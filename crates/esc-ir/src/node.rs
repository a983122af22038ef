//! Source position metadata shared by modules, functions and blocks

/// Source position of a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Meta {
    /// Source file name
    pub name: String,
    /// Start offset
    pub beg: usize,
    /// End offset
    pub end: usize,
}

impl Meta {
    pub fn new(name: impl Into<String>, beg: usize, end: usize) -> Self {
        Meta {
            name: name.into(),
            beg,
            end,
        }
    }
}
