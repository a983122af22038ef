//! Unique label generation

/// Monotonic label generator
///
/// Every label shares one counter, so labels are unique across prefixes.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    counter: u64,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next anonymous label: `_0`, `_1`, ...
    pub fn next(&mut self) -> String {
        self.next_with_prefix("")
    }

    /// Next label with `prefix`
    ///
    /// The prefix is only used if it is a valid C identifier; otherwise the
    /// label falls back to `_`.
    pub fn next_with_prefix(&mut self, prefix: &str) -> String {
        let prefix = if is_identifier(prefix) { prefix } else { "_" };
        let name = format!("{}{}", prefix, self.counter);
        self.counter += 1;
        name
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_names() {
        let mut names = NameGenerator::new();
        assert_eq!(names.next(), "_0");
        assert_eq!(names.next(), "_1");
    }

    #[test]
    fn test_prefix_validation() {
        let mut names = NameGenerator::new();
        assert_eq!(names.next_with_prefix("loop"), "loop0");
        assert_eq!(names.next_with_prefix("9lives"), "_1");
        assert_eq!(names.next_with_prefix("a-b"), "_2");
        assert_eq!(names.next_with_prefix("_x9"), "_x93");
        assert_eq!(names.next(), "_4");
    }
}
