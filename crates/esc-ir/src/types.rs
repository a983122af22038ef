//! IR types
//!
//! Types form a small closed family. Two types are equal when their kinds
//! match and their parameters (element type, length or name) match. The
//! ordering is total: kinds are ordered by identifier, then by parameters.
//! `Reference` types carry a name for printing only; any two references
//! compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Kind identifier of a [`Type`], in ordering sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    Void,
    Boolean,
    Double,
    String,
    Value,
    Reference,
    Array,
    Pointer,
    Opaque,
}

/// An IR type
#[derive(Debug, Clone)]
pub enum Type {
    Void,
    Boolean,
    Double,
    String,
    /// The dynamic ECMAScript value
    Value,
    /// Named reference produced by meta instructions
    Reference(Arc<str>),
    /// Fixed-length array of an element type
    Array(Arc<Type>, usize),
    /// Pointer to an element type
    Pointer(Arc<Type>),
    /// Runtime type the IR cannot look into
    Opaque(Arc<str>),
}

impl Type {
    pub fn void() -> Self {
        Type::Void
    }

    pub fn boolean() -> Self {
        Type::Boolean
    }

    pub fn double() -> Self {
        Type::Double
    }

    pub fn string() -> Self {
        Type::String
    }

    pub fn value() -> Self {
        Type::Value
    }

    pub fn reference(name: &str) -> Self {
        Type::Reference(Arc::from(name))
    }

    pub fn array(element: Type, length: usize) -> Self {
        Type::Array(Arc::new(element), length)
    }

    pub fn pointer(element: Type) -> Self {
        Type::Pointer(Arc::new(element))
    }

    pub fn opaque(name: &str) -> Self {
        Type::Opaque(Arc::from(name))
    }

    /// Get the kind identifier
    pub fn kind(&self) -> TypeKind {
        match self {
            Type::Void => TypeKind::Void,
            Type::Boolean => TypeKind::Boolean,
            Type::Double => TypeKind::Double,
            Type::String => TypeKind::String,
            Type::Value => TypeKind::Value,
            Type::Reference(_) => TypeKind::Reference,
            Type::Array(..) => TypeKind::Array,
            Type::Pointer(_) => TypeKind::Pointer,
            Type::Opaque(_) => TypeKind::Opaque,
        }
    }

    /// Element type of an array or pointer
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem, _) | Type::Pointer(elem) => Some(elem),
            _ => None,
        }
    }

    /// Length of an array type
    pub fn length(&self) -> Option<usize> {
        match self {
            Type::Array(_, len) => Some(*len),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Type::Double)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::String)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Type::Value)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Reference(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(..))
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Type::Opaque(_))
    }

    /// True for a pointer whose element is the dynamic value type
    pub fn is_value_pointer(&self) -> bool {
        matches!(self, Type::Pointer(elem) if elem.is_value())
    }

    /// Structural equality
    pub fn equal_to(&self, other: &Type) -> bool {
        self.compare(other) == Ordering::Equal
    }

    /// Strict ordering consistent with [`Type::equal_to`]
    pub fn less_than(&self, other: &Type) -> bool {
        self.compare(other) == Ordering::Less
    }

    fn compare(&self, other: &Type) -> Ordering {
        match self.kind().cmp(&other.kind()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match (self, other) {
            (Type::Array(a, alen), Type::Array(b, blen)) => {
                a.compare(b).then_with(|| alen.cmp(blen))
            }
            (Type::Pointer(a), Type::Pointer(b)) => a.compare(b),
            (Type::Opaque(a), Type::Opaque(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.equal_to(other)
    }
}

impl Eq for Type {}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Type {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Type::Array(elem, len) => {
                elem.hash(state);
                len.hash(state);
            }
            Type::Pointer(elem) => elem.hash(state),
            Type::Opaque(name) => name.hash(state),
            _ => {}
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Boolean => write!(f, "boolean"),
            Type::Double => write!(f, "double"),
            Type::String => write!(f, "string"),
            Type::Value => write!(f, "value"),
            Type::Reference(name) => write!(f, "reference({})", name),
            Type::Array(elem, len) => write!(f, "{}[{}]", elem, len),
            Type::Pointer(elem) => write!(f, "{}*", elem),
            Type::Opaque(name) => write!(f, "opaque {}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_parameterized_equality() {
        assert_eq!(Type::array(Type::value(), 4), Type::array(Type::value(), 4));
        assert_ne!(Type::array(Type::value(), 4), Type::array(Type::value(), 5));
        assert_ne!(Type::array(Type::value(), 4), Type::array(Type::double(), 4));
        assert_eq!(Type::pointer(Type::value()), Type::pointer(Type::value()));
        assert_ne!(Type::opaque("A"), Type::opaque("B"));
    }

    #[test]
    fn test_types_cross_threads() {
        let ty = Type::pointer(Type::array(Type::value(), 3));
        let copy = ty.clone();
        let shown = std::thread::spawn(move || copy.to_string()).join().unwrap();
        assert_eq!(shown, "value[3]*");
    }

    #[test]
    fn test_references_ignore_name() {
        assert_eq!(Type::reference("a"), Type::reference("b"));
        assert!(!Type::reference("a").less_than(&Type::reference("b")));
    }

    #[test]
    fn test_kind_order() {
        assert!(Type::void().less_than(&Type::boolean()));
        assert!(Type::value().less_than(&Type::array(Type::void(), 0)));
        assert!(Type::pointer(Type::opaque("z")).less_than(&Type::opaque("a")));
    }

    #[test]
    fn test_array_orders_by_element_then_length() {
        assert!(Type::array(Type::boolean(), 9).less_than(&Type::array(Type::double(), 1)));
        assert!(Type::array(Type::double(), 1).less_than(&Type::array(Type::double(), 2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::array(Type::value(), 3).to_string(), "value[3]");
        assert_eq!(Type::pointer(Type::value()).to_string(), "value*");
        assert_eq!(Type::opaque("EsPropertyIterator").to_string(), "opaque EsPropertyIterator");
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let mut set = FxHashSet::default();
        set.insert(Type::array(Type::value(), 2));
        set.insert(Type::array(Type::value(), 2));
        set.insert(Type::reference("x"));
        set.insert(Type::reference("y"));
        assert_eq!(set.len(), 2);
    }

    fn arb_type() -> impl Strategy<Value = Type> {
        let leaf = prop_oneof![
            Just(Type::void()),
            Just(Type::boolean()),
            Just(Type::double()),
            Just(Type::string()),
            Just(Type::value()),
            "[a-c]{1,2}".prop_map(|s| Type::reference(&s)),
            "[a-c]{1,2}".prop_map(|s| Type::opaque(&s)),
        ];
        leaf.prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                (inner.clone(), 0usize..4).prop_map(|(t, n)| Type::array(t, n)),
                inner.prop_map(Type::pointer),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_equal_iff_neither_less(a in arb_type(), b in arb_type()) {
            let eq = a.equal_to(&b);
            let neither = !a.less_than(&b) && !b.less_than(&a);
            prop_assert_eq!(eq, neither);
        }

        #[test]
        fn prop_less_than_is_transitive(a in arb_type(), b in arb_type(), c in arb_type()) {
            if a.less_than(&b) && b.less_than(&c) {
                prop_assert!(a.less_than(&c));
            }
        }

        #[test]
        fn prop_less_than_is_irreflexive(a in arb_type()) {
            prop_assert!(!a.less_than(&a));
            prop_assert!(a.equal_to(&a.clone()));
        }
    }
}
