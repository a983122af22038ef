//! Constant operands

use std::fmt;

use crate::value::Value;

/// Special values of the dynamic value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialValue {
    /// Internal marker for "no value"
    Nothing,
    Undefined,
    Null,
    True,
    False,
}

impl SpecialValue {
    pub fn name(&self) -> &'static str {
        match self {
            SpecialValue::Nothing => "nothing",
            SpecialValue::Undefined => "undefined",
            SpecialValue::Null => "null",
            SpecialValue::True => "true",
            SpecialValue::False => "false",
        }
    }
}

impl fmt::Display for SpecialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A constant operand
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Element `index` of an array or pointer operand
    ArrayElement { array: Value, index: usize },
    /// The function object currently being called
    Callee,
    /// Storage for the current function's return value
    Return,
    /// Null of a given type
    Null(crate::types::Type),
    Boolean(bool),
    Double(f64),
    /// A double kept in its source text form
    StringifiedDouble(String),
    String(String),
    Value(SpecialValue),
}

impl Constant {
    /// Short identifier used by printers and logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            Constant::ArrayElement { .. } => "array_elm",
            Constant::Callee => "callee",
            Constant::Return => "ret",
            Constant::Null(_) => "null",
            Constant::Boolean(_) => "bool",
            Constant::Double(_) => "double",
            Constant::StringifiedDouble(_) => "strdouble",
            Constant::String(_) => "str",
            Constant::Value(_) => "value",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstData {
    pub(crate) constant: Constant,
    pub(crate) persistent: bool,
}

impl ConstData {
    pub(crate) fn new(constant: Constant) -> Self {
        ConstData {
            constant,
            persistent: false,
        }
    }
}
