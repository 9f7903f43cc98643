use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::environment::Env;
use super::node::{BlockStatement, Identifier};

/// Native function signature for builtins.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A function value: parameters, body and the scope it closed over.
#[derive(Clone)]
pub struct Function {
    pub params: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

impl PartialEq for Function {
    // Captured scopes are compared by identity; they may be cyclic.
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.body == other.body && Rc::ptr_eq(&self.env, &other.env)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("params", &self.params)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

/// A natively implemented function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Runtime value in the ape language.
///
/// Constants in a bytecode package and every slot of the VM stack hold one
/// of these. Function and builtin values only exist at runtime and are not
/// serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),

    /// UTF-8 string value.
    String(String),

    /// Boolean value.
    Boolean(bool),

    Null,

    /// Ordered, heterogeneous array.
    Array(Vec<Value>),

    /// String-keyed mapping.
    Object(BTreeMap<String, Value>),

    #[serde(skip)]
    Function(Function),

    #[serde(skip)]
    Builtin(Builtin),

    /// Wraps a value produced by `return` so it can unwind enclosing blocks.
    Return(Box<Value>),

    /// An in-language error value.
    Error(String),
}

impl Value {
    /// Type tag, as used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::String(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Object(_) => "OBJECT",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Return(_) => "RETURN",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Value::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Appends to an array in place. Any other receiver yields an error value.
    pub fn push(&mut self, item: Value) -> Value {
        match self {
            Value::Array(items) => {
                items.push(item);
                Value::Null
            }
            other => Value::error(format!("push: expected ARRAY, got {}", other.type_name())),
        }
    }

    /// Inserts into an object in place, returning the previous value or `Null`.
    /// Any other receiver yields an error value.
    pub fn insert(&mut self, key: impl Into<String>, item: Value) -> Value {
        match self {
            Value::Object(entries) => entries.insert(key.into(), item).unwrap_or(Value::Null),
            other => Value::error(format!("insert: expected OBJECT, got {}", other.type_name())),
        }
    }
}

impl fmt::Display for Value {
    /// Inspect form: what the REPL shows for a result.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => {
                write!(f, "fn(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ") {}", func.body)
            }
            Value::Builtin(builtin) => write!(f, "builtin function {}", builtin.name),
            Value::Return(inner) => write!(f, "{}", inner),
            Value::Error(message) => write!(f, "ERROR: {}", message),
        }
    }
}
