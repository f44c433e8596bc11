//! RESP value types.
//!
//! RESP2 defines the following value types:
//! - Simple String: `+OK\r\n`
//! - Error: `-ERR message\r\n`
//! - Integer: `:1000\r\n`
//! - Bulk String: `$6\r\nfoobar\r\n`
//! - Null: `$-1\r\n` / `*-1\r\n`
//! - Array: `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`
//!
//! Byte payloads are [`Bytes`], so cloning a value into a per-shard fragment
//! or a response slot shares the underlying buffer instead of copying it.

use bytes::Bytes;

/// A RESP protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Simple string: `+OK\r\n`
    SimpleString(Bytes),
    /// Error: `-ERR message\r\n`
    Error(Bytes),
    /// Integer: `:1000\r\n`
    Integer(i64),
    /// Bulk string: `$6\r\nfoobar\r\n`
    BulkString(Bytes),
    /// Null bulk string or null array: `$-1\r\n` / `*-1\r\n`
    Null,
    /// Array: `*2\r\n...`
    Array(Vec<Value>),
}

impl Value {
    // ── Constructors ────────────────────────────────────────────────────

    /// Create a simple string value.
    #[inline]
    pub fn simple_string(s: &[u8]) -> Self {
        Value::SimpleString(Bytes::copy_from_slice(s))
    }

    /// Create an error value.
    #[inline]
    pub fn error(msg: &[u8]) -> Self {
        Value::Error(Bytes::copy_from_slice(msg))
    }

    /// Create an integer value.
    #[inline]
    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    /// Create a bulk string value.
    #[inline]
    pub fn bulk_string(data: &[u8]) -> Self {
        Value::BulkString(Bytes::copy_from_slice(data))
    }

    /// Create a null value.
    #[inline]
    pub fn null() -> Self {
        Value::Null
    }

    /// Create an array value.
    #[inline]
    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(elements)
    }

    /// Build a command array: a `BulkString` name followed by one
    /// `BulkString` per argument.
    pub fn command<I, A>(name: &[u8], args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let mut elements = vec![Value::bulk_string(name)];
        elements.extend(args.into_iter().map(|arg| Value::bulk_string(arg.as_ref())));
        Value::Array(elements)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The array elements, if this value is an `Array`.
    #[inline]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(elements) => Some(elements),
            _ => None,
        }
    }

    /// The byte payload, if this value is a `BulkString`.
    #[inline]
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Value::BulkString(data) => Some(data),
            _ => None,
        }
    }

    /// True if this value is an `Error`.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}
