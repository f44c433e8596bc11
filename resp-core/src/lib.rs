//! RESP value model.
//!
//! This crate provides the in-memory representation of RESP2 values used by
//! the splitline command splitter: the six-variant [`Value`] enum plus the
//! constructors and accessors request routing needs.
//!
//! Wire parsing and encoding are deliberately absent — framing is owned by
//! the front-end decoder and the upstream connection pool, which hand fully
//! decoded values across this boundary.
//!
//! # Example
//!
//! ```
//! use resp_core::Value;
//!
//! let request = Value::command(b"GET", [b"mykey"]);
//! assert_eq!(request.as_array().map(<[Value]>::len), Some(2));
//! ```

mod value;

pub use value::Value;
