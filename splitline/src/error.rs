//! Client-visible request failures.
//!
//! The rendered text of every variant is part of the external contract: it
//! is exactly the message a client sees in the RESP error reply, so the
//! strings here are bit-stable. All messages are lowercase ASCII sentences
//! without trailing punctuation.

use bytes::Bytes;
use resp_core::Value;

/// The catalogue of error replies the splitter can produce.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    /// The request is not an array of at least two bulk strings.
    #[error("invalid request")]
    InvalidRequest,

    /// The command name is not in the supported-commands table. Carries the
    /// name in its original case.
    #[error("unsupported command '{0}'")]
    UnsupportedCommand(String),

    /// The command was recognized but its argument count is wrong. Carries
    /// the name in its original case.
    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),

    /// The pool could not produce an upstream handle synchronously.
    #[error("no upstream host")]
    NoUpstreamHost,

    /// The pool reported a transport-level failure for an in-flight request.
    #[error("upstream failure")]
    UpstreamFailure,

    /// An upstream replied with a RESP type its command contract forbids.
    #[error("upstream protocol error")]
    UpstreamProtocolError,

    /// Aggregate failure for a fan-out write: `n` keys did not land.
    #[error("finished with {0} error(s)")]
    FanoutErrors(u64),
}

impl ReplyError {
    /// Render into the RESP `Error` value sent to the client.
    pub fn into_reply(self) -> Value {
        Value::Error(Bytes::from(self.to_string()))
    }
}
