//! The table of commands the splitter accepts.
//!
//! Every name is lowercase ASCII; the registry matches case-insensitively by
//! lowercasing the incoming command name before lookup. Commands absent from
//! this table are rejected as unsupported.

/// Static views over the supported command names, grouped by dispatch
/// strategy.
pub struct SupportedCommands;

impl SupportedCommands {
    /// Commands routed to a single upstream by their first argument.
    pub fn simple() -> &'static [&'static str] {
        SIMPLE
    }

    /// Script commands routed by the first Redis key in the
    /// `EVAL script numkeys key [key ...]` argument shape.
    pub fn eval() -> &'static [&'static str] {
        EVAL
    }

    /// The fan-out multi-get command.
    pub fn mget() -> &'static str {
        "mget"
    }

    /// The fan-out multi-set command.
    pub fn mset() -> &'static str {
        "mset"
    }
}

static SIMPLE: &[&str] = &[
    "append",
    "bitcount",
    "bitfield",
    "bitpos",
    "decr",
    "decrby",
    "dump",
    "expire",
    "expireat",
    "geoadd",
    "geodist",
    "geohash",
    "geopos",
    "georadius_ro",
    "georadiusbymember_ro",
    "get",
    "getbit",
    "getrange",
    "getset",
    "hdel",
    "hexists",
    "hget",
    "hgetall",
    "hincrby",
    "hincrbyfloat",
    "hkeys",
    "hlen",
    "hmget",
    "hmset",
    "hscan",
    "hset",
    "hsetnx",
    "hstrlen",
    "hvals",
    "incr",
    "incrby",
    "incrbyfloat",
    "lindex",
    "linsert",
    "llen",
    "lpop",
    "lpush",
    "lpushx",
    "lrange",
    "lrem",
    "lset",
    "ltrim",
    "persist",
    "pexpire",
    "pexpireat",
    "pfadd",
    "pfcount",
    "psetex",
    "pttl",
    "restore",
    "rpop",
    "rpush",
    "rpushx",
    "sadd",
    "scard",
    "set",
    "setbit",
    "setex",
    "setnx",
    "setrange",
    "sismember",
    "smembers",
    "spop",
    "srandmember",
    "srem",
    "sscan",
    "strlen",
    "ttl",
    "type",
    "zadd",
    "zcard",
    "zcount",
    "zincrby",
    "zlexcount",
    "zrange",
    "zrangebylex",
    "zrangebyscore",
    "zrank",
    "zrem",
    "zremrangebylex",
    "zremrangebyrank",
    "zremrangebyscore",
    "zrevrange",
    "zrevrangebylex",
    "zrevrangebyscore",
    "zrevrank",
    "zscan",
    "zscore",
];

static EVAL: &[&str] = &["eval", "evalsha"];
