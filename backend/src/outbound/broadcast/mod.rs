//! Broadcast bus adapters for the location topic.
//!
//! - **redis**: publishes to a Redis pub/sub channel through a bb8 pool.
//! - **logging**: records payloads in the trace log when no bus is configured.

mod logging;
mod redis_broadcaster;

pub use logging::LoggingLocationBroadcaster;
pub use redis_broadcaster::{RedisLocationBroadcaster, RedisPoolConfig, RedisPoolError};
