//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: PostgreSQL/PostGIS repositories using Diesel ORM
//! - **broadcast**: Redis pub/sub publisher for live location payloads
//! - **memory**: in-process store used when no database is configured
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod broadcast;
pub mod memory;
pub mod persistence;
