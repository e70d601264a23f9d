//! Adapters implementing domain ports.
//!
//! This module contains the storage implementations of the
//! [`SnapshotRepository`](crate::ports::SnapshotRepository) port.

pub mod json_repository;
pub mod msgpack_repository;

pub use json_repository::JsonRepository;
pub use msgpack_repository::MsgPackRepository;
