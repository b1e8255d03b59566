//! # Newsroom Core
//!
//! The domain layer of the Newsroom publishing backend.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the ports the infrastructure must implement, and the services that
//! enforce the publishing rules (author rating, daily post quota, notification
//! fan-out, scheduled digest/purge job bodies).

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
