//! # Newsletter Core
//!
//! The domain layer of the newsletter.
//! Posts, comments, the capability gate, the routing table and the services
//! that tie them to the ports. No infrastructure dependencies live here.

pub mod access;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod routes;
pub mod services;

pub use access::{Actor, AuthenticatedUser, Capability, CapabilitySet};
pub use error::{DomainError, FieldErrors, RepoError};
pub use routes::Route;
