//! Shared utilities, configuration, and error handling for CurlARC
//!
//! This crate provides common functionality used across the CurlARC core:
//! - Identifier value objects for users, teams and records
//! - Error types and the storage-boundary error
//! - Partial-update field type
//! - Configuration management following 12-factor principles

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod invite;
pub mod state;
pub mod update;

pub use db::{RepoResult, RepositoryError};
pub use error::{Error, Result};
pub use ids::{RecordId, TeamId, UserId};
pub use invite::{InviteFailure, InviteFailureReason, InviteReport, InvitedTarget};
pub use state::StateError;
pub use update::FieldUpdate;
