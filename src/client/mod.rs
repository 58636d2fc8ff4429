//! Compute API client and authentication.
//!
//! This module provides the [`ComputeClient`] used by the compute usage
//! extractor, along with authentication types ([`Auth`], [`AuthType`]).

mod auth;
mod compute;

pub use auth::{Auth, AuthType};
pub use compute::ComputeClient;
