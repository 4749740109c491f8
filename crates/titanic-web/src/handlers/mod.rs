//! HTTP handlers for all API routes.

pub mod ask;
pub mod health;
