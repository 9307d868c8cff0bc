//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod containers;
pub mod fallback;
pub mod index;

use serde::Serialize;

/// Bare outcome body: `{"status": "success"}` or `{"status": "failed"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    /// Either `success` or `failed`.
    pub status: &'static str,
}

impl StatusResponse {
    /// The operation took effect.
    pub const SUCCESS: Self = Self { status: "success" };
    /// The operation had nothing to do.
    pub const FAILED: Self = Self { status: "failed" };

    /// Map a transition outcome onto a status body.
    #[must_use]
    pub const fn from_outcome(applied: bool) -> Self {
        if applied {
            Self::SUCCESS
        } else {
            Self::FAILED
        }
    }
}
