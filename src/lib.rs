//! Paddock - In-Memory Rate Limiting Service
//!
//! This crate implements a fixed-window rate limiter that guards HTTP edge
//! functions against abuse. Requests are tracked per caller identifier
//! (authenticated user id, or forwarded network address for anonymous
//! traffic) against a small catalog of named policies. Rejected requests
//! receive a standardized 429 response that browser clients can parse.
//!
//! State is process-local and ephemeral by design; horizontally scaled
//! deployments each enforce an independent budget per identifier.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
