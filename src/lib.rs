// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT authentication gate for HTTP APIs.
//!
//! Requests carry a JSON Web Token in an `Authorization: Bearer` header or
//! in a cookie. The token is verified against configured X.509 signing
//! certificates or a shared HMAC key, its lifetime is checked, and the
//! caller's identity and roles are made available to handlers.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum) and the OpenAPI document
//! - `auth` - Credential extraction, token verification and claims validation
//! - `config` - Environment configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
