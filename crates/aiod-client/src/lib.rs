// Public fallible APIs in this crate share one concrete error contract (`AiodError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod resource;
pub mod session;
pub mod token;
pub mod transport;

pub use classify::{ErrorOverrides, classify};
pub use client::AiodClient;
pub use config::ClientConfig;
pub use error::{AiodError, ApiFailure, Result};
pub use models::{Credentials, CurrentUser, Page};
pub use resource::{ResourceKind, Taxonomy};
pub use session::SessionStore;
pub use token::Token;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
