//! HTTP middleware: CORS, request logging, and role guards.

pub mod cors;
pub mod logging;
pub mod rbac;
