//! Types shared between routes and middleware.

pub mod session;
