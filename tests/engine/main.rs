//! Commit engine and session integration tests.

mod support;
mod session;

#[cfg(feature = "http")]
mod http;
