//! Centralized user-facing messages.
//!
//! [`Message`] names every string the application shows; the `msg_*` macros
//! route them to stdout/stderr or, in debug mode, to `tracing`.

pub mod display;
pub mod macros;
pub mod types;

pub use types::Message;
