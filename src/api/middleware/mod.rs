//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: session lookup
//! 2. Access logger: logs after auth, has practitioner id

pub mod audit;
pub mod auth;
