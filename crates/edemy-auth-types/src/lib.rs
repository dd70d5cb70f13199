//! Session and request-forgery primitives shared by Edemy services.
//!
//! Provides session token issue/validation, cookie builders, the `Session`
//! extractor, and the double-submit CSRF guard.

pub mod cookie;
pub mod csrf;
pub mod session;
pub mod token;
