pub mod client;
#[cfg(test)]
pub mod fake;
pub mod http;

pub use client::{IdentityError, IdentityService, User};
pub use http::HttpIdentityService;
