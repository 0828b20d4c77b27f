//! welcome-server
//!
//! A static welcome page server plus the smoke-test harness that guards its deployments:
//! [`probe`] captures one HTTP response, [`assertion`] checks it, [`harness`] runs the named
//! test groups and reports.

pub mod assertion;
pub mod cofg;
pub mod error;
pub mod harness;
pub mod probe;
pub mod request;
pub mod server;

#[cfg(test)]
mod test;

/// `<pkg version>(<profile> Profile)-<git hash><env>`, assembled by build.rs
pub const VERSION: &str = env!("VERSION");
