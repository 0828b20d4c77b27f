//! Test module - one submodule per functional area
//!
//! - assertion adapter messages and strictness
//! - config loading/layering and CLI precedence
//! - request handlers (in-process, no socket)
//! - probe against real sockets: live server, refused, silent and closing peers
//! - harness reports and full smoke runs

pub(crate) mod harness;
