//! The streaming relay core.
//!
//! - [`translate`]: inbound chat request → Bedrock invocation payload
//! - [`transduce`]: provider event stream → ordered text fragments
//! - [`backend`]: contract for the streaming model backend

pub mod backend;
pub mod transduce;
pub mod translate;
