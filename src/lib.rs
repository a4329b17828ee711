//! bedrock-relay: streaming chat relay for Bedrock-hosted Anthropic models.
//!
//! Accepts a chat-completion request over HTTP, projects it into the
//! Bedrock invocation payload, opens a streamed model invocation, and
//! relays the resulting text deltas back to the client as they arrive:
//!
//!   HTTP request → translate → Bedrock → transduce → chunked response

pub mod bedrock;
pub mod config;
pub mod relay;
pub mod server;
