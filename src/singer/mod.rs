//! Singer protocol output
//!
//! `SCHEMA`, `RECORD` and `STATE` messages written as one JSON object per
//! line. Nothing but messages may go to the output; logs go to stderr.

mod messages;
mod writer;

pub use messages::Message;
pub use writer::{MessageWriter, OutputMode, SharedBuffer};
