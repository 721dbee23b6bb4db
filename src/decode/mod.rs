//! Response decoding
//!
//! Turns a JSON response body into the list of records for a stream,
//! using the stream's records path (`$`, `$.evaluations[*]`, ...).

mod decoders;

pub use decoders::{JsonDecoder, RecordDecoder};

#[cfg(test)]
mod tests;
