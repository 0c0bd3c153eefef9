//! HTTP request handlers, one module per endpoint.

pub mod embed;
pub mod retrieve;
pub mod transcribe;
pub mod translate;
pub mod tts;

#[cfg(test)]
pub(crate) mod test_helpers;
