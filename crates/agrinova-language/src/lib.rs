//! # agrinova-language
//!
//! Optional language collaborators, each resolved once at startup into a
//! [`Capability`](agrinova_core::Capability):
//!
//! - [`transcription`]: speech-to-text via an ASR sidecar (multipart upload)
//! - [`translation`]: English/Malayalam via a translation sidecar, echoing the
//!   input for unsupported pairs
//! - [`tts`]: MP3 synthesis via a Google Translate TTS compatible endpoint
//!
//! The models themselves run elsewhere; this crate only speaks their HTTP
//! contracts.

#![deny(unsafe_code)]

pub mod errors;
pub mod probe;
pub mod transcription;
pub mod translation;
pub mod tts;

pub use errors::{LanguageError, Result};
pub use transcription::{Transcript, TranscriptionClient};
pub use translation::{Direction, TranslationClient, translate_or_echo};
pub use tts::{SpeechSynthesizer, SynthesizedAudio};
