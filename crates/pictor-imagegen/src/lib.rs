//! Prompt-to-image generation for Pictor
//!
//! Validates user inputs into a [`GenerationRequest`], resolves credentials,
//! calls the `OpenAI` Images API or a Hugging Face hosted diffusion model
//! once per image, decodes the returned payloads and maps vendor errors onto
//! actionable messages.

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

pub mod classify;
pub mod decode;
mod error;
pub mod generator;
mod http_client;
mod provider;
pub mod request;
pub mod types;

pub use classify::{ErrorCategory, ErrorClassifier, GenerationError};
pub use decode::{DecodedImage, decode};
pub use error::{ImageGenError, Result};
pub use generator::{BatchObserver, BatchPolicy, Generator, run_batch};
pub use provider::ImageGenProvider;
pub use request::{BuiltRequest, GenerationInputs, RequestBuilder, max_images};
pub use types::{
    BatchReport, Credentials, Dimensions, GenerationRequest, GenerationResult, ImageSize, OpenAiSize, Payload,
    SlotOutcome, TuningParams,
};
