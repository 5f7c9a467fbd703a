//! Shared Conversion Error Types
//!
//! `CodecError` is what an [`ImageCodec`](crate::codec::ImageCodec) reports;
//! `ConvertError` covers request validation done before a batch starts.
//! Neither crosses a file boundary inside a batch: per-file failures become
//! [`ConversionOutcome`](crate::conversion::ConversionOutcome)s.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Image has no pixels")]
    EmptyImage,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Output format not supported: {requested} (supported: {supported})")]
    UnsupportedFormat { requested: String, supported: String },

    #[error("No input files given")]
    NoInputs,

    #[error("Got {outputs} output paths for {inputs} inputs")]
    OutputCountMismatch { inputs: usize, outputs: usize },
}

