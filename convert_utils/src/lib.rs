//! Shared conversion core for the image converter tools
//!
//! - Codec seam (`ImageCodec`) with an `image`-crate implementation
//! - Output naming policy: same location, explicit path, output directory
//! - Batch conversion with per-file outcomes and best-effort cancellation
//! - Output path picking decoupled from encoding
//! - Logging, progress and summary reporting

pub mod batch;
pub mod cancel;
pub mod codec;
pub mod conversion;
pub mod formats;
pub mod img_errors;
pub mod logging;
pub mod picker;
pub mod progress;
pub mod report;
pub mod types;

#[cfg(test)]
mod test_support;

pub use batch::{
    collect_files, expand_inputs, with_policy, BatchConverter, BatchResult, IMAGE_EXTENSIONS,
};
pub use cancel::{install_ctrlc_handler, CancelFlag};
pub use codec::{ImageCodec, PixelBuffer, RasterCodec};
pub use conversion::{
    convert_one, ensure_extension, resolve_output_path, same_location_path, ConversionOutcome,
    ConversionRequest, OutcomeKind, OutputPolicy,
};
pub use formats::{FormatCatalog, OutputFormat};
pub use img_errors::{CodecError, ConvertError};
pub use picker::{explicit_from_list, plan_explicit, OutputPathPicker};
pub use progress::{create_progress_bar, format_bytes, format_duration};
pub use report::{outcome_line, print_summary_report};
pub use types::Quality;
