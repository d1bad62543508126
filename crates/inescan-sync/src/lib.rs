//! Transport to the OCR backend: image pre-flight checks, the extraction
//! upload, and the liveness probe.

mod upload;
pub use upload::{ALLOWED_EXTENSIONS, ImageUpload, MAX_IMAGE_BYTES, UploadError};

mod response;
pub use response::{DebugInfo, ExtractResponse, HealthResponse, Validaciones};

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HEALTH_TIMEOUT, OcrClient, OcrError};
