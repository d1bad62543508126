//! Local checks on an ID photo before it is sent for extraction.
//!
//! These mirror what the backend rejects, so a bad file fails fast without
//! a network round-trip.

use std::path::Path;

use thiserror::Error;

/// Lower-cased extensions the backend accepts.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "webp"];

/// Largest accepted image: 15 MB.
pub const MAX_IMAGE_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No se seleccionó ninguna imagen")]
    NoFile,
    #[error("Tipo de archivo no permitido: {0:?}. Usa: jpg, jpeg, png, bmp, tiff, webp")]
    UnsupportedType(String),
    #[error("Archivo vacío")]
    Empty,
    #[error("Imagen demasiado grande ({size} bytes, máximo 15MB)")]
    TooLarge { size: usize },
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
}

/// An image that passed the pre-flight checks.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    file_name: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(UploadError::NoFile);
        }

        let ext = extension_of(&file_name);
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(UploadError::UnsupportedType(ext));
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge { size: bytes.len() });
        }

        Ok(Self { file_name, bytes })
    }

    /// Read and check the image at `path`.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or(UploadError::NoFile)?;
        let bytes = std::fs::read(path)?;
        Self::new(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type implied by the file extension.
    pub fn mime_type(&self) -> &'static str {
        match extension_of(&self.file_name).as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "bmp" => "image/bmp",
            "tiff" => "image/tiff",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }

    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.file_name, self.bytes)
    }
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
