use thiserror::Error;

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("OCR service error: {0}")]
    OcrServiceError(String),

    #[error("PDF load error: {0}")]
    PdfLoadError(String),

    #[error("PDF save error: {0}")]
    PdfSaveError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Missing cover image: {0}")]
    MissingCoverImage(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`SanitizeError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl SanitizeError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an invalid-input error.
    invalid_input => InvalidInput,
    /// Create an OCR service error.
    ocr_service => OcrServiceError,
    /// Create a PDF load error.
    pdf_load => PdfLoadError,
    /// Create a PDF save error.
    pdf_save => PdfSaveError,
    /// Create a render error.
    render => RenderError,
    /// Create a missing-cover-image error.
    missing_cover => MissingCoverImage,
}

impl From<lopdf::Error> for SanitizeError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfLoadError(e.to_string())
    }
}

impl From<serde_json::Error> for SanitizeError {
    fn from(e: serde_json::Error) -> Self {
        Self::OcrServiceError(e.to_string())
    }
}

impl From<reqwest::Error> for SanitizeError {
    fn from(e: reqwest::Error) -> Self {
        Self::OcrServiceError(e.to_string())
    }
}

impl From<serde_yml::Error> for SanitizeError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

impl From<image::ImageError> for SanitizeError {
    fn from(e: image::ImageError) -> Self {
        Self::RenderError(e.to_string())
    }
}

#[cfg(feature = "sample")]
impl From<pdfium_render::prelude::PdfiumError> for SanitizeError {
    fn from(e: pdfium_render::prelude::PdfiumError) -> Self {
        Self::RenderError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SanitizeError>;
