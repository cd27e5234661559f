//! Error type definitions.
//!
//! This module defines the error enums returned at the crate's seams and the
//! error, warning, and info categories counted during a crawl.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the logger with custom message (e.g., log file creation).
    #[error("Logger initialization error: {0}")]
    LoggerSetupError(String),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Error opening a WebDriver session.
    #[error("WebDriver session error: {0}")]
    WebDriverError(String),
}

/// Errors raised by a [`PageDriver`](crate::browser::PageDriver).
#[derive(Error, Debug, Clone)]
pub enum BrowserError {
    /// The page could not be loaded.
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// Target URL
        url: String,
        /// Driver message
        message: String,
    },

    /// A browser command (script, click, source) failed.
    #[error("Browser command failed: {0}")]
    Command(String),

    /// The browser session is gone.
    #[error("Browser session closed")]
    SessionClosed,
}

/// Errors from the CSV append sink.
#[derive(Error, Debug)]
pub enum SinkError {
    /// Opening or creating the output file failed.
    #[error("CSV file error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a record failed.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors from one image download.
#[derive(Error, Debug)]
pub enum ImageError {
    /// The request failed or timed out.
    #[error("Image request error: {0}")]
    Http(#[from] ReqwestError),

    /// The server answered with a non-success status.
    #[error("Image request returned HTTP {0}")]
    Status(u16),

    /// Writing the file failed.
    #[error("Image file error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImageError {
    /// Whether a later attempt at the same URL could succeed (transport
    /// errors, throttling, server errors).
    pub fn is_retryable(&self) -> bool {
        match self {
            ImageError::Http(_) => true,
            ImageError::Status(status) => *status == 429 || *status >= 500,
            ImageError::Io(_) => false,
        }
    }
}

/// Errors while reading or collecting the brand/model taxonomy.
#[derive(Error, Debug)]
pub enum TaxonomyError {
    /// The taxonomy file could not be read.
    #[error("Taxonomy file error: {0}")]
    Io(#[from] std::io::Error),

    /// The taxonomy CSV is malformed.
    #[error("Taxonomy CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A configured column is absent from the header.
    #[error("Taxonomy column missing: {0}")]
    MissingColumn(String),

    /// The car-meta API could not be reached.
    #[error("Taxonomy API error: {0}")]
    Http(#[from] ReqwestError),

    /// The car-meta API answered with a non-success status.
    #[error("Taxonomy API returned HTTP {0}")]
    Status(u16),
}

/// Failures that cost an item (or the run) data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    /// A listing navigation attempt failed
    ListingNavigation,
    /// A detail navigation or reload failed
    DetailNavigation,
    /// Every detail attempt failed; a list-derived row was written
    DetailExhausted,
    /// A CSV row could not be written
    SinkWrite,
}

/// Degraded-but-recoverable conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// No readiness selector appeared before its timeout
    ReadinessTimeout,
    /// A detail pass filled fewer core fields than required
    DetailUnderfilled,
    /// One image download failed
    ImageDownload,
    /// A partition could not be selected
    PartitionSkipped,
    /// The taxonomy file was absent or unreadable
    TaxonomyMissing,
}

/// Notable events that are neither errors nor warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// A detail page was reloaded for another pass
    DetailReload,
    /// A blank detail field was back-filled from the listing
    FallbackFill,
    /// An image file was written
    ImageSaved,
    /// Detail visit skipped by the profile's skip rule
    DetailSkipped,
    /// A listing load trigger (scroll or page advance)
    LoadTrigger,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    /// Returns a human-readable string representation of the error type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ListingNavigation => "Listing navigation failed",
            ErrorType::DetailNavigation => "Detail navigation failed",
            ErrorType::DetailExhausted => "Detail attempts exhausted",
            ErrorType::SinkWrite => "CSV write failed",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::ReadinessTimeout => "Readiness wait timed out",
            WarningType::DetailUnderfilled => "Detail pass under-filled",
            WarningType::ImageDownload => "Image download failed",
            WarningType::PartitionSkipped => "Partition skipped",
            WarningType::TaxonomyMissing => "Taxonomy file missing",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::DetailReload => "Detail page reloaded",
            InfoType::FallbackFill => "Field filled from listing",
            InfoType::ImageSaved => "Image saved",
            InfoType::DetailSkipped => "Detail visit skipped",
            InfoType::LoadTrigger => "Listing load trigger",
        }
    }
}
