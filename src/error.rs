//! Error types for catalogpdf.
//!
//! Errors fall into four groups, and the group decides what the pipelines do
//! with them:
//!
//! - **Input errors**: a single image or PDF could not be read. These are
//!   recoverable; the file is skipped with a warning.
//! - **Configuration errors**: rejected before any file is touched.
//! - **Empty input**: nothing usable was found, so no output is written.
//! - **Output errors**: the destination cannot be created or written.

use std::io;
use std::path::PathBuf;

/// Result type alias for catalogpdf operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for catalogpdf operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Input directory was not found.
    #[error("Input directory not found: {}", .path.display())]
    InputDirNotFound {
        /// Directory that was requested.
        path: PathBuf,
    },

    /// Input path exists but is not a directory.
    #[error("Not a directory: {}", .path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Input file was not found.
    #[error("File not found: {}", .path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Image file could not be decoded.
    #[error("Failed to decode image: {}\n  Reason: {reason}", .path.display())]
    ImageDecode {
        /// Path to the image.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// PDF file could not be loaded.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file loaded but its structure is unusable.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", .path.display())]
    CorruptedPdf {
        /// Path to the PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        .path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// The input directory holds no eligible files.
    #[error("No eligible input files found in {}", .dir.display())]
    NoInputFiles {
        /// Scanned directory.
        dir: PathBuf,
    },

    /// Every eligible input failed to load.
    #[error("None of the {attempted} input file(s) could be used; no output was written")]
    NoValidInputs {
        /// Number of files that were tried.
        attempted: usize,
    },

    /// Output file already exists and overwriting is disabled.
    #[error(
        "Output file already exists: {}\n  \
         Remove --no-clobber or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Directory that should contain the output does not exist.
    #[error("Output directory does not exist: {}", .path.display())]
    OutputDirMissing {
        /// Missing directory.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", .path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A cover, back-cover or exclusion pattern does not compile.
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern text.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Page rendering failed.
    #[error("Failed to render page: {reason}")]
    RenderFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },
}

impl From<lopdf::Error> for CatalogError {
    fn from(err: lopdf::Error) -> Self {
        Self::merge_failed(err.to_string())
    }
}

impl CatalogError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create an ImageDecode error.
    pub fn image_decode(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            path,
            reason: reason.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Check if this error only concerns a single input file.
    ///
    /// Recoverable errors are turned into a warning and the file is skipped.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::ImageDecode { .. }
                | Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InputDirNotFound { .. } => 2,
            Self::NotADirectory { .. } => 2,
            Self::FileNotFound { .. } => 2,
            Self::ImageDecode { .. } => 3,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::NoInputFiles { .. } => 1,
            Self::NoValidInputs { .. } => 1,
            Self::OutputExists { .. } => 4,
            Self::OutputDirMissing { .. } => 5,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::InvalidPattern { .. } => 1,
            Self::MergeFailed { .. } => 6,
            Self::RenderFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
        }
    }
}

/// An input that was left out of the output because it could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    /// The offending file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

impl SkippedFile {
    /// Record `path` as skipped because of `err`.
    pub fn new(path: PathBuf, err: &CatalogError) -> Self {
        Self {
            path,
            reason: err.to_string(),
        }
    }
}
