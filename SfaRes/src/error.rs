//! Error types for `SfaRes`

use thiserror::Error;

use crate::formats::container::ContainerKind;

/// The error type for `SfaRes` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected end of data.
    #[error("unexpected end of data")]
    UnexpectedEof,

    // ==================== Container Errors ====================
    /// The buffer carries a recognized container tag but its header is invalid.
    #[error("malformed {kind} container: {message}")]
    MalformedContainer {
        /// The container kind identified by the tag.
        kind: ContainerKind,
        /// Description of what is invalid.
        message: String,
    },

    /// Containers kept wrapping each other past the configured depth.
    #[error("container nesting exceeds {depth} layers")]
    ContainerNestingTooDeep {
        /// The maximum depth that was allowed.
        depth: usize,
    },

    // ==================== Compression/Decompression Errors ====================
    /// Zlib decompression failed (ZLB payloads).
    #[error("Zlib decompression failed: {message}")]
    ZlibDecompressionFailed {
        /// The error message.
        message: String,
    },

    /// LZO decompression failed (LZOn payloads).
    #[error("LZO decompression failed: {message}")]
    LzoDecompressionFailed {
        /// The error message.
        message: String,
    },

    /// Zlib compression failed while writing a ZLB container.
    #[error("Zlib compression failed: {message}")]
    ZlibCompressionFailed {
        /// The error message.
        message: String,
    },

    // ==================== Animation Errors ====================
    /// Two keyframes with differing pose counts were blended.
    #[error("keyframe shape mismatch: {left} poses vs {right} poses")]
    ShapeMismatch {
        /// Pose count of the first keyframe.
        left: usize,
        /// Pose count of the second keyframe.
        right: usize,
    },

    /// The animation entry could not be parsed.
    #[error("malformed animation: {message}")]
    MalformedAnim {
        /// Description of what is invalid.
        message: String,
    },

    /// Sampling was requested on an animation with no keyframes.
    #[error("animation has no keyframes")]
    EmptyAnimation,

    // ==================== Resource Table Errors ====================
    /// A TAB/BIN table pair is inconsistent.
    #[error("malformed {name} table: {message}")]
    MalformedTable {
        /// The table name (e.g. `ANIM.TAB`).
        name: &'static str,
        /// Description of what is invalid.
        message: String,
    },

    /// No entry exists for the requested id.
    #[error("{kind} #{id} not found")]
    ResourceNotFound {
        /// The resource kind (`anim`, `amap`, ...).
        kind: &'static str,
        /// The requested id.
        id: u32,
    },

    /// An earlier load of this id failed; it stays absent for the session.
    #[error("{kind} #{id} previously failed to load")]
    ResourceAbsent {
        /// The resource kind (`anim`, `amap`, ...).
        kind: &'static str,
        /// The requested id.
        id: u32,
    },

    /// The location number has no subdirectory mapping.
    #[error("subdirectory for location {0} unknown")]
    UnknownSubdir(u32),

    // ==================== Config / Parsing Errors ====================
    /// Configuration is invalid.
    #[error("config error: {message}")]
    Config {
        /// The validation error message.
        message: String,
    },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error came from a corrupt or truncated compressed stream.
    pub fn is_decompression_error(&self) -> bool {
        matches!(
            self,
            Error::ZlibDecompressionFailed { .. } | Error::LzoDecompressionFailed { .. }
        )
    }

    pub(crate) fn malformed(kind: ContainerKind, message: impl Into<String>) -> Self {
        Error::MalformedContainer {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn lzo(message: impl Into<String>) -> Self {
        Error::LzoDecompressionFailed {
            message: message.into(),
        }
    }

    pub(crate) fn anim(message: impl Into<String>) -> Self {
        Error::MalformedAnim {
            message: message.into(),
        }
    }
}

/// A specialized Result type for `SfaRes` operations.
pub type Result<T> = std::result::Result<T, Error>;
