//! Error types for sector streaming
//!
//! This module defines the error type shared by the tree index registry,
//! the mesh and batching managers, and the GPU buffer abstraction.

use std::fmt;
use crate::sector::SectorId;

/// Result type for sector streaming operations
pub type Result<T> = std::result::Result<T, Error>;

/// Sector streaming errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, wgpu, mock, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, material, etc.)
    InvalidResource(String),

    /// Geometry payload does not match what its collection type requires
    InvalidGeometry(String),

    /// `batch_geometries` was called twice for the same sector
    SectorAlreadyBatched(SectorId),

    /// A sector was delivered to a pipeline that still holds it
    SectorAlreadyLoaded(SectorId),

    /// No materials are registered for the model
    UnknownModel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            Error::SectorAlreadyBatched(id) => write!(f, "Sector {} is already batched", id),
            Error::SectorAlreadyLoaded(id) => write!(f, "Sector {} is already loaded", id),
            Error::UnknownModel(model) => write!(f, "Unknown model: {}", model),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error with file:line information and build an `Error::InvalidResource`
///
/// # Example
///
/// ```ignore
/// let lane = lanes.get(index)
///     .ok_or_else(|| stream_err!("sector3d::Batching", "Lane {} not found", index))?;
/// ```
#[macro_export]
macro_rules! stream_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::error::Error::InvalidResource(message)
    }};
}

/// Log an error with file:line information and return early with it
///
/// The one-argument-after-source form builds an `Error::InvalidResource`.
/// Passing `kind = Variant` builds that `String`-carrying variant instead.
///
/// # Example
///
/// ```ignore
/// stream_bail!("sector3d::Batching", kind = InvalidGeometry, "stride {} is zero", stride);
/// ```
#[macro_export]
macro_rules! stream_bail {
    ($source:expr, kind = $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        return Err($crate::error::Error::$variant(message));
    }};
    ($source:expr, $($arg:tt)*) => {{
        return Err($crate::stream_err!($source, $($arg)*));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
