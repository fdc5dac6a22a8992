use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Sticky per-instance status of a [`Matrix`](crate::math::Matrix).
///
/// The numeric codes are stable: 0 clean, 1 allocation failed,
/// 2 bounds violation, 3 dimension mismatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorState {
    #[default]
    Clean,
    AllocationFailed,
    BoundsViolation,
    DimensionMismatch,
}

impl ErrorState {
    pub fn code(self) -> u8 {
        match self {
            ErrorState::Clean => 0,
            ErrorState::AllocationFailed => 1,
            ErrorState::BoundsViolation => 2,
            ErrorState::DimensionMismatch => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ErrorState::Clean),
            1 => Some(ErrorState::AllocationFailed),
            2 => Some(ErrorState::BoundsViolation),
            3 => Some(ErrorState::DimensionMismatch),
            _ => None,
        }
    }

    pub fn is_clean(self) -> bool {
        self == ErrorState::Clean
    }
}

impl fmt::Display for ErrorState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ErrorState::Clean => "clean",
            ErrorState::AllocationFailed => "allocation failed",
            ErrorState::BoundsViolation => "bounds violation",
            ErrorState::DimensionMismatch => "dimension mismatch",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Errors returned by the fallible matrix operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Element storage for a `rows x cols` matrix could not be reserved, or
    /// the operand has no storage.
    AllocationFailure { rows: usize, cols: usize },
    BoundsViolation {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// A zero extent was requested.
    InvalidDimensions { rows: usize, cols: usize },
    /// Buffer length does not match the requested shape.
    ShapeMismatch { rows: usize, cols: usize, len: usize },
}

impl MatrixError {
    /// The sticky code an instance records for this kind of failure.
    pub fn state(&self) -> ErrorState {
        match self {
            MatrixError::AllocationFailure { .. }
            | MatrixError::InvalidDimensions { .. }
            | MatrixError::ShapeMismatch { .. } => ErrorState::AllocationFailed,
            MatrixError::BoundsViolation { .. } => ErrorState::BoundsViolation,
            MatrixError::DimensionMismatch { .. } => ErrorState::DimensionMismatch,
        }
    }
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MatrixError::AllocationFailure { rows, cols } => {
                write!(f, "failed to allocate storage for a {}x{} matrix", rows, cols)
            }
            MatrixError::BoundsViolation {
                row,
                col,
                rows,
                cols,
            } => write!(
                f,
                "index ({}, {}) out of bounds for a {}x{} matrix",
                row, col, rows, cols
            ),
            MatrixError::DimensionMismatch { left, right } => write!(
                f,
                "dimension mismatch: {}x{} vs {}x{}",
                left.0, left.1, right.0, right.1
            ),
            MatrixError::InvalidDimensions { rows, cols } => write!(
                f,
                "invalid dimensions {}x{}: rows and cols must be positive",
                rows, cols
            ),
            MatrixError::ShapeMismatch { rows, cols, len } => write!(
                f,
                "invalid shape ({}, {}) for buffer of length {}",
                rows, cols, len
            ),
        }
    }
}

impl Error for MatrixError {}
