//! The dense `f64` matrix value type.
//!
//! `Matrix` owns a contiguous row-major buffer, carries a sticky
//! `ErrorState` and is registered with an `InstanceCounter` for its lifetime.
pub mod matrix;

pub use matrix::Matrix;
