//! fixed-matrix: a fixed-shape `f64` matrix value type.
//!
//! The crate provides [`Matrix`] (construction, element access, elementwise
//! arithmetic, scalar scaling and all-or-nothing comparisons), the sticky
//! [`ErrorState`] each instance carries, and live-instance accounting through
//! [`InstanceCounter`] and [`MatrixFactory`].
//!
//! Failures never abort: allocation failure leaves an instance without
//! storage, out-of-range access is dropped and recorded, and the fallible
//! operations return [`MatrixError`].
pub mod config;
pub mod counter;
pub mod error;
pub mod factory;
pub mod math;

pub use config::MatrixConfig;
pub use counter::{InstanceCounter, InstanceToken};
pub use error::{ErrorState, MatrixError};
pub use factory::MatrixFactory;
pub use math::Matrix;
