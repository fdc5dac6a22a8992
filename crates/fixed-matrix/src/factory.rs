use crate::config::MatrixConfig;
use crate::counter::InstanceCounter;
use crate::error::MatrixError;
use crate::math::Matrix;

/// Builds matrices tracked by a counter of the caller's choosing.
///
/// The plain `Matrix` constructors use [`InstanceCounter::global`]; a factory
/// scopes accounting to its own counter instead, which keeps counts
/// observable in isolation.
#[derive(Debug, Clone, Default)]
pub struct MatrixFactory {
    counter: InstanceCounter,
    config: MatrixConfig,
}

impl MatrixFactory {
    /// Factory with a fresh counter and the default 4x3 shape.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatrixConfig) -> Self {
        Self {
            counter: InstanceCounter::new(),
            config,
        }
    }

    pub fn with_counter(counter: InstanceCounter) -> Self {
        Self {
            counter,
            config: MatrixConfig::default(),
        }
    }

    /// Factory over the process-wide counter.
    pub fn global() -> Self {
        Self::with_counter(InstanceCounter::global().clone())
    }

    pub fn counter(&self) -> &InstanceCounter {
        &self.counter
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn live(&self) -> usize {
        self.counter.live()
    }

    pub fn default_matrix(&self) -> Matrix {
        Matrix::filled_in(
            &self.counter,
            self.config.default_rows,
            self.config.default_cols,
            self.config.fill_value,
        )
    }

    pub fn square(&self, n: usize) -> Matrix {
        Matrix::filled_in(&self.counter, n, n, 0.0)
    }

    pub fn zeros(&self, rows: usize, cols: usize) -> Matrix {
        Matrix::filled_in(&self.counter, rows, cols, 0.0)
    }

    pub fn filled(&self, rows: usize, cols: usize, fill: f64) -> Matrix {
        Matrix::filled_in(&self.counter, rows, cols, fill)
    }

    pub fn try_square(&self, n: usize) -> Result<Matrix, MatrixError> {
        Matrix::try_filled_in(&self.counter, n, n, 0.0)
    }

    pub fn try_filled(&self, rows: usize, cols: usize, fill: f64) -> Result<Matrix, MatrixError> {
        Matrix::try_filled_in(&self.counter, rows, cols, fill)
    }

    pub fn from_shape_vec(
        &self,
        shape: (usize, usize),
        data: Vec<f64>,
    ) -> Result<Matrix, MatrixError> {
        Matrix::from_shape_vec_in(&self.counter, shape, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matrix_follows_config() {
        let factory = MatrixFactory::with_config(MatrixConfig::new(2, 5, 7.0));
        let m = factory.default_matrix();
        assert_eq!(m.shape(), (2, 5));
        assert!(m.as_slice().iter().all(|v| *v == 7.0));
    }

    #[test]
    fn every_form_is_counted() {
        let factory = MatrixFactory::new();
        let a = factory.default_matrix();
        let b = factory.square(2);
        let c = factory.filled(2, 3, 1.5);
        let d = factory.from_shape_vec((1, 2), vec![1.0, 2.0]).unwrap();
        let e = c.clone();
        assert_eq!(factory.live(), 5);
        drop((a, b, c, d, e));
        assert_eq!(factory.live(), 0);
    }

    #[test]
    fn rejected_constructions_are_not_counted() {
        let factory = MatrixFactory::new();
        assert!(factory.try_square(0).is_err());
        assert!(factory.from_shape_vec((2, 2), vec![1.0]).is_err());
        assert_eq!(factory.live(), 0);
    }
}
