use std::cmp::Ordering;
use std::fmt;
use std::io::{self, Write};
use std::ops::{Add, Index, Mul, Sub};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::MatrixConfig;
use crate::counter::{InstanceCounter, InstanceToken};
use crate::error::{ErrorState, MatrixError};

/// A `rows x cols` grid of `f64` stored row-major in an owned buffer.
///
/// Every instance carries a sticky [`ErrorState`] and is registered with an
/// [`InstanceCounter`] for as long as it lives. When storage cannot be
/// reserved the instance is still returned, with its requested shape, an
/// empty buffer and [`ErrorState::AllocationFailed`].
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    state: ErrorState,
    token: InstanceToken,
}

/// Reserve and fill storage for `rows * cols` elements without aborting on
/// allocation failure.
fn allocate(rows: usize, cols: usize, fill: f64) -> Result<Vec<f64>, MatrixError> {
    let mut data = reserve(rows, cols)?;
    data.resize(rows * cols, fill);
    Ok(data)
}

fn reserve(rows: usize, cols: usize) -> Result<Vec<f64>, MatrixError> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::InvalidDimensions { rows, cols });
    }
    let len = rows
        .checked_mul(cols)
        .ok_or(MatrixError::AllocationFailure { rows, cols })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| MatrixError::AllocationFailure { rows, cols })?;
    Ok(data)
}

impl Matrix {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Default 4x3 matrix of zeros, tracked by the global counter.
    pub fn new() -> Self {
        Self::with_config(&MatrixConfig::default())
    }

    pub fn with_config(config: &MatrixConfig) -> Self {
        Self::filled_in(
            InstanceCounter::global(),
            config.default_rows,
            config.default_cols,
            config.fill_value,
        )
    }

    /// `n x n` matrix of zeros.
    pub fn square(n: usize) -> Self {
        Self::filled_in(InstanceCounter::global(), n, n, 0.0)
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled_in(InstanceCounter::global(), rows, cols, 0.0)
    }

    /// `rows x cols` matrix with every element set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: f64) -> Self {
        Self::filled_in(InstanceCounter::global(), rows, cols, fill)
    }

    /// Like [`Matrix::square`] but refuses to return a matrix without storage.
    pub fn try_square(n: usize) -> Result<Self, MatrixError> {
        Self::try_filled_in(InstanceCounter::global(), n, n, 0.0)
    }

    /// Like [`Matrix::filled`] but refuses to return a matrix without storage.
    pub fn try_filled(rows: usize, cols: usize, fill: f64) -> Result<Self, MatrixError> {
        Self::try_filled_in(InstanceCounter::global(), rows, cols, fill)
    }

    pub fn from_shape_vec(shape: (usize, usize), data: Vec<f64>) -> Result<Self, MatrixError> {
        Self::from_shape_vec_in(InstanceCounter::global(), shape, data)
    }

    pub(crate) fn filled_in(
        counter: &InstanceCounter,
        rows: usize,
        cols: usize,
        fill: f64,
    ) -> Self {
        let token = counter.track();
        match allocate(rows, cols, fill) {
            Ok(data) => {
                log::debug!("Constructed {}x{} matrix filled with {}", rows, cols, fill);
                Self {
                    data,
                    rows,
                    cols,
                    state: ErrorState::Clean,
                    token,
                }
            }
            Err(err) => {
                log::warn!("{}; matrix left without storage", err);
                Self::without_storage(token, rows, cols)
            }
        }
    }

    pub(crate) fn try_filled_in(
        counter: &InstanceCounter,
        rows: usize,
        cols: usize,
        fill: f64,
    ) -> Result<Self, MatrixError> {
        let data = allocate(rows, cols, fill)?;
        Ok(Self {
            data,
            rows,
            cols,
            state: ErrorState::Clean,
            token: counter.track(),
        })
    }

    pub(crate) fn from_shape_vec_in(
        counter: &InstanceCounter,
        shape: (usize, usize),
        data: Vec<f64>,
    ) -> Result<Self, MatrixError> {
        let (rows, cols) = shape;
        if rows == 0 || cols == 0 {
            return Err(MatrixError::InvalidDimensions { rows, cols });
        }
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(MatrixError::ShapeMismatch {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            rows,
            cols,
            state: ErrorState::Clean,
            token: counter.track(),
        })
    }

    fn without_storage(token: InstanceToken, rows: usize, cols: usize) -> Self {
        Self {
            data: Vec::new(),
            rows,
            cols,
            state: ErrorState::AllocationFailed,
            token,
        }
    }

    /// 1x1 stand-in returned by the operator forms of add/subtract when the
    /// operand shapes differ.
    fn mismatch_sentinel(counter: &InstanceCounter) -> Self {
        let mut sentinel = Self::filled_in(counter, 1, 1, 0.0);
        if sentinel.state.is_clean() {
            sentinel.state = ErrorState::DimensionMismatch;
        }
        sentinel
    }

    /// Build a matrix of `self`'s shape from an element iterator.
    fn collect_like<I>(&self, values: I) -> Result<Matrix, MatrixError>
    where
        I: Iterator<Item = f64>,
    {
        let mut data = reserve(self.rows, self.cols)?;
        data.extend(values);
        Ok(Self {
            data,
            rows: self.rows,
            cols: self.cols,
            state: ErrorState::Clean,
            token: self.token.duplicate(),
        })
    }

    /// Deep copy. Copying a matrix without storage is an error.
    pub fn try_clone(&self) -> Result<Matrix, MatrixError> {
        self.ensure_allocated()?;
        self.collect_like(self.data.iter().copied())
    }

    /// Replace this matrix's shape and contents with a deep copy of `other`.
    ///
    /// The new buffer is reserved before the current one is released, so on
    /// failure `self` keeps its previous value and state. On success the
    /// sticky state resets to [`ErrorState::Clean`].
    pub fn assign_from(&mut self, other: &Matrix) -> Result<(), MatrixError> {
        other.ensure_allocated()?;
        let mut data = reserve(other.rows, other.cols)?;
        data.extend_from_slice(&other.data);

        self.data = data;
        self.rows = other.rows;
        self.cols = other.cols;
        self.state = ErrorState::Clean;
        log::debug!("Assigned {}x{} matrix", self.rows, self.cols);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored elements; zero for a matrix without storage.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn error_state(&self) -> ErrorState {
        self.state
    }

    /// The counter this instance is tracked by.
    pub fn counter(&self) -> InstanceCounter {
        self.token.counter()
    }

    /// Live instances tracked by the global counter.
    pub fn live_count() -> usize {
        InstanceCounter::global().live()
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    fn bounds_error(&self, row: usize, col: usize) -> MatrixError {
        MatrixError::BoundsViolation {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }

    fn ensure_allocated(&self) -> Result<(), MatrixError> {
        if self.is_allocated() {
            Ok(())
        } else {
            Err(MatrixError::AllocationFailure {
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Elements of `row`, or `None` when the row is out of range or the
    /// matrix has no storage.
    pub fn row_slice(&self, row: usize) -> Option<&[f64]> {
        if !self.is_allocated() || row >= self.rows {
            return None;
        }
        let start = self.offset(row, 0);
        self.data.get(start..start + self.cols)
    }

    // ------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------

    /// Write `value` at `(row, col)`.
    ///
    /// Out of range records [`ErrorState::BoundsViolation`] and drops the
    /// write. A successful write leaves the sticky state untouched.
    pub fn set_element(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        if !self.in_bounds(row, col) {
            let err = self.bounds_error(row, col);
            log::warn!("set_element: {}", err);
            self.state = ErrorState::BoundsViolation;
            return Err(err);
        }
        self.ensure_allocated()?;
        let offset = self.offset(row, col);
        self.data[offset] = value;
        Ok(())
    }

    /// Read the value at `(row, col)` without touching the sticky state.
    pub fn get_element(&self, row: usize, col: usize) -> Result<f64, MatrixError> {
        if !self.in_bounds(row, col) {
            return Err(self.bounds_error(row, col));
        }
        self.ensure_allocated()?;
        Ok(self.data[self.offset(row, col)])
    }

    /// Read the value at `(row, col)`, recording an out-of-range access in the
    /// sticky state and returning `0.0` for it.
    pub fn element_or_zero(&mut self, row: usize, col: usize) -> f64 {
        match self.get_element(row, col) {
            Ok(value) => value,
            Err(err @ MatrixError::BoundsViolation { .. }) => {
                log::warn!("element_or_zero: {}", err);
                self.state = err.state();
                0.0
            }
            Err(_) => 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    fn zip_with<F>(&self, other: &Matrix, f: F) -> Result<Matrix, MatrixError>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        self.ensure_allocated()?;
        other.ensure_allocated()?;
        self.collect_like(self.data.iter().zip(&other.data).map(|(a, b)| f(*a, *b)))
    }

    /// Elementwise sum. Shapes must match.
    pub fn add(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference. Shapes must match.
    pub fn subtract(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Apply `f` to every element. A matrix without storage maps to another
    /// matrix without storage of the same shape.
    pub fn mapv<F>(&self, f: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let mapped = self
            .ensure_allocated()
            .and_then(|_| self.collect_like(self.data.iter().map(|v| f(*v))));
        match mapped {
            Ok(matrix) => matrix,
            Err(err) => {
                log::warn!("{}; result left without storage", err);
                Self::without_storage(self.token.duplicate(), self.rows, self.cols)
            }
        }
    }

    pub fn multiply(&self, scalar: f64) -> Matrix {
        self.mapv(|v| v * scalar)
    }

    // ------------------------------------------------------------------
    // Comparisons
    // ------------------------------------------------------------------

    fn all_pairs<F>(&self, other: &Matrix, pred: F) -> bool
    where
        F: Fn(f64, f64) -> bool,
    {
        self.shape() == other.shape()
            && self.is_allocated()
            && other.is_allocated()
            && self.data.iter().zip(&other.data).all(|(a, b)| pred(*a, *b))
    }

    /// True iff shapes match and every element is strictly greater.
    pub fn greater_than(&self, other: &Matrix) -> bool {
        self.all_pairs(other, |a, b| a > b)
    }

    /// True iff shapes match and every element is strictly less.
    pub fn less_than(&self, other: &Matrix) -> bool {
        self.all_pairs(other, |a, b| a < b)
    }

    /// Exact elementwise equality, no tolerance.
    pub fn equals(&self, other: &Matrix) -> bool {
        self.all_pairs(other, |a, b| a == b)
    }

    // ------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------

    /// Write one line per row, each element followed by a single space.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    pub fn print(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.write_to(&mut handle)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::new()
    }
}

impl Clone for Matrix {
    /// Deep copy tracked by the same counter. Cloning a matrix without
    /// storage yields another matrix without storage.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(matrix) => matrix,
            Err(err) => {
                log::warn!("clone: {}", err);
                Self::without_storage(self.token.duplicate(), self.rows, self.cols)
            }
        }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matrix")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("state", &self.state)
            .field("data", &self.data)
            .finish()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_allocated() {
            return Ok(());
        }
        for row in self.data.chunks(self.cols) {
            for value in row {
                write!(f, "{} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        assert!(
            self.is_allocated() && self.in_bounds(index.0, index.1),
            "matrix index out of bounds"
        );
        let offset = self.offset(index.0, index.1);
        &self.data[offset]
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// `Equal`, `Greater` or `Less` only when the relation holds for every
/// element pair; any mixed or mismatched comparison is unordered.
impl PartialOrd for Matrix {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.equals(other) {
            Some(Ordering::Equal)
        } else if self.greater_than(other) {
            Some(Ordering::Greater)
        } else if self.less_than(other) {
            Some(Ordering::Less)
        } else {
            None
        }
    }

    fn gt(&self, other: &Self) -> bool {
        self.greater_than(other)
    }

    fn lt(&self, other: &Self) -> bool {
        self.less_than(other)
    }
}

impl<'a, 'b> Add<&'b Matrix> for &'a Matrix {
    type Output = Matrix;

    /// Never fails: mismatched shapes yield a 1x1 matrix in
    /// [`ErrorState::DimensionMismatch`].
    fn add(self, rhs: &'b Matrix) -> Self::Output {
        Matrix::add(self, rhs).unwrap_or_else(|err| self.recover(err))
    }
}

impl<'a, 'b> Sub<&'b Matrix> for &'a Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &'b Matrix) -> Self::Output {
        self.subtract(rhs).unwrap_or_else(|err| self.recover(err))
    }
}

impl<'a> Mul<f64> for &'a Matrix {
    type Output = Matrix;

    fn mul(self, scalar: f64) -> Self::Output {
        self.multiply(scalar)
    }
}

impl Matrix {
    fn recover(&self, err: MatrixError) -> Matrix {
        log::warn!("{}", err);
        match err {
            MatrixError::DimensionMismatch { .. } => Matrix::mismatch_sentinel(&self.counter()),
            _ => Matrix::without_storage(self.token.duplicate(), self.rows, self.cols),
        }
    }
}

#[derive(Serialize)]
struct MatrixView<'a> {
    rows: usize,
    cols: usize,
    state: ErrorState,
    data: &'a [f64],
}

#[derive(Deserialize)]
struct MatrixRepr {
    rows: usize,
    cols: usize,
    #[serde(default)]
    state: ErrorState,
    data: Vec<f64>,
}

/// Serialized as `{ rows, cols, state, data }`. A matrix without storage
/// carries its requested shape, `AllocationFailed` and an empty `data`.
impl Serialize for Matrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        MatrixView {
            rows: self.rows,
            cols: self.cols,
            state: self.state,
            data: &self.data,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = MatrixRepr::deserialize(deserializer)?;
        if repr.state == ErrorState::AllocationFailed {
            if !repr.data.is_empty() {
                return Err(serde::de::Error::custom(
                    "a matrix in the allocation-failed state cannot carry data",
                ));
            }
            let token = InstanceCounter::global().track();
            return Ok(Matrix::without_storage(token, repr.rows, repr.cols));
        }
        let mut matrix = Matrix::from_shape_vec((repr.rows, repr.cols), repr.data)
            .map_err(serde::de::Error::custom)?;
        matrix.state = repr.state;
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counted() -> InstanceCounter {
        InstanceCounter::new()
    }

    #[test]
    fn test_constructors_fill_and_shape() {
        let counter = counted();
        let m = Matrix::filled_in(&counter, 2, 3, 1.5);
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.as_slice(), &[1.5; 6]);
        assert_eq!(m.error_state(), ErrorState::Clean);
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn test_overflowing_shape_degrades() {
        let counter = counted();
        let m = Matrix::filled_in(&counter, usize::MAX, 2, 0.0);
        assert_eq!(m.error_state(), ErrorState::AllocationFailed);
        assert_eq!(m.shape(), (usize::MAX, 2));
        assert!(!m.is_allocated());
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn test_unreservable_shape_degrades() {
        // 2^60 f64 exceeds isize::MAX bytes, so reservation fails up front.
        let counter = counted();
        let m = Matrix::filled_in(&counter, 1 << 30, 1 << 30, 0.0);
        assert_eq!(m.error_state(), ErrorState::AllocationFailed);
        assert_eq!(m.to_string(), "");
    }

    #[test]
    fn test_zero_extent_degrades_or_errors() {
        let counter = counted();
        let m = Matrix::filled_in(&counter, 0, 3, 0.0);
        assert_eq!(m.error_state(), ErrorState::AllocationFailed);
        assert_eq!(
            Matrix::try_filled_in(&counter, 3, 0, 0.0).unwrap_err(),
            MatrixError::InvalidDimensions { rows: 3, cols: 0 }
        );
    }

    #[test]
    fn test_offset_is_row_major() {
        let data = vec![1., 2., 3., 4., 5., 6.];
        let m = Matrix::from_shape_vec_in(&counted(), (2, 3), data).unwrap();
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
        assert_eq!(m.row_slice(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(m.row_slice(2), None);
    }

    #[test]
    fn test_row_slice_without_storage_is_none() {
        let m = Matrix::filled_in(&counted(), usize::MAX, 2, 0.0);
        assert_eq!(m.row_slice(0), None);
    }

    #[test]
    #[should_panic(expected = "matrix index out of bounds")]
    fn test_index_without_storage_panics_with_message() {
        let m = Matrix::filled_in(&counted(), usize::MAX, 2, 0.0);
        let _value: f64 = m[(0, 0)];
    }

    #[test]
    #[should_panic(expected = "matrix index out of bounds")]
    fn test_index_panics_past_last_column() {
        let m = Matrix::filled_in(&counted(), 2, 2, 0.0);
        let _value: f64 = m[(0, 2)];
    }

    #[test]
    fn test_display_has_trailing_space() {
        let m = Matrix::from_shape_vec_in(&counted(), (2, 2), vec![1.0, 2.5, -3.0, 0.0]).unwrap();
        assert_eq!(m.to_string(), "1 2.5 \n-3 0 \n");
    }

    #[test]
    fn test_mismatch_sentinel_is_one_by_one() {
        let counter = counted();
        let a = Matrix::filled_in(&counter, 2, 3, 1.0);
        let b = Matrix::filled_in(&counter, 3, 2, 1.0);
        let sentinel = &a + &b;
        assert_eq!(sentinel.shape(), (1, 1));
        assert_eq!(sentinel.error_state().code(), 3);
        assert_eq!(counter.live(), 3);
    }

    #[test]
    fn test_results_share_the_operand_counter() {
        let counter = counted();
        let a = Matrix::filled_in(&counter, 2, 2, 1.0);
        {
            let scaled = &a * 3.0;
            assert!(scaled.counter().same_as(&counter));
            assert_eq!(counter.live(), 2);
        }
        assert_eq!(counter.live(), 1);
    }

    #[test]
    fn test_partial_cmp_is_all_or_nothing() {
        let counter = counted();
        let low = Matrix::filled_in(&counter, 2, 2, 1.0);
        let high = Matrix::filled_in(&counter, 2, 2, 2.0);
        let mut mixed = Matrix::filled_in(&counter, 2, 2, 1.0);
        mixed.set_element(1, 1, 3.0).unwrap();

        assert_eq!(high.partial_cmp(&low), Some(Ordering::Greater));
        assert_eq!(low.partial_cmp(&high), Some(Ordering::Less));
        assert_eq!(low.partial_cmp(&low), Some(Ordering::Equal));
        assert_eq!(mixed.partial_cmp(&low), None);
        assert!(high >= low);
        assert!(!(mixed > low));
    }
}
