use serde::{Deserialize, Serialize};

/// Shape and fill used by the default constructor.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MatrixConfig {
    pub default_rows: usize,
    pub default_cols: usize,

    #[serde(default)]
    pub fill_value: f64,
}

impl MatrixConfig {
    pub fn new(default_rows: usize, default_cols: usize, fill_value: f64) -> Self {
        Self {
            default_rows,
            default_cols,
            fill_value,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.default_rows, self.default_cols)
    }
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            default_rows: 4,
            default_cols: 3,
            fill_value: 0.0,
        }
    }
}
