use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use fixed_matrix::{ErrorState, Matrix, MatrixConfig, MatrixFactory};

/// Parameters of the demonstration run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub default_shape: MatrixConfig,
    pub square_size: usize,
    pub rows: usize,
    pub cols: usize,
    pub fill: f64,
    pub other_fill: f64,
    pub edit_row: usize,
    pub edit_col: usize,
    pub edit_value: f64,
    pub scale: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            default_shape: MatrixConfig::default(),
            square_size: 2,
            rows: 2,
            cols: 3,
            fill: 1.5,
            other_fill: 1.0,
            edit_row: 0,
            edit_col: 0,
            edit_value: 5.0,
            scale: 2.0,
        }
    }
}

/// What the demonstration observed, for callers that want more than the text.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DemoSummary {
    pub edited_value: f64,
    pub greater: bool,
    pub less: bool,
    pub copy_equal: bool,
    pub live_instances: usize,
    pub failures: Vec<String>,
}

pub fn load_demo_config<P: AsRef<Path>>(path: P) -> Result<DemoConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: DemoConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

fn section<W: Write>(out: &mut W, title: &str, matrix: &Matrix) -> Result<()> {
    writeln!(out, "\n{}:", title)?;
    matrix.write_to(out)?;
    Ok(())
}

fn note_state(failures: &mut Vec<String>, label: &str, matrix: &Matrix) {
    if matrix.error_state() != ErrorState::Clean {
        log::warn!("{} finished in state {}", label, matrix.error_state());
        failures.push(format!("{}: {}", label, matrix.error_state()));
    }
}

/// Exercise every constructor form, element access, arithmetic and the
/// comparisons, writing a human-readable trace to `out`.
///
/// Matrices are built by a private factory, so the reported live count covers
/// exactly the instances alive at the end of the run.
pub fn run_demo<W: Write>(config: &DemoConfig, out: &mut W) -> Result<DemoSummary> {
    let factory = MatrixFactory::with_config(config.default_shape.clone());
    let mut failures = Vec::new();

    let m1 = factory.default_matrix();
    let (r, c) = m1.shape();
    writeln!(out, "Default matrix ({}x{}):", r, c)?;
    m1.write_to(out)?;
    note_state(&mut failures, "default", &m1);

    let m2 = factory.square(config.square_size);
    section(
        out,
        &format!("Square matrix ({0}x{0})", config.square_size),
        &m2,
    )?;
    note_state(&mut failures, "square", &m2);

    let m3 = factory.filled(config.rows, config.cols, config.fill);
    section(
        out,
        &format!(
            "Custom matrix ({}x{}) initialized with {}",
            config.rows, config.cols, config.fill
        ),
        &m3,
    )?;
    note_state(&mut failures, "custom", &m3);

    let mut m4 = m3.clone();
    section(out, "Copied matrix", &m4)?;

    if let Err(err) = m4.set_element(config.edit_row, config.edit_col, config.edit_value) {
        log::warn!("Edit skipped: {}", err);
    }
    let edited_value = m4.element_or_zero(config.edit_row, config.edit_col);
    writeln!(
        out,
        "\nElement at ({},{}): {}",
        config.edit_row, config.edit_col, edited_value
    )?;
    note_state(&mut failures, "copy", &m4);

    let m5 = factory.filled(config.rows, config.cols, config.other_fill);
    let sum = &m3 + &m5;
    section(out, "Sum of matrices", &sum)?;
    note_state(&mut failures, "sum", &sum);

    let diff = &m3 - &m5;
    section(out, "Difference of matrices", &diff)?;
    note_state(&mut failures, "difference", &diff);

    let scaled = &m3 * config.scale;
    section(out, &format!("Matrix multiplied by {}", config.scale), &scaled)?;
    note_state(&mut failures, "scaled", &scaled);

    let greater = m3 > m5;
    let less = m3 < m5;
    let copy_equal = m3 == m4;
    writeln!(out, "\nComparisons:")?;
    writeln!(out, "m3 > m5: {}", greater)?;
    writeln!(out, "m3 < m5: {}", less)?;
    writeln!(out, "m3 == m4: {}", copy_equal)?;

    let live_instances = factory.live();
    writeln!(out, "\nTotal matrix objects: {}", live_instances)?;
    log::info!(
        "Demo finished with {} live matrices and {} failure(s)",
        live_instances,
        failures.len()
    );

    Ok(DemoSummary {
        edited_value,
        greater,
        less,
        copy_equal,
        live_instances,
        failures,
    })
}
