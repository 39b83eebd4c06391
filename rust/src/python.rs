//! Python bindings, built with the `python` feature.
//!
//! Mirrors the programmatic surface of the CLI: solve rows given as dicts, or
//! go straight from a CSV file to a rendered diagram.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::{RenderConfig, SolverConfig, DEFAULT_TOLERANCE};
use crate::graph::ActivityNetwork;
use crate::models::FieldRecord;
use crate::solver::solve;

/// Solved activity as seen from Python.
#[pyclass(name = "ActivityResult")]
#[derive(Clone, Debug)]
pub struct PyActivityResult {
    #[pyo3(get)]
    pub id: String,
    #[pyo3(get)]
    pub description: String,
    #[pyo3(get)]
    pub duration: f64,
    #[pyo3(get)]
    pub predecessors: Vec<String>,
    #[pyo3(get, name = "ES")]
    pub earliest_start: f64,
    #[pyo3(get, name = "EF")]
    pub earliest_finish: f64,
    #[pyo3(get, name = "LS")]
    pub latest_start: f64,
    #[pyo3(get, name = "LF")]
    pub latest_finish: f64,
    #[pyo3(get, name = "TF")]
    pub total_float: f64,
    #[pyo3(get)]
    pub critical: bool,
}

#[pymethods]
impl PyActivityResult {
    fn __repr__(&self) -> String {
        format!(
            "ActivityResult(id={:?}, ES={}, EF={}, LS={}, LF={}, TF={})",
            self.id,
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.total_float
        )
    }
}

/// Text of a cell; None and NaN (pandas' empty cell) read as empty.
fn cell_text(value: &Bound<'_, PyAny>) -> PyResult<String> {
    if value.is_none() {
        return Ok(String::new());
    }
    if let Ok(number) = value.extract::<f64>() {
        if number.is_nan() {
            return Ok(String::new());
        }
    }
    Ok(value.str()?.to_string())
}

/// Compute CPM values for rows given as dicts.
///
/// # Arguments
/// * `rows` - Dicts with keys id, description, duration, predecessors (any case)
/// * `tolerance` - Tolerance for zero float; finite and non-negative
///
/// # Returns
/// * Dict mapping activity id to ActivityResult
///
/// # Raises
/// * ValueError on an invalid tolerance, missing fields, duplicate ids,
///   unknown predecessors, invalid durations or cycles
#[pyfunction]
#[pyo3(signature = (rows, tolerance=DEFAULT_TOLERANCE))]
fn compute_cpm(
    rows: Vec<HashMap<String, Bound<'_, PyAny>>>,
    tolerance: f64,
) -> PyResult<HashMap<String, PyActivityResult>> {
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut record = FieldRecord::new();
        for (key, value) in row {
            record.insert(key.as_str(), cell_text(value)?);
        }
        records.push(record);
    }

    let config = SolverConfig::with_tolerance(tolerance).map_err(PyValueError::new_err)?;
    let schedule = ActivityNetwork::from_field_records(&records)
        .and_then(|network| solve(network, &config))
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    Ok(schedule
        .iter()
        .map(|a| {
            (
                a.id().to_string(),
                PyActivityResult {
                    id: a.activity.id.clone(),
                    description: a.activity.description.clone(),
                    duration: a.activity.duration,
                    predecessors: a.activity.predecessors.clone(),
                    earliest_start: a.timing.earliest_start,
                    earliest_finish: a.timing.earliest_finish,
                    latest_start: a.timing.latest_start,
                    latest_finish: a.timing.latest_finish,
                    total_float: a.timing.total_float,
                    critical: a.critical,
                },
            )
        })
        .collect())
}

/// Read a CSV file, solve it and render the network diagram.
///
/// # Returns
/// * The path of the rendered file
#[pyfunction]
#[pyo3(signature = (input, output, start_date=None, rankdir="LR", highlight_critical=true))]
fn render_csv(
    input: &str,
    output: &str,
    start_date: Option<NaiveDate>,
    rankdir: &str,
    highlight_critical: bool,
) -> PyResult<String> {
    let render_config = RenderConfig {
        rankdir: rankdir.parse().map_err(PyValueError::new_err)?,
        highlight_critical,
        ..RenderConfig::default()
    };
    crate::run_from_csv(
        Path::new(input),
        Path::new(output),
        start_date,
        &SolverConfig::default(),
        &render_config,
    )
    .map(|path| path.display().to_string())
    .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The cpm_network Python module.
#[pymodule]
fn cpm_network(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyActivityResult>()?;
    m.add_function(wrap_pyfunction!(compute_cpm, m)?)?;
    m.add_function(wrap_pyfunction!(render_csv, m)?)?;
    Ok(())
}
