//! Critical Path Method scheduling for project activity networks.
//!
//! The pipeline reads tabular activity records, builds and validates the
//! activity graph, orders it topologically, runs the forward and backward
//! passes, and renders a network diagram through Graphviz.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

pub mod calendar;
mod config;
mod error;
pub mod graph;
pub mod ingest;
mod interner;
pub mod logging;
mod models;
pub mod render;
mod schedule;
pub mod sequencer;
pub mod solver;

#[cfg(feature = "python")]
mod python;

pub use calendar::{ActivityDates, CalendarError, CalendarSchedule};
pub use config::{RankDir, RenderConfig, SolverConfig, DEFAULT_TOLERANCE};
pub use error::CpmError;
pub use graph::ActivityNetwork;
pub use ingest::{read_records, read_records_from_path, ColumnMap, IngestError};
pub use interner::ActivityIdx;
pub use models::{
    Activity, ActivityRecord, ActivityTiming, FieldRecord, ScheduledActivity, REQUIRED_FIELDS,
};
pub use render::{
    Diagram, DiagramEdge, DiagramNode, GraphvizRenderer, OutputTarget, RenderError, Renderer,
};
pub use schedule::Schedule;
pub use solver::solve;

/// Errors from the end-to-end CSV to diagram pipeline.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Network(#[from] CpmError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Build, order and solve a network from schema-mapped records.
///
/// # Arguments
/// * `records` - Activity records in input order
/// * `config` - Solver configuration (tolerance, verbosity)
///
/// # Returns
/// * `Ok(Schedule)` with every activity's ES/EF/LS/LF/TF populated
/// * `Err(CpmError)` on the first validation failure; nothing partial is returned
pub fn solve_records(
    records: &[ActivityRecord],
    config: &SolverConfig,
) -> Result<Schedule, CpmError> {
    let network = ActivityNetwork::from_records(records)?;
    crate::log_summary!(
        config.verbosity,
        "Parsed {} activities with {} predecessor links",
        network.len(),
        network.edge_count()
    );
    solve(network, config)
}

/// Read a CSV file and solve it.
pub fn solve_csv(input: &Path, config: &SolverConfig) -> Result<Schedule, RunError> {
    let records = read_records_from_path(input)?;
    Ok(solve_records(&records, config)?)
}

/// Read a CSV file, solve it and render the diagram to `output`.
///
/// The format comes from the output path's suffix (`png` when absent).
/// When `project_start` is given, node labels also carry calendar dates.
///
/// # Returns
/// * The resolved path of the written artifact
pub fn run_from_csv(
    input: &Path,
    output: &Path,
    project_start: Option<NaiveDate>,
    solver_config: &SolverConfig,
    render_config: &RenderConfig,
) -> Result<PathBuf, RunError> {
    let schedule = solve_csv(input, solver_config)?;
    render_schedule(&schedule, output, project_start, solver_config, render_config)
}

/// Output name used by [`run_demo`] when none is given.
pub const DEMO_OUTPUT: &str = "network_demo";

/// The built-in five-activity sample project.
///
/// Solves to a duration of 16 with critical path A, B, D, E; C has a float
/// of 2.
pub fn demo_records() -> Vec<ActivityRecord> {
    vec![
        ActivityRecord::new("A", "Kickoff", "1", ""),
        ActivityRecord::new("B", "Design", "5", "A"),
        ActivityRecord::new("C", "Procurement", "4", "A"),
        ActivityRecord::new("D", "Implementation", "7", "B,C"),
        ActivityRecord::new("E", "Testing", "3", "D"),
    ]
}

/// Solve and render the sample project from [`demo_records`].
pub fn run_demo(
    output: &Path,
    project_start: Option<NaiveDate>,
    solver_config: &SolverConfig,
    render_config: &RenderConfig,
) -> Result<PathBuf, RunError> {
    let schedule = solve_records(&demo_records(), solver_config)?;
    render_schedule(&schedule, output, project_start, solver_config, render_config)
}

fn render_schedule(
    schedule: &Schedule,
    output: &Path,
    project_start: Option<NaiveDate>,
    solver_config: &SolverConfig,
    render_config: &RenderConfig,
) -> Result<PathBuf, RunError> {
    let calendar = project_start
        .map(|start| CalendarSchedule::anchor(schedule, start))
        .transpose()?;

    let diagram = Diagram::from_schedule(schedule, calendar.as_ref(), render_config);
    let target = OutputTarget::from_path(output);
    let renderer = GraphvizRenderer::new(render_config.dot_program.as_str());
    let written = renderer.render(&diagram, &target)?;

    crate::log_summary!(
        solver_config.verbosity,
        "Rendered {} nodes and {} edges as {}",
        diagram.nodes.len(),
        diagram.edges.len(),
        target.format
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const REFERENCE_CSV: &str = "\
id,description,duration,predecessors
A,Kickoff,1,
B,Design,5,A
C,Procurement,4,A
D,Implementation,7,\"B,C\"
E,Testing,3,D
";

    fn reference_records() -> Vec<ActivityRecord> {
        read_records(REFERENCE_CSV.as_bytes()).unwrap()
    }

    fn timings(schedule: &Schedule) -> Vec<(String, ActivityTiming)> {
        let mut all: Vec<(String, ActivityTiming)> = schedule
            .iter()
            .map(|a| (a.id().to_string(), a.timing))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Checks every per-activity identity and the project-level invariants.
    fn assert_invariants(schedule: &Schedule) {
        let eps = schedule.tolerance();
        let mut max_ef: f64 = 0.0;
        for a in schedule.iter() {
            let t = a.timing;
            let d = a.activity.duration;
            assert!((t.earliest_finish - (t.earliest_start + d)).abs() <= eps);
            assert!((t.latest_start - (t.latest_finish - d)).abs() <= eps);
            assert!((t.total_float - (t.latest_start - t.earliest_start)).abs() <= eps);
            assert!(t.total_float >= -eps);
            max_ef = max_ef.max(t.earliest_finish);
        }
        assert!((schedule.project_duration() - max_ef).abs() <= eps);
        for sink in schedule.sinks() {
            let lf = schedule.timing(sink).unwrap().latest_finish;
            assert!((lf - schedule.project_duration()).abs() <= eps);
        }

        if !schedule.is_empty() {
            let path = schedule.critical_path();
            assert!(!path.is_empty());
            assert!(schedule.get(path[0]).unwrap().activity.is_source());
            assert!(schedule.successors(path[path.len() - 1]).is_empty());
            for pair in path.windows(2) {
                assert!(schedule.is_critical_edge(pair[0], pair[1]));
            }
        }
    }

    #[test]
    fn test_reference_scenario_end_to_end() {
        let schedule = solve_records(&reference_records(), &SolverConfig::default()).unwrap();
        assert!((schedule.project_duration() - 16.0).abs() < 1e-9);
        assert_eq!(schedule.critical_path(), vec!["A", "B", "D", "E"]);
        let c = schedule.timing("C").unwrap();
        assert!((c.total_float - 2.0).abs() < 1e-9);
        assert_invariants(&schedule);
    }

    #[test]
    fn test_solve_is_idempotent() {
        let records = reference_records();
        let first = solve_records(&records, &SolverConfig::default()).unwrap();
        let second = solve_records(&records, &SolverConfig::default()).unwrap();
        assert_eq!(timings(&first), timings(&second));
    }

    #[test]
    fn test_errors_abort_pipeline() {
        let cycle = vec![
            ActivityRecord::new("A", "a", "1", "B"),
            ActivityRecord::new("B", "b", "1", "A"),
        ];
        assert!(matches!(
            solve_records(&cycle, &SolverConfig::default()),
            Err(CpmError::CycleDetected { .. })
        ));

        let unknown = vec![ActivityRecord::new("A", "a", "1", "Z")];
        assert_eq!(
            solve_records(&unknown, &SolverConfig::default()).unwrap_err(),
            CpmError::UnknownPredecessor {
                activity: "A".to_string(),
                predecessor: "Z".to_string(),
            }
        );

        let duplicate = vec![
            ActivityRecord::new("A", "a", "1", ""),
            ActivityRecord::new("A", "b", "2", ""),
        ];
        assert!(matches!(
            solve_records(&duplicate, &SolverConfig::default()),
            Err(CpmError::DuplicateId { .. })
        ));
    }

    #[test]
    fn test_run_from_csv_writes_dot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("network.csv");
        std::fs::write(&input, REFERENCE_CSV).unwrap();
        let output = dir.path().join("network.dot");

        let written = run_from_csv(
            &input,
            &output,
            NaiveDate::from_ymd_opt(2025, 1, 1),
            &SolverConfig::default(),
            &RenderConfig::default(),
        )
        .unwrap();

        assert_eq!(written, output);
        let dot = std::fs::read_to_string(&written).unwrap();
        assert!(dot.contains("\"D\" -> \"E\" [color=red];"));
        assert!(dot.contains("2025-01-14 &rarr; 2025-01-17"));
    }

    #[test]
    fn test_demo_project_matches_csv_reference() {
        assert_eq!(demo_records(), reference_records());
        let schedule = solve_records(&demo_records(), &SolverConfig::default()).unwrap();
        assert!((schedule.project_duration() - 16.0).abs() < 1e-9);
        assert_eq!(schedule.critical_path(), vec!["A", "B", "D", "E"]);
    }

    #[test]
    fn test_run_demo_writes_dot() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("network_demo.gv");
        let written = run_demo(
            &output,
            None,
            &SolverConfig::default(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(written, output);
        let dot = std::fs::read_to_string(&written).unwrap();
        assert!(dot.contains("\"B\" -> \"D\" [color=red];"));
        assert!(dot.contains("\"C\" -> \"D\" [color=black];"));
    }

    #[test]
    fn test_run_from_csv_renders_nothing_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("network.csv");
        std::fs::write(&input, "id,description,duration\nA,a,1\nA,b,2\n").unwrap();
        let output = dir.path().join("network.dot");

        let err = run_from_csv(
            &input,
            &output,
            None,
            &SolverConfig::default(),
            &RenderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Network(CpmError::DuplicateId { .. })));
        assert!(!output.exists());
    }

    /// Random DAG: each activity may only depend on activities listed before it.
    fn arb_network() -> impl Strategy<Value = Vec<ActivityRecord>> {
        arb_network_with((0u32..20).prop_map(|d| d.to_string()))
    }

    /// Random DAG with large durations carrying two decimals.
    fn arb_fractional_network() -> impl Strategy<Value = Vec<ActivityRecord>> {
        arb_network_with((0.0f64..1e9).prop_map(|d| ((d * 100.0).round() / 100.0).to_string()))
    }

    fn arb_network_with<D>(durations: D) -> impl Strategy<Value = Vec<ActivityRecord>>
    where
        D: Strategy<Value = String>,
    {
        let row = (durations, prop::collection::vec(any::<prop::sample::Index>(), 0..4));
        prop::collection::vec(row, 1..15).prop_map(|rows| {
            rows.iter()
                .enumerate()
                .map(|(i, (duration, preds))| {
                    let preds: Vec<String> = if i == 0 {
                        Vec::new()
                    } else {
                        preds.iter().map(|p| format!("T{}", p.index(i))).collect()
                    };
                    ActivityRecord::new(
                        format!("T{i}"),
                        format!("Task {i}"),
                        duration.clone(),
                        preds.join(","),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn solved_networks_satisfy_cpm_invariants(records in arb_network()) {
            let schedule = solve_records(&records, &SolverConfig::default()).unwrap();
            assert_invariants(&schedule);
        }

        #[test]
        fn large_fractional_durations_keep_a_critical_path(records in arb_fractional_network()) {
            let schedule = solve_records(&records, &SolverConfig::default());
            prop_assert!(schedule.is_ok(), "solve failed: {:?}", schedule.as_ref().err());
            let schedule = schedule.unwrap();

            let path = schedule.critical_path();
            prop_assert!(!path.is_empty());
            prop_assert!(schedule.sinks().contains(&path[path.len() - 1]));
            for activity in schedule.iter() {
                prop_assert!(activity.timing.total_float >= 0.0);
            }
            assert_invariants(&schedule);
        }

        #[test]
        fn permuting_input_rows_keeps_results(
            (records, shuffled) in arb_network().prop_flat_map(|records| {
                let shuffled = Just(records.clone()).prop_shuffle();
                (Just(records), shuffled)
            })
        ) {
            let baseline = solve_records(&records, &SolverConfig::default()).unwrap();
            let permuted = solve_records(&shuffled, &SolverConfig::default()).unwrap();
            prop_assert_eq!(timings(&baseline), timings(&permuted));
        }
    }
}
