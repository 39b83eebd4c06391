//! CPM forward and backward passes.

use crate::config::SolverConfig;
use crate::error::CpmError;
use crate::graph::ActivityNetwork;
use crate::models::ActivityTiming;
use crate::schedule::Schedule;
use crate::sequencer::topological_order;
use crate::{log_debug, log_passes, log_summary};

/// Solve a validated network.
///
/// 1. Orders activities topologically
/// 2. Forward pass: ES = max EF of predecessors (0 for sources), EF = ES + d
/// 3. Backward pass: LF = project duration for sinks, min LS of successors
///    otherwise; LS = LF - d
/// 4. TF = LS - ES
///
/// Comparisons use `config.tolerance` scaled by the project duration (see
/// [`effective_tolerance`]). Float within that tolerance of zero is rounding
/// noise and is reported as exactly zero. Float below it fails with
/// `CpmError::NegativeFloat`, so a returned schedule never carries negative
/// float.
pub fn solve(network: ActivityNetwork, config: &SolverConfig) -> Result<Schedule, CpmError> {
    let verbosity = config.verbosity;
    let order = topological_order(&network)?;
    log_debug!(
        verbosity,
        "Topological order: {:?}",
        order.iter().map(|&i| network.id_of(i)).collect::<Vec<_>>()
    );

    let n = network.len();
    let mut earliest_start = vec![0.0_f64; n];
    let mut earliest_finish = vec![0.0_f64; n];

    for &idx in &order {
        let i = idx as usize;
        let es = network
            .predecessors(idx)
            .iter()
            .map(|&p| earliest_finish[p as usize])
            .fold(0.0_f64, f64::max);
        earliest_start[i] = es;
        earliest_finish[i] = es + network.activity(idx).duration;
        log_passes!(
            verbosity,
            "Forward: {} ES={} EF={}",
            network.id_of(idx),
            earliest_start[i],
            earliest_finish[i]
        );
    }

    let project_duration = earliest_finish.iter().copied().fold(0.0_f64, f64::max);

    let mut latest_start = vec![0.0_f64; n];
    let mut latest_finish = vec![0.0_f64; n];

    for &idx in order.iter().rev() {
        let i = idx as usize;
        let successors = network.successors(idx);
        let lf = if successors.is_empty() {
            project_duration
        } else {
            successors
                .iter()
                .map(|&s| latest_start[s as usize])
                .fold(f64::INFINITY, f64::min)
        };
        latest_finish[i] = lf;
        latest_start[i] = lf - network.activity(idx).duration;
        log_passes!(
            verbosity,
            "Backward: {} LS={} LF={}",
            network.id_of(idx),
            latest_start[i],
            latest_finish[i]
        );
    }

    let tolerance = effective_tolerance(config.tolerance, project_duration);
    log_debug!(verbosity, "Effective float tolerance: {:e}", tolerance);

    let mut timings = Vec::with_capacity(n);
    for i in 0..n {
        let mut total_float = latest_start[i] - earliest_start[i];
        if total_float < -tolerance {
            return Err(CpmError::NegativeFloat {
                id: network.activities()[i].id.clone(),
                total_float,
            });
        }
        if total_float.abs() <= tolerance {
            total_float = 0.0;
        }
        timings.push(ActivityTiming {
            earliest_start: earliest_start[i],
            earliest_finish: earliest_finish[i],
            latest_start: latest_start[i],
            latest_finish: latest_finish[i],
            total_float,
        });
    }

    log_summary!(
        verbosity,
        "Solved {} activities, project duration {}",
        n,
        project_duration
    );

    Ok(Schedule::new(
        network,
        order,
        timings,
        project_duration,
        tolerance,
    ))
}

/// Absolute tolerance for a schedule of the given length.
///
/// Rounding in `LS = LF - d` grows with the magnitude of the times involved,
/// so the configured tolerance is relative to the project duration once that
/// exceeds one time unit.
pub fn effective_tolerance(tolerance: f64, project_duration: f64) -> f64 {
    tolerance * project_duration.abs().max(1.0)
}
