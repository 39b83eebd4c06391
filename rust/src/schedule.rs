//! Solved activity network.

use crate::graph::ActivityNetwork;
use crate::interner::ActivityIdx;
use crate::models::{ActivityTiming, ScheduledActivity};

/// A fully solved network: every activity has its timing populated.
///
/// Only [`crate::solver::solve`] constructs a schedule, so partially computed
/// values are never observable.
#[derive(Clone, Debug)]
pub struct Schedule {
    network: ActivityNetwork,
    order: Vec<ActivityIdx>,
    /// Timings indexed by activity index.
    timings: Vec<ActivityTiming>,
    project_duration: f64,
    tolerance: f64,
}

impl Schedule {
    pub(crate) fn new(
        network: ActivityNetwork,
        order: Vec<ActivityIdx>,
        timings: Vec<ActivityTiming>,
        project_duration: f64,
        tolerance: f64,
    ) -> Self {
        Self {
            network,
            order,
            timings,
            project_duration,
            tolerance,
        }
    }

    /// Project duration: the largest earliest finish, 0 for an empty network.
    pub fn project_duration(&self) -> f64 {
        self.project_duration
    }

    /// Absolute tolerance used for criticality: the configured tolerance
    /// scaled by the project duration.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn network(&self) -> &ActivityNetwork {
        &self.network
    }

    pub fn len(&self) -> usize {
        self.network.len()
    }

    pub fn is_empty(&self) -> bool {
        self.network.is_empty()
    }

    fn scheduled(&self, idx: ActivityIdx) -> ScheduledActivity<'_> {
        let timing = self.timings[idx as usize];
        ScheduledActivity {
            activity: self.network.activity(idx),
            timing,
            critical: timing.is_critical(self.tolerance),
        }
    }

    #[inline]
    fn critical_at(&self, idx: ActivityIdx) -> bool {
        self.timings[idx as usize].is_critical(self.tolerance)
    }

    /// Scheduled activities in input order.
    pub fn iter(&self) -> impl Iterator<Item = ScheduledActivity<'_>> + '_ {
        (0..self.len() as ActivityIdx).map(move |idx| self.scheduled(idx))
    }

    /// Scheduled activities in topological order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = ScheduledActivity<'_>> + '_ {
        self.order.iter().map(move |&idx| self.scheduled(idx))
    }

    pub fn get(&self, id: &str) -> Option<ScheduledActivity<'_>> {
        self.network.index_of(id).map(|idx| self.scheduled(idx))
    }

    pub fn timing(&self, id: &str) -> Option<&ActivityTiming> {
        self.network
            .index_of(id)
            .map(|idx| &self.timings[idx as usize])
    }

    /// Whether the activity has zero total float. Unknown ids are not critical.
    pub fn is_critical(&self, id: &str) -> bool {
        self.network
            .index_of(id)
            .is_some_and(|idx| self.critical_at(idx))
    }

    /// Whether `from -> to` is a predecessor edge with both endpoints critical.
    pub fn is_critical_edge(&self, from: &str, to: &str) -> bool {
        let (Some(from), Some(to)) = (self.network.index_of(from), self.network.index_of(to))
        else {
            return false;
        };
        self.network.successors(from).contains(&to)
            && self.critical_at(from)
            && self.critical_at(to)
    }

    /// Ids of the activities that directly follow `id`.
    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.network
            .index_of(id)
            .map(|idx| {
                self.network
                    .successors(idx)
                    .iter()
                    .map(|&s| self.network.id_of(s))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of activities with no predecessors.
    pub fn sources(&self) -> Vec<&str> {
        self.network
            .sources()
            .map(|idx| self.network.id_of(idx))
            .collect()
    }

    /// Ids of activities with no successors.
    pub fn sinks(&self) -> Vec<&str> {
        self.network
            .sinks()
            .map(|idx| self.network.id_of(idx))
            .collect()
    }

    /// Topological order used by the solve.
    pub fn topological_order(&self) -> Vec<&str> {
        self.order
            .iter()
            .map(|&idx| self.network.id_of(idx))
            .collect()
    }

    /// Ids of all zero-float activities, in topological order.
    pub fn critical_activities(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|&&idx| self.critical_at(idx))
            .map(|&idx| self.network.id_of(idx))
            .collect()
    }

    /// One critical path from a source to a sink.
    ///
    /// Starts at the first critical source in topological order and follows,
    /// at each step, the first critical successor that starts exactly when the
    /// current activity finishes. Such a successor always exists for a
    /// critical non-sink activity, so the walk ends at a sink.
    pub fn critical_path(&self) -> Vec<&str> {
        let Some(mut current) = self
            .order
            .iter()
            .copied()
            .find(|&idx| self.network.predecessors(idx).is_empty() && self.critical_at(idx))
        else {
            return Vec::new();
        };

        let mut path = vec![self.network.id_of(current)];
        loop {
            let finish = self.timings[current as usize].earliest_finish;
            let next = self.network.successors(current).iter().copied().find(|&s| {
                self.critical_at(s)
                    && (self.timings[s as usize].earliest_start - finish).abs() <= self.tolerance
            });
            match next {
                Some(s) => {
                    path.push(self.network.id_of(s));
                    current = s;
                }
                None => break,
            }
        }
        path
    }
}
