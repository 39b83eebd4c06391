//! Activity graph construction and referential validation.

use rustc_hash::FxHashSet;

use crate::error::CpmError;
use crate::interner::{ActivityIdInterner, ActivityIdx};
use crate::models::{Activity, ActivityRecord, FieldRecord, FIELD_ID};

/// Separator between ids in a predecessor list.
pub const PREDECESSOR_DELIMITER: char = ',';

/// A validated activity network.
///
/// Every predecessor reference resolves to an activity of the same network.
/// Adjacency lists are indexed by [`ActivityIdx`] and keep input order, so
/// everything derived from them is deterministic for a given input.
#[derive(Clone, Debug)]
pub struct ActivityNetwork {
    index: ActivityIdInterner,
    activities: Vec<Activity>,
    predecessors: Vec<Vec<ActivityIdx>>,
    successors: Vec<Vec<ActivityIdx>>,
}

/// Trim surrounding whitespace from an id. Comparison stays case-sensitive.
pub fn normalize_id(raw: &str) -> &str {
    raw.trim()
}

/// Split a delimited predecessor list into normalized ids.
///
/// Empty tokens are discarded and repeated ids collapse to their first
/// occurrence.
pub fn parse_predecessors(raw: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    raw.split(PREDECESSOR_DELIMITER)
        .map(normalize_id)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(*token))
        .map(str::to_string)
        .collect()
}

/// Parse a duration cell as a finite, non-negative real.
pub fn parse_duration(id: &str, raw: &str) -> Result<f64, CpmError> {
    let invalid = || CpmError::InvalidDuration {
        id: id.to_string(),
        value: raw.to_string(),
    };
    let duration: f64 = raw.trim().parse().map_err(|_| invalid())?;
    check_duration(duration).ok_or_else(invalid)
}

fn check_duration(duration: f64) -> Option<f64> {
    // Adding zero folds -0.0 into 0.0.
    (duration.is_finite() && duration >= 0.0).then_some(duration + 0.0)
}

impl ActivityNetwork {
    /// Build a network from schema-mapped records.
    ///
    /// Records are parsed in order; predecessor references are checked only
    /// after every activity is known.
    pub fn from_records<'a, I>(records: I) -> Result<Self, CpmError>
    where
        I: IntoIterator<Item = &'a ActivityRecord>,
    {
        let records = records.into_iter();
        let mut index = ActivityIdInterner::with_capacity(records.size_hint().0);
        let mut activities = Vec::with_capacity(records.size_hint().0);

        for record in records {
            let id = normalize_id(&record.id);
            if id.is_empty() {
                return Err(CpmError::missing_field(FIELD_ID));
            }
            if index.insert(id).is_none() {
                return Err(CpmError::DuplicateId { id: id.to_string() });
            }
            let duration = parse_duration(id, &record.duration)?;
            activities.push(Activity::new(
                id,
                record.description.as_str(),
                duration,
                parse_predecessors(&record.predecessors),
            ));
        }

        Self::link(index, activities)
    }

    /// Build a network from loosely keyed rows, requiring every schema field.
    pub fn from_field_records(records: &[FieldRecord]) -> Result<Self, CpmError> {
        let records = records
            .iter()
            .map(FieldRecord::to_activity_record)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_records(&records)
    }

    /// Build a network from already typed activities.
    ///
    /// Ids and predecessor ids are normalized the same way as textual input.
    pub fn from_activities(activities: Vec<Activity>) -> Result<Self, CpmError> {
        let mut index = ActivityIdInterner::with_capacity(activities.len());
        let mut normalized = Vec::with_capacity(activities.len());

        for activity in activities {
            let id = normalize_id(&activity.id);
            if id.is_empty() {
                return Err(CpmError::missing_field(FIELD_ID));
            }
            if index.insert(id).is_none() {
                return Err(CpmError::DuplicateId { id: id.to_string() });
            }
            let duration =
                check_duration(activity.duration).ok_or_else(|| CpmError::InvalidDuration {
                    id: id.to_string(),
                    value: activity.duration.to_string(),
                })?;
            let predecessors = parse_predecessors(&activity.predecessors.join(","));
            normalized.push(Activity::new(
                id,
                activity.description,
                duration,
                predecessors,
            ));
        }

        Self::link(index, normalized)
    }

    /// Resolve predecessor ids and derive successor adjacency.
    fn link(index: ActivityIdInterner, activities: Vec<Activity>) -> Result<Self, CpmError> {
        let n = activities.len();
        let mut predecessors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];

        for (idx, activity) in activities.iter().enumerate() {
            for pred_id in &activity.predecessors {
                let pred = index
                    .get(pred_id)
                    .ok_or_else(|| CpmError::UnknownPredecessor {
                        activity: activity.id.clone(),
                        predecessor: pred_id.clone(),
                    })?;
                predecessors[idx].push(pred);
                successors[pred as usize].push(idx as ActivityIdx);
            }
        }

        Ok(Self {
            index,
            activities,
            predecessors,
            successors,
        })
    }

    /// Number of activities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Activities in input order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[inline]
    pub fn activity(&self, idx: ActivityIdx) -> &Activity {
        &self.activities[idx as usize]
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<ActivityIdx> {
        self.index.get(id)
    }

    #[inline]
    pub fn id_of(&self, idx: ActivityIdx) -> &str {
        self.index.resolve(idx).unwrap_or_default()
    }

    #[inline]
    pub fn predecessors(&self, idx: ActivityIdx) -> &[ActivityIdx] {
        &self.predecessors[idx as usize]
    }

    #[inline]
    pub fn successors(&self, idx: ActivityIdx) -> &[ActivityIdx] {
        &self.successors[idx as usize]
    }

    /// Activities with no predecessors.
    pub fn sources(&self) -> impl Iterator<Item = ActivityIdx> + '_ {
        (0..self.len() as ActivityIdx).filter(move |&idx| self.predecessors(idx).is_empty())
    }

    /// Activities with no successors.
    pub fn sinks(&self) -> impl Iterator<Item = ActivityIdx> + '_ {
        (0..self.len() as ActivityIdx).filter(move |&idx| self.successors(idx).is_empty())
    }

    /// Successor adjacency keyed by id, one entry per activity.
    pub fn successor_ids(&self) -> Vec<(&str, Vec<&str>)> {
        (0..self.len() as ActivityIdx)
            .map(|idx| {
                let succs = self.successors(idx).iter().map(|&s| self.id_of(s)).collect();
                (self.id_of(idx), succs)
            })
            .collect()
    }

    /// Number of predecessor edges.
    pub fn edge_count(&self) -> usize {
        self.predecessors.iter().map(Vec::len).sum()
    }
}
