//! Core data types for activity networks.

use crate::error::CpmError;

/// Column names of the input schema, matched case-insensitively.
pub const FIELD_ID: &str = "id";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_DURATION: &str = "duration";
pub const FIELD_PREDECESSORS: &str = "predecessors";

/// Fields every record must provide, in schema order.
pub const REQUIRED_FIELDS: [&str; 4] = [
    FIELD_ID,
    FIELD_DESCRIPTION,
    FIELD_DURATION,
    FIELD_PREDECESSORS,
];

/// One input row after schema mapping, still in textual form.
///
/// Normalization and validation happen in the graph builder so that errors
/// can name the activity they belong to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityRecord {
    pub id: String,
    pub description: String,
    pub duration: String,
    /// Comma-delimited predecessor ids.
    pub predecessors: String,
}

impl ActivityRecord {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        duration: impl Into<String>,
        predecessors: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            duration: duration.into(),
            predecessors: predecessors.into(),
        }
    }
}

/// A loosely keyed row, e.g. a dataframe row or a Python dict.
///
/// Keys are compared after trimming and lowercasing. When two keys collide
/// the first one wins, the same as header resolution in CSV input.
#[derive(Clone, Debug, Default)]
pub struct FieldRecord {
    fields: Vec<(String, String)>,
}

impl FieldRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, returning the record for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a field unless one with the same normalized key is already set.
    ///
    /// Returns `false` when the key was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into().trim().to_lowercase();
        if self.fields.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.fields.push((key, value.into()));
        true
    }

    /// Look up a field by name, ignoring case.
    pub fn get(&self, field: &str) -> Option<&str> {
        let field = field.trim().to_lowercase();
        self.fields
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| v.as_str())
    }

    /// Map onto the typed record, failing on the first absent schema field.
    pub fn to_activity_record(&self) -> Result<ActivityRecord, CpmError> {
        let field = |name: &str| {
            self.get(name)
                .map(str::to_string)
                .ok_or_else(|| CpmError::missing_field(name))
        };
        Ok(ActivityRecord {
            id: field(FIELD_ID)?,
            description: field(FIELD_DESCRIPTION)?,
            duration: field(FIELD_DURATION)?,
            predecessors: field(FIELD_PREDECESSORS)?,
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = FieldRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// An activity of the project network.
///
/// Constructed once from input and never mutated; computed values live in
/// [`ActivityTiming`].
#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub id: String,
    pub description: String,
    pub duration: f64,
    /// Predecessor ids in first-seen order, without repeats.
    pub predecessors: Vec<String>,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        duration: f64,
        predecessors: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            duration,
            predecessors,
        }
    }

    /// Activities without predecessors start the project.
    pub fn is_source(&self) -> bool {
        self.predecessors.is_empty()
    }
}

/// Per-activity CPM values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActivityTiming {
    /// Earliest start (ES).
    pub earliest_start: f64,
    /// Earliest finish (EF) = ES + duration.
    pub earliest_finish: f64,
    /// Latest start (LS) = LF - duration.
    pub latest_start: f64,
    /// Latest finish (LF).
    pub latest_finish: f64,
    /// Total float (TF) = LS - ES.
    pub total_float: f64,
}

impl ActivityTiming {
    pub fn is_critical(&self, tolerance: f64) -> bool {
        self.total_float.abs() <= tolerance
    }
}

/// A solved activity: the input activity with its computed timing.
#[derive(Clone, Copy, Debug)]
pub struct ScheduledActivity<'a> {
    pub activity: &'a Activity,
    pub timing: ActivityTiming,
    pub critical: bool,
}

impl<'a> ScheduledActivity<'a> {
    pub fn id(&self) -> &'a str {
        &self.activity.id
    }
}
