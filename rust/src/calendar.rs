//! Anchoring a solved schedule to calendar dates.
//!
//! One time unit is one calendar day and every day counts; there is no
//! working-day calendar.

use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::schedule::Schedule;

/// Errors raised while converting offsets to dates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Activity {id} falls outside the supported date range")]
    DateOutOfRange { id: String },
}

/// Calendar dates for one activity.
///
/// Start dates round down and finish dates round up, so fractional days
/// never shrink the window an activity occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActivityDates {
    pub early_start: NaiveDate,
    pub early_finish: NaiveDate,
    pub late_start: NaiveDate,
    pub late_finish: NaiveDate,
}

/// A schedule's offsets mapped onto dates from a project start.
#[derive(Clone, Debug)]
pub struct CalendarSchedule {
    pub project_start: NaiveDate,
    pub project_finish: NaiveDate,
    dates: FxHashMap<String, ActivityDates>,
}

fn offset_date(start: NaiveDate, days: f64) -> Option<NaiveDate> {
    if !days.is_finite() || days.abs() > i32::MAX as f64 {
        return None;
    }
    start.checked_add_signed(Duration::try_days(days as i64)?)
}

impl CalendarSchedule {
    /// Anchor every activity of `schedule` to `project_start`.
    pub fn anchor(schedule: &Schedule, project_start: NaiveDate) -> Result<Self, CalendarError> {
        let mut dates = FxHashMap::with_capacity_and_hasher(schedule.len(), Default::default());

        for activity in schedule.iter() {
            let t = activity.timing;
            let out_of_range = || CalendarError::DateOutOfRange {
                id: activity.id().to_string(),
            };
            let date = |days: f64| offset_date(project_start, days).ok_or_else(out_of_range);
            dates.insert(
                activity.id().to_string(),
                ActivityDates {
                    early_start: date(t.earliest_start.floor())?,
                    early_finish: date(t.earliest_finish.ceil())?,
                    late_start: date(t.latest_start.floor())?,
                    late_finish: date(t.latest_finish.ceil())?,
                },
            );
        }

        let project_finish = offset_date(project_start, schedule.project_duration().ceil())
            .ok_or_else(|| CalendarError::DateOutOfRange {
                id: "<project>".to_string(),
            })?;

        Ok(Self {
            project_start,
            project_finish,
            dates,
        })
    }

    pub fn dates(&self, id: &str) -> Option<&ActivityDates> {
        self.dates.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverConfig;
    use crate::graph::ActivityNetwork;
    use crate::models::ActivityRecord;
    use crate::solver::solve;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(rows: &[(&str, &str, &str)]) -> Schedule {
        let records: Vec<ActivityRecord> = rows
            .iter()
            .map(|(id, d, p)| ActivityRecord::new(*id, *id, *d, *p))
            .collect();
        solve(
            ActivityNetwork::from_records(&records).unwrap(),
            &SolverConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_anchor_whole_days() {
        let s = schedule(&[("A", "1", ""), ("B", "5", "A"), ("C", "4", "A")]);
        let cal = CalendarSchedule::anchor(&s, date(2025, 1, 1)).unwrap();

        assert_eq!(cal.project_finish, date(2025, 1, 7));
        let c = cal.dates("C").unwrap();
        assert_eq!(c.early_start, date(2025, 1, 2));
        assert_eq!(c.early_finish, date(2025, 1, 6));
        assert_eq!(c.late_start, date(2025, 1, 3));
        assert_eq!(c.late_finish, date(2025, 1, 7));
        assert!(cal.dates("Z").is_none());
    }

    #[test]
    fn test_fractional_days_widen_window() {
        let s = schedule(&[("A", "1.5", ""), ("B", "1", "A")]);
        let cal = CalendarSchedule::anchor(&s, date(2025, 3, 10)).unwrap();

        let b = cal.dates("B").unwrap();
        // ES 1.5 -> day 1, EF 2.5 -> day 3.
        assert_eq!(b.early_start, date(2025, 3, 11));
        assert_eq!(b.early_finish, date(2025, 3, 13));
        assert_eq!(cal.project_finish, date(2025, 3, 13));
    }

    #[test]
    fn test_out_of_range() {
        let s = schedule(&[("A", "1e12", "")]);
        assert_eq!(
            CalendarSchedule::anchor(&s, date(2025, 1, 1)).unwrap_err(),
            CalendarError::DateOutOfRange {
                id: "A".to_string()
            }
        );
    }
}
