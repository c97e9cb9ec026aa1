// src/report.rs
//! Read side of the store: the figures the managers' dashboard shows.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::config::consts::{DAILY_GOALS, DEFAULT_DAILY_GOAL};
use crate::error::{ConfigError, StoreError};
use crate::store::{CaseRecord, CaseStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoxSummary {
    pub total: usize,
    pub open: usize,
    pub concluded: usize,
    pub concluded_today: usize,
}

impl BoxSummary {
    pub fn from_records(records: &[CaseRecord], today: NaiveDate) -> Self {
        let mut s = BoxSummary { total: records.len(), ..Self::default() };
        for r in records {
            if r.concluded {
                s.concluded += 1;
                if concluded_on(r, today) {
                    s.concluded_today += 1;
                }
            } else {
                s.open += 1;
            }
        }
        s
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssigneeCount {
    pub assignee: String,
    pub open: usize,
    pub concluded: usize,
}

/// Open/concluded counts per assignee, sorted by assignee. With a non-empty
/// `responsible` list only those assignees are counted.
pub fn assignee_counts(records: &[CaseRecord], responsible: &[String]) -> Vec<AssigneeCount> {
    let keep: HashSet<&str> = responsible.iter().map(String::as_str).collect();
    let mut by: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for r in records {
        if !keep.is_empty() && !keep.contains(r.assignee_email.as_str()) {
            continue;
        }
        let e = by.entry(r.assignee_email.as_str()).or_default();
        if r.concluded { e.1 += 1 } else { e.0 += 1 }
    }
    by.into_iter()
        .map(|(a, (open, concluded))| AssigneeCount { assignee: s!(a), open, concluded })
        .collect()
}

/// Per-technician daily goal for a box.
pub fn daily_goal(box_name: &str) -> u32 {
    DAILY_GOALS
        .iter()
        .find(|(name, _)| *name == box_name)
        .map(|(_, goal)| *goal)
        .unwrap_or(DEFAULT_DAILY_GOAL)
}

/// Monday to Friday count of the month containing `day`. No holiday calendar.
pub fn weekdays_in_month(day: NaiveDate) -> u32 {
    let Some(mut d) = day.with_day(1) else { return 0 };
    let mut n = 0;
    while d.month() == day.month() {
        if !matches!(d.weekday(), Weekday::Sat | Weekday::Sun) {
            n += 1;
        }
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    n
}

/// Integer percentage, capped at 100. A zero goal reads as 0%.
pub fn percent(done: usize, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    ((done as u64 * 100) / goal as u64).min(100) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GoalProgress {
    pub daily_goal: u32,
    pub monthly_goal: u32,
    pub working_days: u32,
    pub done_today: usize,
    pub done_month: usize,
    pub daily_pct: u32,
    pub monthly_pct: u32,
}

/// Whose work a goal covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalScope<'a> {
    /// Everyone responsible for the box; the goal scales with headcount.
    WholeBox(&'a [String]),
    Technician(&'a str),
}

pub fn goal_progress(records: &[CaseRecord], box_name: &str, scope: GoalScope<'_>, today: NaiveDate) -> GoalProgress {
    let per_head = daily_goal(box_name);
    let (daily, counted): (u32, Vec<&CaseRecord>) = match scope {
        GoalScope::WholeBox(people) => {
            let keep: HashSet<&str> = people.iter().map(String::as_str).collect();
            (
                per_head * people.len() as u32,
                records.iter().filter(|r| keep.contains(r.assignee_email.as_str())).collect(),
            )
        }
        GoalScope::Technician(who) => (per_head, records.iter().filter(|r| r.technician == who).collect()),
    };

    let working_days = weekdays_in_month(today);
    let monthly = working_days * daily;
    let done_today = counted.iter().filter(|r| concluded_on(r, today)).count();
    let done_month = counted
        .iter()
        .filter(|r| r.concluded_at.is_some_and(|at| at.year() == today.year() && at.month() == today.month()))
        .count();

    GoalProgress {
        daily_goal: daily,
        monthly_goal: monthly,
        working_days,
        done_today,
        done_month,
        daily_pct: percent(done_today, daily),
        monthly_pct: percent(done_month, monthly),
    }
}

fn concluded_on(r: &CaseRecord, day: NaiveDate) -> bool {
    r.concluded_at.is_some_and(|at| at.date() == day)
}

/// Responsible assignees keyed by box name.
pub type ResponsibleMap = BTreeMap<String, Vec<String>>;

/// Read the per-box responsible lists. A missing file is an empty map.
pub fn load_responsible(path: &Path) -> Result<ResponsibleMap, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logd!(path = %path.display(), "no responsible list file");
            return Ok(ResponsibleMap::new());
        }
        Err(source) => return Err(ConfigError::ResponsibleRead { path: path.to_path_buf(), source }),
    };
    serde_json::from_str(&raw).map_err(|source| ConfigError::ResponsibleParse { path: path.to_path_buf(), source })
}

/// Responsible list of one box; empty when the box has none.
pub fn responsible_for(map: &ResponsibleMap, box_name: &str) -> Vec<String> {
    map.get(box_name)
        .map(|people| people.iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect())
        .unwrap_or_default()
}

/// Everything `report` prints for one box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxReport {
    pub box_name: String,
    pub summary: BoxSummary,
    pub responsible: Vec<String>,
    pub per_assignee: Vec<AssigneeCount>,
    pub goals: GoalProgress,
}

/// Build the report of one box. An empty `responsible` list means every
/// assignee present in the store.
pub fn box_report(
    store: &CaseStore,
    box_name: &str,
    responsible: &[String],
    technician: Option<&str>,
    today: NaiveDate,
) -> Result<BoxReport, StoreError> {
    let records = store.all()?;
    let responsible: Vec<String> = if responsible.is_empty() {
        let distinct: BTreeSet<&str> = records
            .iter()
            .map(|r| r.assignee_email.as_str())
            .filter(|a| !a.is_empty())
            .collect();
        distinct.into_iter().map(String::from).collect()
    } else {
        responsible.to_vec()
    };

    let scope = match technician {
        Some(t) => GoalScope::Technician(t),
        None => GoalScope::WholeBox(&responsible),
    };
    Ok(BoxReport {
        box_name: s!(box_name),
        summary: BoxSummary::from_records(&records, today),
        per_assignee: assignee_counts(&records, &responsible),
        goals: goal_progress(&records, box_name, scope, today),
        responsible,
    })
}
