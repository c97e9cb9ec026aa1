// tests/report_figures.rs
use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use sei_capture::report::{self, BoxSummary, GoalScope};
use sei_capture::store::STAMP_FMT;
use sei_capture::{CaseLedger, CaseRecord, CaseStore};

const BOX: &str = "MGI-SGP-DECIPEX-CGPAG-BENESP"; // 7 per technician per day

fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, STAMP_FMT).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
}

/// a@: A1 concluded today, A2 concluded earlier this month, A3 open.
/// b@: B1 concluded last month, B2 open. c@ (not responsible): C1 concluded today.
fn populated() -> CaseStore {
    let mut store = CaseStore::in_memory().unwrap();
    let seen = at("2024-04-20 10:00:00");
    let rec = |n: &str, who: &str| CaseRecord::sighted(n, who, BOX, seen);
    store
        .upsert(&[
            rec("A1", "a@x.org"),
            rec("A2", "a@x.org"),
            rec("A3", "a@x.org"),
            rec("B1", "b@x.org"),
            rec("B2", "b@x.org"),
            rec("C1", "c@x.org"),
        ])
        .unwrap();

    let keep = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<HashSet<_>>();
    store.mark_concluded_at(&keep(&["A1", "A2", "A3", "B2", "C1"]), at("2024-04-30 17:00:00")).unwrap();
    store.mark_concluded_at(&keep(&["A1", "A3", "B2", "C1"]), at("2024-05-03 17:00:00")).unwrap();
    store.mark_concluded_at(&keep(&["A3", "B2"]), at("2024-05-15 09:30:00")).unwrap();
    store
}

#[test]
fn summary_counts_open_and_concluded() {
    let store = populated();
    let s = BoxSummary::from_records(&store.all().unwrap(), today());
    assert_eq!(s, BoxSummary { total: 6, open: 2, concluded: 4, concluded_today: 2 });
}

#[test]
fn whole_box_goal_scales_with_responsible_people() {
    let store = populated();
    let people = vec!["a@x.org".to_string(), "b@x.org".to_string()];
    let g = report::goal_progress(&store.all().unwrap(), BOX, GoalScope::WholeBox(&people), today());

    assert_eq!(g.daily_goal, 14);
    assert_eq!(g.working_days, 23);
    assert_eq!(g.monthly_goal, 23 * 14);
    assert_eq!(g.done_today, 1); // A1; C1 is not responsible
    assert_eq!(g.done_month, 2); // A1, A2
    assert_eq!(g.daily_pct, 7);
}

#[test]
fn technician_goal_uses_the_per_head_figure() {
    let store = populated();
    let g = report::goal_progress(&store.all().unwrap(), BOX, GoalScope::Technician("c@x.org"), today());
    assert_eq!(g.daily_goal, 7);
    assert_eq!(g.done_today, 1);
    assert_eq!(g.daily_pct, 14);
}

#[test]
fn report_defaults_responsible_to_store_assignees() {
    let store = populated();
    let r = report::box_report(&store, BOX, &[], None, today()).unwrap();

    assert_eq!(r.responsible, ["a@x.org", "b@x.org", "c@x.org"]);
    assert_eq!(r.goals.daily_goal, 21);
    let a = r.per_assignee.iter().find(|c| c.assignee == "a@x.org").unwrap();
    assert_eq!((a.open, a.concluded), (1, 2));

    let only_b = report::box_report(&store, BOX, &["b@x.org".to_string()], None, today()).unwrap();
    assert_eq!(only_b.per_assignee.len(), 1);
    assert_eq!(only_b.per_assignee[0].concluded, 1);
}

#[test]
fn responsible_lists_come_from_the_box_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responsaveis.json");
    std::fs::write(
        &path,
        format!(r#"{{ "{BOX}": ["a@x.org", " b@x.org "], "OTHER-BOX": ["z@x.org"] }}"#),
    )
    .unwrap();

    let map = report::load_responsible(&path).unwrap();
    let people = report::responsible_for(&map, BOX);
    assert_eq!(people, ["a@x.org", "b@x.org"]);
    assert!(report::responsible_for(&map, "UNLISTED").is_empty());

    // c@ is left out of the goal even though the store knows them.
    let r = report::box_report(&populated(), BOX, &people, None, today()).unwrap();
    assert_eq!(r.goals.daily_goal, 14);
    assert!(r.per_assignee.iter().all(|a| a.assignee != "c@x.org"));
}

#[test]
fn missing_responsible_file_is_empty_and_bad_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(report::load_responsible(&dir.path().join("absent.json")).unwrap().is_empty());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "[not, a, map]").unwrap();
    assert!(matches!(
        report::load_responsible(&bad),
        Err(sei_capture::error::ConfigError::ResponsibleParse { .. })
    ));
}
