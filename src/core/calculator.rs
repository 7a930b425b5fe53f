use chrono::NaiveDateTime;

use crate::core::sequence::{self, PunchEvent};
use crate::model::punch::PunchType;
use crate::model::summary::DailyAttendanceStatus;

/// Everything the daily calculation needs, already fetched.
#[derive(Debug)]
pub struct SummaryInput {
    pub events: Vec<PunchEvent>,
    /// Template minutes for the weekday; `None` when no assignment covers
    /// the date.
    pub policy_minutes: Option<u32>,
    pub is_holiday: bool,
    pub has_pending_adjustment: bool,
}

/// Derived figures for one subject-day. Pure output; persistence is the
/// recalculator's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFigures {
    pub expected_minutes: u32,
    pub worked_minutes: u32,
    pub break_minutes: u32,
    pub overtime_minutes: u32,
    pub deficit_minutes: u32,
    pub status: DailyAttendanceStatus,
}

fn diff_minutes(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    (end - start).num_minutes().max(0) as u32
}

/// Accumulates worked and break minutes over a sorted, legal event list.
/// Worked intervals run IN→(BREAK_START | OUT); BREAK_END re-opens work.
/// Returns (worked, break, complete).
fn accumulate(events: &[PunchEvent]) -> (u32, u32, bool) {
    let mut worked_minutes = 0;
    let mut break_minutes = 0;
    let mut open_work: Option<NaiveDateTime> = None;
    let mut open_break: Option<NaiveDateTime> = None;

    for &(punched_at, punch_type) in events {
        match punch_type {
            PunchType::In => {
                open_work = Some(punched_at);
            }
            PunchType::BreakStart => {
                if let Some(start) = open_work.take() {
                    worked_minutes += diff_minutes(start, punched_at);
                }
                open_break = Some(punched_at);
            }
            PunchType::BreakEnd => {
                if let Some(start) = open_break.take() {
                    break_minutes += diff_minutes(start, punched_at);
                }
                open_work = Some(punched_at);
            }
            PunchType::Out => {
                if let Some(start) = open_work.take() {
                    worked_minutes += diff_minutes(start, punched_at);
                }
            }
        }
    }

    let complete = open_work.is_none() && open_break.is_none();
    (worked_minutes, break_minutes, complete)
}

/// Computes a day's figures. An illegal sequence contributes zero worked and
/// break minutes and counts as incomplete. Overtime and deficit are only
/// derived when the day resolves to OK, and never both non-zero.
pub fn compute(input: SummaryInput) -> SummaryFigures {
    let mut events = input.events;
    sequence::sort_events(&mut events);

    let (worked_minutes, break_minutes, complete) = match sequence::check_sorted(&events) {
        Ok(_) => accumulate(&events),
        Err(_) => (0, 0, false),
    };

    let expected_minutes = if input.is_holiday {
        0
    } else {
        input.policy_minutes.unwrap_or(0)
    };

    let status = resolve_status(
        input.policy_minutes.is_some(),
        input.has_pending_adjustment,
        complete,
        events.len(),
        expected_minutes,
    );

    let mut overtime_minutes = 0;
    let mut deficit_minutes = 0;
    if status == DailyAttendanceStatus::Ok {
        overtime_minutes = worked_minutes.saturating_sub(expected_minutes);
        deficit_minutes = expected_minutes.saturating_sub(worked_minutes);
    }

    SummaryFigures {
        expected_minutes,
        worked_minutes,
        break_minutes,
        overtime_minutes,
        deficit_minutes,
        status,
    }
}

/// First match wins.
fn resolve_status(
    has_policy: bool,
    has_pending_adjustment: bool,
    complete: bool,
    punch_count: usize,
    expected_minutes: u32,
) -> DailyAttendanceStatus {
    if !has_policy {
        return DailyAttendanceStatus::NoPolicy;
    }
    if has_pending_adjustment {
        return DailyAttendanceStatus::PendingAdjustment;
    }
    if punch_count == 0 && expected_minutes == 0 {
        // Nothing demanded, nothing punched: a holiday or a day off.
        return DailyAttendanceStatus::Ok;
    }
    if punch_count == 0 || !complete {
        return DailyAttendanceStatus::Incomplete;
    }
    DailyAttendanceStatus::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn input(events: Vec<PunchEvent>, policy_minutes: Option<u32>) -> SummaryInput {
        SummaryInput {
            events,
            policy_minutes,
            is_holiday: false,
            has_pending_adjustment: false,
        }
    }

    #[test]
    fn full_day_with_overtime() {
        // IN@08:00, OUT@17:00 against a 480-minute policy.
        let figures = compute(input(
            vec![(at(8, 0), PunchType::In), (at(17, 0), PunchType::Out)],
            Some(480),
        ));
        assert_eq!(figures.status, DailyAttendanceStatus::Ok);
        assert_eq!(figures.worked_minutes, 540);
        assert_eq!(figures.overtime_minutes, 60);
        assert_eq!(figures.deficit_minutes, 0);
    }

    #[test]
    fn open_shift_is_incomplete_with_no_deltas() {
        let figures = compute(input(vec![(at(8, 0), PunchType::In)], Some(480)));
        assert_eq!(figures.status, DailyAttendanceStatus::Incomplete);
        assert_eq!(figures.overtime_minutes, 0);
        assert_eq!(figures.deficit_minutes, 0);
    }

    #[test]
    fn break_splits_worked_time() {
        let figures = compute(input(
            vec![
                (at(8, 0), PunchType::In),
                (at(12, 0), PunchType::BreakStart),
                (at(13, 0), PunchType::BreakEnd),
                (at(17, 0), PunchType::Out),
            ],
            Some(480),
        ));
        assert_eq!(figures.worked_minutes, 480);
        assert_eq!(figures.break_minutes, 60);
        assert_eq!(figures.status, DailyAttendanceStatus::Ok);
        assert_eq!(figures.overtime_minutes, 0);
        assert_eq!(figures.deficit_minutes, 0);
    }

    #[test]
    fn short_day_yields_deficit() {
        let figures = compute(input(
            vec![(at(9, 0), PunchType::In), (at(15, 0), PunchType::Out)],
            Some(480),
        ));
        assert_eq!(figures.worked_minutes, 360);
        assert_eq!(figures.deficit_minutes, 120);
        assert_eq!(figures.overtime_minutes, 0);
    }

    #[test]
    fn no_policy_wins_over_everything() {
        let figures = compute(SummaryInput {
            events: vec![(at(8, 0), PunchType::In)],
            policy_minutes: None,
            is_holiday: true,
            has_pending_adjustment: true,
        });
        assert_eq!(figures.status, DailyAttendanceStatus::NoPolicy);
        assert_eq!(figures.expected_minutes, 0);
    }

    #[test]
    fn pending_adjustment_freezes_deltas() {
        let figures = compute(SummaryInput {
            events: vec![(at(8, 0), PunchType::In), (at(17, 0), PunchType::Out)],
            policy_minutes: Some(480),
            is_holiday: false,
            has_pending_adjustment: true,
        });
        assert_eq!(figures.status, DailyAttendanceStatus::PendingAdjustment);
        assert_eq!(figures.overtime_minutes, 0);
        assert_eq!(figures.deficit_minutes, 0);
    }

    #[test]
    fn empty_day_with_zero_expectation_is_ok() {
        // Holiday (or weekday with no template entry) and no punches.
        let figures = compute(SummaryInput {
            events: vec![],
            policy_minutes: Some(480),
            is_holiday: true,
            has_pending_adjustment: false,
        });
        assert_eq!(figures.status, DailyAttendanceStatus::Ok);
        assert_eq!(figures.expected_minutes, 0);
        assert_eq!(figures.overtime_minutes, 0);
        assert_eq!(figures.deficit_minutes, 0);
    }

    #[test]
    fn empty_working_day_is_incomplete() {
        let figures = compute(input(vec![], Some(480)));
        assert_eq!(figures.status, DailyAttendanceStatus::Incomplete);
    }

    #[test]
    fn illegal_sequence_zeroes_minutes() {
        let figures = compute(input(
            vec![(at(8, 0), PunchType::Out), (at(9, 0), PunchType::Out)],
            Some(480),
        ));
        assert_eq!(figures.status, DailyAttendanceStatus::Incomplete);
        assert_eq!(figures.worked_minutes, 0);
        assert_eq!(figures.break_minutes, 0);
    }

    #[test]
    fn sub_minute_remainder_is_floored() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(8, 0, 30)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let figures = compute(input(
            vec![(start, PunchType::In), (end, PunchType::Out)],
            None,
        ));
        assert_eq!(figures.worked_minutes, 59);
    }
}
