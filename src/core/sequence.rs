use chrono::NaiveDateTime;
use derive_more::Display;

use crate::core::error::EngineError;
use crate::model::punch::{PunchType, TimePunch};

/// A punch reduced to what the shift grammar cares about.
pub type PunchEvent = (NaiveDateTime, PunchType);

/// Shift-grammar rule violations, one per illegal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SequenceRule {
    #[display(fmt = "IN cannot happen while a shift is open")]
    InWhileShiftOpen,
    #[display(fmt = "OUT requires an open shift")]
    OutWithoutShift,
    #[display(fmt = "OUT is not allowed while a break is open")]
    OutDuringBreak,
    #[display(fmt = "BREAK_START requires an open shift")]
    BreakStartWithoutShift,
    #[display(fmt = "BREAK_START while a break is already open")]
    BreakStartDuringBreak,
    #[display(fmt = "BREAK_END requires an open break")]
    BreakEndWithoutBreak,
}

/// Tie-break priority for punches sharing a timestamp.
fn type_priority(punch_type: PunchType) -> u8 {
    match punch_type {
        PunchType::In => 0,
        PunchType::BreakStart => 1,
        PunchType::BreakEnd => 2,
        PunchType::Out => 3,
    }
}

/// Sorts events by (punched_at asc, type priority), the canonical order the
/// validator and the calculator both walk.
pub fn sort_events(events: &mut [PunchEvent]) {
    events.sort_by_key(|&(at, punch_type)| (at, type_priority(punch_type)));
}

pub fn events_of(punches: &[TimePunch]) -> Vec<PunchEvent> {
    punches
        .iter()
        .map(|punch| (punch.punched_at, punch.punch_type))
        .collect()
}

/// Walks an already-sorted event list. Returns whether the day ends with no
/// open shift or break, or the first rule violated.
pub fn check_sorted(events: &[PunchEvent]) -> Result<bool, SequenceRule> {
    let mut inside_shift = false;
    let mut in_break = false;

    for &(_, punch_type) in events {
        match punch_type {
            PunchType::In => {
                if inside_shift {
                    return Err(SequenceRule::InWhileShiftOpen);
                }
                inside_shift = true;
                in_break = false;
            }
            PunchType::Out => {
                if !inside_shift {
                    return Err(SequenceRule::OutWithoutShift);
                }
                if in_break {
                    return Err(SequenceRule::OutDuringBreak);
                }
                inside_shift = false;
            }
            PunchType::BreakStart => {
                if !inside_shift {
                    return Err(SequenceRule::BreakStartWithoutShift);
                }
                if in_break {
                    return Err(SequenceRule::BreakStartDuringBreak);
                }
                in_break = true;
            }
            PunchType::BreakEnd => {
                if !in_break {
                    return Err(SequenceRule::BreakEndWithoutBreak);
                }
                in_break = false;
            }
        }
    }

    Ok(!inside_shift && !in_break)
}

/// Validates that a (possibly unsorted) set of events for one subject-day is
/// a legal alternating sequence. An empty set is legal; absence of punches
/// is the summary calculator's business, not a grammar error.
pub fn validate(mut events: Vec<PunchEvent>) -> Result<(), EngineError> {
    sort_events(&mut events);
    check_sorted(&events)
        .map(|_| ())
        .map_err(EngineError::InvalidSequence)
}
