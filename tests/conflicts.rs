#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::scheduler::conflicts;
use roulement::{
    check_availability, flag_conflicts, Assignment, Availability, CalendarDay, Schedule,
    ShiftKind, StaffId, StaffMember, UnavailabilityReason,
};

#[test]
fn oracle_reports_reason() {
    let leave = date(2024, 6, 12);
    let member = StaffMember::with_id("a", "A")
        .unavailable_on(leave)
        .never_on_weekday(0);

    assert_eq!(
        check_availability(&member, &CalendarDay::from_date(leave)),
        Availability::Unavailable(UnavailabilityReason::ExplicitDateLeave)
    );
    assert_eq!(
        check_availability(&member, &CalendarDay::from_date(date(2024, 6, 2))),
        Availability::Unavailable(UnavailabilityReason::WeekdayBlackout)
    );
    assert!(check_availability(&member, &CalendarDay::from_date(date(2024, 6, 3))).is_available());
}

#[test]
fn date_leave_wins_over_weekday_blackout() {
    let sunday = date(2024, 6, 2);
    let member = StaffMember::with_id("a", "A")
        .unavailable_on(sunday)
        .never_on_weekday(0);
    assert_eq!(
        check_availability(&member, &CalendarDay::from_date(sunday)),
        Availability::Unavailable(UnavailabilityReason::ExplicitDateLeave)
    );
}

#[test]
fn preferred_days_never_block() {
    let member = StaffMember::with_id("a", "A").prefers_day(5);
    assert!(check_availability(&member, &CalendarDay::from_date(date(2024, 6, 6))).is_available());
}

#[test]
fn working_shift_on_unavailable_day_is_flagged() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    s.insert(&id("a"), date(2024, 6, 2), working(ShiftKind::Night));
    s.insert(&id("a"), date(2024, 6, 3), working(ShiftKind::Morning));
    s.insert(&id("b"), date(2024, 6, 12), working(ShiftKind::Afternoon));

    assert_eq!(flag_conflicts(&mut s, &roster), 2);

    let sunday = s.get(&id("a"), date(2024, 6, 2)).unwrap();
    assert!(sunday.conflict);
    assert_eq!(sunday.conflict_reason, Some(UnavailabilityReason::WeekdayBlackout));
    assert!(!s.get(&id("a"), date(2024, 6, 3)).unwrap().conflict);

    let found = conflicts(&s);
    assert_eq!(found.len(), 2);
    assert_eq!(found[1].staff, id("b"));
    assert_eq!(found[1].reason, UnavailabilityReason::ExplicitDateLeave);
}

#[test]
fn flagging_only_annotates() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    s.insert(&id("a"), date(2024, 6, 2), working(ShiftKind::Night));
    s.insert(&id("b"), date(2024, 6, 4), working(ShiftKind::Morning));
    let before = s.clone();

    flag_conflicts(&mut s, &roster);
    assert_eq!(s.len(), before.len());
    for ((sa, da, a), (sb, db, b)) in s.assignments().zip(before.assignments()) {
        assert_eq!((sa, da, a.kind, &a.zone), (sb, db, b.kind, &b.zone));
    }
}

#[test]
fn flagging_is_idempotent() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    s.insert(&id("a"), date(2024, 6, 9), working(ShiftKind::Morning));
    s.insert(&id("b"), date(2024, 6, 12), working(ShiftKind::Night));

    flag_conflicts(&mut s, &roster);
    let once = s.clone();
    flag_conflicts(&mut s, &roster);
    assert_eq!(s, once);
}

#[test]
fn stale_flag_is_cleared_when_day_is_available() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    let mut cell = working(ShiftKind::Morning);
    cell.conflict = true;
    cell.conflict_reason = Some(UnavailabilityReason::ExplicitDateLeave);
    s.insert(&id("b"), date(2024, 6, 4), cell);

    assert_eq!(flag_conflicts(&mut s, &roster), 0);
    let cell = s.get(&id("b"), date(2024, 6, 4)).unwrap();
    assert!(!cell.conflict);
    assert_eq!(cell.conflict_reason, None);
}

#[test]
fn rest_days_on_leave_are_not_conflicts() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    s.insert(&id("b"), date(2024, 6, 12), Assignment::new(ShiftKind::Leave, None));
    s.insert(&id("a"), date(2024, 6, 2), Assignment::new(ShiftKind::Off, None));
    assert_eq!(flag_conflicts(&mut s, &roster), 0);
}

#[test]
fn staff_outside_roster_is_left_alone() {
    let roster = roster();
    let mut s = Schedule::for_roster(&roster);
    let mut cell = working(ShiftKind::Morning);
    cell.conflict = true;
    s.insert(&id("ghost"), date(2024, 6, 2), cell.clone());

    assert_eq!(flag_conflicts(&mut s, &roster), 0);
    assert_eq!(s.get(&id("ghost"), date(2024, 6, 2)), Some(&cell));
}

fn roster() -> Vec<StaffMember> {
    vec![
        StaffMember::with_id("a", "A").never_on_weekday(0),
        StaffMember::with_id("b", "B").unavailable_on(date(2024, 6, 12)),
    ]
}

fn working(kind: ShiftKind) -> Assignment {
    Assignment::new(kind, Some("ER Zone".into()))
}

fn id(s: &str) -> StaffId {
    StaffId::new(s)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
