use super::{Availability, UnavailabilityReason};
use crate::calendar::CalendarDay;
use crate::model::StaffMember;

/// La personne peut-elle prendre une garde ce jour-là ?
///
/// Les congés datés priment sur les jours de semaine exclus. Les jours
/// préférés (`preferred_days`) ne sont jamais consultés.
pub fn check_availability(staff: &StaffMember, day: &CalendarDay) -> Availability {
    if staff.unavailable_dates.contains(&day.date) {
        return Availability::Unavailable(UnavailabilityReason::ExplicitDateLeave);
    }
    if staff.unavailable_weekdays.contains(&day.weekday) {
        return Availability::Unavailable(UnavailabilityReason::WeekdayBlackout);
    }
    Availability::Available
}

pub fn is_available(staff: &StaffMember, day: &CalendarDay) -> bool {
    check_availability(staff, day).is_available()
}
