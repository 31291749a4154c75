//! Gate that every booking proposal passes before it reaches the store.

use chrono::NaiveDate;
use log::debug;
use shared::Actor;
use std::collections::BTreeSet;

use crate::domain::models::{BookingError, BookingProposal};

/// Check a proposal against the booked dates of its counselor.
///
/// Checks run in a fixed order and stop at the first failure: signed-in
/// actor, counselor selected, date and time present, date still free.
pub fn validate(
    actor: Option<&Actor>,
    proposal: &BookingProposal,
    booked_dates: &BTreeSet<NaiveDate>,
) -> Result<(), BookingError> {
    if actor.is_none() {
        return Err(BookingError::NotAuthenticated);
    }

    if proposal.counselor_id.trim().is_empty() {
        return Err(BookingError::NoCounselorSelected);
    }

    let (Some(date), Some(_time)) = (proposal.date, proposal.time) else {
        return Err(BookingError::MissingSchedule);
    };

    if booked_dates.contains(&date) {
        debug!("Rejecting proposal: {} already booked for {}", date, proposal.counselor_id);
        return Err(BookingError::DateAlreadyBooked {
            counselor_id: proposal.counselor_id.clone(),
            date,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::availability::booked_dates;
    use crate::domain::test_support::{actor, appointment, date, time};
    use shared::ActorRole;

    fn proposal(counselor_id: &str, day: Option<&str>, at: Option<&str>) -> BookingProposal {
        BookingProposal {
            counselor_id: counselor_id.to_string(),
            date: day.map(date),
            time: at.map(time),
            reason: "Orientation".to_string(),
        }
    }

    #[test]
    fn test_rejections_follow_check_order() {
        let user = actor("u1", ActorRole::User);
        let booked: BTreeSet<NaiveDate> = [date("2024-03-15")].into_iter().collect();

        // Nothing filled in and signed out: authentication wins
        assert_eq!(
            validate(None, &proposal("", None, None), &booked),
            Err(BookingError::NotAuthenticated)
        );
        assert_eq!(
            validate(Some(&user), &proposal("  ", None, None), &booked),
            Err(BookingError::NoCounselorSelected)
        );
        assert_eq!(
            validate(Some(&user), &proposal("ana", Some("2024-03-15"), None), &booked),
            Err(BookingError::MissingSchedule)
        );
        assert_eq!(
            validate(Some(&user), &proposal("ana", None, Some("09:00")), &booked),
            Err(BookingError::MissingSchedule)
        );
    }

    #[test]
    fn test_rejects_exactly_booked_dates() {
        let user = actor("u1", ActorRole::User);
        let booked: BTreeSet<NaiveDate> = [date("2024-03-15"), date("2024-03-18")].into_iter().collect();

        for day in ["2024-03-14", "2024-03-15", "2024-03-16", "2024-03-18", "2025-03-15"] {
            let result = validate(Some(&user), &proposal("ana", Some(day), Some("09:00")), &booked);
            if booked.contains(&date(day)) {
                assert!(matches!(result, Err(BookingError::DateAlreadyBooked { .. })), "{}", day);
            } else {
                assert_eq!(result, Ok(()), "{}", day);
            }
        }
    }

    #[test]
    fn test_same_date_is_free_for_another_counselor() {
        let user = actor("u9", ActorRole::User);
        let appointments = vec![appointment("a1", "u1", "ana", "2024-03-15")];

        let for_ana = validate(
            Some(&user),
            &proposal("ana", Some("2024-03-15"), Some("10:00")),
            &booked_dates(&appointments, "ana"),
        );
        assert_eq!(
            for_ana,
            Err(BookingError::DateAlreadyBooked {
                counselor_id: "ana".to_string(),
                date: date("2024-03-15"),
            })
        );

        let for_bruno = validate(
            Some(&user),
            &proposal("bruno", Some("2024-03-15"), Some("10:00")),
            &booked_dates(&appointments, "bruno"),
        );
        assert_eq!(for_bruno, Ok(()));
    }

    #[test]
    fn test_empty_reason_is_accepted() {
        let user = actor("u1", ActorRole::User);
        let mut empty_reason = proposal("ana", Some("2024-03-20"), Some("09:00"));
        empty_reason.reason.clear();
        assert_eq!(validate(Some(&user), &empty_reason, &BTreeSet::new()), Ok(()));
    }
}
