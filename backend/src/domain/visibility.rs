//! Role-scoped projection of the appointment collection.

use shared::{Actor, ActorRole, Appointment};

/// Appointments the actor is allowed to see, in source order.
///
/// Admins see everything, counselors see the appointments assigned to them and
/// everyone else sees only what they booked. Without an actor nothing is visible.
pub fn visible(appointments: &[Appointment], actor: Option<&Actor>) -> Vec<Appointment> {
    let Some(actor) = actor else {
        return Vec::new();
    };

    match actor.role {
        ActorRole::Admin => appointments.to_vec(),
        ActorRole::Counselor => appointments
            .iter()
            .filter(|appointment| appointment.counselor_id == actor.uid)
            .cloned()
            .collect(),
        ActorRole::User => appointments
            .iter()
            .filter(|appointment| appointment.requester_id == actor.uid)
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{actor, appointment};

    fn collection() -> Vec<Appointment> {
        vec![
            appointment("a1", "u1", "ana", "2024-03-15"),
            appointment("a2", "u2", "ana", "2024-03-16"),
            appointment("a3", "u2", "bruno", "2024-03-17"),
        ]
    }

    fn ids(appointments: &[Appointment]) -> Vec<&str> {
        appointments.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_regular_user_sees_own_appointments() {
        let user = actor("u1", ActorRole::User);
        assert_eq!(ids(&visible(&collection(), Some(&user))), vec!["a1"]);
    }

    #[test]
    fn test_admin_sees_everything_in_source_order() {
        let admin = actor("root", ActorRole::Admin);
        let all = visible(&collection(), Some(&admin));
        assert_eq!(ids(&all), vec!["a1", "a2", "a3"]);

        // Filtering again for the same admin changes nothing
        assert_eq!(visible(&all, Some(&admin)), all);
    }

    #[test]
    fn test_counselor_sees_assigned_appointments() {
        let counselor = actor("ana", ActorRole::Counselor);
        assert_eq!(ids(&visible(&collection(), Some(&counselor))), vec!["a1", "a2"]);
    }

    #[test]
    fn test_counselor_does_not_see_own_bookings_with_others() {
        // A counselor's view is keyed on assignment, not on who booked
        let counselor = actor("u2", ActorRole::Counselor);
        assert!(visible(&collection(), Some(&counselor)).is_empty());
    }

    #[test]
    fn test_no_actor_sees_nothing() {
        assert!(visible(&collection(), None).is_empty());
    }
}
