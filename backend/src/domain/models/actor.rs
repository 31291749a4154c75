use shared::{Actor, CounselorProfile, UserProfile};

/// Resolve the acting user from the directory. Unknown or blank uids have no actor.
pub fn resolve_actor(profiles: &[UserProfile], uid: &str) -> Option<Actor> {
    let uid = uid.trim();
    if uid.is_empty() {
        return None;
    }
    profiles
        .iter()
        .find(|profile| profile.uid == uid)
        .map(Actor::from_profile)
}

/// Counselors in directory order
pub fn counselor_directory(profiles: &[UserProfile]) -> Vec<CounselorProfile> {
    profiles
        .iter()
        .filter(|profile| profile.is_counselor)
        .map(CounselorProfile::from)
        .collect()
}
