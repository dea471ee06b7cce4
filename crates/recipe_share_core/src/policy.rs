//! crates/recipe_share_core/src/policy.rs
//!
//! The ownership policy: a single reusable predicate deciding whether an
//! acting user may mutate a resource, instead of per-route owner
//! comparisons. Reads and review creation are not gated here.

use uuid::Uuid;

use crate::domain::{PublicUser, UserRole};

/// True iff `actor` owns the resource or holds the admin role.
pub fn can_mutate(actor: &PublicUser, owner_id: Uuid) -> bool {
    actor.id == owner_id || actor.role == UserRole::Admin
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: UserRole) -> PublicUser {
        PublicUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            bio: None,
            profile_picture: None,
            dietary_preferences: vec![],
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_may_mutate() {
        let actor = user(UserRole::User);
        assert!(can_mutate(&actor, actor.id));
    }

    #[test]
    fn stranger_may_not_mutate() {
        let actor = user(UserRole::User);
        assert!(!can_mutate(&actor, Uuid::new_v4()));
    }

    #[test]
    fn admin_may_mutate_anything() {
        let actor = user(UserRole::Admin);
        assert!(can_mutate(&actor, Uuid::new_v4()));
    }
}
