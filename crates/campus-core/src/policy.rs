// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-record ownership rule.

use crate::error::{CoreError, CoreResult};
use crate::identity::{Identity, Role, UserId};

/// Decides whether an identity may read a student's records.
///
/// Applies identically to attendance and marks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordPolicy;

impl RecordPolicy {
    /// Permits staff for any student and students only for themselves.
    pub fn check(identity: &Identity, student_id: UserId) -> CoreResult<()> {
        match identity.role {
            Role::Teacher | Role::Admin => Ok(()),
            Role::Student if identity.id == student_id => Ok(()),
            Role::Student => Err(CoreError::forbidden("students may only view their own records")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PasswordVerifier;

    fn identity(id: UserId, role: Role) -> Identity {
        Identity {
            id,
            username: format!("user{}", id),
            display_name: None,
            password_verifier: PasswordVerifier::new("x"),
            role,
        }
    }

    #[test]
    fn test_student_owns_only_own_records() {
        let student = identity(42, Role::Student);
        assert!(RecordPolicy::check(&student, 42).is_ok());
        assert!(matches!(
            RecordPolicy::check(&student, 43),
            Err(CoreError::Forbidden { .. })
        ));
    }

    #[test]
    fn test_staff_bypass_ownership() {
        for role in Role::STAFF {
            let staff = identity(7, role);
            assert!(RecordPolicy::check(&staff, 42).is_ok());
            assert!(RecordPolicy::check(&staff, 7).is_ok());
        }
    }
}
