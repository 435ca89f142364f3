//! Authorization decisions.
//!
//! Evaluation is deny-first: a missing principal or any overlap with the
//! denied roles is a DENY, even when the same permission is also allowed.

use super::errors::AuthError;
use super::models::{AuthorizationPolicy, Decision, Principal};

pub fn decide(principal: Option<&Principal>, policy: &AuthorizationPolicy) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny;
    };
    let permissions = &principal.permissions;

    if let Some(denied) = &policy.denied_roles {
        if permissions.intersects(denied) {
            return Decision::Deny;
        }
    }

    match &policy.allowed_roles {
        None => Decision::Allow,
        Some(allowed) if permissions.intersects(allowed) => Decision::Allow,
        Some(_) => Decision::Deny,
    }
}

/// [`decide`], with DENY surfaced as [`AuthError::PermissionDenied`].
pub fn authorize(principal: Option<&Principal>, policy: &AuthorizationPolicy) -> Result<(), AuthError> {
    match decide(principal, policy) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AuthError::PermissionDenied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Permission, PermissionSet};
    use uuid::Uuid;

    fn principal(permissions: &[Permission]) -> Principal {
        let set = PermissionSet::new(permissions.iter().copied()).unwrap();
        let one_time = set.is_one_time_use();
        Principal::new(Uuid::new_v4(), set, one_time, Uuid::new_v4(), String::new())
    }

    #[test]
    fn test_no_principal_is_denied() {
        assert_eq!(decide(None, &AuthorizationPolicy::authenticated()), Decision::Deny);
    }

    #[test]
    fn test_deny_wins_over_allow() {
        let policy = AuthorizationPolicy::allow(&[Permission::Regular]).and_deny(&[Permission::Regular]);
        let p = principal(&[Permission::Regular]);
        assert_eq!(decide(Some(&p), &policy), Decision::Deny);
    }

    #[test]
    fn test_missing_allow_list_admits_any_principal() {
        let policy = AuthorizationPolicy::authenticated();
        for permission in Permission::ALL {
            let p = principal(&[permission]);
            assert_eq!(decide(Some(&p), &policy), Decision::Allow);
        }
    }

    #[test]
    fn test_denied_roles_only() {
        let policy = AuthorizationPolicy::deny(&[Permission::RecoverPassword, Permission::VerifyEmail]);

        assert_eq!(decide(Some(&principal(&[Permission::Regular])), &policy), Decision::Allow);
        assert_eq!(
            decide(
                Some(&principal(&[Permission::Regular, Permission::RequestEmailVerification])),
                &policy
            ),
            Decision::Allow
        );
        assert_eq!(decide(Some(&principal(&[Permission::VerifyEmail])), &policy), Decision::Deny);
        assert_eq!(
            decide(Some(&principal(&[Permission::RecoverPassword])), &policy),
            Decision::Deny
        );
    }

    #[test]
    fn test_allowed_roles_require_overlap() {
        let policy = AuthorizationPolicy::allow(&[Permission::Regular, Permission::RecoverPassword]);

        assert_eq!(decide(Some(&principal(&[Permission::Regular])), &policy), Decision::Allow);
        assert_eq!(
            decide(Some(&principal(&[Permission::RecoverPassword])), &policy),
            Decision::Allow
        );
        assert_eq!(decide(Some(&principal(&[Permission::VerifyEmail])), &policy), Decision::Deny);
        assert_eq!(
            decide(Some(&principal(&[Permission::RequestEmailVerification])), &policy),
            Decision::Deny
        );
    }

    #[test]
    fn test_pair_matches_on_either_member() {
        let policy = AuthorizationPolicy::allow(&[Permission::RequestEmailVerification]);
        let p = principal(&[Permission::Regular, Permission::RequestEmailVerification]);
        assert_eq!(decide(Some(&p), &policy), Decision::Allow);
    }

    #[test]
    fn test_authorize_maps_deny_to_forbidden() {
        let policy = AuthorizationPolicy::allow(&[Permission::VerifyEmail]);
        let err = authorize(Some(&principal(&[Permission::Regular])), &policy).unwrap_err();
        assert!(matches!(err, AuthError::PermissionDenied));
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }
}
