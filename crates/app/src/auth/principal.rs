//! Authenticated request principals.

use crate::domain::users::records::{Role, UserUuid};

/// The user a request acts on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_uuid: UserUuid,
    pub role: Role,
}

impl Principal {
    #[must_use]
    pub const fn new(user_uuid: UserUuid, role: Role) -> Self {
        Self { user_uuid, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Obtain admin rights, if this principal holds the admin role.
    #[must_use]
    pub const fn admin(&self) -> Option<AdminCapability> {
        if self.is_admin() {
            Some(AdminCapability {
                user_uuid: self.user_uuid,
            })
        } else {
            None
        }
    }

    /// Whether this principal may act on a resource owned by `owner`.
    #[must_use]
    pub fn can_access(&self, owner: UserUuid) -> bool {
        self.is_admin() || self.user_uuid == owner
    }
}

/// Proof that the caller was authenticated as an administrator.
///
/// Only [`Principal::admin`] constructs this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCapability {
    user_uuid: UserUuid,
}

impl AdminCapability {
    #[must_use]
    pub const fn user_uuid(&self) -> UserUuid {
        self.user_uuid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_obtain_capability() {
        let user = Principal::new(UserUuid::new(), Role::User);
        let admin = Principal::new(UserUuid::new(), Role::Admin);

        assert!(user.admin().is_none());
        assert_eq!(
            admin.admin().map(|capability| capability.user_uuid()),
            Some(admin.user_uuid)
        );
    }

    #[test]
    fn owners_and_admins_can_access() {
        let owner = UserUuid::new();

        assert!(Principal::new(owner, Role::User).can_access(owner));
        assert!(!Principal::new(UserUuid::new(), Role::User).can_access(owner));
        assert!(Principal::new(UserUuid::new(), Role::Admin).can_access(owner));
    }
}
