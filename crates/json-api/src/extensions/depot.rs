//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use emporium_app::auth::{AdminCapability, Principal};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_principal(&mut self, principal: Principal);

    /// The authenticated caller.
    fn principal_or_401(&self) -> Result<Principal, StatusError>;

    /// Admin rights for the authenticated caller.
    fn admin_or_403(&self) -> Result<AdminCapability, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_principal(&mut self, principal: Principal) {
        self.inject(principal);
    }

    fn principal_or_401(&self) -> Result<Principal, StatusError> {
        self.obtain::<Principal>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Not authorized, no token"))
    }

    fn admin_or_403(&self) -> Result<AdminCapability, StatusError> {
        self.principal_or_401()?
            .admin()
            .ok_or_else(|| StatusError::forbidden().brief("Not authorized as an admin"))
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use emporium_app::domain::users::records::{Role, UserUuid};

    use super::*;

    #[test]
    fn missing_principal_is_unauthorized() {
        let depot = Depot::new();

        let status = depot.principal_or_401().err().map(|error| error.code);

        assert_eq!(status, Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn customers_are_forbidden_from_admin_rights() {
        let mut depot = Depot::new();

        depot.insert_principal(Principal::new(UserUuid::new(), Role::User));

        let status = depot.admin_or_403().err().map(|error| error.code);

        assert_eq!(status, Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn admins_obtain_capability() {
        let mut depot = Depot::new();
        let admin = UserUuid::new();

        depot.insert_principal(Principal::new(admin, Role::Admin));

        let capability = depot.admin_or_403().ok().map(|capability| capability.user_uuid());

        assert_eq!(capability, Some(admin));
    }
}
