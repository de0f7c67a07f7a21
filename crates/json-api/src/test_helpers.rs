//! Test helpers.

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use emporium_app::{
    auth::{MockAuthService, Principal},
    context::AppContext,
    domain::{
        carts::MockCartsService,
        orders::MockOrdersService,
        products::MockProductsService,
        reports::MockReportsService,
        users::{
            MockUsersService,
            records::{Role, UserUuid},
        },
        wishlists::MockWishlistsService,
    },
    payments::webhook::WebhookVerifier,
};

use crate::state::State;

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

pub(crate) const TEST_ADMIN_UUID: UserUuid = UserUuid::from_uuid(Uuid::from_u128(1));

pub(crate) const TEST_WEBHOOK_SECRET: &[u8] = b"whsec_test";

pub(crate) const fn customer() -> Principal {
    Principal::new(TEST_USER_UUID, Role::User)
}

pub(crate) const fn admin() -> Principal {
    Principal::new(TEST_ADMIN_UUID, Role::Admin)
}

/// Service mocks; any call without an expectation fails the test.
#[derive(Default)]
pub(crate) struct Mocks {
    pub auth: MockAuthService,
    pub users: MockUsersService,
    pub products: MockProductsService,
    pub carts: MockCartsService,
    pub wishlists: MockWishlistsService,
    pub orders: MockOrdersService,
    pub reports: MockReportsService,
}

impl Mocks {
    pub(crate) fn into_state(self) -> Arc<State> {
        let app = AppContext {
            auth: Arc::new(self.auth),
            users: Arc::new(self.users),
            products: Arc::new(self.products),
            carts: Arc::new(self.carts),
            wishlists: Arc::new(self.wishlists),
            orders: Arc::new(self.orders),
            reports: Arc::new(self.reports),
        };

        #[expect(clippy::expect_used, reason = "the test secret is a non-empty constant")]
        let webhook =
            WebhookVerifier::new(TEST_WEBHOOK_SECRET).expect("test webhook secret is non-empty");

        State::shared(app, webhook)
    }
}

/// Route under test, called as `principal`.
pub(crate) fn service_as(principal: Principal, mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .hoop(inject(principal))
            .push(route),
    )
}

/// Route under test, called without authentication.
pub(crate) fn anonymous_service(mocks: Mocks, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(mocks.into_state()))
            .push(route),
    )
}

pub(crate) fn storage_error() -> sqlx::Error {
    sqlx::Error::PoolTimedOut
}
