//! App Router

use salvo::Router;

use crate::{
    admin, auth, carts, healthcheck, observability::metrics_handler, orders, payments, products,
    wishlists,
};

/// Every API route. Only the healthcheck, metrics, registration, login and the
/// payment webhook are reachable without a bearer token.
pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("metrics").get(metrics_handler))
        .push(Router::with_path("auth/register").post(auth::register::handler))
        .push(Router::with_path("auth/login").post(auth::login::handler))
        .push(Router::with_path("payments/webhook").post(payments::webhook::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(auth_router())
                .push(products_router())
                .push(cart_router())
                .push(wishlist_router())
                .push(orders_router())
                .push(admin_router()),
        )
}

fn auth_router() -> Router {
    Router::with_path("auth")
        .push(Router::with_path("me").get(auth::me::handler))
        .push(
            Router::with_path("tokens")
                .get(auth::tokens::index::handler)
                .post(auth::tokens::create::handler)
                .push(Router::with_path("{token}").delete(auth::tokens::delete::handler)),
        )
}

fn products_router() -> Router {
    Router::with_path("products")
        .get(products::index::handler)
        .post(products::create::handler)
        .push(Router::with_path("categories").get(products::categories::handler))
        .push(
            Router::with_path("{product}")
                .get(products::get::handler)
                .put(products::update::handler)
                .delete(products::delete::handler)
                .push(Router::with_path("reviews").post(products::reviews::handler)),
        )
}

fn cart_router() -> Router {
    Router::with_path("cart")
        .get(carts::get::handler)
        .delete(carts::delete::handler)
        .push(
            Router::with_path("items")
                .post(carts::items::create::handler)
                .push(
                    Router::with_path("{product}")
                        .put(carts::items::update::handler)
                        .delete(carts::items::delete::handler),
                ),
        )
}

fn wishlist_router() -> Router {
    Router::with_path("wishlist")
        .get(wishlists::index::handler)
        .delete(wishlists::clear::handler)
        .push(
            Router::with_path("items")
                .post(wishlists::create::handler)
                .push(
                    Router::with_path("{product}")
                        .get(wishlists::contains::handler)
                        .delete(wishlists::delete::handler),
                ),
        )
}

fn orders_router() -> Router {
    Router::with_path("orders")
        .get(orders::index::handler)
        .post(orders::create::handler)
        .push(
            Router::with_path("{order}")
                .get(orders::get::handler)
                .push(Router::with_path("pay").put(orders::pay::handler))
                .push(Router::with_path("status").put(orders::status::handler)),
        )
}

fn admin_router() -> Router {
    Router::with_path("admin")
        .push(Router::with_path("dashboard").get(admin::dashboard::handler))
        .push(Router::with_path("users").get(admin::users::handler))
        .push(Router::with_path("orders").get(admin::orders::handler))
}
