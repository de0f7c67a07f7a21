//! Test Helpers

use crate::{
    auth::{AdminCapability, Principal},
    domain::{
        orders::records::ShippingAddress,
        products::{
            ProductsService, ProductsServiceError,
            data::NewProduct,
            records::{Category, ProductRecord, ProductUuid},
        },
        users::{
            UsersService, UsersServiceError,
            data::NewUser,
            records::{Role, UserRecord, UserUuid},
        },
    },
    test::TestContext,
};

/// Capability for an admin principal that has no backing user row.
pub(crate) fn admin_capability() -> AdminCapability {
    Principal::new(UserUuid::new(), Role::Admin)
        .admin()
        .expect("admin principal yields a capability")
}

pub(crate) async fn create_user(
    ctx: &TestContext,
    email: &str,
    role: Role,
) -> Result<UserRecord, UsersServiceError> {
    ctx.users
        .create_user(NewUser {
            uuid: UserUuid::new(),
            name: "Test User".to_string(),
            email: email.to_string(),
            role,
        })
        .await
}

pub(crate) fn new_product(name: &str, price: u64, stock: u32) -> NewProduct {
    NewProduct {
        uuid: ProductUuid::new(),
        name: name.to_string(),
        description: format!("{name} description"),
        image: "https://example.com/product.png".to_string(),
        brand: "Acme".to_string(),
        category: Category::Electronics,
        price,
        original_price: None,
        stock,
    }
}

pub(crate) async fn create_product(
    ctx: &TestContext,
    name: &str,
    price: u64,
    stock: u32,
) -> Result<ProductRecord, ProductsServiceError> {
    ctx.products
        .create_product(admin_capability(), new_product(name, price, stock))
        .await
}

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Ada Lovelace".to_string(),
        address: "12 Analytical Row".to_string(),
        city: "London".to_string(),
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
        phone: "+44 20 7946 0000".to_string(),
    }
}
