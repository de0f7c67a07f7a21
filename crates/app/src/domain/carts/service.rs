//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        carts::{errors::CartsServiceError, records::CartRecord, repository::PgCartsRepository},
        products::{PgProductsRepository, records::ProductUuid},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    products_repository: PgProductsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.lock_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartRecord, CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.lock_cart(&mut tx, user).await?;

        let product = self
            .products_repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        cart.add_item(&product, quantity)?;

        let saved = self.carts_repository.save_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        info!(total_items = saved.total_items, "added item to cart");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "carts.service.update_quantity",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn update_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartRecord, CartsServiceError> {
        if quantity <= 0 {
            return self.remove_item(user, product).await;
        }

        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.lock_cart(&mut tx, user).await?;

        if cart.item(product).is_none() {
            return Err(CartsServiceError::ItemNotFound);
        }

        let live = self
            .products_repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(CartsServiceError::ProductNotFound)?;

        let quantity = u32::try_from(quantity).map_err(|_| CartsServiceError::InsufficientStock {
            available: live.stock,
        })?;

        cart.set_quantity(product, quantity, live.stock)?;

        let saved = self.carts_repository.save_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        Ok(saved)
    }

    #[tracing::instrument(
        name = "carts.service.remove_item",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.lock_cart(&mut tx, user).await?;

        cart.remove_item(product);

        let saved = self.carts_repository.save_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        Ok(saved)
    }

    #[tracing::instrument(
        name = "carts.service.clear_cart",
        skip(self),
        fields(user_uuid = %user),
        err
    )]
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self.carts_repository.lock_cart(&mut tx, user).await?;

        cart.clear();

        let saved = self.carts_repository.save_cart(&mut tx, &cart).await?;

        tx.commit().await?;

        Ok(saved)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Return the user's cart, creating an empty one on first access.
    async fn get_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;

    /// Add units of a product, merging with an existing line.
    async fn add_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Set a line's quantity; zero or less removes the line.
    async fn update_quantity(
        &self,
        user: UserUuid,
        product: ProductUuid,
        quantity: i64,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Remove a line if present.
    async fn remove_item(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<CartRecord, CartsServiceError>;

    /// Empty the cart.
    async fn clear_cart(&self, user: UserUuid) -> Result<CartRecord, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            products::{ProductsService, data::ProductUpdate},
            users::records::Role,
        },
        test::{
            TestContext,
            helpers::{admin_capability, create_product, create_user},
        },
    };

    use super::*;

    #[tokio::test]
    async fn get_cart_creates_empty_cart_once() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "cart@example.com", Role::User).await?;

        let first = ctx.carts.get_cart(user.uuid).await?;
        let second = ctx.carts.get_cart(user.uuid).await?;

        assert!(first.is_empty());
        assert_eq!(first.uuid, second.uuid);
        assert_eq!(first.total_price, 0);

        Ok(())
    }

    #[tokio::test]
    async fn add_item_merges_and_persists_totals() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "merge@example.com", Role::User).await?;
        let product = create_product(&ctx, "Speaker", 80_00, 5).await?;

        ctx.carts.add_item(user.uuid, product.uuid, 1).await?;
        ctx.carts.add_item(user.uuid, product.uuid, 2).await?;

        let cart = ctx.carts.get_cart(user.uuid).await?;

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_price, 240_00);

        Ok(())
    }

    #[tokio::test]
    async fn over_stock_add_fails_and_leaves_cart_unchanged() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "stock@example.com", Role::User).await?;
        let product = create_product(&ctx, "Speaker", 80_00, 2).await?;

        ctx.carts.add_item(user.uuid, product.uuid, 2).await?;

        let result = ctx.carts.add_item(user.uuid, product.uuid, 1).await;

        assert!(
            matches!(
                result,
                Err(CartsServiceError::InsufficientStock { available: 2 })
            ),
            "expected InsufficientStock, got {result:?}"
        );

        let cart = ctx.carts.get_cart(user.uuid).await?;

        assert_eq!(cart.total_items, 2);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "unknown@example.com", Role::User).await?;

        let result = ctx.carts.add_item(user.uuid, ProductUuid::new(), 1).await;

        assert!(matches!(result, Err(CartsServiceError::ProductNotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn price_edit_does_not_touch_snapshot() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "snap@example.com", Role::User).await?;
        let product = create_product(&ctx, "Speaker", 80_00, 5).await?;

        ctx.carts.add_item(user.uuid, product.uuid, 1).await?;

        ctx.products
            .update_product(
                admin_capability(),
                product.uuid,
                ProductUpdate {
                    price: Some(10_00),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        let cart = ctx.carts.get_cart(user.uuid).await?;

        assert_eq!(cart.items[0].price, 80_00);
        assert_eq!(cart.total_price, 80_00);

        Ok(())
    }

    #[tokio::test]
    async fn update_quantity_sets_bounds_and_removes() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "qty@example.com", Role::User).await?;
        let product = create_product(&ctx, "Speaker", 80_00, 4).await?;

        ctx.carts.add_item(user.uuid, product.uuid, 1).await?;

        let cart = ctx.carts.update_quantity(user.uuid, product.uuid, 4).await?;

        assert_eq!(cart.total_items, 4);
        assert_eq!(cart.total_price, 320_00);

        let result = ctx.carts.update_quantity(user.uuid, product.uuid, 5).await;

        assert!(matches!(
            result,
            Err(CartsServiceError::InsufficientStock { .. })
        ));

        let cart = ctx.carts.update_quantity(user.uuid, product.uuid, 0).await?;

        assert!(cart.is_empty());

        let result = ctx.carts.update_quantity(user.uuid, product.uuid, 1).await;

        assert!(matches!(result, Err(CartsServiceError::ItemNotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn clear_cart_zeroes_totals() -> TestResult {
        let ctx = TestContext::new().await;
        let user = create_user(&ctx, "clear@example.com", Role::User).await?;
        let product = create_product(&ctx, "Speaker", 80_00, 4).await?;

        ctx.carts.add_item(user.uuid, product.uuid, 2).await?;

        let cart = ctx.carts.clear_cart(user.uuid).await?;

        assert!(cart.is_empty());
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_price, 0);

        Ok(())
    }
}
