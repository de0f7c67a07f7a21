//! Wishlists service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        products::{PgProductsRepository, records::{ProductRecord, ProductUuid}},
        users::records::UserUuid,
        wishlists::{errors::WishlistsServiceError, repository::PgWishlistsRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgWishlistsService {
    db: Db,
    repository: PgWishlistsRepository,
    products_repository: PgProductsRepository,
}

impl PgWishlistsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgWishlistsRepository::new(),
            products_repository: PgProductsRepository::new(),
        }
    }
}

#[async_trait]
impl WishlistsService for PgWishlistsService {
    async fn list(&self, user: UserUuid) -> Result<Vec<ProductRecord>, WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list(&mut tx, user).await?;

        tx.commit().await?;

        Ok(products)
    }

    #[tracing::instrument(
        name = "wishlists.service.add",
        skip(self),
        fields(user_uuid = %user, product_uuid = %product),
        err
    )]
    async fn add(&self, user: UserUuid, product: ProductUuid) -> Result<(), WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        self.products_repository
            .find_product(&mut tx, product)
            .await?
            .ok_or(WishlistsServiceError::ProductNotFound)?;

        self.repository.add(&mut tx, user, product).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn remove(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<(), WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.remove(&mut tx, user, product).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn contains(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let present = self.repository.contains(&mut tx, user, product).await?;

        tx.commit().await?;

        Ok(present)
    }

    async fn clear(&self, user: UserUuid) -> Result<(), WishlistsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.clear(&mut tx, user).await?;

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait WishlistsService: Send + Sync {
    /// Live products on the user's wishlist; deleted products are skipped.
    async fn list(&self, user: UserUuid) -> Result<Vec<ProductRecord>, WishlistsServiceError>;

    /// Add a product; a no-op when already present.
    async fn add(&self, user: UserUuid, product: ProductUuid) -> Result<(), WishlistsServiceError>;

    /// Remove a product; a no-op when absent.
    async fn remove(&self, user: UserUuid, product: ProductUuid)
    -> Result<(), WishlistsServiceError>;

    async fn contains(
        &self,
        user: UserUuid,
        product: ProductUuid,
    ) -> Result<bool, WishlistsServiceError>;

    async fn clear(&self, user: UserUuid) -> Result<(), WishlistsServiceError>;
}
