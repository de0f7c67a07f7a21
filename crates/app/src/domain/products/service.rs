//! Products service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::AdminCapability,
    database::Db,
    domain::products::{
        data::{NewProduct, NewReview, ProductFilter, ProductPage, ProductUpdate},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid, ReviewRecord},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

fn validate_prices(price: u64, original_price: Option<u64>) -> Result<(), ProductsServiceError> {
    i64::try_from(price)?;

    if let Some(original_price) = original_price {
        i64::try_from(original_price)?;
    }

    Ok(())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<ProductPage<ProductRecord>, ProductsServiceError> {
        let filter = filter.normalized();

        let mut tx = self.db.begin().await?;

        let total = self.repository.count_products(&mut tx, &filter).await?;
        let products = self.repository.list_products(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(ProductPage::new(products, total, &filter))
    }

    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    #[tracing::instrument(
        name = "products.service.create_product",
        skip(self, _admin, product),
        fields(product_uuid = %product.uuid, category = %product.category),
        err
    )]
    async fn create_product(
        &self,
        _admin: AdminCapability,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if product.name.trim().is_empty() {
            return Err(ProductsServiceError::MissingRequiredData);
        }

        validate_prices(product.price, product.original_price)?;

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, &product).await?;

        tx.commit().await?;

        info!(product_uuid = %created.uuid, "created product");

        Ok(created)
    }

    #[tracing::instrument(
        name = "products.service.update_product",
        skip(self, _admin, update),
        fields(product_uuid = %product),
        err
    )]
    async fn update_product(
        &self,
        _admin: AdminCapability,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(ProductsServiceError::MissingRequiredData);
        }

        validate_prices(update.price.unwrap_or_default(), update.original_price)?;

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, &update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    #[tracing::instrument(
        name = "products.service.delete_product",
        skip(self, _admin),
        fields(product_uuid = %product),
        err
    )]
    async fn delete_product(
        &self,
        _admin: AdminCapability,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted product");

        Ok(())
    }

    #[tracing::instrument(
        name = "products.service.add_review",
        skip(self, review),
        fields(product_uuid = %product, user_uuid = %review.user_uuid, rating = review.rating),
        err
    )]
    async fn add_review(
        &self,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if !(1..=5).contains(&review.rating) {
            return Err(ProductsServiceError::InvalidRating);
        }

        let mut tx = self.db.begin().await?;

        let mut record = self
            .repository
            .get_product_for_update(&mut tx, product)
            .await?;

        if record.has_review_from(review.user_uuid) {
            return Err(ProductsServiceError::AlreadyReviewed);
        }

        record.push_review(ReviewRecord {
            user_uuid: review.user_uuid,
            name: review.name,
            rating: review.rating,
            comment: review.comment,
            created_at: Timestamp::now(),
        });

        let updated = self.repository.set_reviews(&mut tx, &record).await?;

        tx.commit().await?;

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Filtered, sorted, paginated catalog listing.
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<ProductPage<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid) -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        admin: AdminCapability,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Partially update a product; absent fields keep their stored value.
    async fn update_product(
        &self,
        admin: AdminCapability,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-delete a product.
    async fn delete_product(
        &self,
        admin: AdminCapability,
        product: ProductUuid,
    ) -> Result<(), ProductsServiceError>;

    /// Add one review per user and re-derive the product rating.
    async fn add_review(
        &self,
        product: ProductUuid,
        review: NewReview,
    ) -> Result<ProductRecord, ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            products::{data::ProductSort, records::Category},
            users::records::UserUuid,
        },
        test::{
            TestContext,
            helpers::{admin_capability, create_product, new_product},
        },
    };

    use super::*;

    fn review(rating: u8) -> NewReview {
        NewReview {
            user_uuid: UserUuid::new(),
            name: "Ada".to_string(),
            rating,
            comment: "solid".to_string(),
        }
    }

    #[tokio::test]
    async fn create_product_returns_record() -> TestResult {
        let ctx = TestContext::new().await;

        let product = NewProduct {
            original_price: Some(120_00),
            ..new_product("Desk Lamp", 90_00, 4)
        };
        let uuid = product.uuid;

        let created = ctx
            .products
            .create_product(admin_capability(), product)
            .await?;

        assert_eq!(created.uuid, uuid);
        assert_eq!(created.price, 90_00);
        assert_eq!(created.stock, 4);
        assert!(created.in_stock);
        assert_eq!(created.discount_percentage(), 25);

        let fetched = ctx.products.get_product(uuid).await?;

        assert_eq!(fetched.name, "Desk Lamp");

        Ok(())
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let ctx = TestContext::new().await;

        let result = ctx
            .products
            .create_product(admin_capability(), new_product("  ", 1_00, 1))
            .await;

        assert!(matches!(
            result,
            Err(ProductsServiceError::MissingRequiredData)
        ));
    }

    #[tokio::test]
    async fn update_keeps_absent_fields_and_rederives_in_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Kettle", 25_00, 2).await?;

        let updated = ctx
            .products
            .update_product(
                admin_capability(),
                product.uuid,
                ProductUpdate {
                    stock: Some(0),
                    ..ProductUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.name, "Kettle");
        assert_eq!(updated.price, 25_00);
        assert_eq!(updated.stock, 0);
        assert!(!updated.in_stock);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_products_are_hidden() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Mug", 8_00, 10).await?;

        ctx.products
            .delete_product(admin_capability(), product.uuid)
            .await?;

        let result = ctx.products.get_product(product.uuid).await;

        assert!(matches!(result, Err(ProductsServiceError::NotFound)));

        let again = ctx
            .products
            .delete_product(admin_capability(), product.uuid)
            .await;

        assert!(matches!(again, Err(ProductsServiceError::NotFound)));

        Ok(())
    }

    #[tokio::test]
    async fn list_filters_sorts_and_paginates() -> TestResult {
        let ctx = TestContext::new().await;

        create_product(&ctx, "Cheap Cable", 5_00, 10).await?;
        create_product(&ctx, "Mid Cable", 15_00, 0).await?;
        create_product(&ctx, "Dear Cable", 50_00, 3).await?;
        create_product(&ctx, "Lamp", 30_00, 3).await?;

        let page = ctx
            .products
            .list_products(ProductFilter {
                search: Some("cable".to_string()),
                sort: ProductSort::PriceDesc,
                ..ProductFilter::default()
            })
            .await?;

        let names: Vec<&str> = page.products.iter().map(|p| p.name.as_str()).collect();

        assert_eq!(names, ["Dear Cable", "Mid Cable", "Cheap Cable"]);
        assert_eq!(page.total, 3);

        let page = ctx
            .products
            .list_products(ProductFilter {
                in_stock_only: true,
                min_price: Some(10_00),
                sort: ProductSort::PriceAsc,
                limit: 1,
                page: 2,
                ..ProductFilter::default()
            })
            .await?;

        assert_eq!(page.total, 2);
        assert_eq!(page.pages, 2);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].name, "Dear Cable");

        let page = ctx
            .products
            .list_products(ProductFilter {
                category: Some(Category::Books),
                ..ProductFilter::default()
            })
            .await?;

        assert_eq!(page.total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn reviews_are_one_per_user() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Chair", 70_00, 1).await?;

        let first = review(4);
        let reviewer = first.user_uuid;

        ctx.products.add_review(product.uuid, first).await?;
        let updated = ctx.products.add_review(product.uuid, review(2)).await?;

        assert_eq!(updated.num_reviews, 2);
        assert!((updated.rating - 3.0).abs() < f64::EPSILON);

        let duplicate = ctx
            .products
            .add_review(
                product.uuid,
                NewReview {
                    user_uuid: reviewer,
                    ..review(5)
                },
            )
            .await;

        assert!(matches!(
            duplicate,
            Err(ProductsServiceError::AlreadyReviewed)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let product = create_product(&ctx, "Stool", 20_00, 1).await?;

        for rating in [0, 6] {
            let result = ctx.products.add_review(product.uuid, review(rating)).await;

            assert!(matches!(result, Err(ProductsServiceError::InvalidRating)));
        }

        Ok(())
    }
}
