//! Products Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};

use crate::{
    database::{to_i64, try_get_u32, try_get_u64},
    domain::products::{
        data::{NewProduct, ProductFilter, ProductUpdate},
        records::{Category, ProductRecord, ProductUuid, ReviewRecord},
    },
};

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const COUNT_PRODUCTS_SQL: &str = include_str!("sql/count_products.sql");
const GET_PRODUCT_SQL: &str = include_str!("sql/get_product.sql");
const GET_PRODUCT_FOR_UPDATE_SQL: &str = include_str!("sql/get_product_for_update.sql");
const CREATE_PRODUCT_SQL: &str = include_str!("sql/create_product.sql");
const UPDATE_PRODUCT_SQL: &str = include_str!("sql/update_product.sql");
const DELETE_PRODUCT_SQL: &str = include_str!("sql/delete_product.sql");
const SET_REVIEWS_SQL: &str = include_str!("sql/set_reviews.sql");
const RESERVE_STOCK_SQL: &str = include_str!("sql/reserve_stock.sql");
const RELEASE_STOCK_SQL: &str = include_str!("sql/release_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgProductsRepository;

impl PgProductsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(LIST_PRODUCTS_SQL)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.brand.as_deref().map(str::trim))
            .bind(filter.search_pattern())
            .bind(filter.min_price.map(to_i64).transpose()?)
            .bind(filter.max_price.map(to_i64).transpose()?)
            .bind(filter.in_stock_only)
            .bind(filter.sort.as_str())
            .bind(i64::from(filter.limit))
            .bind(to_i64(filter.offset())?)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn count_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &ProductFilter,
    ) -> Result<u64, sqlx::Error> {
        let row = query(COUNT_PRODUCTS_SQL)
            .bind(filter.category.map(Category::as_str))
            .bind(filter.brand.as_deref().map(str::trim))
            .bind(filter.search_pattern())
            .bind(filter.min_price.map(to_i64).transpose()?)
            .bind(filter.max_price.map(to_i64).transpose()?)
            .bind(filter.in_stock_only)
            .fetch_one(&mut **tx)
            .await?;

        try_get_u64(&row, "total")
    }

    pub(crate) async fn get_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<Option<ProductRecord>, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_SQL)
            .bind(product.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn get_product_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(GET_PRODUCT_FOR_UPDATE_SQL)
            .bind(product.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &NewProduct,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(CREATE_PRODUCT_SQL)
            .bind(product.uuid.into_uuid())
            .bind(product.name.trim())
            .bind(&product.description)
            .bind(&product.image)
            .bind(product.brand.trim())
            .bind(product.category.as_str())
            .bind(to_i64(product.price)?)
            .bind(product.original_price.map(to_i64).transpose()?)
            .bind(to_i32(product.stock)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        update: &ProductUpdate,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(UPDATE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .bind(update.name.as_deref().map(str::trim))
            .bind(update.description.as_deref())
            .bind(update.image.as_deref())
            .bind(update.brand.as_deref().map(str::trim))
            .bind(update.category.map(Category::as_str))
            .bind(update.price.map(to_i64).transpose()?)
            .bind(update.original_price.map(to_i64).transpose()?)
            .bind(update.stock.map(to_i32).transpose()?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_product(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PRODUCT_SQL)
            .bind(product.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn set_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: &ProductRecord,
    ) -> Result<ProductRecord, sqlx::Error> {
        query_as::<Postgres, ProductRecord>(SET_REVIEWS_SQL)
            .bind(product.uuid.into_uuid())
            .bind(Json(&product.reviews))
            .bind(product.rating)
            .bind(to_i32(product.num_reviews)?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Take `quantity` units if, and only if, that many are on hand.
    ///
    /// Returns `false` when the product is missing, deleted, or short.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RESERVE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(to_i32(quantity)?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn release_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductUuid,
        quantity: u32,
    ) -> Result<(), sqlx::Error> {
        query(RELEASE_STOCK_SQL)
            .bind(product.into_uuid())
            .bind(to_i32(quantity)?)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

fn to_i32(value: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

fn try_get_category(row: &PgRow) -> Result<Category, sqlx::Error> {
    let category: String = row.try_get("category")?;

    category
        .parse::<Category>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: "category".to_string(),
            source: Box::new(e),
        })
}

impl<'r> FromRow<'r, PgRow> for ProductRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let original_price = row
            .try_get::<Option<i64>, _>("original_price")?
            .map(u64::try_from)
            .transpose()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "original_price".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: ProductUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            image: row.try_get("image")?,
            brand: row.try_get("brand")?,
            category: try_get_category(row)?,
            price: try_get_u64(row, "price")?,
            original_price,
            stock: try_get_u32(row, "stock")?,
            in_stock: row.try_get("in_stock")?,
            rating: row.try_get("rating")?,
            num_reviews: try_get_u32(row, "num_reviews")?,
            reviews: row.try_get::<Json<Vec<ReviewRecord>>, _>("reviews")?.0,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
