//! Product Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Fashion,
    Home,
    Beauty,
    Sports,
    Books,
    Toys,
    Grocery,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Electronics,
        Self::Fashion,
        Self::Home,
        Self::Beauty,
        Self::Sports,
        Self::Books,
        Self::Toys,
        Self::Grocery,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Fashion => "fashion",
            Self::Home => "home",
            Self::Beauty => "beauty",
            Self::Sports => "sports",
            Self::Books => "books",
            Self::Toys => "toys",
            Self::Grocery => "grocery",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown category \"{0}\"")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| ParseCategoryError(value.to_string()))
    }
}

/// Review embedded in a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub user_uuid: UserUuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Timestamp,
}

/// Product Record
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub brand: String,
    pub category: Category,
    pub price: u64,
    pub original_price: Option<u64>,
    pub stock: u32,
    pub in_stock: bool,
    pub rating: f64,
    pub num_reviews: u32,
    pub reviews: Vec<ReviewRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ProductRecord {
    /// Whole-percent markdown from `original_price`, rounded half up.
    #[must_use]
    pub fn discount_percentage(&self) -> u64 {
        match self.original_price {
            Some(original) if original > self.price => {
                let saved = u128::from(original - self.price);
                let original = u128::from(original);

                u64::try_from((saved * 200 + original) / (original * 2)).unwrap_or(100)
            }
            _ => 0,
        }
    }

    #[must_use]
    pub fn has_review_from(&self, user: UserUuid) -> bool {
        self.reviews.iter().any(|review| review.user_uuid == user)
    }

    /// Append a review and re-derive `rating` and `num_reviews`.
    pub fn push_review(&mut self, review: ReviewRecord) {
        self.reviews.push(review);

        let total: u32 = self.reviews.iter().map(|r| u32::from(r.rating)).sum();
        let count = u32::try_from(self.reviews.len()).unwrap_or(u32::MAX);

        self.num_reviews = count;
        self.rating = f64::from(total) / f64::from(count.max(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: u64, original_price: Option<u64>) -> ProductRecord {
        let now = Timestamp::now();

        ProductRecord {
            uuid: ProductUuid::new(),
            name: "Lamp".to_string(),
            description: String::new(),
            image: String::new(),
            brand: "Lumen".to_string(),
            category: Category::Home,
            price,
            original_price,
            stock: 3,
            in_stock: true,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn review(rating: u8) -> ReviewRecord {
        ReviewRecord {
            user_uuid: UserUuid::new(),
            name: "Ada".to_string(),
            rating,
            comment: "fine".to_string(),
            created_at: Timestamp::now(),
        }
    }

    #[test]
    fn discount_is_rounded_percentage() {
        assert_eq!(product(75_00, Some(100_00)).discount_percentage(), 25);
        assert_eq!(product(66_67, Some(100_00)).discount_percentage(), 33);
        assert_eq!(product(2_00, Some(3_00)).discount_percentage(), 33);
        assert_eq!(product(1_00, Some(3_00)).discount_percentage(), 67);
    }

    #[test]
    fn no_discount_without_markdown() {
        assert_eq!(product(10_00, None).discount_percentage(), 0);
        assert_eq!(product(10_00, Some(10_00)).discount_percentage(), 0);
        assert_eq!(product(12_00, Some(10_00)).discount_percentage(), 0);
    }

    #[test]
    fn reviews_rederive_rating() {
        let mut product = product(10_00, None);

        product.push_review(review(5));
        product.push_review(review(2));

        assert_eq!(product.num_reviews, 2);
        assert!((product.rating - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().ok(), Some(category));
        }

        assert!("garden".parse::<Category>().is_err());
    }
}
