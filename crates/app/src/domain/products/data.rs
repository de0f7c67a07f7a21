//! Products Data

use crate::domain::{
    products::records::{Category, ProductUuid},
    users::records::UserUuid,
};

/// Default page size for catalog listings.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest page size a catalog listing may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub description: String,
    pub image: String,
    pub brand: String,
    pub category: Category,
    pub price: u64,
    pub original_price: Option<u64>,
    pub stock: u32,
}

/// Partial product update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub brand: Option<String>,
    pub category: Option<Category>,
    pub price: Option<u64>,
    pub original_price: Option<u64>,
    pub stock: Option<u32>,
}

/// New Review Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub user_uuid: UserUuid,
    pub name: String,
    pub rating: u8,
    pub comment: String,
}

/// Catalog listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Rating,
}

impl ProductSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
        }
    }
}

/// Catalog listing filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub search: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub in_stock_only: bool,
    pub sort: ProductSort,
    pub page: u32,
    pub limit: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            brand: None,
            search: None,
            min_price: None,
            max_price: None,
            in_stock_only: false,
            sort: ProductSort::Newest,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ProductFilter {
    /// Clamp paging into range.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self.brand = self.brand.filter(|brand| !brand.trim().is_empty());
        self.search = self.search.filter(|search| !search.trim().is_empty());
        self
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// `ILIKE` pattern for the free-text search, with wildcards escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|search| {
            let mut pattern = String::with_capacity(search.len() + 2);

            pattern.push('%');

            for ch in search.trim().chars() {
                if matches!(ch, '%' | '_' | '\\') {
                    pattern.push('\\');
                }

                pattern.push(ch);
            }

            pattern.push('%');
            pattern
        })
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct ProductPage<T> {
    pub products: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
}

impl<T> ProductPage<T> {
    #[must_use]
    pub fn new(products: Vec<T>, total: u64, filter: &ProductFilter) -> Self {
        Self {
            products,
            total,
            page: filter.page,
            pages: total.div_ceil(u64::from(filter.limit.max(1))),
            limit: filter.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_paging() {
        let filter = ProductFilter {
            page: 0,
            limit: 500,
            ..ProductFilter::default()
        }
        .normalized();

        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, MAX_PAGE_SIZE);

        let filter = ProductFilter {
            limit: 0,
            ..ProductFilter::default()
        }
        .normalized();

        assert_eq!(filter.limit, 1);
    }

    #[test]
    fn offset_follows_page() {
        let filter = ProductFilter {
            page: 3,
            limit: 12,
            ..ProductFilter::default()
        };

        assert_eq!(filter.offset(), 24);
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        let filter = ProductFilter {
            search: Some(" 50%_off\\ ".to_string()),
            ..ProductFilter::default()
        };

        assert_eq!(filter.search_pattern().as_deref(), Some("%50\\%\\_off\\\\%"));
    }

    #[test]
    fn blank_search_is_dropped() {
        let filter = ProductFilter {
            search: Some("   ".to_string()),
            ..ProductFilter::default()
        }
        .normalized();

        assert_eq!(filter.search_pattern(), None);
    }

    #[test]
    fn page_count_rounds_up() {
        let filter = ProductFilter::default();
        let page = ProductPage::<()>::new(Vec::new(), 25, &filter);

        assert_eq!(page.pages, 3);
        assert_eq!(ProductPage::<()>::new(Vec::new(), 0, &filter).pages, 0);
    }
}
