//! Cart Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        carts::errors::CartsServiceError,
        products::records::{ProductRecord, ProductUuid},
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart line holding the product snapshot taken when it was first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub product_uuid: ProductUuid,
    pub name: String,
    pub image: String,
    pub price: u64,
    pub quantity: u32,
}

impl CartItemRecord {
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub items: Vec<CartItemRecord>,
    pub total_price: u64,
    pub total_items: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartRecord {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn item(&self, product: ProductUuid) -> Option<&CartItemRecord> {
        self.items.iter().find(|item| item.product_uuid == product)
    }

    /// Add `quantity` units of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Fails when the quantity is zero, the product is out of stock, or the
    /// resulting line would exceed the product's stock. The cart is unchanged
    /// on error.
    pub fn add_item(
        &mut self,
        product: &ProductRecord,
        quantity: u32,
    ) -> Result<(), CartsServiceError> {
        if quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        if !product.in_stock {
            return Err(CartsServiceError::OutOfStock);
        }

        let existing = self.item(product.uuid).map_or(0, |item| item.quantity);

        let wanted = existing
            .checked_add(quantity)
            .filter(|wanted| *wanted <= product.stock)
            .ok_or(CartsServiceError::InsufficientStock {
                available: product.stock,
            })?;

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product_uuid == product.uuid)
        {
            item.quantity = wanted;
        } else {
            self.items.push(CartItemRecord {
                product_uuid: product.uuid,
                name: product.name.clone(),
                image: product.image.clone(),
                price: product.price,
                quantity: wanted,
            });
        }

        self.recompute_totals();

        Ok(())
    }

    /// Set an existing line's quantity, bounded by `stock`.
    ///
    /// # Errors
    ///
    /// Fails when the line is absent or `quantity` exceeds `stock`.
    pub fn set_quantity(
        &mut self,
        product: ProductUuid,
        quantity: u32,
        stock: u32,
    ) -> Result<(), CartsServiceError> {
        if quantity == 0 {
            self.remove_item(product);
            return Ok(());
        }

        if quantity > stock {
            return Err(CartsServiceError::InsufficientStock { available: stock });
        }

        let item = self
            .items
            .iter_mut()
            .find(|item| item.product_uuid == product)
            .ok_or(CartsServiceError::ItemNotFound)?;

        item.quantity = quantity;

        self.recompute_totals();

        Ok(())
    }

    pub fn remove_item(&mut self, product: ProductUuid) {
        self.items.retain(|item| item.product_uuid != product);
        self.recompute_totals();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }

    fn recompute_totals(&mut self) {
        self.total_price = self
            .items
            .iter()
            .map(CartItemRecord::line_total)
            .fold(0, u64::saturating_add);

        self.total_items = self.items.iter().map(|item| u64::from(item.quantity)).sum();
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::products::records::Category;

    use super::*;

    fn cart() -> CartRecord {
        let now = Timestamp::now();

        CartRecord {
            uuid: CartUuid::new(),
            user_uuid: UserUuid::new(),
            items: Vec::new(),
            total_price: 0,
            total_items: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn product(price: u64, stock: u32) -> ProductRecord {
        let now = Timestamp::now();

        ProductRecord {
            uuid: ProductUuid::new(),
            name: "Headphones".to_string(),
            description: String::new(),
            image: "headphones.png".to_string(),
            brand: "Sono".to_string(),
            category: Category::Electronics,
            price,
            original_price: None,
            stock,
            in_stock: stock > 0,
            rating: 0.0,
            num_reviews: 0,
            reviews: Vec::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn assert_totals(cart: &CartRecord) {
        let price: u64 = cart.items.iter().map(|i| i.price * u64::from(i.quantity)).sum();
        let items: u64 = cart.items.iter().map(|i| u64::from(i.quantity)).sum();

        assert_eq!(cart.total_price, price);
        assert_eq!(cart.total_items, items);
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let mut cart = cart();
        let headphones = product(120_00, 5);

        cart.add_item(&headphones, 1).expect("first add");
        cart.add_item(&headphones, 2).expect("second add");

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
        assert_eq!(cart.total_price, 360_00);
        assert_totals(&cart);
    }

    #[test]
    fn over_stock_add_leaves_cart_unchanged() {
        let mut cart = cart();
        let headphones = product(120_00, 3);

        cart.add_item(&headphones, 2).expect("first add");

        let result = cart.add_item(&headphones, 2);

        assert!(matches!(
            result,
            Err(CartsServiceError::InsufficientStock { available: 3 })
        ));
        assert_eq!(cart.items[0].quantity, 2);
        assert_totals(&cart);
    }

    #[test]
    fn out_of_stock_and_zero_quantity_are_rejected() {
        let mut cart = cart();

        assert!(matches!(
            cart.add_item(&product(10_00, 0), 1),
            Err(CartsServiceError::OutOfStock)
        ));
        assert!(matches!(
            cart.add_item(&product(10_00, 4), 0),
            Err(CartsServiceError::InvalidQuantity)
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn snapshot_survives_price_change() {
        let mut cart = cart();
        let mut headphones = product(120_00, 5);

        cart.add_item(&headphones, 1).expect("first add");

        headphones.price = 999_00;
        cart.add_item(&headphones, 1).expect("second add");

        assert_eq!(cart.items[0].price, 120_00);
        assert_eq!(cart.total_price, 240_00);
    }

    #[test]
    fn set_quantity_bounds_and_removal() {
        let mut cart = cart();
        let headphones = product(120_00, 5);
        let cable = product(10_00, 50);

        cart.add_item(&headphones, 1).expect("add headphones");
        cart.add_item(&cable, 4).expect("add cable");

        cart.set_quantity(headphones.uuid, 5, 5).expect("set to stock");
        assert_totals(&cart);

        assert!(matches!(
            cart.set_quantity(headphones.uuid, 6, 5),
            Err(CartsServiceError::InsufficientStock { available: 5 })
        ));
        assert!(matches!(
            cart.set_quantity(ProductUuid::new(), 1, 5),
            Err(CartsServiceError::ItemNotFound)
        ));

        cart.set_quantity(cable.uuid, 0, 50).expect("zero removes");

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total_items, 5);
        assert_totals(&cart);
    }

    #[test]
    fn remove_is_idempotent_and_clear_zeroes() {
        let mut cart = cart();
        let headphones = product(120_00, 5);

        cart.add_item(&headphones, 2).expect("add");
        cart.remove_item(headphones.uuid);
        cart.remove_item(headphones.uuid);

        assert!(cart.is_empty());
        assert_eq!(cart.total_price, 0);

        cart.add_item(&headphones, 2).expect("add");
        cart.clear();

        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_price, 0);
    }
}
