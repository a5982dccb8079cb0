//! Cart line joined with its product.

use rust_decimal::Decimal;

use grabit_core::{CartId, DiscountPercent, Price, ProductId};

use super::product::media_url;

/// The user's pending purchase line.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub id: CartId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Price,
    pub discount: DiscountPercent,
    pub quantity: i32,
    pub cover_image: Option<String>,
}

impl CartLine {
    /// Discounted price of one unit.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.discounted(self.discount)
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price().amount() * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn cover_url(&self) -> Option<String> {
        self.cover_image.as_deref().map(media_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_discounted_price() {
        let line = CartLine {
            id: CartId::new(1),
            product_id: ProductId::new(2),
            product_name: "Mug".to_owned(),
            price: Price::parse("12.50").unwrap(),
            discount: DiscountPercent::parse("10").unwrap(),
            quantity: 3,
            cover_image: None,
        };
        assert_eq!(line.unit_price().to_string(), "11.25");
        assert_eq!(line.line_total(), Decimal::new(3375, 2));
    }
}
