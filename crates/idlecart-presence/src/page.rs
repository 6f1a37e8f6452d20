//! Page classification
//!
//! The presence tracker only runs on commerce pages; everything else is
//! outside the protocol.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    ShopIndex,
    Product,
    Cart,
    Checkout,
    Other,
}

impl PageKind {
    pub fn is_commerce(&self) -> bool {
        !matches!(self, PageKind::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commerce_gating() {
        assert!(PageKind::ShopIndex.is_commerce());
        assert!(PageKind::Product.is_commerce());
        assert!(PageKind::Cart.is_commerce());
        assert!(PageKind::Checkout.is_commerce());
        assert!(!PageKind::Other.is_commerce());
    }
}
