//! In-memory order building
//!
//! A cart holds items from exactly one vendor. Adding an item from another
//! vendor starts a fresh cart.

use crate::data::MenuItem;

/// One distinct menu item and how many of it are ordered
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity
    pub fn subtotal(&self) -> f64 {
        self.item.price * f64::from(self.quantity)
    }
}

/// Single-vendor shopping cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    vendor_code: String,
    vendor_name: String,
}

impl Cart {
    /// Creates an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `item` sold by the given vendor
    ///
    /// If the cart currently holds another vendor's items they are dropped
    /// first. An item already in the cart has its quantity incremented.
    pub fn add(&mut self, item: &MenuItem, vendor_code: &str, vendor_name: &str) {
        if !self.lines.is_empty() && self.vendor_code != vendor_code {
            self.lines.clear();
        }
        self.vendor_code = vendor_code.to_string();
        self.vendor_name = vendor_name.to_string();

        match self.lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            }),
        }
    }

    /// Removes one unit of the item with `item_id`
    ///
    /// The line disappears when its quantity reaches zero, and the vendor is
    /// forgotten once the cart is empty. Unknown ids are ignored.
    pub fn remove(&mut self, item_id: i64) {
        let Some(index) = self.lines.iter().position(|line| line.item.id == item_id) else {
            return;
        };

        let line = &mut self.lines[index];
        line.quantity = line.quantity.saturating_sub(1);
        if line.quantity == 0 {
            self.lines.remove(index);
        }

        if self.lines.is_empty() {
            self.reset_vendor();
        }
    }

    /// Empties the cart and forgets the vendor
    pub fn clear(&mut self) {
        self.lines.clear();
        self.reset_vendor();
    }

    /// Sum of quantities across all lines
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of unit price times quantity across all lines
    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a given item, zero when absent
    pub fn quantity_of(&self, item_id: i64) -> u32 {
        self.lines
            .iter()
            .find(|line| line.item.id == item_id)
            .map_or(0, |line| line.quantity)
    }

    /// Code of the vendor the cart belongs to, `None` when empty
    pub fn vendor_code(&self) -> Option<&str> {
        (!self.vendor_code.is_empty()).then_some(self.vendor_code.as_str())
    }

    pub fn vendor_name(&self) -> Option<&str> {
        (!self.vendor_name.is_empty()).then_some(self.vendor_name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn reset_vendor(&mut self) {
        self.vendor_code.clear();
        self.vendor_name.clear();
    }
}
