use serde::{Deserialize, Serialize};

/// A product record as returned by `/products` and `/product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
    /// Server-computed stock value; not every backend build sends it
    #[serde(default, rename = "totalValue", skip_serializing_if = "Option::is_none")]
    pub reported_total: Option<f64>,
}

impl Product {
    /// Value of the stock on hand
    pub fn total_value(&self) -> f64 {
        self.reported_total
            .unwrap_or(self.price * f64::from(self.quantity))
    }

    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.quantity < threshold
    }
}

/// Body of `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub quantity: u32,
    pub category: String,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Product ID is required".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Category is required".to_string());
        }
        validate_price(self.price)
    }
}

/// Body of `PUT /product?id=`. Quantity only changes through stock adjustments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductUpdate {
    pub name: String,
    pub price: f64,
    pub category: String,
}

impl ProductUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Category is required".to_string());
        }
        validate_price(self.price)
    }
}

fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Price must be zero or more".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    In,
    Out,
}

impl StockDirection {
    pub fn endpoint(&self) -> &'static str {
        match self {
            StockDirection::In => "/stock-in",
            StockDirection::Out => "/stock-out",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockDirection::In => "Stock in",
            StockDirection::Out => "Stock out",
        }
    }

    /// Check an amount against the quantity currently known for the product.
    /// Stock-out may never exceed what is on hand.
    pub fn validate(&self, amount: u32, on_hand: u32) -> Result<(), String> {
        if amount == 0 {
            return Err("Amount must be greater than 0".to_string());
        }
        if *self == StockDirection::Out && amount > on_hand {
            return Err(format!(
                "Stock-out amount cannot exceed current stock ({})",
                on_hand
            ));
        }
        Ok(())
    }
}

/// Body of `POST /stock-in` and `POST /stock-out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment<'a> {
    pub id: &'a str,
    pub amount: u32,
}

/// Inventory summary from `/statistics`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default)]
    pub product_count: u64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_list() {
        let json = r#"[{"id":"P001","name":"Laptop","price":5999.0,"quantity":12,"category":"Electronics","totalValue":71988.0},
                       {"id":"P002","name":"Desk","price":450.5,"quantity":3,"category":"Furniture"}]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].total_value(), 71988.0);
        // Derived when the server omits it
        assert_eq!(products[1].total_value(), 1351.5);
        assert!(products[1].is_low_stock(10));
        assert!(!products[0].is_low_stock(10));
    }

    #[test]
    fn test_new_product_serializes_wire_fields() {
        let product = NewProduct {
            id: "P003".to_string(),
            name: "Chair".to_string(),
            price: 99.0,
            quantity: 20,
            category: "Furniture".to_string(),
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"id":"P003","name":"Chair","price":99.0,"quantity":20,"category":"Furniture"})
        );
    }

    #[test]
    fn test_new_product_validation() {
        let mut product = NewProduct {
            id: "P003".to_string(),
            name: "Chair".to_string(),
            price: 0.0,
            quantity: 0,
            category: "Furniture".to_string(),
        };
        assert!(product.validate().is_ok());

        product.price = -1.0;
        assert!(product.validate().is_err());

        product.price = 1.0;
        product.id = "  ".to_string();
        assert_eq!(product.validate().unwrap_err(), "Product ID is required");
    }

    #[test]
    fn test_stock_out_bounded_by_quantity() {
        assert!(StockDirection::Out.validate(5, 5).is_ok());
        assert!(StockDirection::Out.validate(6, 5).is_err());
        assert!(StockDirection::Out.validate(0, 5).is_err());
    }

    #[test]
    fn test_stock_in_has_no_upper_bound() {
        assert!(StockDirection::In.validate(1000, 0).is_ok());
        assert!(StockDirection::In.validate(0, 0).is_err());
    }

    #[test]
    fn test_parse_statistics() {
        let json = r#"{"productCount":3,"totalValue":1234.5,"categories":["Electronics","Furniture"]}"#;
        let stats: Statistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats.product_count, 3);
        assert_eq!(stats.total_value, 1234.5);
        assert_eq!(stats.categories, vec!["Electronics", "Furniture"]);
    }
}
