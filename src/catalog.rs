//! The named-query catalogue.
//!
//! Three fixed pages, each an ordered list of (description, SQL) pairs.
//! The built-in catalogue is hardcoded; `--catalog <file.toml>` replaces
//! it at startup with a TOML document of the same shape:
//!
//! ```toml
//! [[pages]]
//! title = "My Page"
//!
//! [[pages.queries]]
//! description = "Orders by region"
//! sql = "SELECT region, COUNT(order_id) FROM orders GROUP BY region"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalogue parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Unknown page '{requested}'. Available pages: {available}")]
    UnknownPage {
        requested: String,
        available: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedQuery {
    pub description: String,
    pub sql: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub queries: Vec<NamedQuery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub pages: Vec<Page>,
}

impl Catalog {
    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn page_titles(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.title.as_str()).collect()
    }

    pub fn page(&self, title: &str) -> Result<&Page, CatalogError> {
        self.pages
            .iter()
            .find(|p| p.title.eq_ignore_ascii_case(title))
            .ok_or_else(|| CatalogError::UnknownPage {
                requested: title.to_string(),
                available: self.page_titles().join(", "),
            })
    }

    pub fn find_query(&self, description: &str) -> Option<&NamedQuery> {
        self.pages
            .iter()
            .flat_map(|p| p.queries.iter())
            .find(|q| q.description.eq_ignore_ascii_case(description))
    }

    /// The built-in report catalogue over the `orders` and `products`
    /// tables.
    pub fn builtin() -> Self {
        Self {
            pages: vec![
                business_insights(),
                standard_reports(),
                deep_dives(),
            ],
        }
    }
}

fn query(description: &str, sql: &str) -> NamedQuery {
    NamedQuery {
        description: description.to_string(),
        sql: sql.trim().to_string(),
    }
}

fn business_insights() -> Page {
    Page {
        title: "Business Insights".to_string(),
        queries: vec![
            query(
                "Top-Selling Products",
                "
SELECT p.product_id, p.sub_category, SUM(o.sale_price) AS total_sales,
       RANK() OVER (ORDER BY SUM(o.sale_price) DESC) AS sales_rank
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.product_id, p.sub_category",
            ),
            query(
                "Monthly Sales Growth",
                "
WITH y1 AS (
    SELECT order_month, SUM(sale_price) AS revenue
    FROM orders WHERE order_year = 2023 GROUP BY order_month
),
y2 AS (
    SELECT order_month, SUM(sale_price) AS revenue
    FROM orders WHERE order_year = 2022 GROUP BY order_month
)
SELECT y1.order_month,
       ((y1.revenue - y2.revenue) / y2.revenue) * 100 AS growth_pct,
       RANK() OVER (ORDER BY ((y1.revenue - y2.revenue) / y2.revenue) * 100 DESC) AS growth_rank
FROM y1
JOIN y2 ON y1.order_month = y2.order_month",
            ),
            query(
                "Product Performance",
                "
SELECT p.product_id, p.category,
       ROUND(SUM(o.sale_price), 2) AS total_revenue,
       ROUND(SUM(o.profit), 2) AS total_profit,
       CASE WHEN SUM(o.sale_price) = 0 THEN 0
            ELSE ROUND((SUM(o.profit) / SUM(o.sale_price)) * 100)
       END AS profit_margin,
       CASE WHEN SUM(o.sale_price) > 10000 THEN 'High Performer'
            WHEN SUM(o.sale_price) BETWEEN 5000 AND 10000 THEN 'Mid Performer'
            ELSE 'Low Performer'
       END AS performance_band,
       RANK() OVER (ORDER BY SUM(o.sale_price) DESC) AS revenue_rank
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.product_id, p.category",
            ),
            query(
                "Regional Sales",
                "
SELECT region,
       COUNT(order_id) AS total_orders,
       ROUND(SUM(sale_price), 2) AS total_sales,
       ROUND(SUM(profit), 2) AS total_profit,
       ROUND((SUM(profit) / SUM(sale_price)) * 100) AS profit_margin,
       RANK() OVER (ORDER BY SUM(sale_price) DESC) AS sales_rank
FROM orders
GROUP BY region",
            ),
            query(
                "Discount Impact",
                "
SELECT product_id,
       SUM(quantity) AS total_quantity,
       SUM(discount_percent) AS total_discount_percent,
       ROUND(SUM(discount_price), 2) AS total_discount,
       ROUND(SUM(sale_price), 2) AS total_sales,
       ROUND((SUM(discount_price) / SUM(sale_price)) * 100, 2) AS discount_impact_pct
FROM orders
GROUP BY product_id
HAVING SUM(discount_percent) > 20
ORDER BY discount_impact_pct DESC",
            ),
        ],
    }
}

fn standard_reports() -> Page {
    Page {
        title: "Standard Reports".to_string(),
        queries: vec![
            query(
                "Top 10 Products by Revenue",
                "
SELECT p.product_id, p.sub_category, SUM(o.sale_price) AS revenue
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.product_id, p.sub_category
ORDER BY revenue DESC
LIMIT 10",
            ),
            query(
                "Top 5 Cities by Profit Margin",
                "
SELECT city,
       AVG(CASE WHEN sale_price = 0 THEN 0
                ELSE (profit / sale_price) * 100 END) AS profit_margin
FROM orders
GROUP BY city
ORDER BY profit_margin DESC
LIMIT 5",
            ),
            query(
                "Total Discount by Category",
                "
SELECT p.category, SUM(o.discount_price * o.quantity) AS total_discount
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.category",
            ),
            query(
                "Average Sale Price by Category",
                "
SELECT p.category, AVG(o.sale_price) AS avg_sale_price
FROM orders o
JOIN products p ON p.product_id = o.product_id
GROUP BY p.category",
            ),
            query(
                "Region with Highest Average Sales",
                "
SELECT region, AVG(sale_price) AS avg_sales
FROM orders
GROUP BY region
ORDER BY avg_sales DESC
LIMIT 1",
            ),
            query(
                "Total Profit by Category",
                "
SELECT p.category, SUM(o.profit) AS total_profit
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.category",
            ),
            query(
                "Highest Quantity Sold by Segment",
                "
SELECT segment, SUM(quantity) AS total_quantity
FROM orders
GROUP BY segment
ORDER BY total_quantity DESC",
            ),
            query(
                "Average Discount by Region",
                "
SELECT region, ROUND(AVG(discount_percent), 2) AS avg_discount
FROM orders
GROUP BY region",
            ),
            query(
                "Most Profitable Category",
                "
SELECT p.category, ROUND(SUM(o.profit), 2) AS total_profit
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.category
ORDER BY total_profit DESC
LIMIT 1",
            ),
            query(
                "Annual Revenue",
                "
SELECT order_year, ROUND(SUM(sale_price), 2) AS revenue
FROM orders
GROUP BY order_year",
            ),
        ],
    }
}

fn deep_dives() -> Page {
    Page {
        title: "Deep Dives".to_string(),
        queries: vec![
            query(
                "Top 5 States by Revenue per Category",
                "
SELECT o.state, p.category, ROUND(SUM(o.sale_price), 2) AS revenue
FROM orders o
JOIN products p ON o.product_id = p.product_id
GROUP BY o.state, p.category
ORDER BY revenue DESC
LIMIT 5",
            ),
            query(
                "Orders, Quantity and Revenue per Category",
                "
SELECT p.category,
       COUNT(o.order_id) AS order_count,
       SUM(o.quantity) AS total_quantity,
       ROUND(SUM(o.sale_price), 2) AS revenue
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.category",
            ),
            query(
                "Top 10 Products by Quantity Sold",
                "
SELECT p.product_id, p.category,
       SUM(o.quantity) AS total_quantity,
       ROUND(SUM(o.sale_price), 2) AS revenue,
       ROUND(SUM(o.profit), 2) AS profit
FROM products p
JOIN orders o ON p.product_id = o.product_id
GROUP BY p.product_id, p.category
ORDER BY total_quantity DESC
LIMIT 10",
            ),
            query(
                "Regions Ranked by Quantity Sold",
                "
SELECT region,
       SUM(quantity) AS total_quantity,
       COUNT(order_id) AS order_count,
       RANK() OVER (ORDER BY SUM(quantity) DESC) AS quantity_rank
FROM orders
GROUP BY region",
            ),
            query(
                "Segments Ranked by Profit",
                "
SELECT segment,
       ROUND(SUM(profit), 2) AS total_profit,
       RANK() OVER (ORDER BY SUM(profit) DESC) AS profit_rank
FROM orders
GROUP BY segment",
            ),
            query(
                "Average Quantity per Sub-Category",
                "
SELECT p.sub_category,
       ROUND(AVG(o.quantity), 2) AS avg_quantity,
       COUNT(o.order_id) AS order_count
FROM products p
JOIN orders o ON o.product_id = p.product_id
GROUP BY p.sub_category",
            ),
            query(
                "Revenue by Segment",
                "
SELECT segment, ROUND(SUM(sale_price), 2) AS total_revenue
FROM orders
GROUP BY segment",
            ),
            query(
                "Profit by Region",
                "
SELECT region, ROUND(SUM(profit), 2) AS total_profit
FROM orders
GROUP BY region
ORDER BY total_profit DESC",
            ),
            query(
                "Quantity and Ship Mode by State",
                "
SELECT state, ship_mode, SUM(quantity) AS total_quantity
FROM orders
GROUP BY state, ship_mode
ORDER BY total_quantity DESC",
            ),
            query(
                "Month with Highest Revenue",
                "
SELECT order_month,
       ROUND(SUM(sale_price), 2) AS revenue,
       RANK() OVER (ORDER BY SUM(sale_price) DESC) AS revenue_rank
FROM orders
GROUP BY order_month",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_has_three_pages() {
        let catalog = Catalog::builtin();
        assert_eq!(
            catalog.page_titles(),
            vec!["Business Insights", "Standard Reports", "Deep Dives"]
        );
        assert_eq!(catalog.pages[0].queries.len(), 5);
        assert_eq!(catalog.pages[1].queries.len(), 10);
        assert_eq!(catalog.pages[2].queries.len(), 10);
    }

    #[test]
    fn test_page_lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        assert!(catalog.page("deep dives").is_ok());
        let err = catalog.page("Nonexistent").unwrap_err();
        assert!(err.to_string().contains("Business Insights"));
    }

    #[test]
    fn test_builtin_queries_reference_known_tables() {
        let catalog = Catalog::builtin();
        for page in &catalog.pages {
            for q in &page.queries {
                let sql = q.sql.to_lowercase();
                assert!(
                    sql.contains("orders") || sql.contains("products"),
                    "query '{}' references no known table",
                    q.description
                );
            }
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let catalog = Catalog::builtin();
        let serialized = toml::to_string(&catalog).unwrap();
        let parsed: Catalog = toml::from_str(&serialized).unwrap();

        assert_eq!(catalog.page_titles(), parsed.page_titles());
        for (original, round_tripped) in catalog.pages.iter().zip(&parsed.pages) {
            assert_eq!(original.queries.len(), round_tripped.queries.len());
            for (a, b) in original.queries.iter().zip(&round_tripped.queries) {
                assert_eq!(a.description, b.description);
                assert_eq!(a.sql, b.sql);
            }
        }
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            r#"
[[pages]]
title = "Custom"

[[pages.queries]]
description = "All orders"
sql = "SELECT * FROM orders"
"#,
        )
        .unwrap();

        let catalog = Catalog::from_toml_file(&path).unwrap();
        assert_eq!(catalog.page_titles(), vec!["Custom"]);
        assert_eq!(catalog.pages[0].queries[0].sql, "SELECT * FROM orders");
    }

    #[test]
    fn test_missing_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Catalog::from_toml_file(&dir.path().join("nope.toml")).is_err());
    }
}
