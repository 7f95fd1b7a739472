//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! sofa products --room bedroom --tags on-sale,new-arrival --sort newest
//! sofa product lamu-sofa --select color=grey
//! sofa rooms
//! ```

use clap::Args;
use sofahub_core::{AttributeValue, Price};
use sofahub_storefront::api::{Product, ProductVariation};
use sofahub_storefront::catalog::{CatalogQuery, SortKey};
use sofahub_storefront::variations::{
    attribute_groups, default_variation, resolve_variation, selection_summary,
};
use tracing::{info, warn};

use super::{CommandError, Shop};

/// Listing filters.
#[derive(Debug, Args)]
pub struct ProductFilters {
    /// Room category slug
    #[arg(long)]
    room: Option<String>,

    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,

    /// Comma-separated tag slugs
    #[arg(long)]
    tags: Option<String>,

    /// Product type slug
    #[arg(long = "type")]
    product_type: Option<String>,

    /// Minimum price in shillings
    #[arg(long)]
    min: Option<i64>,

    /// Maximum price in shillings
    #[arg(long)]
    max: Option<i64>,

    /// `name`, `price-low`, `price-high`, or `newest`
    #[arg(long, default_value = "name")]
    sort: String,
}

impl ProductFilters {
    fn to_query(&self) -> CatalogQuery {
        let mut query = CatalogQuery::default()
            .sort(SortKey::from_param(&self.sort))
            .price_range(
                self.min.map(Price::from_shillings),
                self.max.map(Price::from_shillings),
            );

        if let Some(room) = &self.room {
            query = query.room(room);
        }
        if let Some(search) = &self.search {
            query = query.search(search);
        }
        if let Some(tags) = &self.tags {
            query = query.tags_csv(tags);
        }
        if let Some(product_type) = &self.product_type {
            query = query.product_type(product_type);
        }
        query
    }
}

/// List products matching the filters.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn products(shop: &Shop, filters: &ProductFilters) -> Result<(), CommandError> {
    let query = filters.to_query();
    let products = shop.client.list_products(&query).await?;

    info!("{} products ({})", products.len(), query.sort.label());
    for product in &products {
        let sale = if product.is_on_sale { " [sale]" } else { "" };
        info!("  {:<32} {:>14}{sale}", product.slug, product.current_price.display());
    }
    Ok(())
}

/// Show a product, applying `key=value` option selections in order.
///
/// # Errors
///
/// Returns an error for a malformed selection, an unknown slug, or a failed
/// API request.
pub async fn product(shop: &Shop, slug: &str, selections: &[String]) -> Result<(), CommandError> {
    let product = shop.client.get_product(slug).await?;
    let mut selected = default_variation(&product);

    for selection in selections {
        let (key, value) = selection
            .split_once('=')
            .ok_or_else(|| CommandError::InvalidArgument(selection.clone()))?;
        let value = AttributeValue::from(value.trim());

        match resolve_variation(&product.variations, selected, key.trim(), &value) {
            Some(variation) => selected = Some(variation),
            None => warn!("No variation offers {selection}; selection unchanged"),
        }
    }

    print_product(&product, selected);
    Ok(())
}

fn print_product(product: &Product, selected: Option<&ProductVariation>) {
    info!("{} ({})", product.name, product.slug);
    match product.base_price.filter(|base| *base != product.current_price) {
        Some(base) => info!(
            "  {} (was {})",
            product.current_price.display(),
            base.display()
        ),
        None => info!("  {}", product.current_price.display()),
    }
    if let Some(description) = &product.description {
        info!("  {description}");
    }

    for group in attribute_groups(&product.variations, selected) {
        let options: Vec<String> = group
            .options
            .iter()
            .map(|option| {
                let mut label = option.display.clone();
                if option.selected {
                    label = format!("[{label}]");
                }
                if !option.available {
                    label.push_str(" (sold out)");
                }
                if let Some(price) = option.price {
                    label.push_str(&format!(" {}", price.display()));
                }
                label
            })
            .collect();
        info!("  {}: {}", group.label, options.join(", "));
    }

    if let Some(variation) = selected {
        info!(
            "  Selected #{}: {} | SKU {} | {} | {} available",
            variation.id,
            selection_summary(variation),
            variation.sku,
            variation.price.display(),
            variation.stock_quantity
        );
    }
}

/// List room categories.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn rooms(shop: &Shop) -> Result<(), CommandError> {
    for category in shop.client.list_room_categories().await? {
        info!("  {:<24} {}", category.slug, category.name);
    }
    Ok(())
}

/// List product types.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn product_types(shop: &Shop) -> Result<(), CommandError> {
    for product_type in shop.client.list_product_types().await? {
        info!("  {:<24} {}", product_type.slug, product_type.name);
    }
    Ok(())
}

/// List product tags.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn tags(shop: &Shop) -> Result<(), CommandError> {
    for tag in shop.client.list_tags().await? {
        info!("  {:<24} {} {}", tag.slug, tag.name, tag.color_code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_to_query() {
        let filters = ProductFilters {
            room: Some("living-room".to_string()),
            search: None,
            tags: Some("on-sale, new".to_string()),
            product_type: None,
            min: Some(0),
            max: Some(50_000),
            sort: "price-low".to_string(),
        };
        let query = filters.to_query();

        assert_eq!(query.room.as_deref(), Some("living-room"));
        assert_eq!(query.tags, ["on-sale", "new"]);
        assert!(query.on_sale());
        assert_eq!(query.sort, SortKey::PriceLow);
    }
}
