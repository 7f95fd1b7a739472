//! Cart commands.
//!
//! The cart session id is kept in the session file, so the same cart is used
//! across invocations until `sofa cart clear` or a placed order rotates it.

use sofahub_core::{CartItemId, VariationId};
use sofahub_storefront::api::Cart;
use sofahub_storefront::cart::CartSummary;
use sofahub_storefront::variations::attribute_display_value;
use tracing::info;

use super::{CommandError, Shop};

/// Print the cart with its deposit and delivery summary.
pub fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for item in &cart.items {
        let options: Vec<String> = item
            .variation
            .attributes
            .iter()
            .map(|(key, value)| attribute_display_value(key, &value.normalized()))
            .collect();
        info!(
            "  #{:<5} {} ({}) x{} @ {} = {}",
            item.id,
            item.variation.product_name,
            options.join(", "),
            item.quantity,
            item.unit_price.display(),
            item.total_price.display()
        );
    }

    let summary = CartSummary::from_cart(cart);
    info!("  Items:    {}", summary.total_items);
    info!("  Subtotal: {}", summary.subtotal.display());
    info!("  Deposit:  {} (M-Pesa, 50%)", summary.deposit.display());
    info!("  Balance:  {} (on delivery)", summary.balance.display());
    info!("  Delivery: {}", summary.delivery.label());
}

/// Show the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be loaded.
pub async fn show(shop: &Shop) -> Result<(), CommandError> {
    shop.cart.refresh_cart().await?;
    if let Some(cart) = shop.cart.cart() {
        print_cart(&cart);
    }
    Ok(())
}

/// Add a variation to the cart.
///
/// # Errors
///
/// Returns an error for a zero quantity or a failed API request.
pub async fn add(shop: &Shop, variation_id: i32, quantity: u32) -> Result<(), CommandError> {
    shop.cart
        .add_to_cart(VariationId::new(variation_id), quantity)
        .await?;
    info!("Added {quantity} x variation {variation_id}");
    show_snapshot(shop);
    Ok(())
}

/// Change a cart line's quantity.
///
/// # Errors
///
/// Returns an error for a zero quantity or a failed API request.
pub async fn update(shop: &Shop, item_id: i32, quantity: u32) -> Result<(), CommandError> {
    shop.cart.refresh_cart().await?;
    shop.cart
        .update_quantity(CartItemId::new(item_id), quantity)
        .await?;
    show_snapshot(shop);
    Ok(())
}

/// Remove a cart line.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn remove(shop: &Shop, item_id: i32) -> Result<(), CommandError> {
    shop.cart.refresh_cart().await?;
    shop.cart.remove_from_cart(CartItemId::new(item_id)).await?;
    show_snapshot(shop);
    Ok(())
}

/// Start a new cart.
///
/// # Errors
///
/// Returns an error if the new cart cannot be loaded.
pub async fn clear(shop: &Shop) -> Result<(), CommandError> {
    shop.cart.clear_cart().await?;
    info!("Started a new cart");
    Ok(())
}

fn show_snapshot(shop: &Shop) {
    if let Some(cart) = shop.cart.cart() {
        print_cart(&cart);
    }
}
