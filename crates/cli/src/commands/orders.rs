//! Order lookup.

use sofahub_core::OrderId;
use sofahub_storefront::variations::selection_summary_of;
use tracing::info;

use super::{CommandError, Shop};

/// Show an order by id or order number.
///
/// # Errors
///
/// Returns an error for an unparseable reference, an unknown order, or a
/// failed API request.
pub async fn show(shop: &Shop, reference: &str) -> Result<(), CommandError> {
    let id = OrderId::parse_reference(reference)?;
    let order = shop.client.get_order(id).await?;

    info!("Order {} ({})", order.order_number, order.status);
    info!("  {}", order.status.message());
    info!("  {} | {} | {}", order.customer_name, order.customer_email, order.customer_phone);
    info!("  Deliver to: {}, {}", order.shipping_address, order.shipping_city);

    for item in &order.items {
        info!(
            "  {} ({}) x{} = {}",
            item.product_name,
            selection_summary_of(&item.attributes),
            item.quantity,
            item.total_price.display()
        );
    }

    info!("  Subtotal: {}", order.subtotal.display());
    info!(
        "  Deposit:  {} ({})",
        order.deposit().display(),
        if order.payment_confirmed { "paid" } else { "unpaid" }
    );
    info!("  Balance:  {}", order.remaining().display());
    Ok(())
}
