//! Checkout command.
//!
//! Runs the four checkout steps non-interactively from command-line
//! arguments, then places the order for the current cart.

use clap::Args;
use sofahub_storefront::checkout::{
    CheckoutFlow, CheckoutStep, CustomerInfo, KENYAN_COUNTIES, ShippingAddress,
};
use tracing::{info, warn};

use super::cart::print_cart;
use super::{CommandError, Shop};

/// Checkout details.
#[derive(Debug, Args)]
pub struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    street: String,

    #[arg(long)]
    city: String,

    #[arg(long)]
    county: String,

    #[arg(long)]
    postal_code: Option<String>,

    /// Number that receives the M-Pesa deposit prompt
    #[arg(long)]
    mpesa_phone: String,
}

/// Validate the details, review the cart, and place the order.
///
/// # Errors
///
/// Returns an error if the cart is empty, a step fails validation, or the
/// order cannot be placed.
pub async fn place_order(shop: &Shop, args: CheckoutArgs) -> Result<(), CommandError> {
    shop.cart.refresh_cart().await?;

    let mut flow = CheckoutFlow::new(shop.client.clone());
    flow.guard(&shop.cart)?;

    if !KENYAN_COUNTIES
        .iter()
        .any(|county| county.eq_ignore_ascii_case(args.county.trim()))
    {
        warn!("{} is not in the delivery county list", args.county);
    }

    for step in CheckoutStep::ALL {
        info!("Step {}: {} - {}", step.number(), step.title(), step.description());
    }

    flow.submit_customer(CustomerInfo {
        name: args.name,
        email: args.email,
        phone: args.phone,
    })?;
    flow.submit_shipping(ShippingAddress {
        street: args.street,
        city: args.city,
        county: args.county,
        postal_code: args.postal_code,
    })?;
    flow.submit_payment(args.mpesa_phone)?;

    if let Some(cart) = shop.cart.cart() {
        print_cart(&cart);
    }

    let placed = flow.place_order(&shop.cart).await?;
    info!("{}", placed.title());
    info!("{}", placed.message());
    info!(
        "Order {} | deposit {} | on delivery {}",
        placed.order.order_number,
        placed.order.deposit().display(),
        placed.order.remaining().display()
    );
    info!("Next: {}", placed.navigation.path());
    Ok(())
}
