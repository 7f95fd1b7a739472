//! Contact form command.

use clap::Args;
use sofahub_core::Email;
use sofahub_storefront::api::ContactMessage;
use tracing::{info, warn};

use super::{CommandError, Shop};

/// Contact form fields.
#[derive(Debug, Args)]
pub struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    subject: String,

    #[arg(long)]
    message: String,
}

/// Send a message to the shop.
///
/// # Errors
///
/// Returns an error for an invalid email or a failed API request.
pub async fn submit(shop: &Shop, args: ContactArgs) -> Result<(), CommandError> {
    let email = Email::parse(&args.email)
        .map_err(|e| CommandError::InvalidArgument(e.to_string()))?;

    let response = shop
        .client
        .submit_contact(&ContactMessage {
            name: args.name,
            email: email.into_inner(),
            phone: args.phone.filter(|p| !p.trim().is_empty()),
            subject: args.subject,
            message: args.message,
        })
        .await?;

    if response.success {
        info!("{}", response.message);
    } else {
        warn!("{}", response.message);
    }
    Ok(())
}
