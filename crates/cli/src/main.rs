//! SofaHub CLI - Browse the catalog, manage a cart, and check out from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse living room sofas under KSh 50,000, cheapest first
//! sofa products --room living-room --max 50000 --sort price-low
//!
//! # Show a product and pick options
//! sofa product lamu-sofa --select color=grey --select size=3-seater
//!
//! # Manage the cart
//! sofa cart add 5 -q 2
//! sofa cart show
//!
//! # Place the order (an M-Pesa prompt is sent for the 50% deposit)
//! sofa checkout --name "Amina Otieno" --email amina@example.co.ke \
//!     --phone 0712345678 --street "Ngong Road" --city Nairobi \
//!     --county Nairobi --mpesa-phone 0712345678
//!
//! # Look up an order
//! sofa order ORD-123
//! ```
//!
//! # Environment Variables
//!
//! - `SOFAHUB_API_BASE_URL` - API base URL
//! - `SOFAHUB_SESSION_FILE` - Where the cart session id is kept
//! - `SOFAHUB_CACHE_TTL_SECS` - Catalog cache lifetime
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT` - Error tracking (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use sofahub_storefront::config::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sofa")]
#[command(author, version, about = "SofaHub furniture store from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products(commands::catalog::ProductFilters),
    /// Show a product and its options
    Product {
        /// Product slug
        slug: String,

        /// Select an option, e.g. `color=grey` (repeatable)
        #[arg(short, long = "select", value_name = "KEY=VALUE")]
        selections: Vec<String>,
    },
    /// List room categories
    Rooms,
    /// List product types
    Types,
    /// List product tags
    Tags,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Look up an order by id or order number
    Order {
        /// Order id (`123`) or number (`ORD-123`)
        reference: String,
    },
    /// Read the blog
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },
    /// Send a message to the shop
    Contact(commands::contact::ContactArgs),
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a product variation
    Add {
        /// Variation id
        variation_id: i32,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity
    Update {
        /// Cart item id
        item_id: i32,
        /// New quantity
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Cart item id
        item_id: i32,
    },
    /// Start a new, empty cart
    Clear,
}

#[derive(Subcommand)]
enum BlogAction {
    /// List posts
    List {
        #[arg(short, long)]
        search: Option<String>,

        /// Only featured posts
        #[arg(short, long)]
        featured: bool,

        /// Comma-separated tag slugs
        #[arg(short, long)]
        tags: Option<String>,
    },
    /// Show a post
    Show {
        /// Post slug
        slug: String,
    },
    /// List blog tags
    Tags,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sofahub_storefront=info,sofahub_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, &config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    let shop = commands::Shop::new(config)?;

    match cli.command {
        Commands::Products(filters) => commands::catalog::products(&shop, &filters).await?,
        Commands::Product { slug, selections } => {
            commands::catalog::product(&shop, &slug, &selections).await?;
        }
        Commands::Rooms => commands::catalog::rooms(&shop).await?,
        Commands::Types => commands::catalog::product_types(&shop).await?,
        Commands::Tags => commands::catalog::tags(&shop).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&shop).await?,
            CartAction::Add {
                variation_id,
                quantity,
            } => commands::cart::add(&shop, variation_id, quantity).await?,
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(&shop, item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&shop, item_id).await?,
            CartAction::Clear => commands::cart::clear(&shop).await?,
        },
        Commands::Checkout(args) => commands::checkout::place_order(&shop, args).await?,
        Commands::Order { reference } => commands::orders::show(&shop, &reference).await?,
        Commands::Blog { action } => match action {
            BlogAction::List {
                search,
                featured,
                tags,
            } => {
                commands::blog::list(&shop, search.as_deref(), featured, tags.as_deref()).await?;
            }
            BlogAction::Show { slug } => commands::blog::show(&shop, &slug).await?,
            BlogAction::Tags => commands::blog::tags(&shop).await?,
        },
        Commands::Contact(args) => commands::contact::submit(&shop, args).await?,
    }
    Ok(())
}
