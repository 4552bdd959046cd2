//! Kirana CLI - storefront shell over the client library.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (tokens land in the session file)
//! kirana auth login -e asha@example.com
//!
//! # Browse the catalog
//! kirana catalog list
//! kirana catalog search "copper wire"
//!
//! # Work the cart
//! kirana cart show
//! kirana cart add 42 --quantity 2
//! kirana cart set-qty 7 3
//!
//! # Place a cash-on-delivery order
//! kirana checkout cod --address 5
//! ```
//!
//! # Commands
//!
//! - `auth` - Login, logout, registration
//! - `catalog` - List, search and show products
//! - `cart` - Show and mutate the cart
//! - `checkout` - Place orders
//! - `orders` - Order history

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kirana")]
#[command(author, version, about = "Kirana storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the signed-in session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show and mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in and store the token pair
    Login {
        /// Email or username
        #[arg(short = 'e', long)]
        identifier: String,

        /// Password (prompted for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Phone number
        #[arg(long)]
        phone: Option<String>,
    },
    /// Revoke the refresh token and forget the session
    Logout,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products, paginated
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Items per page
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },
    /// Full-text search
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one product
    Show {
        /// Product id
        id: i64,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product id
        product: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart item id
        item: i64,
    },
    /// Set a line's quantity
    SetQty {
        /// Cart item id
        item: i64,

        /// New quantity (at least 1)
        quantity: u32,
    },
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Cash on delivery using a saved address
    Cod {
        /// Saved billing address id
        #[arg(short, long)]
        address: i64,

        /// Saved shipping address id (defaults to billing)
        #[arg(short, long)]
        shipping: Option<i64>,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List past orders
    List,
    /// Show one order
    Show {
        /// Order id
        id: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login {
                identifier,
                password,
            } => commands::auth::login(&identifier, password.as_deref()).await?,
            AuthAction::Register {
                email,
                password,
                name,
                phone,
            } => commands::auth::register(&email, &password, name, phone).await?,
            AuthAction::Logout => commands::auth::logout().await?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::List { page, page_size } => {
                commands::catalog::list(page, page_size).await?;
            }
            CatalogAction::Search { query, limit } => {
                commands::catalog::search(&query, limit).await?;
            }
            CatalogAction::Show { id } => commands::catalog::show(id).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(product, quantity).await?;
            }
            CartAction::Remove { item } => commands::cart::remove(item).await?,
            CartAction::SetQty { item, quantity } => {
                commands::cart::set_quantity(item, quantity).await?;
            }
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Cod { address, shipping } => {
                commands::checkout::cash_on_delivery(address, shipping).await?;
            }
        },
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list().await?,
            OrdersAction::Show { id } => commands::orders::show(&id).await?,
        },
    }
    Ok(())
}
