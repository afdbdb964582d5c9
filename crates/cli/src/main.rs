//! FashionHub CLI - shop cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (persists the session token in the profile directory)
//! fh-cli login -e jane@example.com
//!
//! # Add two size-M units of product 5 to the cart
//! fh-cli add 5 M -q 2
//!
//! # Show the cart, change a quantity, remove a line
//! fh-cli show
//! fh-cli update 5 M -q 1
//! fh-cli remove 5 M
//!
//! # Follow external changes to the local cart (another client on the
//! # same profile directory)
//! fh-cli watch
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - manage the authenticated session
//! - `show`, `add`, `update`, `remove`, `clear` - cart operations
//! - `watch` - follow external local-cart changes

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use clap::{Parser, Subcommand};

use fashionhub_cart::{CartConfig, CartStore};

mod commands;

use commands::notify::ConsoleNotifier;

#[derive(Parser)]
#[command(name = "fh-cli")]
#[command(author, version, about = "FashionHub cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and sync the local cart to the server
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out and return to the local cart
    Logout,
    /// Print the cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product: i64,

        /// Size, e.g. S, M, L
        size: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a cart line (0 removes it)
    Update {
        /// Product ID
        product: i64,

        /// Size, e.g. S, M, L
        size: String,

        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Product ID
        product: i64,

        /// Size, e.g. S, M, L
        size: String,
    },
    /// Empty the cart
    Clear,
    /// Follow external changes to the local cart record
    Watch,
}

#[tokio::main]
async fn main() {
    // Initialize tracing; RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fashionhub_cart=info")),
        )
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CartConfig::from_env()?;
    let mut store = CartStore::open(&config, Arc::new(ConsoleNotifier))?;

    // Resume the persisted session, if any. A stale token is rejected on
    // the first remote call and the store falls back to the local cart.
    if let Some(token) = commands::auth::stored_token(&config)? {
        store.sign_in(token).await;
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&config, &mut store, &email, password).await?;
        }
        Commands::Logout => commands::auth::logout(&config, &mut store).await?,
        Commands::Show => commands::cart::show(&store),
        Commands::Add {
            product,
            size,
            quantity,
        } => commands::cart::add(&config, &mut store, product, &size, quantity).await?,
        Commands::Update {
            product,
            size,
            quantity,
        } => {
            commands::cart::update(&mut store, product, &size, quantity).await;
        }
        Commands::Remove { product, size } => {
            commands::cart::remove(&mut store, product, &size).await;
        }
        Commands::Clear => commands::cart::clear(&mut store).await,
        Commands::Watch => commands::cart::watch(&mut store).await?,
    }
    Ok(())
}
