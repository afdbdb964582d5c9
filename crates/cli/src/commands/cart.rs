//! Cart commands: show, add, update, remove, clear, watch.

use fashionhub_cart::{CartConfig, CartGateway, CartStore};
use fashionhub_core::ProductId;

/// Print the cart as a line-per-entry table with totals.
#[allow(clippy::print_stdout)]
pub fn show(store: &CartStore) {
    if store.items().is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in store.items() {
        println!(
            "{:>4} x {:<32} size {:<4} {:>10}",
            line.quantity,
            line.product.name,
            line.size,
            line.line_total()
        );
    }
    println!(
        "{} item(s), total {}",
        store.total_items(),
        store.total_price()
    );
}

/// Fetch a product snapshot and add it to the cart.
///
/// # Errors
///
/// Returns error when the product cannot be fetched; cart-level failures
/// surface as notices, not errors.
pub async fn add(
    config: &CartConfig,
    store: &mut CartStore,
    product: i64,
    size: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = CartGateway::new(config)?;
    let snapshot = gateway.get_product(ProductId::new(product)).await?;

    store.add_item(&snapshot, size, quantity, Vec::new()).await;
    show(store);
    Ok(())
}

/// Change a line quantity; zero removes the line.
pub async fn update(store: &mut CartStore, product: i64, size: &str, quantity: u32) {
    store
        .update_quantity(ProductId::new(product), size, quantity)
        .await;
    show(store);
}

/// Remove one line.
pub async fn remove(store: &mut CartStore, product: i64, size: &str) {
    store.remove_item(ProductId::new(product), size).await;
    show(store);
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub async fn clear(store: &mut CartStore) {
    store.clear_cart().await;
    println!("Cart cleared");
}

/// Follow external writes to the local cart record and reprint the cart
/// after each one.
///
/// # Errors
///
/// Returns error if the file watcher cannot be installed.
#[allow(clippy::print_stdout)]
pub async fn watch(store: &mut CartStore) -> Result<(), Box<dyn std::error::Error>> {
    let mut watcher = store.watch_external()?;
    println!("Watching for cart changes (Ctrl-C to stop)");

    while watcher.changed().await.is_some() {
        store.refresh().await;
        show(store);
    }
    Ok(())
}
