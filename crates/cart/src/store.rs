//! Cart store: the authoritative in-memory cart for one session.
//!
//! Owns the line list, validates every quantity increase against the
//! per-size stock ceiling, and routes mutations to the active backend -
//! local file storage while anonymous, the remote cart once authenticated.
//! After a remote mutation the cart is always re-fetched in full; there is
//! no optimistic merge across the network boundary.
//!
//! Mutations take `&mut self`, so callers cannot overlap two cart
//! mutations: the exclusive borrow is the request-sequencing layer, and the
//! in-memory view always reflects the response of the last mutation
//! *issued*.
//!
//! Failed mutations emit a [`Notice`] and leave the cart at its last-known
//! good state; they never propagate as errors to the caller.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use fashionhub_core::{Accessory, Cart, CartLine, LineKey, Product, ProductId};

use crate::backend::{CartBackend, LocalCartBackend, RemoteCartBackend};
use crate::config::CartConfig;
use crate::error::CartError;
use crate::gateway::{CartGateway, GatewayError};
use crate::notify::{Notice, Notifier};
use crate::session::{AccessToken, Session};
use crate::stock::{self, StockDecision};
use crate::storage::{CartWatcher, LocalCartStore, StorageError};

/// A pending cart mutation, held so it can be retried once against the
/// local backend when the remote side rejects the session token.
enum Mutation {
    Add(CartLine),
    Update(LineKey, u32),
    Remove(LineKey),
    Clear,
}

/// Session-scoped cart store with dual persistence backends.
pub struct CartStore {
    gateway: CartGateway,
    local_store: LocalCartStore,
    backend: Box<dyn CartBackend>,
    session: Session,
    notifier: Arc<dyn Notifier>,
    cart: Cart,
}

impl CartStore {
    /// Open a store in anonymous mode, restoring any persisted local cart.
    ///
    /// A corrupt or unreadable local record degrades to an empty cart.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn open(config: &CartConfig, notifier: Arc<dyn Notifier>) -> Result<Self, GatewayError> {
        let gateway = CartGateway::new(config)?;
        let local_store = LocalCartStore::new(config.profile_dir.clone(), config.retention);
        let cart = load_local_or_empty(&local_store);

        Ok(Self {
            gateway,
            backend: Box::new(LocalCartBackend::new(local_store.clone())),
            local_store,
            session: Session::new(),
            notifier,
            cart,
        })
    }

    /// Current cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.total_items()
    }

    /// Sum of line totals (item price plus accessory prices, each times the
    /// line quantity).
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.cart.total_price()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Add an item to the cart.
    ///
    /// Rejected with a notice (and no backend call) when the size is not
    /// offered, the quantity is zero, or the request exceeds the per-size
    /// stock ceiling. On the local path a duplicate `(product, size)` line
    /// is merged by summing quantities; a merge that would exceed stock is
    /// aborted, leaving prior state unchanged.
    #[instrument(skip(self, product, accessories), fields(product = %product.id, size = %size))]
    pub async fn add_item(
        &mut self,
        product: &Product,
        size: &str,
        quantity: u32,
        accessories: Vec<Accessory>,
    ) {
        if quantity == 0 {
            self.notifier.notify(Notice::InvalidQuantity);
            return;
        }
        if !product.has_size(size) {
            self.notifier.notify(Notice::SizeUnavailable {
                size: size.to_string(),
            });
            return;
        }
        let available = product.stock_for(size);
        if !stock::validate(quantity, 0, available).is_allowed() {
            self.notifier.notify(Notice::InsufficientStock {
                size: size.to_string(),
                available,
            });
            return;
        }

        let line = CartLine {
            product_id: product.id,
            product: product.clone(),
            size: size.to_string(),
            quantity,
            accessories,
        };

        if self.mutate(Mutation::Add(line), Notice::AddFailed).await {
            self.reload().await;
            self.notifier.notify(Notice::Added {
                product: product.name.clone(),
            });
        }
    }

    /// Remove the line for `(productId, size)`.
    #[instrument(skip(self), fields(product = %product_id, size = %size))]
    pub async fn remove_item(&mut self, product_id: ProductId, size: &str) {
        let key = LineKey::new(product_id, size.to_string());
        if self.mutate(Mutation::Remove(key), Notice::RemoveFailed).await {
            self.reload().await;
        }
    }

    /// Set the quantity for `(productId, size)`. A quantity of zero is
    /// equivalent to [`Self::remove_item`].
    #[instrument(skip(self), fields(product = %product_id, size = %size))]
    pub async fn update_quantity(&mut self, product_id: ProductId, size: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, size).await;
            return;
        }
        let key = LineKey::new(product_id, size.to_string());
        if self.mutate(Mutation::Update(key, quantity), Notice::UpdateFailed).await {
            self.reload().await;
        }
    }

    /// Empty the cart. The in-memory view is reset even when the backend
    /// call fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&mut self) {
        self.mutate(Mutation::Clear, Notice::ClearFailed).await;
        self.cart.clear();
    }

    /// Transition `Anonymous -> Authenticated` and reconcile the local cart
    /// into the remote one.
    ///
    /// The remote cart wins unconditionally for any overlapping line; local
    /// lines are then pushed to the server one by one, best-effort. Lines
    /// that fail to sync stay in local storage for a later attempt; once
    /// every line has synced, the local record is deleted. Duplicate
    /// `sign_in` calls while already authenticated are ignored, so
    /// reconciliation runs exactly once per login edge.
    #[instrument(skip(self, token))]
    pub async fn sign_in(&mut self, token: AccessToken) {
        if !self.session.begin_login() {
            debug!("sign_in ignored: session not anonymous");
            return;
        }

        match self.gateway.get_cart(&token).await {
            Ok(remote_lines) => {
                self.session.complete_login(token.clone());
                // Recreate the cart rather than patching it in place, so no
                // caller ever observes a half-reconciled view.
                self.cart = Cart::from_lines(remote_lines);
                self.backend = Box::new(RemoteCartBackend::new(self.gateway.clone(), token.clone()));
                self.reconcile(&token).await;
            }
            Err(GatewayError::Unauthorized) => {
                debug!("token rejected at login, staying on local cart");
                self.session.fail_login();
            }
            Err(e) => {
                warn!(error = %e, "failed to load remote cart at login");
                self.session.fail_login();
                self.notifier.notify(Notice::LoadFailed);
            }
        }
    }

    /// Transition back to anonymous mode. The local record is re-read
    /// (empty unless something was written earlier); the remote cart is
    /// left untouched on the server and disappears from this client.
    #[instrument(skip(self))]
    pub async fn log_out(&mut self) {
        if !self.session.logout() {
            return;
        }
        self.switch_to_local();
    }

    /// Re-read the active backend, e.g. after an external change signal.
    pub async fn refresh(&mut self) {
        self.reload().await;
    }

    /// Subscribe to external writes of the local cart record (another
    /// client sharing this profile directory).
    ///
    /// # Errors
    ///
    /// Returns error if the file watcher cannot be installed.
    pub fn watch_external(&self) -> Result<CartWatcher, StorageError> {
        self.local_store.watch()
    }

    /// Push every locally persisted line to the remote cart, then reload.
    async fn reconcile(&mut self, token: &AccessToken) {
        let local_lines = match self.local_store.load() {
            Ok(lines) => lines,
            Err(e) => {
                warn!(error = %e, "cannot read local cart for reconciliation");
                return;
            }
        };
        if local_lines.is_empty() {
            return;
        }

        let mut failed = Vec::new();
        for line in local_lines {
            let result = self
                .gateway
                .add_line(
                    token,
                    line.product_id,
                    &line.size,
                    line.quantity,
                    &line.accessories,
                )
                .await;
            if let Err(e) = result {
                warn!(key = %line.key(), error = %e, "failed to sync local cart line");
                failed.push(line);
            }
        }

        // Keep only unsynced lines locally; an empty save deletes the
        // record, so a second reconciliation finds nothing to do.
        if let Err(e) = self.local_store.save(&failed) {
            warn!(error = %e, "failed to rewrite local cart after sync");
        }

        self.reload().await;
    }

    /// Run one mutation against the active backend, retrying once against
    /// the local backend when the remote side rejects the token.
    async fn mutate(&mut self, mutation: Mutation, failure: Notice) -> bool {
        match self.apply(&mutation).await {
            Ok(done) => done,
            Err(e) if e.is_unauthorized() => {
                debug!("token rejected by cart API, switching to local cart");
                self.session.logout();
                self.switch_to_local();
                match self.apply(&mutation).await {
                    Ok(done) => done,
                    Err(e) => {
                        warn!(error = %e, "cart mutation failed");
                        self.notifier.notify(failure);
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "cart mutation failed");
                self.notifier.notify(failure);
                false
            }
        }
    }

    /// Execute one mutation. `Ok(false)` means a validation stopped it and
    /// the user has already been notified.
    async fn apply(&mut self, mutation: &Mutation) -> Result<bool, CartError> {
        match mutation {
            Mutation::Add(line) => {
                // The server owns duplicate-merge stock semantics on the
                // remote path; locally the merged quantity is checked here,
                // against the ceiling in the line's own snapshot.
                if !self.session.is_authenticated() {
                    let existing = self.cart.get(&line.key()).map_or(0, |l| l.quantity);
                    if existing > 0 {
                        let available = line.product.stock_for(&line.size);
                        if let StockDecision::Rejected { .. } =
                            stock::validate(line.quantity, existing, available)
                        {
                            self.notifier.notify(Notice::StockCeilingReached {
                                size: line.size.clone(),
                                available,
                            });
                            return Ok(false);
                        }
                    }
                }
                self.backend.add(line.clone()).await?;
                Ok(true)
            }
            Mutation::Update(key, quantity) => {
                self.backend.update_quantity(key, *quantity).await?;
                Ok(true)
            }
            Mutation::Remove(key) => {
                self.backend.remove(key).await?;
                Ok(true)
            }
            Mutation::Clear => {
                self.backend.clear().await?;
                Ok(true)
            }
        }
    }

    /// Replace the in-memory cart with a fresh backend load. A failed
    /// reload keeps the last-known-good view.
    async fn reload(&mut self) {
        match self.backend.load().await {
            Ok(lines) => self.cart = Cart::from_lines(lines),
            Err(e) if e.is_unauthorized() => {
                debug!("token rejected on reload, switching to local cart");
                self.session.logout();
                self.switch_to_local();
            }
            Err(e) => {
                warn!(error = %e, "failed to reload cart, keeping stale view");
                self.notifier.notify(Notice::LoadFailed);
            }
        }
    }

    fn switch_to_local(&mut self) {
        self.backend = Box::new(LocalCartBackend::new(self.local_store.clone()));
        self.cart = load_local_or_empty(&self.local_store);
    }
}

fn load_local_or_empty(store: &LocalCartStore) -> Cart {
    match store.load() {
        Ok(lines) => Cart::from_lines(lines),
        Err(e) => {
            warn!(error = %e, "failed to read local cart, starting empty");
            Cart::new()
        }
    }
}
