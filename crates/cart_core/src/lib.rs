use chrono::{DateTime, Utc};
use shared::domain::{parse_quantity, Cart, ItemId, EMPTY_TOTAL};
use storage::{CartStore, CorruptCart, KeyValueStore};
use tracing::{error, info, warn};

pub mod catalog;
pub mod error;
pub mod render;

pub use catalog::{CatalogSource, HttpCatalog, StaticCatalog, UnavailableCatalog};
pub use error::{CartError, Notice, NoticeLevel};
pub use render::{CartRow, CartSummary, CartView, Renderer};

pub type Result<T, E = CartError> = std::result::Result<T, E>;

/// Where the view shown after initialization came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOrigin {
    /// Storage was empty; the fetched catalog was shown and persisted.
    Catalog,
    /// A non-empty stored cart took precedence over the fetched catalog.
    Stored,
    /// The catalog could not be fetched; nothing was rendered.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantityChange {
    pub id: ItemId,
    pub quantity: u32,
    pub subtotal: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub total: String,
    pub line_count: usize,
    pub completed_at: DateTime<Utc>,
}

impl CheckoutReceipt {
    pub fn notice(&self, currency_symbol: &str) -> Notice {
        Notice::info(format!(
            "Checkout successful! Total: {currency_symbol}{}",
            self.total
        ))
    }
}

/// The cart widget: owns the current view and routes user actions to the
/// injected store. Every action re-reads the stored cart before mutating it.
pub struct CartWidget<S, C> {
    store: CartStore<S>,
    catalog: C,
    renderer: Renderer,
    view: CartView,
}

impl<S: KeyValueStore, C: CatalogSource> CartWidget<S, C> {
    pub fn new(store: CartStore<S>, catalog: C) -> Self {
        Self::with_renderer(store, catalog, Renderer::default())
    }

    pub fn with_renderer(store: CartStore<S>, catalog: C, renderer: Renderer) -> Self {
        Self {
            store,
            catalog,
            renderer,
            view: CartView::default(),
        }
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Translates a rendered row position into the item it shows.
    pub fn item_id_at(&self, index: usize) -> Option<ItemId> {
        self.view.id_at(index)
    }

    /// Page-load sequence: fetch the catalog once, then show the stored cart
    /// if it holds anything, otherwise show and persist the catalog.
    pub async fn initialize(&mut self) -> CartOrigin {
        let products = match self.catalog.fetch_items().await {
            Ok(products) => products,
            Err(err) => {
                error!("cart: error fetching products: {err:#}");
                return CartOrigin::Unavailable;
            }
        };
        info!(count = products.len(), "cart: catalog fetched");

        let stored = match self.store.load().await {
            Ok(stored) => stored,
            Err(err) if err.is::<CorruptCart>() => {
                warn!("cart: ignoring unreadable stored cart: {err:#}");
                None
            }
            Err(err) => {
                error!("cart: failed to read stored cart: {err:#}");
                None
            }
        };

        match stored {
            Some(cart) if !cart.is_empty() => {
                info!(items = cart.len(), "cart: restored stored cart");
                self.view = self.renderer.render(&cart);
                CartOrigin::Stored
            }
            _ => {
                let cart = Cart::new(products);
                self.view = self.renderer.render(&cart);
                if let Err(err) = self.store.save(&cart).await {
                    error!("cart: failed to persist fetched catalog: {err:#}");
                }
                CartOrigin::Catalog
            }
        }
    }

    /// Applies raw quantity input to one item. Rejected input restores the
    /// displayed quantity to 1 and leaves storage and subtotals untouched.
    pub async fn change_quantity(&mut self, id: ItemId, input: &str) -> Result<QuantityChange> {
        let quantity = match parse_quantity(input) {
            Ok(quantity) => quantity,
            Err(err) => {
                if let Some(row) = self.view.row_mut(id) {
                    row.quantity = 1;
                }
                return Err(err.into());
            }
        };

        let mut cart = self.load_cart().await?;
        let item = cart.get_mut(id).ok_or(CartError::ItemNotFound(id))?;
        item.quantity = quantity;
        let subtotal = self.renderer.money(item.subtotal());
        self.store.save(&cart).await.map_err(CartError::from_storage)?;

        if let Some(row) = self.view.row_mut(id) {
            row.quantity = quantity;
            row.subtotal = subtotal.clone();
        }
        self.view.summary = self.renderer.summary(&cart);
        info!(item_id = %id, quantity, "cart: quantity updated");

        Ok(QuantityChange {
            id,
            quantity,
            subtotal,
            total: self.view.summary.total.clone(),
        })
    }

    /// Drops one item and re-renders every row.
    pub async fn remove_item(&mut self, id: ItemId) -> Result<&CartView> {
        let mut cart = self.load_cart().await?;
        let removed = cart.remove(id).ok_or(CartError::ItemNotFound(id))?;
        self.store.save(&cart).await.map_err(CartError::from_storage)?;
        info!(item_id = %id, title = %removed.title, "cart: item removed");

        self.view = self.renderer.render(&cart);
        Ok(&self.view)
    }

    /// Completes the purchase shown on screen. A displayed total of `0.00`
    /// counts as an empty cart and changes nothing.
    pub async fn checkout(&mut self) -> Result<CheckoutReceipt> {
        if self.view.total() == EMPTY_TOTAL {
            return Err(CartError::EmptyCart);
        }

        let receipt = CheckoutReceipt {
            total: self.view.total().to_string(),
            line_count: self.view.rows.len(),
            completed_at: Utc::now(),
        };
        self.store.clear().await.map_err(CartError::from_storage)?;
        self.view = self.renderer.render(&Cart::default());
        info!(total = %receipt.total, lines = receipt.line_count, "cart: checkout complete");
        Ok(receipt)
    }

    async fn load_cart(&self) -> Result<Cart> {
        Ok(self
            .store
            .load()
            .await
            .map_err(CartError::from_storage)?
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
