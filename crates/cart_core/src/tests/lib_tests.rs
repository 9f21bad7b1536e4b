use super::*;
use shared::{
    domain::CartItem,
    error::{ErrorCode, QuantityError},
    protocol::CatalogRecord,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use storage::{MemoryStorage, DEFAULT_CART_KEY};

fn record(title: &str, price: f64, quantity: u32, image: &str) -> CatalogRecord {
    CatalogRecord {
        title: title.to_string(),
        price,
        quantity,
        image: image.to_string(),
    }
}

fn scenario_catalog() -> StaticCatalog {
    StaticCatalog::new(vec![record("A", 10.0, 1, "x"), record("B", 5.5, 2, "y")])
}

struct CountingCatalog {
    inner: StaticCatalog,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl CatalogSource for CountingCatalog {
    async fn fetch_items(&self) -> anyhow::Result<Vec<CartItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_items().await
    }
}

async fn initialized_widget() -> (CartWidget<MemoryStorage, StaticCatalog>, MemoryStorage) {
    let backend = MemoryStorage::new();
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), scenario_catalog());
    assert_eq!(widget.initialize().await, CartOrigin::Catalog);
    (widget, backend)
}

async fn stored_cart(backend: &MemoryStorage) -> Cart {
    CartStore::new(backend.clone())
        .load()
        .await
        .expect("load")
        .expect("stored cart")
}

#[tokio::test]
async fn empty_storage_shows_and_persists_catalog() {
    let (widget, backend) = initialized_widget().await;
    let view = widget.view();

    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].subtotal, "₹10.00");
    assert_eq!(view.rows[1].subtotal, "₹11.00");
    assert_eq!(view.total(), "21.00");

    let stored = stored_cart(&backend).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.items()[0].title, "A");
    assert_eq!(stored.items()[0].quantity, 1);
    assert_eq!(stored.items()[1].title, "B");
    assert_eq!(stored.items()[1].quantity, 2);
    assert_eq!(stored.items()[1].id, view.rows[1].id);
}

#[tokio::test]
async fn stored_cart_wins_over_fetched_catalog() {
    let backend = MemoryStorage::new();
    let stored = Cart::new(vec![CartItem::new("Kept", 3.0, 4, "k")]);
    CartStore::new(backend.clone())
        .save(&stored)
        .await
        .expect("seed");

    let calls = Arc::new(AtomicUsize::new(0));
    let catalog = CountingCatalog {
        inner: scenario_catalog(),
        calls: calls.clone(),
    };
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), catalog);

    assert_eq!(widget.initialize().await, CartOrigin::Stored);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(widget.view().rows.len(), 1);
    assert_eq!(widget.view().rows[0].title, "Kept");
    assert_eq!(widget.view().total(), "12.00");
    assert_eq!(stored_cart(&backend).await, stored);
}

#[tokio::test]
async fn stored_empty_array_is_replaced_by_catalog() {
    let backend = MemoryStorage::new();
    backend.set_item(DEFAULT_CART_KEY, "[]").await.expect("seed");
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), scenario_catalog());

    assert_eq!(widget.initialize().await, CartOrigin::Catalog);
    assert_eq!(stored_cart(&backend).await.len(), 2);
}

#[tokio::test]
async fn corrupt_storage_is_treated_as_no_cart_on_load() {
    let backend = MemoryStorage::new();
    backend
        .set_item(DEFAULT_CART_KEY, "definitely not json")
        .await
        .expect("seed");
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), scenario_catalog());

    assert_eq!(widget.initialize().await, CartOrigin::Catalog);
    assert_eq!(widget.view().total(), "21.00");
    assert_eq!(stored_cart(&backend).await.len(), 2);
}

#[tokio::test]
async fn fetch_failure_renders_nothing_and_keeps_storage() {
    let backend = MemoryStorage::new();
    let stored = Cart::new(vec![CartItem::new("Kept", 3.0, 4, "k")]);
    CartStore::new(backend.clone())
        .save(&stored)
        .await
        .expect("seed");
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), UnavailableCatalog);

    assert_eq!(widget.initialize().await, CartOrigin::Unavailable);
    assert!(widget.view().is_empty());
    assert_eq!(widget.view().total(), "0.00");
    assert_eq!(stored_cart(&backend).await, stored);
}

#[tokio::test]
async fn quantity_edit_updates_row_total_and_storage() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");
    let second_before = widget.view().rows[1].clone();

    let change = widget.change_quantity(first, "3").await.expect("change");

    assert_eq!(change.quantity, 3);
    assert_eq!(change.subtotal, "₹30.00");
    assert_eq!(change.total, "41.00");
    assert_eq!(widget.view().rows[0].subtotal, "₹30.00");
    assert_eq!(widget.view().rows[0].quantity, 3);
    assert_eq!(widget.view().rows[1], second_before);
    assert_eq!(widget.view().total(), "41.00");
    assert_eq!(widget.view().summary.subtotal, "41.00");
    assert_eq!(stored_cart(&backend).await.items()[0].quantity, 3);
}

#[tokio::test]
async fn fractional_quantity_input_keeps_its_integer_part() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");

    let change = widget.change_quantity(first, "2.0").await.expect("2.0");
    assert_eq!(change.quantity, 2);
    assert_eq!(change.subtotal, "₹20.00");
    assert_eq!(stored_cart(&backend).await.items()[0].quantity, 2);

    let change = widget.change_quantity(first, "3.5").await.expect("3.5");
    assert_eq!(change.quantity, 3);
    assert_eq!(widget.view().total(), "41.00");
    assert_eq!(stored_cart(&backend).await.items()[0].quantity, 3);
}

#[tokio::test]
async fn stored_cart_with_float_quantities_is_restored() {
    let backend = MemoryStorage::new();
    backend
        .set_item(
            DEFAULT_CART_KEY,
            r#"[{"title":"Old","price":4,"quantity":2.0,"image":"o"}]"#,
        )
        .await
        .expect("seed");

    let mut widget = CartWidget::new(CartStore::new(backend.clone()), scenario_catalog());
    assert_eq!(widget.initialize().await, CartOrigin::Stored);
    assert_eq!(widget.view().rows[0].quantity, 2);
    assert_eq!(widget.view().total(), "8.00");
}

#[tokio::test]
async fn quantity_below_one_is_rejected_without_persisting() {
    let (mut widget, backend) = initialized_widget().await;
    let second = widget.item_id_at(1).expect("second row");

    let err = widget
        .change_quantity(second, "0")
        .await
        .expect_err("rejected");

    assert!(matches!(
        err,
        CartError::InvalidQuantity(QuantityError::BelowMinimum { value: 0 })
    ));
    assert_eq!(err.to_string(), "Quantity cannot be less than 1");
    let row = widget.view().row(second).expect("row");
    assert_eq!(row.quantity, 1);
    assert_eq!(row.subtotal, "₹11.00");
    assert_eq!(widget.view().total(), "21.00");
    assert_eq!(stored_cart(&backend).await.items()[1].quantity, 2);

    let notice = Notice::from(&err);
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.code, Some(ErrorCode::Validation));
}

#[tokio::test]
async fn non_numeric_quantity_is_rejected() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");

    let err = widget
        .change_quantity(first, "lots")
        .await
        .expect_err("rejected");

    assert!(matches!(
        err,
        CartError::InvalidQuantity(QuantityError::NotANumber { .. })
    ));
    assert_eq!(widget.view().rows[0].quantity, 1);
    assert_eq!(stored_cart(&backend).await.items()[0].quantity, 1);
}

#[tokio::test]
async fn quantity_edit_for_unknown_item_fails() {
    let (mut widget, backend) = initialized_widget().await;
    let before = stored_cart(&backend).await;
    let missing = ItemId::new();

    let err = widget
        .change_quantity(missing, "2")
        .await
        .expect_err("unknown item");
    assert!(matches!(err, CartError::ItemNotFound(id) if id == missing));
    assert_eq!(stored_cart(&backend).await, before);
}

#[tokio::test]
async fn handlers_surface_corrupt_storage() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");
    backend
        .set_item(DEFAULT_CART_KEY, "{\"broken\":")
        .await
        .expect("corrupt");

    let err = widget
        .change_quantity(first, "2")
        .await
        .expect_err("corrupt");
    assert!(matches!(err, CartError::CorruptCart(_)));
    assert_eq!(err.code(), ErrorCode::CorruptState);

    let err = widget.remove_item(first).await.expect_err("corrupt");
    assert!(matches!(err, CartError::CorruptCart(_)));
}

#[tokio::test]
async fn handlers_reread_storage_before_mutating() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");

    let mut external = stored_cart(&backend).await;
    external.get_mut(first).expect("item").price = 2.0;
    CartStore::new(backend.clone())
        .save(&external)
        .await
        .expect("external write");

    let change = widget.change_quantity(first, "4").await.expect("change");
    assert_eq!(change.subtotal, "₹8.00");
    assert_eq!(change.total, "19.00");
}

#[tokio::test]
async fn removing_an_item_reindexes_later_rows() {
    let (mut widget, backend) = initialized_widget().await;
    let first = widget.item_id_at(0).expect("first row");
    let second = widget.item_id_at(1).expect("second row");
    widget.change_quantity(first, "3").await.expect("change");

    let view = widget.remove_item(first).await.expect("remove");

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].id, second);
    assert_eq!(view.rows[0].index, 0);
    assert_eq!(view.rows[0].title, "B");
    assert_eq!(view.total(), "11.00");

    let stored = stored_cart(&backend).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.items()[0].id, second);

    let err = widget.remove_item(first).await.expect_err("already gone");
    assert!(matches!(err, CartError::ItemNotFound(_)));
}

#[tokio::test]
async fn checkout_clears_storage_and_view() {
    let (mut widget, backend) = initialized_widget().await;

    let receipt = widget.checkout().await.expect("checkout");

    assert_eq!(receipt.total, "21.00");
    assert_eq!(receipt.line_count, 2);
    assert_eq!(
        receipt.notice("₹").message,
        "Checkout successful! Total: ₹21.00"
    );
    assert!(widget.view().is_empty());
    assert_eq!(widget.view().total(), "0.00");
    assert!(backend
        .get_item(DEFAULT_CART_KEY)
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn checkout_of_empty_cart_changes_nothing() {
    let backend = MemoryStorage::new();
    let stored = Cart::new(vec![CartItem::new("Kept", 3.0, 4, "k")]);
    CartStore::new(backend.clone())
        .save(&stored)
        .await
        .expect("seed");
    // Nothing rendered because the catalog was unreachable.
    let mut widget = CartWidget::new(CartStore::new(backend.clone()), UnavailableCatalog);
    widget.initialize().await;

    let err = widget.checkout().await.expect_err("empty");
    assert!(matches!(err, CartError::EmptyCart));
    assert_eq!(Notice::from(&err).message, "Your cart is empty!");
    assert_eq!(stored_cart(&backend).await, stored);
}

#[tokio::test]
async fn second_checkout_reports_empty_cart() {
    let (mut widget, _backend) = initialized_widget().await;
    widget.checkout().await.expect("first checkout");
    let err = widget.checkout().await.expect_err("second checkout");
    assert!(matches!(err, CartError::EmptyCart));
}
