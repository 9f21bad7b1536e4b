use anyhow::{anyhow, Context, Result};
use cart_core::{
    CartError, CartView, CartWidget, CatalogSource, HttpCatalog, Notice, NoticeLevel, Renderer,
    UnavailableCatalog,
};
use clap::{Parser, Subcommand};
use shared::domain::ItemId;
use storage::{CartStore, KeyValueStore, Storage};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url, validate_catalog_url};

#[derive(Parser, Debug)]
#[command(name = "cart", about = "Shopping cart kept in local storage")]
struct Cli {
    #[arg(long)]
    catalog_url: Option<String>,
    #[arg(long)]
    database_url: Option<String>,
    #[arg(long)]
    storage_key: Option<String>,
    /// Skip the catalog fetch, as if the network were unreachable.
    #[arg(long)]
    offline: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored cart text as persisted.
    Raw,
    #[command(flatten)]
    Action(Action),
}

/// Commands that run against the initialized widget.
#[derive(Subcommand, Debug)]
enum Action {
    /// Print the cart rows and totals.
    Show,
    /// Print the cart table markup.
    Html,
    /// Set the quantity of the item at a row index or with an item id.
    SetQuantity {
        item: String,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove the item at a row index or with an item id.
    Remove { item: String },
    Checkout,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(v) = cli.catalog_url {
        settings.catalog_url = v;
    }
    if let Some(v) = cli.database_url {
        settings.database_url = v;
    }
    if let Some(v) = cli.storage_key {
        settings.storage_key = v;
    }

    let storage = Storage::new(&normalize_database_url(&settings.database_url)).await?;
    let store = CartStore::with_key(storage, settings.storage_key.clone());

    let action = match cli.command.unwrap_or(Command::Action(Action::Show)) {
        Command::Raw => {
            match store.raw().await? {
                Some(raw) => println!("{raw}"),
                None => println!("(no cart stored under '{}')", store.key()),
            }
            return Ok(());
        }
        Command::Action(action) => action,
    };

    let catalog: Box<dyn CatalogSource> = if cli.offline {
        Box::new(UnavailableCatalog)
    } else {
        let url = validate_catalog_url(&settings.catalog_url)?;
        Box::new(HttpCatalog::new(url.as_str()))
    };

    let renderer = Renderer::new(settings.currency_symbol.clone());
    let mut widget = CartWidget::with_renderer(store, catalog, renderer);
    let origin = widget.initialize().await;
    info!(?origin, "cart: page loaded");

    let outcome = match action {
        Action::Show => {
            print_view(widget.view(), widget.renderer().currency_symbol());
            Ok(())
        }
        Action::Html => {
            print!("{}", widget.view().page_html());
            Ok(())
        }
        Action::SetQuantity { item, quantity } => {
            let id = resolve_item(&widget, &item)?;
            widget
                .change_quantity(id, &quantity)
                .await
                .map(|_| print_view(widget.view(), widget.renderer().currency_symbol()))
        }
        Action::Remove { item } => {
            let id = resolve_item(&widget, &item)?;
            let symbol = widget.renderer().currency_symbol().to_string();
            widget
                .remove_item(id)
                .await
                .map(|view| print_view(view, &symbol))
        }
        Action::Checkout => {
            let symbol = widget.renderer().currency_symbol().to_string();
            widget
                .checkout()
                .await
                .map(|receipt| report(&receipt.notice(&symbol)))
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(err @ (CartError::InvalidQuantity(_) | CartError::EmptyCart)) => {
            report(&Notice::from(&err));
            Ok(())
        }
        Err(err) => {
            report(&Notice::from(&err));
            Err(err.into())
        }
    }
}

fn resolve_item<S: KeyValueStore, C: CatalogSource>(
    widget: &CartWidget<S, C>,
    selector: &str,
) -> Result<ItemId> {
    if let Ok(index) = selector.trim().parse::<usize>() {
        return widget
            .item_id_at(index)
            .ok_or_else(|| anyhow!("no cart row at index {index}"));
    }
    selector
        .parse::<ItemId>()
        .with_context(|| format!("'{selector}' is neither a row index nor an item id"))
}

fn print_view(view: &CartView, currency_symbol: &str) {
    if view.is_empty() {
        println!("(cart is empty)");
    }
    for row in &view.rows {
        println!(
            "{:>3}  {:<32} {:>10} x{:<4} {:>12}  {}",
            row.index, row.title, row.unit_price, row.quantity, row.subtotal, row.id
        );
    }
    println!("Subtotal: {currency_symbol}{}", view.summary.subtotal);
    println!("Total:    {currency_symbol}{}", view.summary.total);
}

fn report(notice: &Notice) {
    let label = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warning",
        NoticeLevel::Error => "error",
    };
    eprintln!("{label}: {}", notice.message);
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
