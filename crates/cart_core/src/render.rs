//! Projection of a cart into table rows and summary totals, plus the HTML the
//! `#items-list` table body is filled with.

use std::fmt::Write as _;

use shared::domain::{
    format_amount, Cart, CartItem, ItemId, DEFAULT_CURRENCY_SYMBOL, EMPTY_TOTAL,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRow {
    pub index: usize,
    pub id: ItemId,
    pub title: String,
    pub image: String,
    pub unit_price: String,
    pub quantity: u32,
    pub subtotal: String,
}

/// Values of the `#subtotal` and `#total` slots. Both carry the same figure,
/// without currency prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSummary {
    pub subtotal: String,
    pub total: String,
}

impl Default for CartSummary {
    fn default() -> Self {
        Self {
            subtotal: EMPTY_TOTAL.to_string(),
            total: EMPTY_TOTAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartView {
    pub rows: Vec<CartRow>,
    pub summary: CartSummary,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> &str {
        &self.summary.total
    }

    pub fn row(&self, id: ItemId) -> Option<&CartRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn id_at(&self, index: usize) -> Option<ItemId> {
        self.rows.get(index).map(|row| row.id)
    }

    pub(crate) fn row_mut(&mut self, id: ItemId) -> Option<&mut CartRow> {
        self.rows.iter_mut().find(|row| row.id == id)
    }

    /// `<tbody>` contents for `#items-list`.
    pub fn tbody_html(&self) -> String {
        let mut html = String::from("<tbody>\n");
        for row in &self.rows {
            write_row_html(&mut html, row);
        }
        html.push_str("</tbody>");
        html
    }

    /// Cart table, summary slots and checkout control.
    pub fn page_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<table id=\"items-list\" class=\"cart-table\">\n");
        html.push_str(
            "<thead><tr><th>Product</th><th>Price</th><th>Quantity</th><th>Subtotal</th><th></th></tr></thead>\n",
        );
        html.push_str(&self.tbody_html());
        html.push_str("\n</table>\n");
        let _ = write!(
            html,
            "<div class=\"cart-totals\">\n  <p>Subtotal: <span id=\"subtotal\">{}</span></p>\n  <p>Total: <span id=\"total\">{}</span></p>\n  <button id=\"checkout-btn\">Check Out</button>\n</div>\n",
            escape_html(&self.summary.subtotal),
            escape_html(&self.summary.total),
        );
        html
    }
}

fn write_row_html(html: &mut String, row: &CartRow) {
    let id = row.id.to_string();
    let _ = write!(
        html,
        concat!(
            "<tr data-id=\"{id}\">\n",
            "  <td>\n",
            "    <img src=\"{image}\" alt=\"{title}\" class=\"product-image\">\n",
            "    <span>{title}</span>\n",
            "  </td>\n",
            "  <td>{price}</td>\n",
            "  <td>\n",
            "    <input type=\"number\" min=\"1\" value=\"{quantity}\" data-index=\"{index}\" data-id=\"{id}\" class=\"quantity-input\">\n",
            "  </td>\n",
            "  <td class=\"subtotal\">{subtotal}</td>\n",
            "  <td>\n",
            "    <button class=\"remove-button\" data-index=\"{index}\" data-id=\"{id}\"><i class=\"fas fa-trash\"></i></button>\n",
            "  </td>\n",
            "</tr>\n",
        ),
        id = id,
        image = escape_html(&row.image),
        title = escape_html(&row.title),
        price = escape_html(&row.unit_price),
        quantity = row.quantity,
        index = row.index,
        subtotal = escape_html(&row.subtotal),
    );
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct Renderer {
    currency_symbol: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl Renderer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    /// Replaces every row: one per item, in cart order.
    pub fn render(&self, cart: &Cart) -> CartView {
        CartView {
            rows: cart
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| self.row(index, item))
                .collect(),
            summary: self.summary(cart),
        }
    }

    pub fn row(&self, index: usize, item: &CartItem) -> CartRow {
        CartRow {
            index,
            id: item.id,
            title: item.title.clone(),
            image: item.image.clone(),
            unit_price: format!("{}{}", self.currency_symbol, item.price),
            quantity: item.quantity,
            subtotal: self.money(item.subtotal()),
        }
    }

    /// Total from the numeric model, rounded once.
    pub fn summary(&self, cart: &Cart) -> CartSummary {
        let total = format_amount(cart.total());
        CartSummary {
            subtotal: total.clone(),
            total,
        }
    }

    pub fn money(&self, amount: f64) -> String {
        format!("{}{}", self.currency_symbol, format_amount(amount))
    }

    /// Total obtained by adding up the already rounded subtotal texts of the
    /// rendered rows. Can differ from [`Renderer::summary`] by fractions of a
    /// currency unit.
    pub fn text_summed_total(&self, view: &CartView) -> String {
        let total: f64 = view
            .rows
            .iter()
            .filter_map(|row| {
                row.subtotal
                    .trim_start_matches(self.currency_symbol.as_str())
                    .parse::<f64>()
                    .ok()
            })
            .sum();
        format_amount(total)
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
