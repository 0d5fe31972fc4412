//! Response projections and derived totals.
//!
//! Everything the API returns is shaped here, away from the handlers, so the
//! visibility rules live in one place. The one that matters: customer
//! projections never carry the stored password, account-centric projections
//! do. That asymmetry is part of the API contract.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use greengrocer_core::types::price::format_currency;
use greengrocer_core::{CustomerId, Email, OrderId, Phone, ProductId};

use crate::models::{Customer, CustomerAccount, LineItem, Order, Product};

/// The `account` field of a customer-shaped projection.
///
/// Serializes untagged: `{}` when absent, `{"username": ...}` on customer
/// endpoints, `{"username": ..., "password": ...}` on account endpoints.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AccountView {
    /// Customer has no account.
    Absent {},
    /// Password omitted.
    Summary {
        /// Account username.
        username: String,
    },
    /// Password shown; only the account-centric endpoints build this.
    WithSecret {
        /// Account username.
        username: String,
        /// Stored password.
        password: String,
    },
}

/// Customer projection: `{id, name, email, phone, account}`.
#[derive(Debug, Serialize)]
pub struct CustomerView {
    pub id: CustomerId,
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub account: AccountView,
}

impl CustomerView {
    /// Customer-endpoint shape: the account, if any, shows only its username.
    #[must_use]
    pub fn hidden(customer: Customer, account: Option<CustomerAccount>) -> Self {
        let account = account.map_or(AccountView::Absent {}, |a| AccountView::Summary {
            username: a.username,
        });
        Self::with_account(customer, account)
    }

    /// Account-endpoint shape: username and password both shown.
    #[must_use]
    pub fn revealed(customer: Customer, account: CustomerAccount) -> Self {
        Self::with_account(
            customer,
            AccountView::WithSecret {
                username: account.username,
                password: account.password,
            },
        )
    }

    fn with_account(customer: Customer, account: AccountView) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            account,
        }
    }
}

/// Product projection: `{id, name, price}` with the price rendered `$X.XX`.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price.display(),
        }
    }
}

/// One line item within an order projection.
#[derive(Debug, Serialize)]
pub struct LineItemView {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: String,
    pub quantity: i32,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            product_name: item.product_name.clone(),
            price: item.price.display(),
            quantity: item.quantity,
        }
    }
}

/// Order projection with joined customer fields, line items, and total.
#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub date: NaiveDate,
    pub customer_name: String,
    pub email: Email,
    pub phone: Phone,
    pub products: Vec<LineItemView>,
    pub order_total: String,
}

/// Sum of `price * quantity` over line items, in decimal arithmetic.
#[must_use]
pub fn order_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(|item| item.price.amount() * Decimal::from(item.quantity))
        .sum()
}

/// Build an [`OrderView`] from an order, its customer, and its line items.
#[must_use]
pub fn order_view(order: Order, customer: Customer, items: &[LineItem]) -> OrderView {
    OrderView {
        id: order.id,
        date: order.date,
        customer_name: customer.name,
        email: customer.email,
        phone: customer.phone,
        products: items.iter().map(LineItemView::from).collect(),
        order_total: format_currency(order_total(items)),
    }
}

/// Build [`OrderView`]s for many orders from one batched line-item fetch.
///
/// Input order is preserved; orders without line items get an empty product
/// list and a `$0.00` total.
#[must_use]
pub fn order_views(
    orders: Vec<(Order, Customer)>,
    lines: Vec<(OrderId, LineItem)>,
) -> Vec<OrderView> {
    let mut by_order: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
    for (order_id, item) in lines {
        by_order.entry(order_id).or_default().push(item);
    }

    orders
        .into_iter()
        .map(|(order, customer)| {
            let items = by_order.remove(&order.id).unwrap_or_default();
            order_view(order, customer, &items)
        })
        .collect()
}
