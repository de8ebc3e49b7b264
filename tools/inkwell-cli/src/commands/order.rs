//! Back-office order commands.

use anyhow::{Context as _, Result};
use inkwell_commerce::prelude::*;

use super::{resolve_order, resolve_user, OrderArgs, OrderCommand};
use crate::context::Context;
use crate::output::status_badge;

/// Run the order command.
pub async fn run(args: OrderArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;
    match args.command {
        OrderCommand::List {
            status,
            user,
            page,
            limit,
        } => list_orders(&shop, status, user, page, limit, ctx),
        OrderCommand::Show { order } => show_order(&shop, &order, ctx),
        OrderCommand::Status { order, status } => change_status(&shop, &order, &status, ctx),
    }
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    OrderStatus::from_str(raw).with_context(|| {
        let known: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
        format!("Unknown status \"{raw}\", expected one of: {}", known.join(", "))
    })
}

fn list_orders(
    shop: &Shop,
    status: Option<String>,
    user: Option<String>,
    page: usize,
    limit: usize,
    ctx: &Context,
) -> Result<()> {
    let query = OrderQuery {
        status: status.as_deref().map(parse_status).transpose()?,
        user: match user {
            Some(key) => Some(resolve_user(shop, &key)?.id),
            None => None,
        },
        order_number: None,
        page: PageSettings::new(page, limit),
    };
    let orders = shop.orders();
    let found = orders.list(&query)?;

    if ctx.output.is_json() {
        let views = found
            .items
            .iter()
            .map(|order| orders.view(order))
            .collect::<Result<Vec<_>, _>>()?;
        ctx.output.json(&views);
        return Ok(());
    }

    ctx.output.header(&format!(
        "Orders (page {} of {}, {} total)",
        found.page + 1,
        found.total_pages.max(1),
        found.total_count
    ));
    if found.items.is_empty() {
        ctx.output.info("No orders found");
        return Ok(());
    }

    let widths = [6, 24, 12, 28];
    ctx.output
        .table_row(&["#", "Customer", "To pay", "Status"], &widths);
    for order in &found.items {
        let view = orders.view(order)?;
        let customer = format!("{} {}", view.shipping.first_name, view.shipping.last_name);
        ctx.output.table_row(
            &[
                view.order_number.to_string().as_str(),
                customer.as_str(),
                view.final_sum_with_discounts.as_str(),
                status_badge(view.status).as_str(),
            ],
            &widths,
        );
    }
    Ok(())
}

fn print_order(view: &OrderView, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(view);
        return;
    }

    ctx.output.header(&format!("Order #{}", view.order_number));
    ctx.output.kv("id", view.id.as_str());
    ctx.output.kv("status", &status_badge(view.status));
    ctx.output.kv("created", &view.created_at);
    ctx.output.kv(
        "customer",
        &format!(
            "{} {} <{}> {}",
            view.shipping.first_name, view.shipping.last_name, view.shipping.email, view.shipping.phone
        ),
    );
    ctx.output.kv(
        "delivery",
        view.delivery_name.as_deref().unwrap_or(view.delivery.as_str()),
    );
    let address = &view.shipping.address;
    let place = [
        Some(address.city.as_str()),
        Some(address.region.as_str()),
        address.street.as_deref(),
        address.warehouse.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(", ");
    ctx.output.kv("address", &place);
    if let Some(link) = &view.tracking_link {
        ctx.output.kv("tracking", link);
    } else if let Some(number) = &view.tracking_number {
        ctx.output.kv("tracking", number);
    }
    let paid = if view.is_paid {
        "paid"
    } else if view.is_partly_paid {
        "partly paid"
    } else {
        "not paid"
    };
    ctx.output.kv("payment", paid);

    ctx.output.info("");
    for line in &view.books {
        ctx.output.list_item(&format!(
            "{} x{} @ {} = {}",
            line.name, line.count, line.price, line.total
        ));
    }
    for bundle in &view.group_discounts {
        ctx.output.list_item(&format!(
            "Set {} x{} (-{}%) = {}",
            bundle.group_discount, bundle.count, bundle.discount, bundle.total_with_discount
        ));
    }
    ctx.output.info("");
    ctx.output.kv("sum", &view.final_sum);
    ctx.output.kv("to pay", &view.final_sum_with_discounts);
    if let Some(comment) = &view.comment {
        ctx.output.kv("comment", comment);
    }
    if let Some(comment) = &view.admin_comment {
        ctx.output.kv("admin comment", comment);
    }
}

fn show_order(shop: &Shop, key: &str, ctx: &Context) -> Result<()> {
    let order = resolve_order(shop, key)?;
    let view = shop.orders().view(&order)?;
    print_order(&view, ctx);
    Ok(())
}

fn change_status(shop: &Shop, key: &str, status: &str, ctx: &Context) -> Result<()> {
    let next = parse_status(status)?;
    let order = resolve_order(shop, key)?;
    let previous = order.status;

    let orders = shop.orders();
    let updated = orders.transition(order.id.as_str(), next)?;
    shop.persist()?;

    ctx.output.success(&format!(
        "Order #{}: {} -> {}",
        updated.order_number,
        previous.display_name(),
        updated.status.display_name()
    ));
    if ctx.output.is_json() {
        ctx.output.json(&orders.view(&updated)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("inDelivery").unwrap(), OrderStatus::InDelivery);
        let err = parse_status("shipped").unwrap_err().to_string();
        assert!(err.contains("created"));
        assert!(err.contains("canceled"));
    }
}
