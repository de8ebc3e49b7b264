//! Price a user's basket the way checkout would.

use anyhow::Result;
use inkwell_commerce::prelude::*;

use super::{resolve_user, QuoteArgs};
use crate::context::Context;

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.open_shop()?;
    let user = resolve_user(&shop, &args.user)?;
    let quote = shop.baskets().price(user.id.as_str())?;

    if ctx.output.is_json() {
        ctx.output.json(&quote);
        return Ok(());
    }

    ctx.output.header(&format!("Basket of {} <{}>", user.full_name(), user.email));
    if quote.basket.is_empty() {
        ctx.output.info("Basket is empty");
        return Ok(());
    }

    let widths = [28, 5, 10, 10];
    ctx.output.table_row(&["Book", "Qty", "Total", "To pay"], &widths);
    for line in &quote.pricing.lines {
        let name = if line.grouped_count > 0 {
            format!("{} ({} in sets)", line.name, line.grouped_count)
        } else {
            line.name.clone()
        };
        ctx.output.table_row(
            &[
                name.as_str(),
                line.count.to_string().as_str(),
                line.line_total.display_amount().as_str(),
                line.line_discounted.display_amount().as_str(),
            ],
            &widths,
        );
    }
    for bundle in &quote.pricing.bundles {
        ctx.output.table_row(
            &[
                format!("Set {} (-{}%)", bundle.group_discount_id, bundle.discount).as_str(),
                bundle.count.to_string().as_str(),
                bundle.total.display_amount().as_str(),
                bundle.total_with_discount.display_amount().as_str(),
            ],
            &widths,
        );
    }

    if !quote.pricing.matched.is_empty() {
        ctx.output.info("");
        for matched in &quote.pricing.matched {
            ctx.output.list_item(&format!(
                "Group discount {} applied to {} set(s), -{}%",
                matched.group_discount_id, matched.count, matched.discount
            ));
        }
    }

    ctx.output.info("");
    ctx.output.kv("Sum", &quote.final_sum);
    ctx.output.kv("To pay", &quote.final_sum_with_discounts);
    if quote.pricing.has_discounts() {
        ctx.output.kv("You save", &quote.pricing.savings().display());
    }
    Ok(())
}
