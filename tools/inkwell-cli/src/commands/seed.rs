//! Fill an empty database with a small sample catalog.

use anyhow::{bail, Result};
use inkwell_commerce::prelude::*;
use inkwell_commerce::reference::TRACKING_NUMBER_PLACEHOLDER;
use serde::Serialize;

use super::SeedArgs;
use crate::context::Context;

/// What `seed_catalog` created.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub books: usize,
    pub group_discounts: usize,
    pub admin: UserId,
    pub self_pickup: DeliveryId,
}

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let shop = if args.dry_run {
        Shop::in_memory(ctx.config.shop.clone())
    } else {
        ctx.open_shop()?
    };

    let existing = shop.stats()?.count("books");
    if existing > 0 {
        bail!(
            "Database {} already has {} book(s)",
            ctx.database_path().display(),
            existing
        );
    }

    let summary = seed_catalog(&shop)?;
    if args.dry_run {
        ctx.output.info("Dry run, nothing written");
    } else {
        shop.persist()?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }

    ctx.output.success(&format!(
        "Seeded {} books and {} group discount(s)",
        summary.books, summary.group_discounts
    ));
    ctx.output.kv("admin user id", summary.admin.as_str());
    if ctx.config.shop.self_pickup_delivery_id.as_ref() != Some(&summary.self_pickup) {
        ctx.output.info(&format!(
            "Run `inkwell config set shop.self_pickup_delivery_id {}` to enable self-pickup",
            summary.self_pickup
        ));
    }
    Ok(())
}

struct SampleBook {
    name: &'static str,
    author: usize,
    series: usize,
    book_type: usize,
    price_cents: i64,
    discount: Option<f64>,
    stock: i64,
    year: i32,
    pages: u32,
    tags: &'static [&'static str],
}

const BOOKS: [SampleBook; 5] = [
    SampleBook {
        name: "Kobzar",
        author: 0,
        series: 0,
        book_type: 0,
        price_cents: 45000,
        discount: None,
        stock: 12,
        year: 1840,
        pages: 704,
        tags: &["poetry", "classic"],
    },
    SampleBook {
        name: "Forest Song",
        author: 1,
        series: 0,
        book_type: 1,
        price_cents: 25000,
        discount: Some(10.0),
        stock: 7,
        year: 1911,
        pages: 192,
        tags: &["drama", "classic"],
    },
    SampleBook {
        name: "Contra spem spero",
        author: 1,
        series: 0,
        book_type: 0,
        price_cents: 9000,
        discount: None,
        stock: 20,
        year: 1890,
        pages: 64,
        tags: &["poetry"],
    },
    SampleBook {
        name: "Zakhar Berkut",
        author: 2,
        series: 1,
        book_type: 2,
        price_cents: 32000,
        discount: Some(15.0),
        stock: 4,
        year: 1883,
        pages: 288,
        tags: &["novel", "historical"],
    },
    SampleBook {
        name: "Boa Constrictor",
        author: 2,
        series: 1,
        book_type: 2,
        price_cents: 21000,
        discount: None,
        stock: 0,
        year: 1878,
        pages: 240,
        tags: &["novel"],
    },
];

/// Create the sample references, books, deliveries, one group discount and
/// an admin user.
pub fn seed_catalog(shop: &Shop) -> Result<SeedSummary> {
    let refs = |names: &[&str]| -> Vec<NameInput> {
        names.iter().map(|n| NameInput::new(*n)).collect()
    };

    let mut languages = Vec::new();
    for input in refs(&["Ukrainian", "English"]) {
        languages.push(shop.references::<Language>().create(input)?);
    }
    let mut book_types = Vec::new();
    for input in refs(&["Poetry", "Drama", "Novel"]) {
        book_types.push(shop.references::<BookType>().create(input)?);
    }
    let mut cover_types = Vec::new();
    for input in refs(&["Hardcover", "Paperback"]) {
        cover_types.push(shop.references::<CoverType>().create(input)?);
    }
    let mut page_types = Vec::new();
    for input in refs(&["Offset", "Coated"]) {
        page_types.push(shop.references::<PageType>().create(input)?);
    }

    let mut authors = Vec::new();
    for name in ["Taras Shevchenko", "Lesya Ukrainka", "Ivan Franko"] {
        authors.push(shop.references::<Author>().create(AuthorInput {
            name: name.to_string(),
            description: None,
        })?);
    }

    let house = shop
        .references::<PublishingHouse>()
        .create(PublishingHouseInput {
            name: "A-BA-BA-HA-LA-MA-HA".to_string(),
            tags: vec!["classics".to_string()],
        })?;
    let mut series = Vec::new();
    for name in ["Ukrainian Classics", "Historical Prose"] {
        series.push(shop.references::<BookSeries>().create(BookSeriesInput {
            name: name.to_string(),
            publishing_house: house.id.clone(),
            description: None,
        })?);
    }

    shop.references::<Delivery>().create(DeliveryInput {
        name: "Nova Poshta".to_string(),
        image_id: None,
        tracking_url: Some(format!(
            "https://novaposhta.ua/tracking/?cargo_number={TRACKING_NUMBER_PLACEHOLDER}"
        )),
    })?;
    let pickup = shop.references::<Delivery>().create(DeliveryInput {
        name: "Self-pickup".to_string(),
        image_id: None,
        tracking_url: None,
    })?;

    let currency = shop.settings().currency;
    let mut books = Vec::with_capacity(BOOKS.len());
    for sample in &BOOKS {
        books.push(shop.catalog().create(BookInput {
            name: sample.name.to_string(),
            price: Money::new(sample.price_cents, currency),
            number_in_stock: sample.stock,
            discount: sample.discount,
            image_ids: Vec::new(),
            book_series: series[sample.series].id.clone(),
            book_type: book_types[sample.book_type].id.clone(),
            page_type: page_types[0].id.clone(),
            cover_type: cover_types[sample.year as usize % 2].id.clone(),
            language: languages[0].id.clone(),
            authors: vec![authors[sample.author].id.clone()],
            tags: sample.tags.iter().map(|t| t.to_string()).collect(),
            description: None,
            isbn: None,
            number_of_pages: Some(sample.pages),
            publishing_year: Some(sample.year),
        })?);
    }

    // Both Lesya Ukrainka titles together.
    shop.group_discounts().create(GroupDiscountInput {
        books: vec![books[1].id.clone(), books[2].id.clone()],
        discount: 10.0,
    })?;

    let admin = shop.users().create(UserInput {
        email: "admin@inkwell.local".to_string(),
        first_name: "Inkwell".to_string(),
        last_name: "Admin".to_string(),
        phone: None,
        role: Role::Admin,
    })?;

    Ok(SeedSummary {
        books: books.len(),
        group_discounts: 1,
        admin: admin.id,
        self_pickup: pickup.id,
    })
}
