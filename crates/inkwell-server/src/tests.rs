use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use inkwell_carrier::stub::StubCarrier;
use inkwell_carrier::CarrierConfig;
use inkwell_commerce::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::*;

struct TestApp {
    app: Router,
    shop: Arc<Shop>,
    admin: User,
    customer: User,
    language: Language,
    book: Book,
    cheap_book: Book,
    delivery: Delivery,
}

fn user(shop: &Shop, email: &str, role: Role) -> User {
    shop.users()
        .create(UserInput {
            email: email.to_string(),
            first_name: "Ivan".to_string(),
            last_name: "Franko".to_string(),
            phone: None,
            role,
        })
        .unwrap()
}

fn setup() -> TestApp {
    let shop = Arc::new(Shop::in_memory(ShopSettings::default()));
    let admin = user(&shop, "admin@inkwell.test", Role::Admin);
    let customer = user(&shop, "reader@inkwell.test", Role::Customer);

    let author = shop
        .references::<Author>()
        .create(AuthorInput {
            name: "Lesya Ukrainka".into(),
            description: None,
        })
        .unwrap();
    let book_type = shop.references::<BookType>().create(NameInput::new("Paper")).unwrap();
    let cover_type = shop
        .references::<CoverType>()
        .create(NameInput::new("Softcover"))
        .unwrap();
    let page_type = shop
        .references::<PageType>()
        .create(NameInput::new("Offset"))
        .unwrap();
    let language = shop
        .references::<Language>()
        .create(NameInput::new("Ukrainian"))
        .unwrap();
    let house = shop
        .references::<PublishingHouse>()
        .create(PublishingHouseInput {
            name: "A-BA-BA-HA-LA-MA-HA".into(),
            tags: vec![],
        })
        .unwrap();
    let series = shop
        .references::<BookSeries>()
        .create(BookSeriesInput {
            name: "Poetry".into(),
            publishing_house: house.id.clone(),
            description: None,
        })
        .unwrap();
    let delivery = shop
        .references::<Delivery>()
        .create(DeliveryInput {
            name: "Nova Poshta".into(),
            image_id: None,
            tracking_url: Some("https://novaposhta.ua/tracking/?cargo_number={number}".into()),
        })
        .unwrap();

    let input = |name: &str, cents: i64| BookInput {
        name: name.to_string(),
        price: Money::new(cents, Currency::UAH),
        number_in_stock: 5,
        discount: None,
        image_ids: vec![],
        book_series: series.id.clone(),
        book_type: book_type.id.clone(),
        page_type: page_type.id.clone(),
        cover_type: cover_type.id.clone(),
        language: language.id.clone(),
        authors: vec![author.id.clone()],
        tags: vec!["poetry".into()],
        description: None,
        isbn: None,
        number_of_pages: None,
        publishing_year: None,
    };
    let book = shop.catalog().create(input("Forest Song", 25000)).unwrap();
    let cheap_book = shop.catalog().create(input("Contra spem spero", 9000)).unwrap();

    let carrier = StubCarrier::new()
        .with_settlement("Київ", "Київська", None)
        .with_street("Київ", "Хрещатик");
    let state = AppState::new(shop.clone()).with_carrier(Arc::new(carrier), CarrierConfig::default());
    let app = router(state, &ServerConfig::default());

    TestApp {
        app,
        shop,
        admin,
        customer,
        language,
        book,
        cheap_book,
        delivery,
    }
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&User>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user.id.as_str());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn shipping() -> Value {
    json!({
        "firstName": "Ivan",
        "lastName": "Franko",
        "phone": "+380501234567",
        "email": "reader@inkwell.test",
        "address": { "city": "Київ", "region": "Київська", "warehouse": "1" }
    })
}

#[tokio::test]
async fn test_health_reports_collections() {
    let t = setup();
    let (status, body) = call(&t.app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_caller_is_invalid_token() {
    let t = setup();
    let (status, body) = call(&t.app, "GET", "/api/basket", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let t = setup();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-42");
}

#[tokio::test]
async fn test_reference_crud_rules() {
    let t = setup();

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/languages",
        Some(&t.admin),
        Some(json!({ "name": "English" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "English");

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/languages",
        Some(&t.admin),
        Some(json!({ "name": "english" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ERROR");

    let (status, _) = call(
        &t.app,
        "POST",
        "/api/languages",
        Some(&t.customer),
        Some(json!({ "name": "Polish" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = call(&t.app, "GET", "/api/languages?name=eng", None, None).await;
    assert_eq!(body["data"]["totalCount"], 1);
}

#[tokio::test]
async fn test_referenced_language_cannot_be_deleted() {
    let t = setup();
    let uri = format!("/api/languages/{}", t.language.id);

    let (status, body) = call(&t.app, "DELETE", &uri, Some(&t.admin), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_DATA");

    let (status, _) = call(&t.app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(t.shop.catalog().get(t.book.id.as_str()).is_ok());
}

#[tokio::test]
async fn test_book_listing_query_params() {
    let t = setup();
    let (status, body) = call(
        &t.app,
        "GET",
        "/api/books?rowsPerPage=1&orderBy=price&order=desc&tags=poetry",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalCount"], 2);
    assert_eq!(body["data"]["totalPages"], 2);
    assert_eq!(body["data"]["items"][0]["name"], "Forest Song");
    assert_eq!(body["data"]["items"][0]["language"]["name"], "Ukrainian");

    let (_, body) = call(&t.app, "GET", "/api/books?priceMax=100", None, None).await;
    assert_eq!(body["data"]["totalCount"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Contra spem spero");

    let (status, _) = call(&t.app, "GET", "/api/books?orderBy=isbn", None, None).await;
    assert_ne!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_viewing_a_book_records_it() {
    let t = setup();
    let uri = format!("/api/books/{}", t.book.id);
    call(&t.app, "GET", &uri, Some(&t.customer), None).await;

    let (_, body) = call(
        &t.app,
        "GET",
        "/api/users/me/recently-viewed",
        Some(&t.customer),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["name"], "Forest Song");
}

#[tokio::test]
async fn test_checkout_flow() {
    let t = setup();

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/basket/books",
        Some(&t.customer),
        Some(json!({ "bookId": t.book.id, "count": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["finalSum"], "500.00");
    assert_eq!(body["data"]["finalSumWithDiscounts"], "500.00");

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/orders",
        Some(&t.customer),
        Some(json!({ "shipping": shipping(), "delivery": t.delivery.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orderNumber"], 1);
    assert_eq!(body["data"]["status"], "created");
    let order_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = call(&t.app, "GET", "/api/basket", Some(&t.customer), None).await;
    assert_eq!(body["data"]["basketItems"], json!([]));

    let (_, body) = call(&t.app, "GET", "/api/orders", Some(&t.customer), None).await;
    assert_eq!(body["data"]["totalCount"], 1);

    let stranger = user(&t.shop, "other@inkwell.test", Role::Customer);
    let uri = format!("/api/orders/{order_id}");
    let (status, _) = call(&t.app, "GET", &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &t.app,
        "POST",
        &format!("{uri}/status"),
        Some(&t.admin),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isConfirmed"], true);

    let (status, body) = call(
        &t.app,
        "POST",
        &format!("{uri}/status"),
        Some(&t.admin),
        Some(json!({ "status": "created" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_DATA");

    let (_, body) = call(
        &t.app,
        "PUT",
        &format!("{uri}/tracking"),
        Some(&t.admin),
        Some(json!({ "trackingNumber": "20450000000001" })),
    )
    .await;
    assert_eq!(
        body["data"]["trackingLink"],
        "https://novaposhta.ua/tracking/?cargo_number=20450000000001"
    );
}

#[tokio::test]
async fn test_empty_basket_checkout_is_bad_data() {
    let t = setup();
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/orders",
        Some(&t.customer),
        Some(json!({ "shipping": shipping(), "delivery": t.delivery.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_DATA");
}

#[tokio::test]
async fn test_unknown_status_filter() {
    let t = setup();
    let (status, body) = call(
        &t.app,
        "GET",
        "/api/orders?status=lost",
        Some(&t.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_DATA");
}

#[tokio::test]
async fn test_group_discount_in_basket() {
    let t = setup();
    let (status, body) = call(
        &t.app,
        "POST",
        "/api/group-discounts",
        Some(&t.admin),
        Some(json!({ "books": [t.book.id, t.cheap_book.id], "discount": 10.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let discount_id = body["data"]["id"].clone();

    let (_, body) = call(
        &t.app,
        "POST",
        "/api/basket/group-discounts",
        Some(&t.customer),
        Some(json!({ "groupDiscountId": discount_id })),
    )
    .await;
    assert_eq!(body["data"]["finalSum"], "340.00");
    assert_eq!(body["data"]["finalSumWithDiscounts"], "306.00");
}

#[tokio::test]
async fn test_address_lookup() {
    let t = setup();
    let (status, body) = call(
        &t.app,
        "GET",
        "/api/address/settlements?q=%D0%9A%D0%B8",
        Some(&t.customer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["outcome"], "gated");

    let (_, body) = call(
        &t.app,
        "GET",
        "/api/address/settlements?q=%D0%9A%D0%B8%D1%97%D0%B2",
        Some(&t.customer),
        None,
    )
    .await;
    assert_eq!(body["data"]["outcome"], "applied");
    assert_eq!(body["data"]["count"], 1);
    let settlement_ref = body["data"]["state"]["settlements"][0]["settlementRef"].clone();

    let (status, body) = call(
        &t.app,
        "POST",
        "/api/address/settlements/select",
        Some(&t.customer),
        Some(json!({ "ref": settlement_ref })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settlement"]["city"], "Київ");
}

#[tokio::test]
async fn test_address_without_carrier() {
    let shop = Arc::new(Shop::in_memory(ShopSettings::default()));
    let customer = user(&shop, "solo@inkwell.test", Role::Customer);
    let app = router(AppState::new(shop), &ServerConfig::default());

    let (status, body) = call(&app, "GET", "/api/address", Some(&customer), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "CARRIER_UNAVAILABLE");
}
