use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mockall::mock;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use stars_invoice_backend::{
    app,
    config::Config,
    dto::telegram_dto::{CreateInvoiceLink, Update},
    error::{Error, Result},
    services::bot_client::BotApi,
    utils::telegram_auth::sign_fields,
    AppState,
};

const BOT_TOKEN: &str = "7000000001:AAH-test-token";

mock! {
    pub Bot {}

    #[async_trait]
    impl BotApi for Bot {
        async fn create_invoice_link(&self, request: &CreateInvoiceLink) -> Result<String>;
        async fn answer_pre_checkout_query(
            &self,
            query_id: &str,
            ok: bool,
            error_message: Option<String>,
        ) -> Result<()>;
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            reply_markup: Option<serde_json::Value>,
        ) -> Result<()>;
        async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>>;
    }
}

fn setup_app(bot: MockBot) -> Router {
    let config = Config::new(BOT_TOKEN, "https://gifts.example.com");
    app(AppState::new(&config, Arc::new(bot)))
}

fn linking_bot() -> MockBot {
    let mut bot = MockBot::new();
    bot.expect_create_invoice_link()
        .returning(|req| Ok(format!("https://t.me/$invoice-{}", req.payload)));
    bot
}

fn signed_init_data(pairs: &[(&str, &str)]) -> String {
    let fields: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let hash = sign_fields(&fields, BOT_TOKEN).expect("sign");

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

fn valid_init_data() -> String {
    signed_init_data(&[
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        ("user", r#"{"id":42,"first_name":"Ann","language_code":"en"}"#),
        ("auth_date", "1700000000"),
    ])
}

async fn get(app: Router, uri: &str, init_data: Option<&str>) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(init_data) = init_data {
        builder = builder.header("X-Telegram-Init-Data", init_data);
    }
    let resp = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = resp.status();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(
        resp.headers()["access-control-allow-headers"],
        "Content-Type, X-Telegram-Init-Data"
    );

    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: JsonValue = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn allowed_amount_returns_invoice_link() {
    let init_data = valid_init_data();
    for amount in [25, 50, 100] {
        let (status, body) = get(
            setup_app(linking_bot()),
            &format!("/api/invoice?amount={}", amount),
            Some(&init_data),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["invoice_link"].as_str(),
            Some(format!("https://t.me/$invoice-gift:{}:42", amount).as_str())
        );
    }
}

#[tokio::test]
async fn documented_init_data_string_is_accepted() {
    let fields: BTreeMap<String, String> = [
        ("user".to_string(), r#"{"id":42}"#.to_string()),
        ("auth_date".to_string(), "1".to_string()),
    ]
    .into_iter()
    .collect();
    let hash = sign_fields(&fields, BOT_TOKEN).unwrap();
    let raw = format!("user=%7B%22id%22%3A42%7D&auth_date=1&hash={}", hash);

    let (status, body) = get(
        setup_app(linking_bot()),
        "/api/invoice?amount=25",
        Some(&raw),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice_link"], "https://t.me/$invoice-gift:25:42");

    let tampered = format!("user=%7B%22id%22%3A42%7D&auth_date=1&hash={}", "ab".repeat(32));
    let (status, body) = get(
        setup_app(MockBot::new()),
        "/api/invoice?amount=25",
        Some(&tampered),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_init_data");
}

#[tokio::test]
async fn amount_validation_errors() {
    let init_data = valid_init_data();
    let cases = [
        ("/api/invoice?amount=26", "unsupported_amount"),
        ("/api/invoice?amount=0", "unsupported_amount"),
        ("/api/invoice", "unsupported_amount"),
        ("/api/invoice?amount=abc", "invalid_amount"),
        ("/api/invoice?amount=", "invalid_amount"),
        ("/api/invoice?amount=25.5", "invalid_amount"),
    ];

    for (uri, code) in cases {
        let mut bot = MockBot::new();
        bot.expect_create_invoice_link().never();
        let (status, body) = get(setup_app(bot), uri, Some(&init_data)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body, serde_json::json!({ "error": code }), "{uri}");
    }
}

#[tokio::test]
async fn missing_or_forged_init_data_is_unauthorized() {
    let forged = valid_init_data().replace("Ann", "Bob");
    let unsigned = "user=%7B%22id%22%3A42%7D&auth_date=1";
    let garbage = "hash=zzz";

    for init_data in [None, Some(""), Some(unsigned), Some(forged.as_str()), Some(garbage)] {
        let mut bot = MockBot::new();
        bot.expect_create_invoice_link().never();
        let (status, body) = get(setup_app(bot), "/api/invoice?amount=25", init_data).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{init_data:?}");
        assert_eq!(body, serde_json::json!({ "error": "invalid_init_data" }));
    }
}

#[tokio::test]
async fn auth_is_checked_before_amount() {
    let (status, body) = get(
        setup_app(MockBot::new()),
        "/api/invoice?amount=abc",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_init_data");
}

#[tokio::test]
async fn repeated_amount_uses_the_first_value() {
    let (status, body) = get(
        setup_app(MockBot::new()),
        "/api/invoice?amount=25&amount=50",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, serde_json::json!({ "error": "invalid_init_data" }));

    let mut bot = MockBot::new();
    bot.expect_create_invoice_link()
        .withf(|req| req.payload == "gift:25:42" && req.prices[0].amount == 25)
        .times(1)
        .returning(|req| Ok(format!("https://t.me/$invoice-{}", req.payload)));
    let (status, body) = get(
        setup_app(bot),
        "/api/invoice?amount=25&amount=50",
        Some(&valid_init_data()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice_link"], "https://t.me/$invoice-gift:25:42");
}

#[tokio::test]
async fn platform_failure_maps_to_bad_gateway() {
    let mut bot = MockBot::new();
    bot.expect_create_invoice_link().returning(|_| {
        Err(Error::Telegram {
            code: Some(401),
            description: "Unauthorized: secret detail".to_string(),
        })
    });

    let (status, body) = get(
        setup_app(bot),
        "/api/invoice?amount=50",
        Some(&valid_init_data()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, serde_json::json!({ "error": "upstream_unavailable" }));
}

#[tokio::test]
async fn preflight_needs_no_init_data() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/invoice")
        .header("Origin", "https://gifts.example.com")
        .header("Access-Control-Request-Method", "GET")
        .body(Body::empty())
        .unwrap();
    let resp = setup_app(MockBot::new()).oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(
        resp.headers()["access-control-allow-headers"],
        "Content-Type, X-Telegram-Init-Data"
    );
}
