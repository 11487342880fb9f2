//! Round-trip helpers driven through a transport that replays canned
//! responses and records what it was asked to send.

use std::cell::RefCell;
use std::collections::VecDeque;

use order_client::{
    ApiError, HttpMethod, HttpRequest, HttpResponse, OrderClient, PayOrder, PaymentSource,
    Transport,
};
use serde_json::{json, Map, Value};

#[derive(Default)]
struct StubTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    sent: RefCell<Vec<HttpRequest>>,
}

impl StubTransport {
    fn reply(self, status: u16, body: Value) -> Self {
        self.responses.borrow_mut().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
        self
    }

    fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(ApiError::Transport(message.to_string())));
        self
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.borrow().clone()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("no canned response left")
    }
}

fn client() -> OrderClient {
    OrderClient::in_memory("https://payments.test")
}

#[test]
fn get_config_live_and_test_keys() {
    let transport = StubTransport::default()
        .reply(200, json!({"stripePublishableKey": "pk_live_x"}))
        .reply(200, json!({"stripePublishableKey": "pk_test_x"}));
    let c = client();
    assert!(c.get_config(&transport).unwrap().is_live_mode());
    assert!(!c.get_config(&transport).unwrap().is_live_mode());

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|r| r.method == HttpMethod::Get && r.path == "https://payments.test/config"));
}

#[test]
fn get_config_network_failure_is_returned() {
    let transport = StubTransport::default().fail("connection reset");
    let err = client().get_config(&transport).unwrap_err();
    assert!(matches!(err, ApiError::Transport(ref m) if m == "connection reset"));
    assert_eq!(err.to_error_body().error, "transport failed: connection reset");
}

#[test]
fn load_products_failure_leaves_products_untouched() {
    let transport = StubTransport::default()
        .reply(200, json!({"data": [{"id": "prod_a", "price": 100, "currency": "usd"}]}))
        .reply(500, json!("boom"));
    let mut c = client();
    assert_eq!(c.load_products(&transport).unwrap(), 1);
    assert!(matches!(c.load_products(&transport), Err(ApiError::Http { status: 500, .. })));
    assert_eq!(c.products().len(), 1);
}

#[test]
fn create_order_declined_returns_error_and_keeps_store_empty() {
    let transport = StubTransport::default().reply(200, json!({"error": "card_declined"}));
    let mut c = client();
    c.add_line_item("A", 2);
    c.add_line_item("B", 1);
    let payload = c.order_payload("usd", "jenny@example.com", None, Map::new());

    let err = c.create_order(&transport, &payload).unwrap_err();
    assert_eq!(err.to_error_body().error, "card_declined");
    assert_eq!(c.active_order_id().unwrap(), None);

    let body: Value = serde_json::from_str(transport.sent()[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(
        body["items"],
        json!([
            {"type": "sku", "parent": "A", "quantity": 2},
            {"type": "sku", "parent": "B", "quantity": 1},
        ])
    );
}

#[test]
fn create_order_success_returns_full_order() {
    let order = json!({"id": "o1", "status": "created", "amount": 1500, "items": [], "metadata": {"k": "v"}});
    let transport = StubTransport::default().reply(200, json!({"order": order.clone()}));
    let mut c = client();
    let payload = c.order_payload("usd", "jenny@example.com", None, Map::new());

    let created = c.create_order(&transport, &payload).unwrap();
    assert_eq!(serde_json::to_value(&created).unwrap(), order);
    assert_eq!(c.active_order_id().unwrap().as_deref(), Some("o1"));
}

#[test]
fn create_order_network_failure_keeps_previous_active_id() {
    let transport = StubTransport::default().fail("timed out");
    let mut c = client();
    c.set_active_order_id("o_prev").unwrap();
    let payload = c.order_payload("usd", "jenny@example.com", None, Map::new());

    assert!(c.create_order(&transport, &payload).is_err());
    assert_eq!(c.active_order_id().unwrap().as_deref(), Some("o_prev"));
}

#[test]
fn pay_order_posts_source_to_order_path() {
    let transport = StubTransport::default().reply(
        200,
        json!({"order": {"id": "o1", "status": "paid"}, "source": {"id": "src_1", "type": "card"}}),
    );
    let input = PayOrder {
        source: PaymentSource::from_id("src_1"),
    };
    let payment = client().pay_order(&transport, "o1", &input).unwrap();
    assert_eq!(payment.source.unwrap().extra["type"], "card");

    let sent = transport.sent();
    assert_eq!(sent[0].method, HttpMethod::Post);
    assert_eq!(sent[0].path, "https://payments.test/orders/o1/pay");
}

#[test]
fn order_status_parse_failure() {
    let transport = StubTransport::default().reply(200, json!({"status": "paid"}));
    let err = client().get_order_status(&transport, "o1").unwrap_err();
    assert!(matches!(err, ApiError::Deserialization(_)));
    assert_eq!(transport.sent()[0].path, "https://payments.test/orders/o1");
}
