use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use king_airlines::criteria::FlightOffersRequest;
use king_airlines::flight_client::{FlightClientError, FlightClientResult, FlightOffersApi};
use king_airlines::flight_offer::{Amount, FlightOffer, Itinerary, Price, Segment, SegmentEndpoint};
use king_airlines::routes::build_routes;
use king_airlines::session::SessionStore;
use king_airlines::warp_helpers::AppState;
use warp::http::HeaderMap;
use warp::{Filter, Reply};

const VALID_FORM: &str = "departureAirport=ZAG&destinationAirport=LHR&departureDate=2024-05-01&returnDate=2024-05-08&numberOfPassengers=4&currency=USD";

struct StubClient {
    offers: Vec<FlightOffer>,
    fail: bool,
    calls: AtomicUsize,
    last_request: Mutex<Option<FlightOffersRequest>>,
}

impl StubClient {
    fn returning(offers: Vec<FlightOffer>) -> Arc<Self> {
        Arc::new(Self {
            offers,
            fail: false,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            offers: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait]
impl FlightOffersApi for StubClient {
    async fn search(&self, request: &FlightOffersRequest) -> FlightClientResult<Vec<FlightOffer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.fail {
            Err(FlightClientError::Status(500))
        } else {
            Ok(self.offers.clone())
        }
    }
}

fn offer(index: usize) -> FlightOffer {
    let endpoint = |code: &str, at: &str| SegmentEndpoint {
        iata_code: code.to_string(),
        at: at.to_string(),
    };
    FlightOffer {
        id: Some(index.to_string()),
        itineraries: vec![
            Itinerary {
                duration: None,
                segments: vec![Segment {
                    departure: endpoint("ZAG", "2024-05-01T07:00:00"),
                    arrival: endpoint("LHR", "2024-05-01T09:00:00"),
                }],
            },
            Itinerary {
                duration: None,
                segments: vec![Segment {
                    departure: endpoint("LHR", "2024-05-08T10:00:00"),
                    arrival: endpoint("ZAG", "2024-05-08T13:30:00"),
                }],
            },
        ],
        price: Price {
            currency: "USD".to_string(),
            total: Amount::Text(format!("{}.00", 100 + index)),
        },
        number_of_bookable_seats: Some(9),
    }
}

fn state_with(client: Arc<StubClient>) -> AppState {
    AppState {
        sessions: SessionStore::new(Duration::from_secs(600), 100),
        flight_client: client,
        max_offers: 3,
        secure_cookie: false,
    }
}

fn session_cookie(headers: &HeaderMap) -> String {
    let value = headers
        .get("set-cookie")
        .expect("response should set the session cookie")
        .to_str()
        .unwrap();
    value.split(';').next().unwrap().to_string()
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form_and_sets_cookie() {
    let routes = build_routes(state_with(StubClient::returning(Vec::new())));

    let res = warp::test::request()
        .method("GET")
        .path("/")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 200);
    assert!(session_cookie(res.headers()).starts_with("king_airlines_session="));

    let html = body_text(res.body());
    assert!(html.contains("King Airlines"));
    assert!(html.contains("name=\"numberOfPassengers\""));
    assert!(html.contains("No direct flights found"));
}

#[tokio::test]
async fn test_invalid_submit_shows_errors_without_network_call() {
    let client = StubClient::returning(vec![offer(0)]);
    let routes = build_routes(state_with(client.clone()));

    let res = warp::test::request()
        .method("POST")
        .path("/search")
        .header("content-type", "application/x-www-form-urlencoded")
        .body("departureAirport=ZAGREB&destinationAirport=LH&departureDate=&returnDate=2024-05-08&numberOfPassengers=9&currency=EUR")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 303);
    assert_eq!(res.headers().get("location").unwrap(), "/");
    let cookie = session_cookie(res.headers());

    let res = warp::test::request()
        .method("GET")
        .path("/")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let html = body_text(res.body());

    assert!(html.contains("Departure Airport must be 3 characters long"));
    assert!(html.contains("Destination Airport must be 3 characters long"));
    assert!(html.contains("Departure Date is required"));
    assert!(html.contains("Number of Passengers must be a positive number, not exceeding 5"));
    assert!(html.contains("value=\"ZAGREB\""));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);

    let res = warp::test::request()
        .method("GET")
        .path("/api/offers")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let snapshot: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(
        snapshot["errors"]["departureDate"],
        "Departure Date is required"
    );
    assert_eq!(
        snapshot["errors"]["numberOfPassengers"],
        "Number of Passengers must be a positive number, not exceeding 5"
    );
    assert!(snapshot["errors"].get("returnDate").is_none());
    assert!(snapshot["errors"].get("currency").is_none());
}

#[tokio::test]
async fn test_secure_cookie_flag() {
    let mut state = state_with(StubClient::returning(Vec::new()));
    state.secure_cookie = true;
    let routes = build_routes(state);

    let res = warp::test::request()
        .method("GET")
        .path("/")
        .reply(&routes)
        .await;

    let header = res.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(header.ends_with("; Secure"));
}

#[tokio::test]
async fn test_session_store_stays_bounded() {
    let mut state = state_with(StubClient::returning(Vec::new()));
    state.sessions = SessionStore::new(Duration::from_secs(600), 3);
    let sessions = state.sessions.clone();
    let routes = build_routes(state);

    for _ in 0..10 {
        let res = warp::test::request()
            .method("GET")
            .path("/api/offers")
            .reply(&routes)
            .await;
        assert_eq!(res.status(), 200);
    }

    assert_eq!(sessions.len(), 3);
}

async fn submit_and_wait<F>(routes: &F) -> String
where
    F: Filter + Clone + 'static,
    F::Extract: Reply + Send,
{
    let res = warp::test::request()
        .method("POST")
        .path("/search")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(VALID_FORM)
        .reply(routes)
        .await;
    assert_eq!(res.status(), 303);
    let cookie = session_cookie(res.headers());

    for _ in 0..100 {
        let res = warp::test::request()
            .method("GET")
            .path("/api/offers")
            .header("cookie", cookie.as_str())
            .reply(routes)
            .await;
        let snapshot: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        if snapshot["loading"] == false {
            return cookie;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("search did not finish");
}

#[tokio::test]
async fn test_valid_submit_fetches_and_paginates() {
    let client = StubClient::returning((0..25).map(offer).collect());
    let routes = build_routes(state_with(client.clone()));

    let cookie = submit_and_wait(&routes).await;
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    let res = warp::test::request()
        .method("GET")
        .path("/api/offers")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let snapshot: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(snapshot["total"], 25);
    assert_eq!(snapshot["page"], 1);
    assert_eq!(snapshot["pageCount"], 3);
    assert_eq!(snapshot["rows"].as_array().unwrap().len(), 10);
    assert_eq!(snapshot["rows"][0]["totalPrice"], "100.00$");
    assert_eq!(snapshot["rows"][0]["returnDate"], "2024-05-08");

    let res = warp::test::request()
        .method("GET")
        .path("/?page=3")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let html = body_text(res.body());
    assert_eq!(html.matches("<tr>").count(), 6);
    assert!(html.contains("124.00$"));
    assert!(html.contains("<li class=\"page-item active\"><a class=\"page-link\" href=\"/?page=3\">3</a></li>"));
    // form is cleared after a successful search
    assert!(html.contains("name=\"departureAirport\" value=\"\""));
}

#[tokio::test]
async fn test_request_body_forwarded_to_client() {
    let client = StubClient::returning(vec![offer(0)]);
    let routes = build_routes(state_with(client.clone()));

    submit_and_wait(&routes).await;

    let request = client.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.departure_airport, "ZAG");
    assert_eq!(request.destination_airport, "LHR");
    assert_eq!(request.number_of_passengers, 4);
    assert_eq!(request.max, 3);
    assert_eq!(request.currency, "USD");
}

#[tokio::test]
async fn test_failed_search_shows_banner() {
    let routes = build_routes(state_with(StubClient::failing()));

    let cookie = submit_and_wait(&routes).await;

    let res = warp::test::request()
        .method("GET")
        .path("/")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let html = body_text(res.body());
    assert!(html.contains("alert-danger"));
    assert!(html.contains("No direct flights found"));
    // the form keeps what the user typed
    assert!(html.contains("name=\"departureAirport\" value=\"ZAG\""));
}

#[tokio::test]
async fn test_page_outside_range_is_ignored() {
    let routes = build_routes(state_with(StubClient::returning((0..12).map(offer).collect())));
    let cookie = submit_and_wait(&routes).await;

    let res = warp::test::request()
        .method("GET")
        .path("/api/offers?page=9")
        .header("cookie", cookie.as_str())
        .reply(&routes)
        .await;
    let snapshot: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(snapshot["page"], 1);
    assert_eq!(snapshot["pageCount"], 2);
}

#[tokio::test]
async fn test_malformed_page_is_bad_request() {
    let routes = build_routes(state_with(StubClient::returning(Vec::new())));

    let res = warp::test::request()
        .method("GET")
        .path("/?page=abc")
        .reply(&routes)
        .await;

    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_health_and_static_routes() {
    let routes = build_routes(state_with(StubClient::returning(Vec::new())));

    let res = warp::test::request()
        .method("GET")
        .path("/health")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    let health: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(health["status"], "healthy");

    let res = warp::test::request()
        .method("GET")
        .path("/css/main.css")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers().get("content-type").unwrap(),
        "text/css; charset=utf-8"
    );

    let res = warp::test::request()
        .method("GET")
        .path("/nonexistent.css")
        .reply(&routes)
        .await;
    assert_eq!(res.status(), 404);
    let error: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(error["code"], 404);
}
