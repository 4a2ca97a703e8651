//! End-to-end tests for the full huexim stack.
//!
//! Each test binds an axum router on `127.0.0.1:0` that impersonates both the
//! vendor cloud and the auth service, then drives the driver entry points
//! through the real reqwest adapters.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use huexim_adapter_hue_cloud::{AuthServiceClient, HueCloudClient, HueCloudConfig};
use huexim_app::driver::{EntryPoint, XimDriver};
use huexim_domain::options::XimOptions;
use serde_json::{Value, json};

const BRIDGE_ID: &str = "001788fffe6a2b3c";
const ACCOUNT_TOKEN: &str = "account-token";
const VENDOR_TOKEN: &str = "vendor-token";
const LONELY_TOKEN: &str = "lonely-token";
const EXPIRED_TOKEN: &str = "expired-token";
const USERNAME: &str = "registered-user";

/// Requests that change something, as `(method path, body)`.
#[derive(Clone, Default)]
struct Recorded(Arc<Mutex<Vec<(String, Value)>>>);

impl Recorded {
    fn push(&self, call: String, body: Value) {
        self.0.lock().unwrap().push((call, body));
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.0.lock().unwrap().clone()
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn fault(errorcode: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "fault": { "faultstring": "rejected", "detail": { "errorcode": errorcode } }
        })),
    )
        .into_response()
}

/// Gatekeeper for vendor cloud paths.
fn check_vendor(headers: &HeaderMap, bridge: Option<&str>) -> Option<Response> {
    match bearer(headers) {
        Some(VENDOR_TOKEN | LONELY_TOKEN) => {}
        Some(EXPIRED_TOKEN) => return Some(fault("keymanagement.service.access_token_expired")),
        _ => return Some(fault("keymanagement.service.invalid_access_token")),
    }
    match bridge {
        Some(bridge) if bridge != BRIDGE_ID => Some(StatusCode::NOT_FOUND.into_response()),
        _ => None,
    }
}

fn lights() -> Value {
    json!({
        "1": { "name": "Porch plug", "type": "On/Off plug-in unit", "state": { "on": true } },
        "2": { "name": "Bulb", "type": "Extended color light", "state": { "on": false, "hue": 0, "sat": 254, "bri": 254 } },
        "10": { "name": "Desk", "type": "Dimmable light", "state": { "on": true, "bri": 127 } }
    })
}

fn light(id: &str) -> Option<Value> {
    lights().get(id).cloned()
}

async fn list_bridges(headers: HeaderMap) -> Response {
    if let Some(rejected) = check_vendor(&headers, None) {
        return rejected;
    }
    if bearer(&headers) == Some(LONELY_TOKEN) {
        return Json(json!([])).into_response();
    }
    Json(json!([{ "id": BRIDGE_ID, "internalipaddress": "192.168.1.20" }])).into_response()
}

async fn press_link_button(
    State(recorded): State<Recorded>,
    Path(bridge): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    recorded.push(format!("PUT /v2/bridges/{bridge}/0/config"), body);
    Json(json!([{ "success": { "/config/linkbutton": true } }])).into_response()
}

async fn register(
    State(recorded): State<Recorded>,
    Path(bridge): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    recorded.push(format!("POST /v2/bridges/{bridge}/"), body);
    Json(json!([{ "success": { "username": USERNAME } }])).into_response()
}

async fn full_config(Path((bridge, username)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    if username != USERNAME {
        return Json(json!([{ "error": { "type": 1, "address": "/", "description": "unauthorized user" } }]))
            .into_response();
    }
    Json(json!({
        "lights": lights(),
        "groups": { "1": { "name": "Living room", "action": { "on": false } } },
        "config": { "name": "Philips hue" }
    }))
    .into_response()
}

async fn list_lights(Path(bridge): Path<String>, headers: HeaderMap) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    Json(lights()).into_response()
}

async fn get_light(Path((bridge, id)): Path<(String, String)>, headers: HeaderMap) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    if id == "99" {
        return (StatusCode::GATEWAY_TIMEOUT, "Gateway Timeout").into_response();
    }
    match light(&id) {
        Some(light) => Json(light).into_response(),
        None => Json(json!([{ "error": { "type": 3, "description": format!("resource, /lights/{id}, not available") } }]))
            .into_response(),
    }
}

async fn get_group(Path((bridge, group)): Path<(String, u32)>, headers: HeaderMap) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    Json(json!({ "name": format!("Group {group}"), "action": { "on": false } })).into_response()
}

async fn put_light_state(
    State(recorded): State<Recorded>,
    Path((bridge, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    recorded.push(format!("PUT /v1/bridges/{bridge}/lights/{id}/state"), body);
    Json(json!([{ "success": {} }])).into_response()
}

async fn put_user_light_state(
    State(recorded): State<Recorded>,
    Path((bridge, username, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    recorded.push(format!("PUT /v2/bridges/{bridge}/{username}/lights/{id}/state"), body);
    Json(json!([{ "success": {} }])).into_response()
}

async fn put_group_action(
    State(recorded): State<Recorded>,
    Path((bridge, group)): Path<(String, u32)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejected) = check_vendor(&headers, Some(&bridge)) {
        return rejected;
    }
    recorded.push(format!("PUT /v1/bridges/{bridge}/groups/{group}/action"), body);
    Json(json!([{ "success": {} }])).into_response()
}

async fn fetch_token(Path(set): Path<String>, headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(ACCOUNT_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match set.as_str() {
        "empty" => Json(json!({ "result": "false" })).into_response(),
        "lonely" => Json(json!({ "access_token": LONELY_TOKEN })).into_response(),
        _ => Json(json!({ "access_token": VENDOR_TOKEN })).into_response(),
    }
}

async fn refresh_token(
    State(recorded): State<Recorded>,
    Path(set): Path<String>,
    headers: HeaderMap,
) -> Response {
    if bearer(&headers) != Some(ACCOUNT_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    recorded.push(format!("POST /refresh_token/hue/{set}"), Value::Null);
    Json(json!({ "access_token": "refreshed-token" })).into_response()
}

async fn revoke_token(State(recorded): State<Recorded>, headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(ACCOUNT_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    recorded.push("DELETE /token/hue".to_string(), Value::Null);
    Json(json!({ "result": "true" })).into_response()
}

fn router(recorded: Recorded) -> Router {
    Router::new()
        .route("/v2/bridges", get(list_bridges))
        .route("/v2/bridges/{bridge}/0/config", put(press_link_button))
        .route("/v2/bridges/{bridge}/", post(register))
        .route("/v2/bridges/{bridge}/{username}", get(full_config))
        .route(
            "/v2/bridges/{bridge}/{username}/lights/{id}/state",
            put(put_user_light_state),
        )
        .route("/v1/bridges/{bridge}/lights", get(list_lights))
        .route("/v1/bridges/{bridge}/lights/{id}", get(get_light))
        .route("/v1/bridges/{bridge}/lights/{id}/state", put(put_light_state))
        .route("/v1/bridges/{bridge}/groups/{group}", get(get_group))
        .route("/v1/bridges/{bridge}/groups/{group}/action", put(put_group_action))
        .route("/token/hue/{set}", get(fetch_token))
        .route("/token/hue", delete(revoke_token))
        .route("/refresh_token/hue/{set}", post(refresh_token))
        .with_state(recorded)
}

struct Harness {
    driver: XimDriver<HueCloudClient, AuthServiceClient>,
    recorded: Recorded,
}

impl Harness {
    async fn start() -> Self {
        let recorded = Recorded::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("loopback listener should bind");
        let addr = listener.local_addr().unwrap();
        let app = router(recorded.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = HueCloudConfig {
            api_base_url: format!("http://{addr}"),
            auth_url: format!("http://{addr}/"),
            request_timeout_secs: 5,
            ..HueCloudConfig::default()
        };
        let driver = XimDriver::new(
            HueCloudClient::new(&config).unwrap(),
            AuthServiceClient::new(&config).unwrap(),
        );
        Self { driver, recorded }
    }

    /// Run `entry` through the callback path and return the payload as JSON.
    async fn run(&self, entry: EntryPoint, options: Value) -> Value {
        let options: XimOptions = serde_json::from_value(options).unwrap();
        let mut payloads = Vec::new();
        self.driver
            .invoke(entry, &options, |response| {
                payloads.push(response.to_value().unwrap());
            })
            .await;
        assert_eq!(payloads.len(), 1, "{entry} must call back exactly once");
        payloads.remove(0)
    }
}

fn linked(extra: Value) -> Value {
    let mut options = json!({
        "xim_type": "hue",
        "xim_content": {
            "hue_access_token": VENDOR_TOKEN,
            "bridgeid": BRIDGE_ID,
            "lights": {
                "2": { "device_id": "2", "device_name": "Bulb", "light_status": { "onoff": false } }
            }
        }
    });
    if let (Some(options), Value::Object(extra)) = (options.as_object_mut(), extra) {
        options.extend(extra);
    }
    options
}

fn device_ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|device| device["device_id"].as_str().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// authenticate / unlink
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_link_bridge_and_store_credentials() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Authenticate,
            json!({
                "quantum_token": ACCOUNT_TOKEN,
                "xim_channel_set": "1",
                "xim_content": { "hue_access_token": "stale", "installed": true }
            }),
        )
        .await;

    assert_eq!(payload["result"], json!({ "err_no": 0, "err_msg": "ok" }));
    assert_eq!(
        payload["xim_content"],
        json!({
            "hue_access_token": VENDOR_TOKEN,
            "bridgeid": BRIDGE_ID,
            "userName": USERNAME,
            "lights": {}
        })
    );
    assert_eq!(
        harness.recorded.calls(),
        [
            (
                format!("PUT /v2/bridges/{BRIDGE_ID}/0/config"),
                json!({ "linkbutton": true })
            ),
            (
                format!("POST /v2/bridges/{BRIDGE_ID}/"),
                json!({ "devicetype": "huexim#driver" })
            ),
        ]
    );
}

#[tokio::test]
async fn should_report_no_stored_token() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Authenticate,
            json!({ "quantum_token": ACCOUNT_TOKEN, "xim_channel_set": "empty" }),
        )
        .await;
    assert_eq!(payload["result"]["err_no"], json!(2));
    assert!(harness.recorded.calls().is_empty());
}

#[tokio::test]
async fn should_refresh_token_when_account_has_no_bridge() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Authenticate,
            json!({ "quantum_token": ACCOUNT_TOKEN, "xim_channel_set": "lonely" }),
        )
        .await;

    assert_eq!(
        payload["result"],
        json!({ "err_no": 112, "err_msg": "Refresh Access Token" })
    );
    assert_eq!(payload["xim_content"]["hue_access_token"], json!("refreshed-token"));
    assert_eq!(
        harness.recorded.calls(),
        [("POST /refresh_token/hue/lonely".to_string(), Value::Null)]
    );
}

#[tokio::test]
async fn should_fail_authenticate_with_unknown_account() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Authenticate,
            json!({ "quantum_token": "someone-else", "xim_channel_set": "1" }),
        )
        .await;
    assert_eq!(payload["result"]["err_no"], json!(1));
    assert_eq!(payload["xim_content"], json!({ "lights": {} }));
}

#[tokio::test]
async fn should_revoke_token_and_forget_credentials_on_unlink() {
    let harness = Harness::start().await;
    let payload = harness
        .run(EntryPoint::Unlink, linked(json!({ "quantum_token": ACCOUNT_TOKEN })))
        .await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert!(payload["xim_content"].get("hue_access_token").is_none());
    assert!(payload["xim_content"].get("bridgeid").is_none());
    assert_eq!(
        harness.recorded.calls(),
        [("DELETE /token/hue".to_string(), Value::Null)]
    );
}

// ---------------------------------------------------------------------------
// discovery / stat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_discover_lights_through_v1_paths() {
    let harness = Harness::start().await;
    let payload = harness.run(EntryPoint::Discovery, linked(json!({}))).await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(device_ids(&payload["list"]), ["2", "10"]);
    assert_eq!(payload["groups"], json!([]));

    let catalog = payload["xim_content"]["lights"].as_object().unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog["1"]["light_type"], json!("white"));
    assert_eq!(catalog["10"]["light_type"], json!("dimmer"));
    assert_eq!(catalog["10"]["light_status"]["brightness"], json!(50));
    assert_eq!(catalog["2"]["light_status"]["saturation"], json!(100));
    assert_eq!(payload["xim_type"], json!("hue"));
}

#[tokio::test]
async fn should_discover_groups_through_v2_paths() {
    let harness = Harness::start().await;
    let mut options = linked(json!({}));
    options["xim_content"]["userName"] = json!(USERNAME);

    let payload = harness.run(EntryPoint::Discovery, options).await;
    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(device_ids(&payload["groups"]), ["90001"]);
    assert_eq!(payload["groups"][0]["is_group"], json!(true));
    assert_eq!(payload["groups"][0]["light_status"]["onoff"], json!(true));
    assert!(payload["xim_content"]["lights"].get("90001").is_some());
}

#[tokio::test]
async fn should_report_bridge_errors_as_upstream_fault() {
    let harness = Harness::start().await;
    let mut options = linked(json!({}));
    options["xim_content"]["userName"] = json!("stranger");

    let payload = harness.run(EntryPoint::Discovery, options).await;
    assert_eq!(payload["result"]["err_no"], json!(900));
    assert_eq!(
        payload["result"]["err_msg"],
        json!("upstream fault: unauthorized user (type 1)")
    );
}

#[tokio::test]
async fn should_report_unknown_bridge_as_120() {
    let harness = Harness::start().await;
    let mut options = linked(json!({}));
    options["xim_content"]["bridgeid"] = json!("ffffffffffffffff");

    let payload = harness.run(EntryPoint::Discovery, options).await;
    assert_eq!(payload["result"]["err_no"], json!(120));
}

#[tokio::test]
async fn should_map_token_faults() {
    let harness = Harness::start().await;

    let mut options = linked(json!({}));
    options["xim_content"]["hue_access_token"] = json!(EXPIRED_TOKEN);
    let payload = harness.run(EntryPoint::Discovery, options).await;
    assert_eq!(payload["result"]["err_no"], json!(112));

    let mut options = linked(json!({}));
    options["xim_content"]["hue_access_token"] = json!("forged");
    let payload = harness.run(EntryPoint::Discovery, options).await;
    assert_eq!(payload["result"]["err_no"], json!(110));
}

#[tokio::test]
async fn should_stat_single_light() {
    let harness = Harness::start().await;
    let payload = harness
        .run(EntryPoint::Stat, linked(json!({ "device_id": "10" })))
        .await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(device_ids(&payload["list"]), ["10"]);
    assert_eq!(
        payload["xim_content"]["lights"]["10"]["device_name"],
        json!("Desk")
    );
}

#[tokio::test]
async fn should_stat_group_by_offset_id() {
    let harness = Harness::start().await;
    let payload = harness
        .run(EntryPoint::Stat, linked(json!({ "device_id": "90004" })))
        .await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(payload["list"][0]["device_name"], json!("Group 4"));
    assert_eq!(payload["list"][0]["device_id"], json!("90004"));
}

#[tokio::test]
async fn should_report_gateway_timeout_as_121() {
    let harness = Harness::start().await;
    let payload = harness
        .run(EntryPoint::Stat, linked(json!({ "device_id": "99" })))
        .await;
    assert_eq!(payload["result"]["err_no"], json!(121));
    assert_eq!(payload["list"], json!([]));
}

// ---------------------------------------------------------------------------
// action
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_send_color_command_to_light() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Action,
            linked(json!({
                "device_id": "2",
                "light_action": { "onoff": true, "rgb": "#ff0000", "brightness": 50 }
            })),
        )
        .await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert!(payload.get("device_id").is_none());
    assert!(payload.get("light_action").is_none());
    assert_eq!(
        payload["xim_content"]["lights"]["2"]["light_status"]["onoff"],
        json!(true)
    );

    let calls = harness.recorded.calls();
    assert_eq!(calls.len(), 1);
    let (call, body) = &calls[0];
    assert_eq!(call, &format!("PUT /v1/bridges/{BRIDGE_ID}/lights/2/state"));
    assert_eq!(body["on"], json!(true));
    assert_eq!(body["bri"], json!(127));
    let x = body["xy"][0].as_f64().unwrap();
    let y = body["xy"][1].as_f64().unwrap();
    assert!((x - 0.648_427_223_687_212).abs() < 1e-9);
    assert!((y - 0.330_856_101_472_778).abs() < 1e-9);
}

#[tokio::test]
async fn should_send_group_action_without_offset() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Action,
            linked(json!({ "device_id": "90003", "light_action": { "onoff": false } })),
        )
        .await;

    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(
        harness.recorded.calls(),
        [(
            format!("PUT /v1/bridges/{BRIDGE_ID}/groups/3/action"),
            json!({ "on": false })
        )]
    );
}

#[tokio::test]
async fn should_send_state_through_v2_paths_with_username() {
    let harness = Harness::start().await;
    let mut options = linked(json!({
        "device_id": "2",
        "light_action": { "hue": 180, "brightness": 100, "saturation": 100 }
    }));
    options["xim_content"]["userName"] = json!(USERNAME);

    let payload = harness.run(EntryPoint::Action, options).await;
    assert_eq!(payload["result"]["err_no"], json!(0));
    assert_eq!(
        harness.recorded.calls(),
        [(
            format!("PUT /v2/bridges/{BRIDGE_ID}/{USERNAME}/lights/2/state"),
            json!({ "hue": 32767, "bri": 255, "sat": 255 })
        )]
    );
}

#[tokio::test]
async fn should_reject_action_without_token_before_any_request() {
    let harness = Harness::start().await;
    let payload = harness
        .run(
            EntryPoint::Action,
            json!({ "xim_content": { "bridgeid": BRIDGE_ID }, "device_id": "2", "light_action": { "onoff": true } }),
        )
        .await;
    assert_eq!(payload["result"]["err_no"], json!(113));
    assert!(harness.recorded.calls().is_empty());
}
