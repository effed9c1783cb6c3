#![allow(clippy::unwrap_used)]
// Hub, catalog and controller tests against a wiremock MarsPro service.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use marspro_core::{
    Command, CommandResult, ConnectionState, CoreError, Credentials, DeviceGroup, Hub, HubConfig,
    LevelControl, PowerState, SetupError,
};

const LIST: &str = "/android/udm/getDeviceList/v1";
const INFO: &str = "/android/mine/info/v1";
const CALC: &str = "/h5/product/getCalculateSum/v1";

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> HubConfig {
    let mut config = HubConfig::new(Credentials::new(
        "grower@example.com",
        SecretString::from("hunter2".to_string()),
    ));
    config.base_url = Url::parse(&server.uri()).unwrap();
    config.refresh_interval_secs = 0;
    config
}

fn hub(server: &MockServer) -> Hub {
    Hub::with_http(config(server), reqwest::Client::new())
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": "000", "msg": "success", "data": data }))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(INFO))
        .respond_with(ok(json!({ "userId": 1 })))
        .mount(server)
        .await;
}

async fn mount_group(server: &MockServer, group: u32, list: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(LIST))
        .and(body_partial_json(json!({ "deviceProductGroup": group })))
        .respond_with(ok(json!({ "list": list })))
        .mount(server)
        .await;
}

async fn mount_group_failure(server: &MockServer, group: u32) {
    Mock::given(method("POST"))
        .and(path(LIST))
        .and(body_partial_json(json!({ "deviceProductGroup": group })))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .mount(server)
        .await;
}

async fn mount_calculations(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(CALC))
        .respond_with(ok(json!(100)))
        .mount(server)
        .await;
}

fn entry(id: &str, name: &str, status: i64, info: &str) -> serde_json::Value {
    json!({ "id": id, "deviceName": name, "connectStatus": status, "deviceInfo": info })
}

async fn list_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == LIST)
        .count()
}

// ── Catalog refresh ─────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_fan_group_keeps_lights() {
    let server = MockServer::start().await;
    mount_group(&server, 1, json!([entry("l1", "Veg", 1, "{\"lastBright\":40}")])).await;
    mount_group_failure(&server, 2).await;
    for group in [3, 6, 7] {
        mount_group(&server, group, json!([])).await;
    }

    let snapshot = hub(&server).full_refresh().await;

    assert_eq!(snapshot.group(DeviceGroup::Light).len(), 1);
    assert!(!snapshot.contains_group(DeviceGroup::Fan));
    assert!(snapshot.device("l1").is_some());
}

#[tokio::test]
async fn test_corrupt_record_does_not_drop_its_group() {
    let server = MockServer::start().await;
    mount_group(
        &server,
        1,
        json!([
            entry("good", "Veg", 1, "{\"lastBright\":40}"),
            {
                "id": "odd",
                "deviceName": "Flower",
                "connectStatus": "1",
                "deviceProductGroup": "1",
                "deviceInfo": { "lastBright": 40 }
            },
            { "deviceName": "No id", "connectStatus": 1 }
        ]),
    )
    .await;
    mount_group(&server, 2, json!([])).await;
    for group in [3, 6, 7] {
        mount_group(&server, group, json!([])).await;
    }

    let snapshot = hub(&server).full_refresh().await;

    let ids: Vec<_> = snapshot
        .group(DeviceGroup::Light)
        .iter()
        .map(|d| d.id.clone())
        .collect();
    assert_eq!(ids, vec!["good".to_string(), "odd".to_string()]);
    let odd = snapshot.device("odd").unwrap();
    assert!(odd.is_connected());
    assert_eq!(odd.raw_info.as_deref(), Some("{\"lastBright\":40}"));
}

#[tokio::test]
async fn test_empty_other_group_is_absent() {
    let server = MockServer::start().await;
    mount_group(&server, 1, json!([])).await;
    mount_group(&server, 2, json!([])).await;
    mount_group(&server, 3, json!([])).await;
    mount_group(&server, 6, json!([{ "id": "s1", "deviceName": "Sensor", "connectStatus": 1 }])).await;
    mount_group_failure(&server, 7).await;

    let snapshot = hub(&server).full_refresh().await;

    let groups: Vec<_> = snapshot.groups().keys().copied().collect();
    assert_eq!(
        groups,
        vec![DeviceGroup::Light, DeviceGroup::Fan, DeviceGroup::Other(6)]
    );
}

#[tokio::test]
async fn test_device_in_two_groups_is_kept_once() {
    let server = MockServer::start().await;
    mount_group(&server, 1, json!([entry("dup", "Both", 1, "{}")])).await;
    mount_group(&server, 2, json!([entry("dup", "Both", 1, "{}")])).await;
    for group in [3, 6, 7] {
        mount_group(&server, group, json!([])).await;
    }

    let snapshot = hub(&server).full_refresh().await;

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.device("dup").unwrap().group, DeviceGroup::Light);
}

#[tokio::test]
async fn test_refresh_notifies_subscribers() {
    let server = MockServer::start().await;
    mount_group(&server, 1, json!([entry("l1", "Veg", 1, "{}")])).await;
    mount_group(&server, 2, json!([])).await;
    for group in [3, 6, 7] {
        mount_group(&server, group, json!([])).await;
    }

    let hub = hub(&server);
    let mut rx = hub.subscribe();
    hub.full_refresh().await;

    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().refreshed_at().is_some());
}

// ── Controllers ─────────────────────────────────────────────────────

async fn connected_hub(server: &MockServer) -> Hub {
    mount_login(server).await;
    mount_group(
        server,
        1,
        json!([
            entry("l1", "Veg", 1, "{\"lastBright\":80}"),
            entry("l2", "Flower", 0, "{\"lastBright\":100}"),
            entry("l3", "Clone", 1, "garbage"),
        ]),
    )
    .await;
    mount_group(
        server,
        2,
        json!([
            entry("f1", "Exhaust", 1, "{\"fanSpeed\":420}"),
            entry("f2", "Intake", 1, "{\"fanSpeed\":0}"),
        ]),
    )
    .await;
    for group in [3, 6, 7] {
        mount_group(server, group, json!([])).await;
    }
    mount_calculations(server).await;

    let hub = hub(server);
    hub.connect().await.unwrap();
    hub
}

#[tokio::test]
async fn test_controller_names_and_ids() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;

    let lights = hub.lights();
    assert_eq!(lights.len(), 3);
    assert_eq!(lights[0].name(), "MarsPro Veg");
    assert_eq!(lights[0].unique_id(), "marspro_light_l1");

    let fans = hub.fans();
    assert_eq!(fans[0].unique_id(), "marspro_fan_f1");

    hub.disconnect().await;
}

#[tokio::test]
async fn test_controller_states() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;

    let lights = hub.lights();
    assert_eq!(lights[0].state(), PowerState::On(204));
    // Disconnected wins over a perfectly good level.
    assert!(!lights[1].is_available());
    assert_eq!(lights[1].state(), PowerState::Unavailable);
    // Malformed deviceInfo decodes to 0.
    assert_eq!(lights[2].brightness(), 0);
    assert_eq!(lights[2].state(), PowerState::Off);

    let fans = hub.fans();
    assert_eq!(fans[0].state(), PowerState::On(50));
    assert_eq!(fans[1].state(), PowerState::Off);

    hub.disconnect().await;
}

#[tokio::test]
async fn test_vanished_device_is_unavailable() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let light = hub.lights().remove(0);

    server.reset().await;
    mount_group(&server, 1, json!([])).await;
    mount_group(&server, 2, json!([])).await;
    hub.full_refresh().await;

    assert_eq!(light.state(), PowerState::Unavailable);
    hub.disconnect().await;
}

#[tokio::test]
async fn test_fan_turn_off_commands_minimum_speed() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let fan = hub.fans().remove(0);

    let result = fan.turn_off().await.unwrap();
    match result {
        CommandResult::FanSpeed(calc) => assert_eq!(calc.percentage, 25),
        other => panic!("expected fan result, got {other:?}"),
    }

    let requests = server.received_requests().await.unwrap();
    let calc_values: Vec<i64> = requests
        .iter()
        .filter(|r| r.url.path() == CALC)
        .map(|r| {
            let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
            body["argsList"][0]["argValue"].as_i64().unwrap()
        })
        .collect();
    assert_eq!(calc_values, vec![25, 25]);

    hub.disconnect().await;
}

#[tokio::test]
async fn test_fan_levels_are_clamped() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let fan = hub.fans().remove(0);

    let CommandResult::FanSpeed(calc) = fan.set_level(10).await.unwrap() else {
        panic!("expected fan result");
    };
    assert_eq!(calc.percentage, 25);

    let CommandResult::FanSpeed(calc) = fan.turn_on(None).await.unwrap() else {
        panic!("expected fan result");
    };
    assert_eq!(calc.percentage, 25);

    hub.disconnect().await;
}

#[tokio::test]
async fn test_light_commands() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let lights = hub.lights();

    // Back to the last reported level (lastBright 80).
    assert!(matches!(
        lights[0].turn_on(None).await.unwrap(),
        CommandResult::Brightness(80)
    ));
    // Host 128 of 255 is 50 %.
    assert!(matches!(
        lights[0].set_level(128).await.unwrap(),
        CommandResult::Brightness(50)
    ));
    assert!(matches!(
        lights[0].turn_on(Some(255)).await.unwrap(),
        CommandResult::Brightness(100)
    ));
    assert!(matches!(
        lights[0].turn_off().await.unwrap(),
        CommandResult::Brightness(0)
    ));

    hub.disconnect().await;
}

#[tokio::test]
async fn test_light_without_a_known_level_turns_on_at_half() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    // l3 reports unparsable deviceInfo.
    let light = hub.lights().remove(2);
    assert_eq!(light.device_id(), "l3");

    assert!(matches!(
        light.turn_on(None).await.unwrap(),
        CommandResult::Brightness(50)
    ));

    hub.disconnect().await;
}

#[tokio::test]
async fn test_successful_command_schedules_refresh() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let mut rx = hub.subscribe();
    rx.borrow_and_update();
    let before = list_requests(&server).await;

    hub.lights()[0].turn_off().await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .unwrap()
        .unwrap();

    // One poll: lights, fans and the three extra groups.
    assert_eq!(list_requests(&server).await - before, 5);
    hub.disconnect().await;
}

#[tokio::test]
async fn test_refresh_requests_coalesce() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let mut rx = hub.subscribe();
    rx.borrow_and_update();
    let before = list_requests(&server).await;

    for _ in 0..10 {
        hub.request_refresh();
    }
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .unwrap()
        .unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let polls = (list_requests(&server).await - before) / 5;
    assert!((1..=2).contains(&polls), "expected at most two polls, got {polls}");
    hub.disconnect().await;
}

#[tokio::test]
async fn test_command_for_unknown_device_fails() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;

    let err = hub
        .execute(Command::SetFanSpeed {
            device_id: "nope".into(),
            percentage: 50,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DeviceNotFound { .. }));

    hub.disconnect().await;
}

#[tokio::test]
async fn test_commands_require_connection() {
    let server = MockServer::start().await;
    let hub = hub(&server);

    let err = hub
        .execute(Command::SetLightBrightness {
            device_id: "l1".into(),
            percentage: 50,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::HubDisconnected));
}

// ── Lifecycle and setup ─────────────────────────────────────────────

#[tokio::test]
async fn test_second_connect_is_a_no_op() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    let before = list_requests(&server).await;

    hub.connect().await.unwrap();

    assert_eq!(list_requests(&server).await, before);
    assert_eq!(*hub.connection_state().borrow(), ConnectionState::Connected);
    hub.disconnect().await;
}

#[tokio::test]
async fn test_reconnect_after_disconnect_resumes_commands_and_refresh() {
    let server = MockServer::start().await;
    let hub = connected_hub(&server).await;
    hub.disconnect().await;
    assert_eq!(*hub.connection_state().borrow(), ConnectionState::Disconnected);

    hub.connect().await.unwrap();
    let mut rx = hub.subscribe();
    rx.borrow_and_update();

    assert!(matches!(
        hub.lights()[0].turn_off().await.unwrap(),
        CommandResult::Brightness(0)
    ));
    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .unwrap()
        .unwrap();

    hub.disconnect().await;
}

#[tokio::test]
async fn test_declined_login_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(INFO))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "code": "401", "msg": "bad token" })),
        )
        .mount(&server)
        .await;

    let hub = hub(&server);
    let err = hub.connect().await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(*hub.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_validate_credentials_outcomes() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    assert_eq!(hub(&server).validate_credentials().await.unwrap(), "MarsPro");

    server.reset().await;
    Mock::given(method("POST"))
        .and(path(INFO))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    assert!(matches!(
        hub(&server).validate_credentials().await,
        Err(SetupError::InvalidAuth)
    ));

    server.reset().await;
    Mock::given(method("POST"))
        .and(path(INFO))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;
    assert!(matches!(
        hub(&server).validate_credentials().await,
        Err(SetupError::CannotConnect { .. })
    ));

    let uri = server.uri();
    drop(server);
    let mut cfg = HubConfig::new(Credentials::new(
        "grower@example.com",
        SecretString::from("hunter2".to_string()),
    ));
    cfg.base_url = Url::parse(&uri).unwrap();
    let offline = Hub::with_http(cfg, reqwest::Client::new());
    assert!(matches!(
        offline.validate_credentials().await,
        Err(SetupError::CannotConnect { .. })
    ));
}

#[tokio::test]
async fn test_blank_credentials_are_invalid_without_a_request() {
    let server = MockServer::start().await;
    let mut cfg = config(&server);
    cfg.credentials = Credentials::new("", SecretString::from(String::new()));

    let hub = Hub::with_http(cfg, reqwest::Client::new());
    assert!(matches!(
        hub.validate_credentials().await,
        Err(SetupError::InvalidAuth)
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oneshot_connects_runs_and_disconnects() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_group(&server, 1, json!([entry("l1", "Veg", 1, "{\"lastBright\":40}")])).await;
    mount_group(&server, 2, json!([])).await;
    for group in [3, 6, 7] {
        mount_group(&server, group, json!([])).await;
    }

    let mut cfg = config(&server);
    cfg.refresh_interval_secs = 30;

    let (names, state) = Hub::oneshot(cfg, |hub| async move {
        assert_eq!(hub.config().refresh_interval_secs, 0);
        let names: Vec<String> = hub.lights().iter().map(|l| l.name().to_owned()).collect();
        Ok((names, hub.connection_state()))
    })
    .await
    .unwrap();

    assert_eq!(names, vec!["MarsPro Veg".to_string()]);
    assert_eq!(*state.borrow(), ConnectionState::Disconnected);
}
