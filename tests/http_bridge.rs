// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the Hue v1 HTTP bridge using wiremock.

use std::sync::Arc;
use std::time::Duration;

use hue_trigger::bridge::{BridgeClient, GroupKind, HttpBridge, HttpConfig};
use hue_trigger::error::UNAUTHORIZED_USER;
use hue_trigger::{BridgeError, Controller, ControllerConfig, Credential, GroupId, SceneId};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn bridge_for(server: &MockServer) -> HttpBridge {
    HttpConfig::new()
        .with_discovery_url(format!("{}/discovery", server.uri()))
        .with_timeout(Duration::from_secs(2))
        .into_bridge()
        .unwrap()
}

async fn authenticated(bridge: &HttpBridge, server: &MockServer) -> hue_trigger::bridge::HueSession {
    bridge
        .open_authenticated(&server.uri(), &Credential::new("abc"))
        .await
        .unwrap()
}

// ============================================================================
// Discovery and pairing
// ============================================================================

mod pairing {
    use super::*;

    #[tokio::test]
    async fn discover_parses_entries() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/discovery"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "001788fffe123456", "internalipaddress": "192.168.1.2", "port": 443}
            ])))
            .mount(&server)
            .await;

        let found = bridge_for(&server).discover().await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].host, "192.168.1.2");
        assert_eq!(found[0].id.as_deref(), Some("001788fffe123456"));
    }

    #[tokio::test]
    async fn create_user_reports_link_button() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"error": {"type": 101, "address": "", "description": "link button not pressed"}}
            ])))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = bridge.open_unauthenticated(&server.uri()).await.unwrap();
        let err = bridge
            .create_user(&session, "hue_trigger#test")
            .await
            .unwrap_err();

        assert!(err.is_link_button_not_pressed());
    }

    #[tokio::test]
    async fn create_user_returns_username() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api"))
            .and(body_json(json!({"devicetype": "hue_trigger#test"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"success": {"username": "new-user"}}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = bridge.open_unauthenticated(&server.uri()).await.unwrap();
        let credential = bridge
            .create_user(&session, "hue_trigger#test")
            .await
            .unwrap();

        assert_eq!(credential.expose(), "new-user");
    }
}

// ============================================================================
// Authenticated resources
// ============================================================================

mod resources {
    use super::*;

    #[tokio::test]
    async fn get_configuration() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Hue Bridge",
                "ipaddress": "192.168.1.2",
                "swversion": "1967054020"
            })))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let info = bridge.get_configuration(&session).await.unwrap();

        assert_eq!(info.name, "Hue Bridge");
        assert_eq!(info.ip_address, "192.168.1.2");
    }

    #[tokio::test]
    async fn unauthorized_user_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"error": {"type": 1, "address": "/config", "description": "unauthorized user"}}
            ])))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let err = bridge.get_configuration(&session).await.unwrap_err();

        assert_eq!(err.code(), Some(1));
    }

    #[tokio::test]
    async fn public_config_means_unknown_user() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Philips hue",
                "swversion": "1967054020",
                "apiversion": "1.50.0",
                "bridgeid": "001788FFFE123456",
                "factorynew": false,
                "modelid": "BSB002"
            })))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let err = bridge.get_configuration(&session).await.unwrap_err();

        assert_eq!(err.code(), Some(UNAUTHORIZED_USER));
    }

    #[tokio::test]
    async fn http_status_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/config"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let err = bridge.get_configuration(&session).await.unwrap_err();

        assert!(matches!(err, BridgeError::Connection(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn list_scenes_and_groups() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/scenes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "s2": {"name": "Energize", "group": "1", "lights": ["1"], "type": "GroupScene"},
                "s1": {"name": "Relax", "group": "1", "lights": ["1", "2"], "type": "GroupScene"},
                "s3": {"name": "Reading", "lights": ["3"], "type": "LightScene"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/abc/groups"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "10": {"name": "Garage", "type": "Room", "lights": []},
                "2": {"name": "Upstairs", "type": "Zone", "lights": []},
                "1": {"name": "Living Room", "type": "Room", "lights": ["1", "2"]}
            })))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;

        let scenes = bridge.list_scenes(&session).await.unwrap();
        let ids: Vec<_> = scenes.iter().map(|scene| scene.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s2", "s3"]);
        assert_eq!(scenes[0].group, Some(GroupId::new("1")));
        assert_eq!(scenes[2].group, None);

        let groups = bridge.list_groups(&session).await.unwrap();
        let ids: Vec<_> = groups.iter().map(|group| group.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "10"]);
        assert_eq!(groups[1].kind, GroupKind::Zone);
    }

    #[tokio::test]
    async fn scene_detail_follows_light_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/scenes/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Relax",
                "group": "1",
                "lights": ["2", "1", "3"],
                "lightstates": {
                    "1": {"on": true, "bri": 254, "xy": [0.5, 0.4]},
                    "2": {"on": false, "bri": 127}
                }
            })))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let detail = bridge
            .get_scene_detail(&session, &SceneId::new("s1"))
            .await
            .unwrap();

        assert_eq!(detail.name, "Relax");
        assert_eq!(detail.light_states.len(), 3);
        assert!(detail.light_states[0].xy.is_none());
        let lit = detail.light_states[1];
        assert_eq!(lit.xy.map(|xy| (xy.x, xy.y)), Some((0.5, 0.4)));
        assert!((lit.brightness - 1.0).abs() < f64::EPSILON);
        assert!(detail.light_states[2].xy.is_none());
    }

    #[tokio::test]
    async fn stateless_light_keeps_stop_positions() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/scenes/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Energize",
                "lights": ["1", "2"],
                "lightstates": {"2": {"on": true, "bri": 254, "xy": [0.7, 0.3]}}
            })))
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;
        let detail = bridge
            .get_scene_detail(&session, &SceneId::new("s1"))
            .await
            .unwrap();

        assert_eq!(
            hue_trigger::color::gradient(&detail.light_states),
            "linear-gradient(90deg, rgba(255,75,0,1) 50%)"
        );
    }

    #[tokio::test]
    async fn push_group_state_sends_scene_and_transition() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/abc/groups/1/action"))
            .and(body_json(json!({"scene": "s1", "transitiontime": 4})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"success": {"/groups/1/action/scene": "s1"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let bridge = bridge_for(&server);
        let session = authenticated(&bridge, &server).await;

        bridge
            .push_group_state(
                &session,
                &GroupId::new("1"),
                &SceneId::new("s1"),
                Duration::from_millis(400),
            )
            .await
            .unwrap();
    }
}

// ============================================================================
// Controller over HTTP
// ============================================================================

mod controller {
    use super::*;
    use hue_trigger::{ConfigError, Error, TriggerInvocation};

    #[tokio::test]
    async fn configure_and_recall_scene() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/abc/config"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "Hue Bridge", "ipaddress": "127.0.0.1"})),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/abc/scenes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "s1": {"name": "Relax", "group": "1", "lights": ["1"]}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/abc/scenes/s1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Relax",
                "lights": ["1"],
                "lightstates": {"1": {"on": true, "bri": 254, "xy": [0.7, 0.3]}}
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/api/abc/groups/1/action"))
            .and(body_json(json!({"scene": "s1", "transitiontime": 0})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"success": {"/groups/1/action/scene": "s1"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let controller = Controller::new(Arc::new(bridge_for(&server))).unwrap();
        let snapshot = controller
            .update_config(
                ControllerConfig::with_host(server.uri())
                    .with_user("abc")
                    .with_group("1"),
            )
            .await
            .unwrap();

        assert_eq!(
            snapshot.catalog().get("Relax").unwrap().gradient,
            "linear-gradient(90deg, rgba(255,75,0,1) 0%)"
        );

        controller
            .trigger(TriggerInvocation::new("Relax").with_transition(Duration::ZERO))
            .unwrap()
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_user_fails_authentication() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/wrong-user/config"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "Philips hue", "swversion": "1967054020"})),
            )
            .mount(&server)
            .await;

        let controller = Controller::new(Arc::new(bridge_for(&server))).unwrap();
        let err = controller
            .update_config(
                ControllerConfig::with_host(server.uri())
                    .with_user("wrong-user")
                    .with_group("1"),
            )
            .await
            .unwrap_err();

        match err {
            Error::Config(ConfigError::AuthenticationFailed { source, .. }) => {
                assert_eq!(source.code(), Some(UNAUTHORIZED_USER));
            }
            other => panic!("Expected AuthenticationFailed, got {other:?}"),
        }
        assert!(controller.state().is_failed());
        assert!(controller.snapshot().session().is_none());
    }
}
