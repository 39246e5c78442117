//! Accessory lifecycle tests through the public library API.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;
use virtual_accessory_bridge::BridgeError;
use virtual_accessory_bridge::accessory::{
    AttributeValue, CapabilityKind, CapabilitySnapshot, DeviceSnapshot,
};
use virtual_accessory_bridge::catalog::{DelegateFactory, DeviceKind};
use virtual_accessory_bridge::config::Config;
use virtual_accessory_bridge::host::{AccessoryHost, DeviceCache, MemoryHost};
use virtual_accessory_bridge::platform::Platform;
use virtual_accessory_bridge::registry::Exposure;
use virtual_accessory_bridge::streaming::options::{
    H264Level, H264Profile, Resolution, SrtpCryptoSuite, VideoProfile,
};
use virtual_accessory_bridge::streaming::{
    LoggingDelegate, StartStreamRequest, StreamingDelegate, StreamingStatus,
};
use virtual_accessory_bridge::trigger::{TriggerCommand, dispatch};

fn delegates() -> DelegateFactory {
    Arc::new(|name: &str| Arc::new(LoggingDelegate::new(name)) as Arc<dyn StreamingDelegate>)
}

fn config(kind: DeviceKind) -> Config {
    let mut config = Config::default();
    config.platform.device_kind = kind;
    config
}

fn launch(config: &Config, host: Arc<dyn AccessoryHost>, cached: Vec<DeviceSnapshot>) -> Platform {
    let platform = Platform::new(config, host, delegates());
    platform.configure_cached(cached).unwrap();
    platform
}

fn switch_snapshot(id: u128, name: &str, on: Option<bool>) -> DeviceSnapshot {
    let mut values = BTreeMap::new();
    if let Some(on) = on {
        values.insert("On".to_string(), AttributeValue::Bool(on));
    }
    DeviceSnapshot {
        id: Uuid::from_u128(id),
        display_name: name.to_string(),
        capabilities: vec![
            CapabilitySnapshot {
                kind: CapabilityKind::AccessoryInfo,
                name: name.to_string(),
                values: BTreeMap::new(),
            },
            CapabilitySnapshot {
                kind: CapabilityKind::Switch,
                name: name.to_string(),
                values,
            },
        ],
    }
}

#[test]
fn timestamp_named_device_lifecycle() {
    let host = Arc::new(MemoryHost::new());
    let platform = launch(&config(DeviceKind::Lightbulb), host.clone(), Vec::new());
    let registry = platform.registry();
    let name = "2024-01-01T00:00:00Z";

    let record = registry.add(name).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(record.display_name(), name);
    assert_eq!(registry.derive_id(name), record.id());

    assert!(matches!(
        registry.add(name),
        Err(BridgeError::DuplicateIdentity(_))
    ));

    registry.remove(record.id()).unwrap();
    assert!(registry.is_empty());
    registry.remove(record.id()).unwrap();
    assert!(registry.is_empty());

    assert!(host.visible().is_empty());
    assert_eq!(host.added_batches().len(), 1);
    assert_eq!(host.removed_batches().len(), 1);
}

#[test]
fn restored_switches_report_cached_values() {
    let host = Arc::new(MemoryHost::new());
    let a = switch_snapshot(1, "Switch A", Some(true));
    let b = switch_snapshot(2, "Switch B", None);
    let platform = launch(
        &config(DeviceKind::Switch),
        host,
        vec![a.clone(), b.clone()],
    );
    let registry = platform.registry();

    assert_eq!(registry.len(), 2);
    for (snapshot, expected) in [(&a, true), (&b, false)] {
        let record = registry.get(snapshot.id).unwrap();
        let switch = record.capability(CapabilityKind::Switch).unwrap();
        assert_eq!(switch.get("On").unwrap(), AttributeValue::Bool(expected));
    }

    // Handlers are live: a write is visible on the next read
    let record = registry.get(b.id).unwrap();
    let switch = record.capability(CapabilityKind::Switch).unwrap();
    switch.set("On", AttributeValue::Bool(true)).unwrap();
    assert_eq!(switch.get("On").unwrap(), AttributeValue::Bool(true));
}

#[test]
fn remove_all_trigger_is_one_batch() {
    let host = Arc::new(MemoryHost::new());
    let platform = launch(&config(DeviceKind::Switch), host.clone(), Vec::new());
    let registry = platform.registry();

    for name in ["A", "B", "C", "D"] {
        dispatch(
            registry,
            TriggerCommand::Add {
                name: Some(name.to_string()),
            },
        );
    }
    let before: Vec<Uuid> = registry.records().iter().map(|r| r.id()).collect();

    assert_eq!(dispatch(registry, TriggerCommand::RemoveAll), 0);

    let batches = host.removed_batches();
    assert_eq!(batches.len(), 1);
    let mut removed = batches[0].clone();
    removed.sort();
    let mut expected = before;
    expected.sort();
    assert_eq!(removed, expected);
}

#[test]
fn restart_round_trip_through_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accessories.json");
    let mut config = config(DeviceKind::Camera);
    config.cache.path = path.clone();

    let first_run = {
        let cache = Arc::new(DeviceCache::new(path.clone()));
        let platform = launch(&config, cache.clone(), cache.snapshots());
        let registry = platform.registry();
        registry.add("Front Door").unwrap();
        registry.add("Garage").unwrap();

        let camera = registry.get(registry.derive_id("Garage")).unwrap();
        camera
            .capability(CapabilityKind::CameraStream)
            .unwrap()
            .set("Active", AttributeValue::Bool(true))
            .unwrap();
        cache.sync(registry.snapshots());
        registry.snapshots()
    };

    // Restart twice; identity and structure survive each time
    for _ in 0..2 {
        let cache = Arc::new(DeviceCache::new(path.clone()));
        let platform = launch(&config, cache.clone(), cache.snapshots());
        let snapshots = platform.registry().snapshots();
        assert_eq!(snapshots, first_run);

        let garage = platform
            .registry()
            .get(platform.registry().derive_id("Garage"))
            .unwrap();
        assert!(garage.stream_controller().is_some());
        assert_eq!(
            garage
                .capability(CapabilityKind::CameraStream)
                .unwrap()
                .get("Active")
                .unwrap(),
            AttributeValue::Bool(true)
        );
    }
}

#[test]
fn camera_sessions_respect_descriptor() {
    let host = Arc::new(MemoryHost::new());
    let platform = launch(&config(DeviceKind::Camera), host, Vec::new());
    let camera = platform.registry().add("Porch").unwrap();
    let controller = camera.stream_controller().unwrap().clone();

    let request = |session: u128| StartStreamRequest {
        session_id: Uuid::from_u128(session),
        video: VideoProfile {
            profile: H264Profile::Main,
            level: H264Level::Level3_1,
        },
        resolution: Resolution::new(1280, 720, 30),
        crypto_suite: SrtpCryptoSuite::AesCm128HmacSha1_80,
    };

    tokio_test::block_on(async {
        controller.start(&request(1)).await.unwrap();
        controller.start(&request(2)).await.unwrap();
        assert_eq!(controller.streaming_status(), StreamingStatus::InUse);
        assert!(matches!(
            controller.start(&request(3)).await,
            Err(BridgeError::MaxStreamsReached)
        ));

        let mut odd = request(4);
        odd.resolution = Resolution::new(1234, 567, 30);
        controller.stop(Uuid::from_u128(1)).await.unwrap();
        assert!(matches!(
            controller.start(&odd).await,
            Err(BridgeError::UnsupportedStreamParameters(_))
        ));
        assert_eq!(controller.streaming_status(), StreamingStatus::Available);
    });
}

#[test]
fn static_platform_cannot_be_triggered() {
    let host = Arc::new(MemoryHost::new());
    let mut config = config(DeviceKind::Switch);
    config.platform.exposure = Exposure::from_mode("static", Vec::new()).unwrap();
    let platform = launch(&config, host.clone(), Vec::new());

    let published = platform.registry().publish().unwrap();
    let names: Vec<_> = published.iter().map(|r| r.display_name().to_string()).collect();
    assert_eq!(names, vec!["Switch 1", "Switch 2"]);

    assert_eq!(dispatch(platform.registry(), TriggerCommand::RemoveAll), 2);
    assert!(host.removed_batches().is_empty());
}
