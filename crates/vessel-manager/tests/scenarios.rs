//! End-to-end scenarios from spec §8, wired to a real (tempfile-backed)
//! repository and an in-process bus.

use std::sync::Arc;
use std::time::Duration;

use vessel_ais::{topics, DecodedMessage, Zone};
use vessel_bus::Bus;
use vessel_manager::{ManagerConfig, VesselManager, VesselUpdated};
use vessel_repository::Repository;

async fn harness(zones: Vec<Zone>, max_tracked: usize) -> (Arc<VesselManager>, Bus, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::start(dir.path().join("db.sqlite")).await.unwrap();
    let bus = Bus::new();
    let config = ManagerConfig {
        in_topic: topics::AIS_DECODED.to_string(),
        max_tracked,
        zones,
    };
    let manager = Arc::new(VesselManager::new(bus.clone(), Arc::new(repo), config));
    manager.start();
    (manager, bus, dir)
}

async fn recv<T: Clone + Send + Sync + 'static>(sub: &mut vessel_bus::Subscription) -> T {
    tokio::time::timeout(Duration::from_secs(1), sub.recv_as::<T>())
        .await
        .expect("event did not arrive in time")
        .expect("bus closed unexpectedly")
}

/// S1 — new-vessel first sighting without static data.
#[tokio::test]
async fn s1_new_vessel_first_sighting() {
    let (_manager, bus, _dir) = harness(vec![], 50).await;
    let mut first_seen = bus.subscribe(topics::VESSEL_FIRST_SEEN);
    let mut updated = bus.subscribe(topics::VESSEL_UPDATED);

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235098765,
            msg_type: 1,
            lat: Some(53.40),
            lon: Some(-3.00),
            ..Default::default()
        },
    );

    let seen: vessel_manager::VesselFirstSeen = recv(&mut first_seen).await;
    assert_eq!(seen.mmsi.as_str(), "235098765");
    assert!(!seen.has_static_data);

    let update: VesselUpdated = recv(&mut updated).await;
    assert_eq!(update.vessel.static_data.name, "Unknown");
    assert!(!update.vessel.static_data.has_static_data);
    assert_eq!(update.vessel.dynamic.lat, Some(53.40));
    assert_eq!(update.vessel.dynamic.lon, Some(-3.00));
}

/// S2 — static data arrives later; no zone event without lat/lon.
#[tokio::test]
async fn s2_static_arrives_later() {
    let (_manager, bus, _dir) = harness(vec![], 50).await;
    let mut identified = bus.subscribe(topics::VESSEL_IDENTIFIED);
    let mut updated = bus.subscribe(topics::VESSEL_UPDATED);
    let mut zone_entered = bus.subscribe(topics::VESSEL_ZONE_ENTERED);

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235098765,
            msg_type: 1,
            lat: Some(53.40),
            lon: Some(-3.00),
            ..Default::default()
        },
    );
    let _: VesselUpdated = recv(&mut updated).await;

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235098765,
            msg_type: 5,
            shipname: Some("ATLANTIC".to_string()),
            callsign: Some("G123".to_string()),
            ship_type: Some(70),
            to_bow: Some(80),
            to_stern: Some(20),
            to_port: Some(8),
            to_starboard: Some(8),
            ..Default::default()
        },
    );

    let identified: vessel_manager::VesselIdentified = recv(&mut identified).await;
    assert_eq!(identified.vessel.static_data.name, "ATLANTIC");

    let update: VesselUpdated = recv(&mut updated).await;
    assert_eq!(update.vessel.static_data.name, "ATLANTIC");
    assert!(update.vessel.static_data.has_static_data);
    // No lat/lon on the type-5 message: the previous position persists.
    assert_eq!(update.vessel.dynamic.lat, Some(53.40));

    assert!(
        tokio::time::timeout(Duration::from_millis(100), zone_entered.recv()).await.is_err(),
        "no zone event expected when no position is carried"
    );
}

/// S3 — SAR aircraft MMSI (`111` prefix) is filtered out entirely.
#[tokio::test]
async fn s3_sar_aircraft_filtered() {
    let (_manager, bus, _dir) = harness(vec![], 50).await;
    let mut updated = bus.subscribe(topics::VESSEL_UPDATED);

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 111234567,
            msg_type: 1,
            lat: Some(53.4),
            lon: Some(-3.0),
            ..Default::default()
        },
    );

    assert!(tokio::time::timeout(Duration::from_millis(100), updated.recv()).await.is_err());
}

/// S4 — an MMSI that is not exactly 9 digits is dropped like S3.
#[tokio::test]
async fn s4_short_mmsi_filtered() {
    let (_manager, bus, _dir) = harness(vec![], 50).await;
    let mut updated = bus.subscribe(topics::VESSEL_UPDATED);

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 12345,
            msg_type: 1,
            ..Default::default()
        },
    );

    assert!(tokio::time::timeout(Duration::from_millis(100), updated.recv()).await.is_err());
}

/// S5 — zone enter then exit.
#[tokio::test]
async fn s5_zone_enter_and_exit() {
    let harbour = Zone::new("harbour", 53.40, -3.00, 1.0);
    let (_manager, bus, _dir) = harness(vec![harbour], 50).await;
    let mut entered = bus.subscribe(topics::VESSEL_ZONE_ENTERED);
    let mut exited = bus.subscribe(topics::VESSEL_ZONE_EXITED);

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235000001,
            msg_type: 1,
            lat: Some(53.40),
            lon: Some(-3.00),
            ..Default::default()
        },
    );
    let enter: vessel_manager::VesselZoneEntered = recv(&mut entered).await;
    assert_eq!(enter.zone, "harbour");

    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235000001,
            msg_type: 1,
            lat: Some(53.50),
            lon: Some(-3.00),
            ..Default::default()
        },
    );
    let exit: vessel_manager::VesselZoneExited = recv(&mut exited).await;
    assert_eq!(exit.zone, "harbour");
}

/// S6 — eviction at `max_tracked = 2`; the evicted vessel returns as
/// "appeared" (repository hit), not "first_seen", on reappearance.
#[tokio::test]
async fn s6_eviction_and_return_as_appeared() {
    let (manager, bus, _dir) = harness(vec![], 2).await;
    let mut updated = bus.subscribe(topics::VESSEL_UPDATED);

    for mmsi in [235000001u32, 235000002, 235000003] {
        bus.publish(
            topics::AIS_DECODED,
            DecodedMessage {
                mmsi,
                msg_type: 1,
                lat: Some(53.4),
                lon: Some(-3.0),
                ..Default::default()
            },
        );
        let _: VesselUpdated = recv(&mut updated).await;
        // Ensure distinct `ts` values so eviction order is deterministic.
        tokio::time::sleep(Duration::from_millis(1100)).await;
    }

    let tracked: Vec<String> = manager.get_all_vessels().into_iter().map(|v| v.mmsi.to_string()).collect();
    assert_eq!(tracked.len(), 2);
    assert!(!tracked.contains(&"235000001".to_string()));

    let mut appeared = bus.subscribe(topics::VESSEL_APPEARED);
    let mut first_seen = bus.subscribe(topics::VESSEL_FIRST_SEEN);
    bus.publish(
        topics::AIS_DECODED,
        DecodedMessage {
            mmsi: 235000001,
            msg_type: 1,
            lat: Some(53.4),
            lon: Some(-3.0),
            ..Default::default()
        },
    );

    let app: vessel_manager::VesselAppeared = recv(&mut appeared).await;
    assert_eq!(app.mmsi.as_str(), "235000001");
    assert!(tokio::time::timeout(Duration::from_millis(100), first_seen.recv()).await.is_err());
}
