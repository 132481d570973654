use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use vessel_ais::zone::find_zone;
use vessel_ais::{topics, DecodedMessage, Mmsi, Zone};
use vessel_bus::Bus;
use vessel_repository::{Repository, UpsertVessel};

use crate::events::{
    VesselAppeared, VesselFirstSeen, VesselIdentified, VesselUpdated, VesselZoneEntered, VesselZoneExited,
    VesselZoneMoved,
};
use crate::record::{DynamicUpdate, VesselRecord};

/// Construction-time configuration for a [`VesselManager`] (spec §4.4).
pub struct ManagerConfig {
    /// Topic to subscribe to for decoded messages. Defaults to
    /// [`topics::AIS_DECODED`].
    pub in_topic: String,
    /// Cap on the in-memory tracked set (spec §3's invariant 2).
    pub max_tracked: usize,
    /// Configured zones, checked in order (spec §4.4.1).
    pub zones: Vec<Zone>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            in_topic: topics::AIS_DECODED.to_string(),
            max_tracked: 50,
            zones: Vec::new(),
        }
    }
}

type VesselMap = HashMap<Mmsi, VesselRecord>;

/// The core algorithmic component (spec §4.4): identity reconciliation,
/// zone detection and event emission, driven by a single task subscribing
/// to decoded AIS messages.
pub struct VesselManager {
    bus: Bus,
    repository: Arc<Repository>,
    config: ManagerConfig,
    vessels: Arc<RwLock<VesselMap>>,
    task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl VesselManager {
    pub fn new(bus: Bus, repository: Arc<Repository>, config: ManagerConfig) -> Self {
        Self {
            bus,
            repository,
            config,
            vessels: Arc::new(RwLock::new(HashMap::new())),
            task: parking_lot::Mutex::new(None),
        }
    }

    /// Idempotent; spawns the background loop if it is not already running.
    pub fn start(self: &Arc<Self>) {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let manager = self.clone();
        let mut subscription = self.bus.subscribe(&self.config.in_topic);
        *task = Some(tokio::spawn(async move {
            loop {
                match subscription.recv_as::<DecodedMessage>().await {
                    Some(message) => manager.update_vessel(message).await,
                    None => {
                        tracing::info!("decoded message bus shut down, manager loop ending");
                        return;
                    }
                }
            }
        }));
    }

    /// Idempotent; cancels the loop task and suppresses the resulting
    /// cancellation error (spec §5's cancellation pattern).
    pub async fn stop(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Spec §4.4's message acceptance filter: reject anything that is not a
    /// 9-digit ship MMSI.
    fn accept(mmsi: u32) -> Option<Mmsi> {
        let mmsi = Mmsi::parse(&mmsi.to_string()).ok()?;
        if mmsi.is_sar_aircraft() {
            return None;
        }
        Some(mmsi)
    }

    /// Per-message algorithm (spec §4.4 steps 1–13). Every early return here
    /// corresponds to a defined "skip this message" outcome in the spec, not
    /// an error condition — there is no exception to log and swallow.
    async fn update_vessel(&self, message: DecodedMessage) {
        let Some(mmsi) = Self::accept(message.mmsi) else {
            return;
        };

        let is_new_vessel = !self.vessels.read().contains_key(&mmsi);
        let has_static_data = message.has_static_data();

        let values = UpsertVessel {
            mmsi: mmsi.clone(),
            imo: message.imo.unwrap_or(0),
            name: message.shipname.clone().unwrap_or_else(|| "Unknown".to_string()),
            callsign: message.callsign.clone().unwrap_or_else(|| "????".to_string()),
            ship_type: message.ship_type.unwrap_or(-1),
            bow: message.to_bow.unwrap_or(0),
            stern: message.to_stern.unwrap_or(0),
            port: message.to_port.unwrap_or(0),
            starboard: message.to_starboard.unwrap_or(0),
        };

        let baseline = if is_new_vessel {
            match self.repository.get_vessel(mmsi.as_str()).await {
                Some(stored) => {
                    let known = stored.has_static_data;
                    let baseline = VesselRecord::from_row(&stored);
                    self.bus.publish(
                        topics::VESSEL_APPEARED,
                        VesselAppeared {
                            mmsi: mmsi.clone(),
                            vessel: baseline.clone(),
                            known,
                        },
                    );
                    baseline
                }
                None => {
                    self.bus.publish(
                        topics::VESSEL_FIRST_SEEN,
                        VesselFirstSeen {
                            mmsi: mmsi.clone(),
                            has_static_data,
                        },
                    );
                    VesselRecord::empty(mmsi.clone())
                }
            }
        } else {
            self.vessels
                .read()
                .get(&mmsi)
                .cloned()
                .unwrap_or_else(|| VesselRecord::empty(mmsi.clone()))
        };

        let now = chrono::Utc::now().timestamp();
        let Some(row) = self.repository.upsert_vessel(values, has_static_data, now).await else {
            return;
        };

        let had_static_before = baseline.static_data.has_static_data;

        let dynamic_update = DynamicUpdate {
            lat: message.lat,
            lon: message.lon,
            cog: message.cog,
            speed: message.speed,
            heading: message.heading,
        };

        let zone = match (message.lat, message.lon) {
            (Some(lat), Some(lon)) => Some(find_zone(&self.config.zones, lat, lon).map(|z| z.name.clone())),
            _ => None,
        };

        let merged = baseline.merged(&row, &dynamic_update, zone, now);

        if has_static_data && !had_static_before {
            self.bus.publish(
                topics::VESSEL_IDENTIFIED,
                VesselIdentified {
                    mmsi: mmsi.clone(),
                    vessel: merged.clone(),
                },
            );
        }

        {
            let mut vessels = self.vessels.write();
            vessels.insert(mmsi.clone(), merged.clone());
            if vessels.len() > self.config.max_tracked {
                let mut entries: Vec<(Mmsi, VesselRecord)> = vessels.drain().collect();
                entries.sort_by(|a, b| b.1.ts.cmp(&a.1.ts));
                entries.truncate(self.config.max_tracked);
                vessels.extend(entries);
            }
        }

        let zone_prev = baseline.dynamic.zone.clone();
        let zone_current = merged.dynamic.zone.clone();
        match (zone_prev, zone_current) {
            (None, Some(entered)) => {
                self.bus.publish(
                    topics::VESSEL_ZONE_ENTERED,
                    VesselZoneEntered {
                        mmsi: mmsi.clone(),
                        zone: entered,
                        vessel: merged.clone(),
                    },
                );
            }
            (Some(exited), None) => {
                self.bus.publish(
                    topics::VESSEL_ZONE_EXITED,
                    VesselZoneExited {
                        mmsi: mmsi.clone(),
                        zone: exited,
                        vessel: merged.clone(),
                    },
                );
            }
            (Some(from_zone), Some(to_zone)) if from_zone != to_zone => {
                self.bus.publish(
                    topics::VESSEL_ZONE_MOVED,
                    VesselZoneMoved {
                        mmsi: mmsi.clone(),
                        from_zone,
                        to_zone,
                        vessel: merged.clone(),
                    },
                );
            }
            _ => {}
        }

        self.bus.publish(topics::VESSEL_UPDATED, VesselUpdated { vessel: merged });
    }

    /// Synchronous snapshot query (spec §4.4's "Read-only queries"). Returns
    /// an owned copy so callers are not exposed to concurrent mutation.
    pub fn get_vessel(&self, mmsi: &str) -> Option<VesselRecord> {
        let mmsi = Mmsi::parse(mmsi).ok()?;
        self.vessels.read().get(&mmsi).cloned()
    }

    pub fn get_all_vessels(&self) -> Vec<VesselRecord> {
        self.vessels.read().values().cloned().collect()
    }

    pub fn get_identified_vessels(&self) -> Vec<VesselRecord> {
        self.vessels.read().values().filter(|v| v.static_data.has_static_data).cloned().collect()
    }

    pub fn get_unknown_vessels(&self) -> Vec<VesselRecord> {
        self.vessels.read().values().filter(|v| !v.static_data.has_static_data).cloned().collect()
    }

    pub fn get_vessels_in_zone(&self, zone_name: &str) -> Vec<VesselRecord> {
        self.vessels
            .read()
            .values()
            .filter(|v| v.dynamic.zone.as_deref() == Some(zone_name))
            .cloned()
            .collect()
    }

    pub fn get_recent_vessels(&self, limit: usize) -> Vec<VesselRecord> {
        let mut vessels: Vec<VesselRecord> = self.vessels.read().values().cloned().collect();
        vessels.sort_by(|a, b| b.ts.cmp(&a.ts));
        vessels.truncate(limit);
        vessels
    }
}
