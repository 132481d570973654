//! Mock AIS source (spec §2 plugin roster): replays a fixed deck of real
//! AIVDM sentences onto `ais.raw` at randomised intervals, so the pipeline
//! is exercisable without a radio receiver attached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use linkme::distributed_slice;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_plugin::{
    Constructor, FieldDefault, FieldType, Plugin, PluginConfig, PluginContext, PluginError, PluginFactory, PluginCategory, PLUGIN_FACTORIES,
};

const DEFAULT_MESSAGES: &[&str] = &[
    "!AIVDM,1,1,,B,13P;lhP005wj=OrNShTenrj80@3Q,0*28",
    "!AIVDM,1,1,,B,13M@DR@000Oj?=vNT`8H@K8J0@7O,0*66",
    "!AIVDM,1,1,,A,13P;lhP004wj=OtNShW01JnL0<13,0*71",
    "!AIVDM,1,1,,A,13P8fQhP11wjADlNSg@chOvR200m,0*32",
    "!AIVDM,1,1,,B,33P;lhP004wj=P4NShbP=bjh00=C,0*0E",
    "!AIVDM,2,1,3,B,53P;lh`2;:IS8=1?P01H:1<4p@tp00000000000l1p?664pB0=832EQD,0*50",
    "!AIVDM,2,2,3,B,T3kk855Ap3l4h00,2*79",
    "!AIVDM,1,1,,A,13P;lhP004wj=P8NShfP:bk608E`,0*0C",
    "!AIVDM,1,1,,A,13P8fQhP1Gwj@whNSh7cT?w<2<1:,0*73",
    "!AIVDM,1,1,,A,13M@DR@000Oj?>FNT`7H@K9F04sL,0*67",
    "!AIVDM,1,1,,A,34`vUp5000wj>48NS5rLUpiF0Dg:,0*0D",
    "!AIVDM,1,1,,B,13P;lhP004wj=PFNShj0MbmJ0@K;,0*3D",
    "!AIVDM,1,1,,B,34S93`5000Oj3pBNSdPol3ET0DMb,0*69",
    "!AIVDM,1,1,,A,13P;lhP002wj=PRNShk0u:od0002,0*63",
    "!AIVDM,1,1,,A,13M@DR@000Oj?>LNT`7`@K8600SK,0*17",
    "!AIVDM,1,1,,B,13P8fQhP1Owj@KrNSiPcg?v@285E,0*09",
    "!AIVDM,1,1,,B,13M@DR@000Oj?>VNT`6H@K8J0<1@,0*3E",
    "!AIVDM,1,1,,A,13P;lhP004wj=Q@NShj3mrlL089>,0*02",
    "!AIVDM,2,1,4,A,53ktrGT2E0:L=4tJ220@Tp610th58U>22222221650s;:4S=0>ihS2E`,0*25",
    "!AIVDM,2,2,4,A,888888888888880,2*20",
];

/// Message source that loops over `messages`, publishing one at a time to
/// `topic` at a uniformly random delay in `[min_delay, max_delay]`.
pub struct MockSource {
    bus: Bus,
    topic: String,
    messages: Vec<String>,
    min_delay: Duration,
    max_delay: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl MockSource {
    pub fn new(bus: Bus, topic: String, messages: Vec<String>, min_delay: Duration, max_delay: Duration) -> Self {
        Self { bus, topic, messages, min_delay, max_delay, task: Mutex::new(None) }
    }

    async fn run(bus: Bus, topic: String, messages: Vec<String>, min_delay: Duration, max_delay: Duration) {
        let mut idx = 0;
        loop {
            bus.publish(&topic, messages[idx].clone());
            idx = (idx + 1) % messages.len();

            let delay = if max_delay > min_delay {
                min_delay + Duration::from_secs_f64(fastrand::f64() * (max_delay - min_delay).as_secs_f64())
            } else {
                min_delay
            };
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Plugin for MockSource {
    async fn start(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        tracing::debug!(topic = %self.topic, "mock source starting");
        *task = Some(tokio::spawn(Self::run(
            self.bus.clone(),
            self.topic.clone(),
            self.messages.clone(),
            self.min_delay,
            self.max_delay,
        )));
        Ok(())
    }

    async fn stop(&self) -> Result<(), PluginError> {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        tracing::debug!(topic = %self.topic, "mock source stopped");
        Ok(())
    }
}

fn schema() -> vessel_plugin::ConfigSchema {
    const FIELDS: &[vessel_plugin::ConfigField] = &[
        vessel_plugin::ConfigField {
            key: "min_delay",
            label: "Minimum delay (seconds)",
            field_type: FieldType::Float,
            default: FieldDefault::Float(0.5),
            options: &[],
        },
        vessel_plugin::ConfigField {
            key: "max_delay",
            label: "Maximum delay (seconds)",
            field_type: FieldType::Float,
            default: FieldDefault::Float(5.0),
            options: &[],
        },
    ];
    FIELDS
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Plugin>, PluginError> {
    let topic = config.get_str("topic", topics::AIS_RAW);
    let min_delay = Duration::from_secs_f64(config.get_f64("min_delay", 0.5));
    let max_delay = Duration::from_secs_f64(config.get_f64("max_delay", 5.0));
    let messages = config.get_str_list("messages");
    let messages = if messages.is_empty() { DEFAULT_MESSAGES.iter().map(|s| s.to_string()).collect() } else { messages };

    Ok(Box::new(MockSource::new(context.bus.clone(), topic, messages, min_delay, max_delay)))
}

#[distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "mock",
    category: PluginCategory::Source,
    schema,
    constructor: Constructor::Plugin(create),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn loops_over_the_message_deck() {
        let bus = Bus::new();
        let mut sub = bus.subscribe(topics::AIS_RAW);
        let source = Arc::new(MockSource::new(
            bus,
            topics::AIS_RAW.to_string(),
            vec!["a".to_string(), "b".to_string()],
            Duration::from_millis(1),
            Duration::from_millis(1),
        ));

        source.start().await.unwrap();
        let first: String = sub.recv_as().await.unwrap();
        tokio::time::advance(Duration::from_millis(5)).await;
        let second: String = sub.recv_as().await.unwrap();

        assert_eq!(first, "a");
        assert_eq!(second, "b");
        source.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let bus = Bus::new();
        let source = MockSource::new(bus, topics::AIS_RAW.to_string(), vec!["a".to_string()], Duration::from_secs(60), Duration::from_secs(60));
        source.start().await.unwrap();
        source.start().await.unwrap();
        source.stop().await.unwrap();
    }
}
