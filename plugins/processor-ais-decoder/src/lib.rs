//! AIS decoder processor (spec §2 plugin roster): `ais.raw -> ais.decoded`.
//! The decode algorithm itself is out of scope per spec §1 ("treated as a
//! pure function from byte strings to structured records"); this plugin is
//! the lifecycle wrapper around [`vessel_ais::SentenceDecoder`], following
//! `original_source/.../ais_decoder_processor`'s receive-loop/decode-loop
//! split (collapsed here into a single loop since the Rust decoder has no
//! need for a producer/consumer queue of its own).

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use vessel_ais::{topics, SentenceDecoder};
use vessel_bus::Bus;
use vessel_plugin::{Constructor, Plugin, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, PLUGIN_FACTORIES};

pub struct AisDecoderProcessor {
    bus: Bus,
    in_topic: String,
    out_topic: String,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AisDecoderProcessor {
    pub fn new(bus: Bus, in_topic: String, out_topic: String) -> Self {
        Self { bus, in_topic, out_topic, task: Mutex::new(None) }
    }

    async fn run(bus: Bus, in_topic: String, out_topic: String) {
        let mut subscription = bus.subscribe(&in_topic);
        let mut decoder = SentenceDecoder::new();

        while let Some(line) = subscription.recv_as::<String>().await {
            match decoder.feed(&line) {
                Ok(Some(message)) => bus.publish(&out_topic, message),
                Ok(None) => {}
                Err(error) => tracing::debug!(%error, "failed decoding AIS sentence"),
            }
        }
    }
}

#[async_trait]
impl Plugin for AisDecoderProcessor {
    async fn start(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        *task = Some(tokio::spawn(Self::run(self.bus.clone(), self.in_topic.clone(), self.out_topic.clone())));
        Ok(())
    }

    async fn stop(&self) -> Result<(), PluginError> {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
        Ok(())
    }
}

fn schema() -> vessel_plugin::ConfigSchema {
    &[]
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Plugin>, PluginError> {
    let in_topic = config.get_str("in_topic", topics::AIS_RAW);
    let out_topic = config.get_str("out_topic", topics::AIS_DECODED);
    Ok(Box::new(AisDecoderProcessor::new(context.bus.clone(), in_topic, out_topic)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "ais_decoder",
    category: PluginCategory::Processor,
    schema,
    constructor: Constructor::Plugin(create),
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn decodes_a_raw_sentence_onto_the_output_topic() {
        let bus = Bus::new();
        let mut out = bus.subscribe(topics::AIS_DECODED);
        let processor = AisDecoderProcessor::new(bus.clone(), topics::AIS_RAW.to_string(), topics::AIS_DECODED.to_string());
        processor.start().await.unwrap();

        bus.publish(topics::AIS_RAW, "!AIVDM,1,1,,B,13P;lhP005wj=OrNShTenrj80@3Q,0*28".to_string());

        let decoded: vessel_ais::DecodedMessage = tokio::time::timeout(Duration::from_secs(1), out.recv_as()).await.unwrap().unwrap();
        assert!(matches!(decoded.msg_type, 1 | 2 | 3));

        processor.stop().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_sentence_is_skipped_not_fatal() {
        let bus = Bus::new();
        let mut out = bus.subscribe(topics::AIS_DECODED);
        let processor = AisDecoderProcessor::new(bus.clone(), topics::AIS_RAW.to_string(), topics::AIS_DECODED.to_string());
        processor.start().await.unwrap();

        bus.publish(topics::AIS_RAW, "not a sentence".to_string());
        bus.publish(topics::AIS_RAW, "!AIVDM,1,1,,B,13P;lhP005wj=OrNShTenrj80@3Q,0*28".to_string());

        let decoded: vessel_ais::DecodedMessage = tokio::time::timeout(Duration::from_secs(1), out.recv_as()).await.unwrap().unwrap();
        assert!(matches!(decoded.msg_type, 1 | 2 | 3));

        processor.stop().await.unwrap();
    }
}
