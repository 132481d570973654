//! Serial-port AIS source (spec §2 plugin roster): reads NMEA lines from a
//! real AIS receiver attached over a COM/tty serial connection and
//! publishes them onto `ais.raw`, following
//! `original_source/.../com_message_source`'s `serial_asyncio` read loop.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;

use vessel_ais::topics;
use vessel_bus::Bus;
use vessel_plugin::{
    Constructor, FieldDefault, FieldType, Plugin, PluginCategory, PluginConfig, PluginContext, PluginError, PluginFactory, PLUGIN_FACTORIES,
};

pub struct SerialSource {
    bus: Bus,
    topic: String,
    port: String,
    baud_rate: u32,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SerialSource {
    pub fn new(bus: Bus, topic: String, port: String, baud_rate: u32) -> Self {
        Self { bus, topic, port, baud_rate, task: Mutex::new(None) }
    }

    /// Runs until cancelled; a connection failure or a read error both log
    /// and return, matching spec §7's "plugin runtime errors inside a loop:
    /// log; the loop swallows and continues" — the next `start()` reopens
    /// the port rather than retrying internally.
    async fn run(bus: Bus, topic: String, port: String, baud_rate: u32) {
        let serial = match tokio_serial::new(&port, baud_rate).open_native_async() {
            Ok(serial) => serial,
            Err(error) => {
                tracing::error!(%port, %error, "failed to open serial port");
                return;
            }
        };

        let mut lines = BufReader::new(serial).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        bus.publish(&topic, line.to_string());
                    }
                }
                Ok(None) => {
                    tracing::warn!(%port, "serial port closed");
                    return;
                }
                Err(error) => {
                    tracing::error!(%port, %error, "serial read error");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl Plugin for SerialSource {
    async fn start(&self) -> Result<(), PluginError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|h| !h.is_finished()) {
            return Ok(());
        }
        *task = Some(tokio::spawn(Self::run(self.bus.clone(), self.topic.clone(), self.port.clone(), self.baud_rate)));
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
    const FIELDS: &[vessel_plugin::ConfigField] = &[
        vessel_plugin::ConfigField {
            key: "port",
            label: "Serial port",
            field_type: FieldType::String,
            default: FieldDefault::Str("/dev/ttyUSB0"),
            options: &[],
        },
        vessel_plugin::ConfigField {
            key: "baud_rate",
            label: "Baud rate",
            field_type: FieldType::Integer,
            default: FieldDefault::Int(38400),
            options: &["9600", "19200", "38400", "57600", "115200"],
        },
    ];
    FIELDS
}

fn create(context: &PluginContext, config: &PluginConfig) -> Result<Box<dyn Plugin>, PluginError> {
    let topic = config.get_str("topic", topics::AIS_RAW);
    let port = config.get_str("port", "/dev/ttyUSB0");
    let baud_rate = config.get_i64("baud_rate", 38400) as u32;

    Ok(Box::new(SerialSource::new(context.bus.clone(), topic, port, baud_rate)))
}

#[linkme::distributed_slice(PLUGIN_FACTORIES)]
static FACTORY: PluginFactory = PluginFactory {
    name: "serial",
    category: PluginCategory::Source,
    schema,
    constructor: Constructor::Plugin(create),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unopenable_port_does_not_panic() {
        let bus = Bus::new();
        let source = SerialSource::new(bus, topics::AIS_RAW.to_string(), "/dev/does-not-exist".to_string(), 38400);
        source.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        source.stop().await.unwrap();
    }
}
