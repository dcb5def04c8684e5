use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use doorhub::frame::PresharedKey;
use doorhub::radio::{RadioTransport, ThreadedRadio, UdpRadio};
use doorhub::uplink::{ConnectivityManager, MqttConfig, MqttSession, Qos, RetryPolicy};
use doorhub::validate::{Validator, ValidatorConfig};
use doorhub::{Coordinator, FileEventLog, Hub, HubConfig, HubExit, SystemClock, TextDisplay};

use crate::cmd::{parse_duration, OnHalt, RunArgs};
use crate::exit::{
    frame_error, hub_error, radio_error, CliError, CliResult, INTERNAL, LINK_HALTED, SUCCESS,
    USAGE,
};

const DOOR_FEED: &str = "door";

pub fn run(args: RunArgs) -> CliResult<i32> {
    let key = PresharedKey::new(&args.key).map_err(|err| frame_error("invalid key", err))?;
    let clock = SystemClock::new(&args.time_format)
        .map_err(|err| CliError::new(USAGE, err.to_string()))?;
    let hub_config = HubConfig {
        poll_interval: parse_duration(&args.poll_interval)?,
    };
    let policy = RetryPolicy {
        max_attempts: args.connect_retries,
        retry_delay: parse_duration(&args.retry_delay)?,
    };
    let mqtt = mqtt_config(&args)?;
    tracing::info!(config = ?mqtt, ?policy, "uplink configured");

    let radio = open_radio(&args)?;
    let coordinator = Coordinator::new(
        key,
        Validator::with_config(ValidatorConfig {
            expected_tag: args.tag,
        }),
        TextDisplay::new(std::io::stdout()),
        ConnectivityManager::new(MqttSession::new(mqtt), policy),
        FileEventLog::new(&args.log_file),
        clock,
    );
    let mut hub = Hub::new(radio, coordinator, hub_config);

    let stop = Arc::new(AtomicBool::new(false));
    install_ctrlc_handler(stop.clone())?;

    match hub.run(&stop).map_err(|err| hub_error("receive failed", err))? {
        HubExit::Stopped | HubExit::SourceClosed => Ok(SUCCESS),
        HubExit::Halted => halt(args.on_halt, &stop),
    }
}

fn mqtt_config(args: &RunArgs) -> CliResult<MqttConfig> {
    let qos = Qos::try_from(args.qos).map_err(|err| CliError::new(USAGE, err))?;
    let defaults = MqttConfig::default();
    let topic = match (&args.topic, &args.mqtt_username) {
        (Some(topic), _) => topic.clone(),
        (None, Some(user)) => MqttConfig::feed_topic(user, DOOR_FEED),
        (None, None) => defaults.topic.clone(),
    };

    Ok(MqttConfig {
        host: args.mqtt_host.clone(),
        port: args.mqtt_port,
        client_id: args.client_id.clone(),
        username: args.mqtt_username.clone(),
        password: args.mqtt_password.clone(),
        topic,
        qos,
        ..defaults
    })
}

fn open_radio(args: &RunArgs) -> CliResult<Box<dyn RadioTransport>> {
    if let Some(addr) = &args.udp {
        let radio = UdpRadio::bind(addr.as_str()).map_err(|err| radio_error("bind failed", err))?;
        if let Ok(local) = radio.local_addr() {
            tracing::info!(%local, "listening for radio datagrams");
        }
        return Ok(Box::new(radio));
    }
    if let Some(path) = &args.input {
        let radio = ThreadedRadio::open(path).map_err(|err| radio_error("open failed", err))?;
        return Ok(Box::new(radio));
    }
    tracing::info!("reading radio frames from stdin");
    let radio = ThreadedRadio::spawn(std::io::stdin())
        .map_err(|err| radio_error("reader thread failed", err))?;
    Ok(Box::new(radio))
}

/// The uplink is gone for good; either hand over to the supervisor or wait
/// for an external reset.
fn halt(on_halt: OnHalt, stop: &AtomicBool) -> CliResult<i32> {
    if on_halt == OnHalt::Park {
        tracing::error!("uplink halted; parked until external reset");
        while !stop.load(Ordering::SeqCst) {
            std::thread::park_timeout(Duration::from_secs(1));
        }
    }
    Err(CliError::new(
        LINK_HALTED,
        "uplink halted after exhausting connect retries",
    ))
}

fn install_ctrlc_handler(stop: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
