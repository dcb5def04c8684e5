use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};

use doorhub::frame::DoorState;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod inspect;
pub mod run;
pub mod seal;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Receive, validate and dispatch door events.
    Run(RunArgs),
    /// Encode and encrypt a single frame.
    Seal(SealArgs),
    /// Decrypt and decode a single frame.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::Seal(args) => seal::run(args),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// What to do once the uplink gives up.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OnHalt {
    /// Exit with the link-halted code and let the supervisor restart us.
    #[default]
    Exit,
    /// Park forever and wait for an external reset.
    Park,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pre-shared key for frame decryption.
    #[arg(long, env = "DOORHUB_KEY", hide_env_values = true)]
    pub key: String,
    /// Expected tag for valid records.
    #[arg(long, env = "DOORHUB_TAG", default_value_t = doorhub::validate::DEFAULT_EXPECTED_TAG)]
    pub tag: u16,
    /// Receive frames as UDP datagrams on this address.
    #[arg(long, env = "DOORHUB_UDP", conflicts_with = "input")]
    pub udp: Option<String>,
    /// Read frames from a file, FIFO or device. Default: stdin.
    #[arg(long, env = "DOORHUB_INPUT", conflicts_with = "udp")]
    pub input: Option<PathBuf>,
    /// Sleep between polls when no frame is waiting (e.g. 10ms).
    #[arg(long, default_value = "10ms")]
    pub poll_interval: String,
    /// Broker host.
    #[arg(long, env = "DOORHUB_MQTT_HOST", default_value = "io.adafruit.com")]
    pub mqtt_host: String,
    /// Broker port.
    #[arg(long, env = "DOORHUB_MQTT_PORT", default_value_t = doorhub::uplink::DEFAULT_MQTT_PORT)]
    pub mqtt_port: u16,
    /// Broker username.
    #[arg(long, env = "DOORHUB_MQTT_USERNAME")]
    pub mqtt_username: Option<String>,
    /// Broker password.
    #[arg(long, env = "DOORHUB_MQTT_PASSWORD", hide_env_values = true)]
    pub mqtt_password: Option<String>,
    /// MQTT client identifier.
    #[arg(long, default_value = "doorhub")]
    pub client_id: String,
    /// Topic for door states. Default: `<username>/feeds/door`.
    #[arg(long, env = "DOORHUB_TOPIC")]
    pub topic: Option<String>,
    /// Publish QoS level (0 or 1).
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub qos: u8,
    /// Connect attempts per dispatch before halting.
    #[arg(long, default_value_t = 3)]
    pub connect_retries: u32,
    /// Delay after each failed connect attempt (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub retry_delay: String,
    /// Event log file.
    #[arg(long, env = "DOORHUB_LOG_FILE", default_value = doorhub::DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
    /// strftime pattern for event log timestamps.
    #[arg(long, default_value = doorhub::DEFAULT_TIME_FORMAT)]
    pub time_format: String,
    /// Behaviour once connect retries are exhausted.
    #[arg(long, value_enum, default_value_t = OnHalt::Exit)]
    pub on_halt: OnHalt,
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Pre-shared key for frame encryption.
    #[arg(long, env = "DOORHUB_KEY", hide_env_values = true)]
    pub key: String,
    /// Sensor identifier.
    #[arg(long)]
    pub sensor: u8,
    /// Door state: open, closed, 1 or 0.
    #[arg(long)]
    pub state: DoorState,
    /// Supply voltage reading.
    #[arg(long, default_value_t = 3300)]
    pub voltage: u16,
    /// Record tag.
    #[arg(long, default_value_t = doorhub::validate::DEFAULT_EXPECTED_TAG)]
    pub tag: u16,
    /// Print the frame as hex instead of raw bytes.
    #[arg(long, conflicts_with = "send")]
    pub hex: bool,
    /// Send the frame as a UDP datagram to this address.
    #[arg(long, value_name = "ADDR")]
    pub send: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Pre-shared key for frame decryption.
    #[arg(long, env = "DOORHUB_KEY", hide_env_values = true)]
    pub key: String,
    /// Frame as hex.
    #[arg(conflicts_with = "file", required_unless_present = "file")]
    pub frame: Option<String>,
    /// Read the frame from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Expected tag for classification.
    #[arg(long, default_value_t = doorhub::validate::DEFAULT_EXPECTED_TAG)]
    pub tag: u16,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `<n>ms` or `<n>s`; a bare number is seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("0ms").unwrap(), Duration::ZERO);
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("-1s").is_err());
    }
}
