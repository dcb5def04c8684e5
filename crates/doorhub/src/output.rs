use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use doorhub::frame::TelemetryRecord;
use doorhub::validate::Classification;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A decrypted frame as reported by `inspect`.
#[derive(Serialize, Debug)]
pub struct RecordOutput {
    pub tag: u16,
    pub valid: bool,
    pub sensor_id: u8,
    pub door_state: &'static str,
    pub door_state_raw: u8,
    pub supply_voltage: u16,
    pub plaintext: String,
}

impl RecordOutput {
    pub fn new(record: &TelemetryRecord, classification: Classification, plaintext: &[u8]) -> Self {
        Self {
            tag: record.tag,
            valid: classification.is_valid(),
            sensor_id: record.sensor_id,
            door_state: record.door_state().label(),
            door_state_raw: record.door_state,
            supply_voltage: record.supply_voltage,
            plaintext: hex::encode(plaintext),
        }
    }
}

pub fn print_record(out: &RecordOutput, plaintext: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TAG", "VALID", "SENSOR", "DOOR", "VOLTAGE"])
                .add_row(vec![
                    out.tag.to_string(),
                    if out.valid { "yes" } else { "no" }.to_string(),
                    out.sensor_id.to_string(),
                    format!("{} ({})", out.door_state, out.door_state_raw),
                    out.supply_voltage.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "tag={} valid={} sensor={} door={} voltage={}",
                out.tag, out.valid, out.sensor_id, out.door_state, out.supply_voltage
            );
        }
        OutputFormat::Raw => print_raw(plaintext),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}
