use std::io::Write;

use doorhub_frame::DoorState;

use crate::sink::DisplaySink;

/// Shown when a frame fails validation.
pub const REJECTED_MESSAGE: &str = "Wrong magic number!";

/// Character display backed by any writer.
///
/// Each update clears the previous screen and writes one or two lines.
/// The last screen is kept for inspection.
#[derive(Debug)]
pub struct TextDisplay<W> {
    out: W,
    screen: Vec<String>,
}

impl<W: Write> TextDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            screen: Vec::new(),
        }
    }

    /// Lines currently on screen.
    pub fn screen(&self) -> &[String] {
        &self.screen
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, lines: Vec<String>) -> std::io::Result<()> {
        self.screen = lines;
        for line in &self.screen {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }
}

impl<W: Write> DisplaySink for TextDisplay<W> {
    fn show_valid(
        &mut self,
        sensor_id: u8,
        supply_voltage: u16,
        door_state: DoorState,
    ) -> std::io::Result<()> {
        self.render(vec![
            format!("SID: {sensor_id} V:{supply_voltage}"),
            format!("Status: {}", door_state.label()),
        ])
    }

    fn show_rejected(&mut self) -> std::io::Result<()> {
        self.render(vec![REJECTED_MESSAGE.to_string()])
    }
}
