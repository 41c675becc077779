//! Serial-plotter event sink.
//!
//! Writes every [`TelemetryFrame`](crate::app::events::TelemetryFrame)
//! as one tuple line, `(d1, d2, d3, pump)`, which the Arduino-style
//! serial plotter graphs directly.  Lifecycle events go to the logger
//! instead so they never corrupt the plotter stream.

use std::io::Write;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct PlotterSink<W> {
    out: W,
    write_failures: u32,
}

impl PlotterSink<std::io::Stdout> {
    /// Sink on the console UART.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> PlotterSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_failures: 0,
        }
    }

    pub fn write_failures(&self) -> u32 {
        self.write_failures
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for PlotterSink<W> {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(frame) => {
                let res = writeln!(self.out, "{}", frame).and_then(|()| self.out.flush());
                if let Err(e) = res {
                    // Only the first failure is logged; a dead console stays dead.
                    if self.write_failures == 0 {
                        warn!("plotter: write failed: {}", e);
                    }
                    self.write_failures = self.write_failures.saturating_add(1);
                }
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::DetectionReset => {
                info!("DETECT | counters reset after cooldown");
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
        }
    }
}
