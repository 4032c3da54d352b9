use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();

/// Starts the run spinner. Idempotent; later calls update the message.
pub fn start(msg: String) {
    let pb = SPINNER.get_or_init(|| {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .expect("static spinner template")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "]);
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    });
    pb.set_message(msg);
}

pub fn update(msg: String) {
    if let Some(pb) = SPINNER.get() {
        pb.set_message(msg);
    }
}

pub fn finish() {
    if let Some(pb) = SPINNER.get() {
        pb.finish_and_clear();
    }
}

/// Routes log output through the spinner while it is running, so lines
/// print above the frame instead of through it.
pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        let msg = msg.trim_end();

        match SPINNER.get() {
            Some(pb) if !pb.is_finished() => pb.println(msg),
            _ => eprintln!("{msg}"),
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
