//! Console progress surface.
//!
//! Renders the receive/convert progress as a single rewritten line with an
//! ASCII bar. The cancel affordance is a flag the Ctrl-C handler sets; the
//! next update reports it back to the orchestrator.

use scenelink::surface::{CancelRequest, ProgressSurface};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Renders a fixed-width ASCII progress bar: `#` filled, `-` empty.
fn render_bar(fraction: f64, width: usize) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width);
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar
}

/// Line-oriented progress surface for terminal output.
pub struct ConsoleSurface {
    width: usize,
    cancel_requested: AtomicBool,
}

impl ConsoleSurface {
    /// Creates a surface with the given bar width in characters.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// Flags cancellation; reported on the next progress update.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }
}

impl ProgressSurface for ConsoleSurface {
    fn begin(&self, title: &str) {
        eprintln!("{}", title);
    }

    fn update(&self, _title: &str, status: &str, fraction: f64) -> CancelRequest {
        let bar = render_bar(fraction, self.width);
        // Pad so a shorter status doesn't leave residue from the prior line.
        eprint!("\r[{}] {:>3.0}% {:<40}", bar, fraction * 100.0, status);
        let _ = io::stderr().flush();

        if self.cancel_requested.load(Ordering::SeqCst) {
            CancelRequest::Cancel
        } else {
            CancelRequest::Continue
        }
    }

    fn clear(&self) {
        eprintln!();
    }
}
