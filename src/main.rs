mod capture;
mod ring;
mod ui;
mod waveform;

use std::sync::Arc;

use capture::AudioCapture;
use ring::{DECIMATION_FACTOR, RING_CAPACITY, SampleRing};
use ui::ScopeApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let ring = Arc::new(
        SampleRing::new(RING_CAPACITY, DECIMATION_FACTOR)
            .expect("Sample ring configuration is invalid"),
    );
    let capture = AudioCapture::new(Arc::clone(&ring))
        .expect("Failed to open audio capture. Is an input device available?");

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Wave Scope",
        options,
        Box::new(move |_cc| Box::new(ScopeApp::new(Arc::clone(&ring), capture))),
    )
}
