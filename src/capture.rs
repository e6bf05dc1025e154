use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::ring::SampleRing;

/// Owns the cpal input stream that feeds the shared sample ring.
///
/// The stream callback is the producer side of the two-thread model: each
/// batch of captured frames is downmixed to mono, converted into the
/// signed-16-bit amplitude domain, and appended to the ring in one locked
/// batch. Dropping the handle stops the capture cleanly.
pub struct AudioCapture {
    stream: cpal::Stream,
    shutdown: Arc<AtomicBool>,
    pub device_name: String,
}

impl AudioCapture {
    pub fn new(ring: Arc<SampleRing>) -> Result<Self, String> {
        Self::new_with_device(ring, None)
    }

    pub fn new_with_device(
        ring: Arc<SampleRing>,
        device_name: Option<&str>,
    ) -> Result<Self, String> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_name)?;
        let resolved_device_name = device
            .name()
            .unwrap_or_else(|_| "<unknown input>".to_string());
        let supported_config = device
            .default_input_config()
            .map_err(|err| format!("Could not query default input: {err}"))?;
        let sample_format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();
        let channels = config.channels as usize;
        log::info!(
            "Capturing from '{resolved_device_name}': {} Hz, {channels} channel(s), {sample_format:?}",
            config.sample_rate.0
        );

        let shutdown = Arc::new(AtomicBool::new(false));
        let err_fn = |err| log::error!("Capture stream error: {err}");
        let stream = match sample_format {
            cpal::SampleFormat::F32 => {
                let ring = Arc::clone(&ring);
                let stop = Arc::clone(&shutdown);
                device
                    .build_input_stream(
                        &config,
                        move |data: &[f32], _: &cpal::InputCallbackInfo| {
                            if !stop.load(Ordering::Relaxed) {
                                ring.append(&downmix(data, channels, f32_to_amplitude));
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| format!("Failed to build f32 capture stream: {err}"))?
            }
            cpal::SampleFormat::I16 => {
                let ring = Arc::clone(&ring);
                let stop = Arc::clone(&shutdown);
                device
                    .build_input_stream(
                        &config,
                        move |data: &[i16], _: &cpal::InputCallbackInfo| {
                            if !stop.load(Ordering::Relaxed) {
                                ring.append(&downmix(data, channels, i16_to_amplitude));
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| format!("Failed to build i16 capture stream: {err}"))?
            }
            cpal::SampleFormat::U16 => {
                let ring = Arc::clone(&ring);
                let stop = Arc::clone(&shutdown);
                device
                    .build_input_stream(
                        &config,
                        move |data: &[u16], _: &cpal::InputCallbackInfo| {
                            if !stop.load(Ordering::Relaxed) {
                                ring.append(&downmix(data, channels, u16_to_amplitude));
                            }
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|err| format!("Failed to build u16 capture stream: {err}"))?
            }
            other => {
                return Err(format!("Unsupported sample format: {other:?}"));
            }
        };
        stream
            .play()
            .map_err(|err| format!("Failed to start capture: {err}"))?;
        Ok(Self {
            stream,
            shutdown,
            device_name: resolved_device_name,
        })
    }

    /// Signals the callback to stop appending and pauses the stream.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Err(err) = self.stream.pause() {
            log::warn!("Could not pause capture stream: {err}");
        }
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

fn select_input_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device, String> {
    if let Some(target) = name {
        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(device_name) = device.name() {
                    if device_name == target {
                        return Ok(device);
                    }
                }
            }
        }
        return Err(format!("Input device '{target}' not found"));
    }

    host.default_input_device()
        .ok_or_else(|| "No audio input device available".to_string())
}

pub fn list_input_device_names() -> Vec<String> {
    let host = cpal::default_host();
    host.input_devices()
        .map(|devices| {
            devices
                .filter_map(|d| d.name().ok())
                .collect::<Vec<String>>()
        })
        .unwrap_or_default()
}

/// Averages the channels of each frame into one mono amplitude.
fn downmix<T: Copy>(data: &[T], channels: usize, to_amplitude: fn(T) -> f32) -> Vec<f32> {
    data.chunks(channels.max(1))
        .map(|frame| {
            let sum: f32 = frame.iter().map(|&s| to_amplitude(s)).sum();
            sum / frame.len() as f32
        })
        .collect()
}

fn i16_to_amplitude(sample: i16) -> f32 {
    sample as f32
}

fn f32_to_amplitude(sample: f32) -> f32 {
    (sample * 32767.0).clamp(i16::MIN as f32, i16::MAX as f32)
}

fn u16_to_amplitude(sample: u16) -> f32 {
    sample as f32 - 32768.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i16_samples_pass_through() {
        assert_eq!(i16_to_amplitude(0), 0.0);
        assert_eq!(i16_to_amplitude(i16::MAX), 32767.0);
        assert_eq!(i16_to_amplitude(i16::MIN), -32768.0);
    }

    #[test]
    fn f32_samples_scale_to_the_16bit_domain() {
        assert_eq!(f32_to_amplitude(0.0), 0.0);
        assert_eq!(f32_to_amplitude(1.0), 32767.0);
        assert_eq!(f32_to_amplitude(-1.0), -32767.0);
        // Out-of-range input stays clamped to the domain.
        assert_eq!(f32_to_amplitude(2.0), 32767.0);
    }

    #[test]
    fn u16_samples_are_recentered() {
        assert_eq!(u16_to_amplitude(32768), 0.0);
        assert_eq!(u16_to_amplitude(0), -32768.0);
        assert_eq!(u16_to_amplitude(u16::MAX), 32767.0);
    }

    #[test]
    fn stereo_frames_average_to_mono() {
        let mono = downmix(&[100i16, 200, -50, 50], 2, i16_to_amplitude);
        assert_eq!(mono, vec![150.0, 0.0]);
    }

    #[test]
    fn empty_callback_data_produces_no_samples() {
        assert!(downmix::<i16>(&[], 2, i16_to_amplitude).is_empty());
    }
}
