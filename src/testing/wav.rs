//! WAV clip loading for fixture microphones.

use std::path::Path;

use crate::error::RoundError;
use crate::platform::SensorKind;

fn clip_error(path: &Path, detail: impl std::fmt::Display) -> RoundError {
    RoundError::SensorUnavailable {
        sensor: SensorKind::Microphone,
        reason: format!("{}: {}", path.display(), detail),
    }
}

/// Read a WAV file as mono f32 samples.
///
/// Multi-channel files are downmixed by averaging. Integer formats are
/// scaled to [-1, 1] by their bit depth.
///
/// # Returns
/// `(samples, sample_rate)`
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32), RoundError> {
    let mut reader = hound::WavReader::open(path).map_err(|err| clip_error(path, err))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(clip_error(path, "zero channels"));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|err| clip_error(path, err))?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(clip_error(
                    path,
                    format!("unsupported bits_per_sample={}", spec.bits_per_sample),
                ));
            }
            let full_scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 / full_scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|err| clip_error(path, err))?
        }
    };

    if spec.channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let channels = spec.channels as usize;
    let mono = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec.sample_rate))
}
