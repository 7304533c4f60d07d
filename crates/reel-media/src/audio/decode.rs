//! WAV decoding and encoding.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{MediaError, MediaResult};

/// Decode a WAV file recorded at `sample_rate` to mono `f32` samples.
///
/// Integer samples are scaled to [-1, 1]; multi-channel audio is averaged.
/// Files at any other rate are rejected, see [`super::conform`].
pub fn decode_wav(path: impl AsRef<Path>, sample_rate: u32) -> MediaResult<Vec<f32>> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path).map_err(|e| MediaError::wav(path, e))?;
    let spec = reader.spec();
    if spec.sample_rate != sample_rate {
        return Err(MediaError::invalid_input(format!(
            "{} is sampled at {} Hz, expected {} Hz",
            path.display(),
            spec.sample_rate,
            sample_rate
        )));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| MediaError::wav(path, e))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| MediaError::wav(path, e))?
        }
    };

    Ok(downmix(&interleaved, spec.channels))
}

/// Average interleaved channels into one.
pub fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let n = channels as usize;
    interleaved
        .chunks_exact(n)
        .map(|frame| frame.iter().sum::<f32>() / n as f32)
        .collect()
}

/// Write mono samples as 32-bit float WAV.
///
/// Samples are clamped to [-1, 1], so mix peaks past full scale are
/// hard-clipped.
pub fn write_wav(path: impl AsRef<Path>, samples: &[f32], sample_rate: u32) -> MediaResult<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| MediaError::wav(path, e))?;
    for &sample in samples {
        writer
            .write_sample(sample.clamp(-1.0, 1.0))
            .map_err(|e| MediaError::wav(path, e))?;
    }
    writer.finalize().map_err(|e| MediaError::wav(path, e))?;

    Ok(())
}
