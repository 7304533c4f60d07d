//! Sample-level operations on mono `f32` buffers.

/// Number of samples covering `secs` at `sample_rate`.
pub fn samples_for(secs: f64, sample_rate: u32) -> usize {
    (secs.max(0.0) * sample_rate as f64).round() as usize
}

/// Root-mean-square energy over the whole buffer; 0 for empty input.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum / samples.len() as f64).sqrt()
}

/// Repeat or cut `samples` to exactly `len` samples.
pub fn fit_length(samples: &[f32], len: usize) -> Vec<f32> {
    if samples.is_empty() {
        return vec![0.0; len];
    }
    samples.iter().copied().cycle().take(len).collect()
}

/// Linear fade from silence over the first `len` samples.
pub fn fade_in(samples: &mut [f32], len: usize) {
    let len = len.min(samples.len());
    for (i, s) in samples.iter_mut().take(len).enumerate() {
        *s *= i as f32 / len as f32;
    }
}

/// Linear fade to silence over the last `len` samples.
pub fn fade_out(samples: &mut [f32], len: usize) {
    let len = len.min(samples.len());
    let start = samples.len() - len;
    for (i, s) in samples[start..].iter_mut().enumerate() {
        *s *= (len - i) as f32 / len as f32;
    }
}

pub fn apply_gain(samples: &mut [f32], gain: f64) {
    let gain = gain as f32;
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// Add `source` into `target` starting at `offset`, dropping overflow.
pub fn mix_into(target: &mut [f32], source: &[f32], offset: usize) {
    if offset >= target.len() {
        return;
    }
    for (t, s) in target[offset..].iter_mut().zip(source) {
        *t += *s;
    }
}
