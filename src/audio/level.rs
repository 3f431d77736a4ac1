// Level - loudness measurement over sample windows

/// Root-mean-square amplitude of a window
///
/// Returns 0.0 for an empty window.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    energy.sqrt()
}
