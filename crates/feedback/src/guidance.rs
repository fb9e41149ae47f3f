//! Guidance cue scheduling

use crate::GuidanceProfile;

fn lerp(far: f64, near: f64, proximity: f64) -> f64 {
    let p = proximity.max(0.0).min(1.0);
    far + (near - far) * p
}

impl GuidanceProfile {
    /// Cue pitch for a proximity
    pub fn frequency_hz(&self, proximity: f64) -> f64 {
        lerp(self.frequency_far_hz, self.frequency_near_hz, proximity)
    }

    /// Minimum gap between cues for a proximity
    pub fn interval_ms(&self, proximity: f64) -> f64 {
        lerp(self.interval_far_ms, self.interval_near_ms, proximity)
    }

    pub fn volume(&self, proximity: f64) -> f64 {
        lerp(self.volume_far, self.volume_near, proximity)
    }
}

/// Whether a guidance cue is due at `now_ms`.
///
/// A cue is due when none has fired yet, or when at least the
/// proximity-dependent interval has passed since the last one.
pub fn should_fire_guidance(
    profile: &GuidanceProfile,
    last_fire_at: Option<u64>,
    proximity: f64,
    now_ms: u64,
) -> bool {
    match last_fire_at {
        None => true,
        Some(last) => now_ms.saturating_sub(last) as f64 >= profile.interval_ms(proximity),
    }
}
