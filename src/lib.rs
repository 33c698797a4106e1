//! Brawl Sim - real-time combat core for a two-player arena brawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, terrain collision, skills,
//!   conditions, monster AI)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{MotionTuning, RegenTuning, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Default frame length in milliseconds (30 FPS)
    pub const TICK_MS: u64 = 33;
    /// Game clock resolution (quarter seconds)
    pub const GAME_CLOCK_MS: u64 = 250;

    /// Full window size the arena is authored against
    pub const WORLD_WIDTH: f32 = 1280.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Thickness of the generated floor slab
    pub const FLOOR_THICKNESS: f32 = 50.0;

    /// Vertical velocity band (exclusive) where gravity is halved for a softer apex
    pub const FLOATY_BAND_LOW: f32 = -5.0;
    pub const FLOATY_BAND_HIGH: f32 = 8.0;
    /// How far (px) the previous bottom edge may sit below a terrain top and still land
    pub const LANDING_TOLERANCE: f32 = 5.0;
    /// Upward velocity is multiplied by this on ceiling contact
    pub const CEILING_DAMPING: f32 = 0.4;

    /// Horizontal knockback multiplier applied to monsters on hit
    pub const MONSTER_KNOCKBACK: f32 = 5.0;
    /// Melee particles may re-hit the same target after this window
    pub const HIT_MEMORY_MS: u64 = 1000;
    /// Scrolling text stays on screen this long
    pub const SCROLLING_TEXT_MS: u64 = 2000;

    /// Melee arcs are drawn slightly above the owner's center
    pub const MELEE_ARC_LIFT: f32 = 10.0;
    /// Ranged particles spawn this far ahead of the owner's center
    pub const RANGED_SPAWN_OFFSET: f32 = 10.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Format milliseconds as whole seconds plus one truncated decimal ("1.5")
pub fn format_tenths(ms: u64) -> String {
    format!("{}.{}", ms / 1000, (ms % 1000) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tenths_truncates() {
        assert_eq!(format_tenths(1500), "1.5");
        assert_eq!(format_tenths(1999), "1.9");
        assert_eq!(format_tenths(250), "0.2");
        assert_eq!(format_tenths(4000), "4.0");
    }

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp(10.0, 30.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 30.0, 0.5), 20.0);
        assert_eq!(lerp(10.0, 30.0, 1.0), 30.0);
    }
}
