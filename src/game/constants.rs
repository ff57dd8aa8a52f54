/// Screen bounds shared with the client renderer
pub mod bounds {
    pub const X: f32 = 0.0;
    pub const Y: f32 = 0.0;
    /// Playfield width in pixels
    pub const WIDTH: f32 = 640.0;
    /// Playfield height in pixels
    pub const HEIGHT: f32 = 480.0;
}

/// Simulation timing
pub mod tick {
    /// Server tick interval in milliseconds (~66 Hz)
    pub const RATE_MS: u64 = 15;
    /// Speed shared by bullets, bombs and the wave descent (pixels per second)
    pub const SCROLL_SPEED: f32 = 480.0;
}

/// Player constants
pub mod player {
    /// Hitbox edge length
    pub const SIZE: f32 = 32.0;
    /// Fixed spawn row (bottom of the screen)
    pub const SPAWN_Y: f32 = 432.0;
}

/// Bullet constants
pub mod bullet {
    pub const WIDTH: f32 = 8.0;
    pub const HEIGHT: f32 = 16.0;
    /// Bullets whose y drops below this are culled
    pub const CULL_Y: f32 = -8.0;
}

/// Bomb constants
pub mod bomb {
    pub const WIDTH: f32 = 20.0;
    pub const HEIGHT: f32 = 14.0;
    /// Offset from the firing enemy's top-left corner
    pub const SPAWN_OFFSET_X: f32 = 6.0;
    pub const SPAWN_OFFSET_Y: f32 = 18.0;
    /// Bombs are culled once they fall this far past the bottom edge
    pub const CULL_MARGIN: f32 = 16.0;
}

/// Enemy constants
pub mod enemy {
    pub const SIZE: f32 = 32.0;
    /// Charge above which an enemy drops a bomb
    pub const CHARGE_THRESHOLD: f32 = 4.0;
    /// Charge gained per millisecond once the fire delay has elapsed
    pub const CHARGE_PER_MS: f32 = 1.0 / 100.0;
    /// Fire delay range in milliseconds, [MIN, MAX)
    pub const FIRE_DELAY_MIN_MS: f32 = 2000.0;
    pub const FIRE_DELAY_MAX_MS: f32 = 4000.0;
    /// Starting vertical offset of a fresh wave (enemies descend from above)
    pub const DESCENT_START: f32 = -480.0;
}

/// Session constants
pub mod session {
    /// Length of generated session ids
    pub const ID_LENGTH: usize = 6;
    /// Alphabet for session ids
    pub const ID_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
}

/// Networking constants
pub mod net {
    /// Maximum reliable message size
    pub const MAX_MESSAGE_SIZE: usize = 65536;
    /// Largest |dx| accepted from a single mouseMove event
    pub const MAX_MOUSE_DELTA: f32 = 4096.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_fit_player() {
        assert!(player::SPAWN_Y + player::SIZE <= bounds::HEIGHT);
        assert!(player::SIZE < bounds::WIDTH);
    }

    #[test]
    fn test_fire_delay_range() {
        assert!(enemy::FIRE_DELAY_MIN_MS < enemy::FIRE_DELAY_MAX_MS);
    }

    #[test]
    fn test_descent_covers_screen() {
        assert_eq!(enemy::DESCENT_START, -bounds::HEIGHT);
    }

    #[test]
    fn test_id_alphabet_is_uppercase() {
        assert!(session::ID_ALPHABET.iter().all(|c| c.is_ascii_uppercase()));
    }
}
