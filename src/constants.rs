// Shared simulation constants

// Grid and arena
pub const DEFAULT_MAP_SIZE: u32 = 14;
pub const MAX_MAP_SIZE: u32 = 1024; // Keeps the flat snapshot and row-major indices small
pub const CELL_SIZE: f32 = 40.0; // World units per cell edge
pub const NEUTRAL_FACTION_NAME: &str = "default";
pub const NEUTRAL_COLOR: u32 = 0x040c12;

// Projectiles
pub const PROJECTILE_SPEED: f32 = 80.0; // World units per second
pub const PROJECTILE_RADIUS: f32 = 8.0;
pub const MUZZLE_OFFSET: [f32; 2] = [12.0, -4.0]; // Relative to the cannon, unrotated
pub const CANNON_ROTATION_PERIOD_MS: f64 = 4000.0; // One full turn
pub const MAX_MOTION_STEP_MS: f64 = 50.0; // Longest slice between capture checks
pub const MIN_MOTION_STEP_MS: f64 = 1.0;

// Wheel
pub const WHEEL_FULL_TURNS: u32 = 6;
pub const MULTIPLIER_CAP: u32 = 30;
pub const INITIAL_MULTIPLIER: u32 = 1;
pub const SPIN_ANIMATION_MS: f64 = 2800.0;
pub const SETTLE_MS: f64 = 1600.0; // Highlight hold after a spin resolves
pub const AUTO_SPIN_INTERVAL_MS: f64 = 2500.0;

// Burst fire
pub const BURST_INTERVAL_MS: f64 = 100.0;

pub const DEFAULT_SEED: u64 = 0x5EED_C0DE;
