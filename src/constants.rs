//! Global constants for textforge
//!
//! Consolidates cache tuning, atlas layout, and descriptor defaults
//! to eliminate magic numbers throughout the codebase.

// ============================================================================
// Render Cache Tuning
// ============================================================================

/// Number of independent lock-guarded cache shards.
/// A fingerprint maps to shard `fingerprint % SHARD_COUNT`.
pub const SHARD_COUNT: usize = 16;

/// Shards below this occupancy are skipped by the eviction sweep
pub const EVICTION_MIN_OCCUPANCY: usize = 100;

/// Occupancy above which the 10ms staleness window applies
pub const EVICTION_HIGH_OCCUPANCY: usize = 500;

/// Occupancy above which the 100ms staleness window applies
pub const EVICTION_MID_OCCUPANCY: usize = 250;

/// Staleness window (ms) for heavily loaded shards
pub const EVICTION_WINDOW_HIGH_MS: u64 = 10;

/// Staleness window (ms) for moderately loaded shards
pub const EVICTION_WINDOW_MID_MS: u64 = 100;

/// Staleness window (ms) for lightly loaded shards
pub const EVICTION_WINDOW_LOW_MS: u64 = 1000;

/// Seed for the 64-bit text fingerprint (fixed, nonzero)
pub const FINGERPRINT_SEED: u64 = 1_125_899_906_842_597;

/// Fingerprint fold multiplier
pub const FINGERPRINT_MUL: u64 = 31;

// ============================================================================
// Atlas Layout
// ============================================================================

/// Fixed number of glyph columns per atlas row
pub const ATLAS_COLUMNS: u32 = 16;

/// Default first codepoint of the packed range
pub const DEFAULT_FIRST_GLYPH: u32 = 32;

/// Default last codepoint of the packed range (cp1252 coverage)
pub const DEFAULT_LAST_GLYPH: u32 = 255;

/// Minimum space advance in pixels when auto-measuring
pub const MIN_SPACE_WIDTH: u32 = 3;

// ============================================================================
// Generated Artifacts
// ============================================================================

/// Writable area for packed atlas textures and synthesized descriptors
pub const GENERATED_FONTS_DIR: &str = "generated/fonts";

/// Suffix appended to atlas texture names (codepoint range marker)
pub const ATLAS_TEXTURE_SUFFIX: &str = "_cp1252";
