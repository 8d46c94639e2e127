//! Reserved message names.
//!
//! Message names are free-form strings chosen by behavior authors; the
//! runtime reserves a handful for its own protocol. Everything that switches
//! on one of these compares against the constants here, never a literal.

/// Broadcast that starts a new game epoch. Triggers the reset coordinator.
pub const RESET_GAME: &str = "ResetGame";

/// Post-reset initialization, delivered only to local actors.
pub const INIT: &str = "Init";

/// Per-tick simulation step. Generated locally by every peer.
pub const TICK: &str = "Tick";

/// Per-tick step that must run even on remote-owned mirrors.
pub const LOCAL_TICK: &str = "LocalTick";

/// Sent to each freshly registered clone, naming its creator and origin.
pub const CLONED: &str = "Cloned";
