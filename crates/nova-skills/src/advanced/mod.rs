//! Skills that act, or could act, on the user's behalf in the outside world.

pub mod ar_overlay;
pub mod coordinator;
pub mod doppelganger;
pub mod negotiator;
pub mod voice_style;
