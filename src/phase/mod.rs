//! Phase detection and the phase → endpoint table.

pub mod detector;
pub mod table;

pub use detector::{detect_phase, detect_sub_state, fixtures_in_window, window_bounds};
pub use table::{PhaseEndpoints, PhaseTable};
