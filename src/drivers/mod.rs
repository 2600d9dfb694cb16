//! Interrupt-level drivers. Only one on this board: the mode button.

pub mod button;
