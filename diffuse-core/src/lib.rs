//! Core 2D RGB color diffusion simulation library.
//!
//! Main components:
//! - [`color`] — linear-RGB color values and channel selectors.
//! - [`error`] — construction-time errors.
//! - [`grid`] — the double-buffered diffusion grid, brush painting and clearing.
//! - [`diffusion`] — the per-generation stencil update and buffer swap.

pub mod color;
pub mod diffusion;
pub mod error;
pub mod grid;
