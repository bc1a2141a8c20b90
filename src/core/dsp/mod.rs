//! Digital Signal Processing utilities

pub mod filters;
pub mod frames;
pub mod stats;
pub mod windows;

pub use filters::{apply_correction, ParametricEq, PeakingFilter};
pub use frames::{FrameExtractor, Frames, SpectralFrame};
pub use windows::{create_window, WindowType};
