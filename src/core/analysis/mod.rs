//! Spectral profile analysis
//!
//! Turns a mono PCM buffer into an [`EqProfile`](crate::core::EqProfile):
//! - Band layout (fixed fractional-octave table) and bin mapping
//! - Welch averaging of frame power spectra
//! - Band aggregation (gain and confidence per band)
//! - Whole-signal descriptors (loudness, dynamic range, centroid, rolloff)

pub mod bands;
pub mod descriptors;
mod layout;
pub mod welch;

pub use layout::{BandBins, BandLayout, BinMap};
pub use welch::WelchEstimate;
