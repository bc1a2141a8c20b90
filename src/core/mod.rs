//! Core profile analysis: DSP primitives, band analysis, the profile
//! engine and the file decoder

pub mod analysis;
pub mod decoder;
pub mod dsp;
pub mod engine;
pub mod profile;

pub use analysis::BandLayout;
pub use decoder::{decode_audio, extract_mono, load_mono, resample_mono, AudioData};
pub use engine::{build_profile, default_engine, EqMatchEngine};
pub use profile::{BandProfile, EqProfile};
