//! Motion Frame Core (engine-agnostic)
//!
//! Packs a humanoid pose and its mouth shapes into a fixed-width vector of
//! scalar channels. Per skeleton, a [`ChannelLayout`] decides which channel
//! carries which (bone, axis); per frame, a [`PoseSampler`] writes the pose
//! into those channels. Viseme channels are resolved separately against a
//! fixed weight table and appended after the skeleton.
//!
//! Channel map: 0..=2 free for auxiliary data, 3..=14 root position and
//! rotation, 15.. one channel per free bone axis in bone order (overrides can
//! relocate a bone), and by default three viseme channels at 80..=82.

pub mod armature;
pub mod config;
pub mod error;
pub mod humanoid;
pub mod layout;
pub mod pose;
pub mod recorder;
pub mod sampler;
pub mod viseme;

// Re-exports for consumers (adapters)
pub use armature::{Armature, Axis, AxisLimits, Bone};
pub use config::{FrameConfig, SlotOverrides};
pub use error::FrameError;
pub use layout::{ChannelLayout, RootSlot, ROOT_CHANNELS, ROOT_SLOT_START};
pub use pose::{ChannelVector, PoseSample, RootFrame};
pub use recorder::{export_clip_json, FrameRecorder, RecordedClip, RecordedTrack};
pub use sampler::{PoseSampler, SkeletonBinding};
pub use viseme::{
    decode_table, encode_table, search_viseme_name, ShapeIndex, ShapeMatch, VISEME_TABLE,
};

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, FrameError>;
