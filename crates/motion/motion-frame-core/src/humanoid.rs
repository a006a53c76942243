//! Canonical humanoid skeleton.
//!
//! Bones are listed roughly by hierarchy mass so the heavy body channels pack
//! into the low indices; the left thumb is pinned to slot 90 so that both
//! hands start on a fixed boundary past the viseme block at 80.

use crate::armature::{Armature, Axis, AxisLimits, Bone};
use crate::config::{FrameConfig, SlotOverrides};
use crate::Result;

use crate::armature::Axis::{X, Y, Z};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum HumanBone {
    Hips,
    Spine,
    Chest,
    UpperChest,
    Neck,
    Head,
    LeftUpperLeg,
    RightUpperLeg,
    LeftLowerLeg,
    RightLowerLeg,
    LeftFoot,
    RightFoot,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
    LeftToes,
    RightToes,
    LeftEye,
    RightEye,
    Jaw,
    LeftThumbProximal,
    LeftThumbIntermediate,
    LeftThumbDistal,
    LeftIndexProximal,
    LeftIndexIntermediate,
    LeftIndexDistal,
    LeftMiddleProximal,
    LeftMiddleIntermediate,
    LeftMiddleDistal,
    LeftRingProximal,
    LeftRingIntermediate,
    LeftRingDistal,
    LeftLittleProximal,
    LeftLittleIntermediate,
    LeftLittleDistal,
    RightThumbProximal,
    RightThumbIntermediate,
    RightThumbDistal,
    RightIndexProximal,
    RightIndexIntermediate,
    RightIndexDistal,
    RightMiddleProximal,
    RightMiddleIntermediate,
    RightMiddleDistal,
    RightRingProximal,
    RightRingIntermediate,
    RightRingDistal,
    RightLittleProximal,
    RightLittleIntermediate,
    RightLittleDistal,
}

/// Default bone order; index in this list is the armature bone index.
pub const DEFAULT_ORDER: [HumanBone; 55] = {
    use HumanBone::*;
    [
        Hips, Spine, Chest, UpperChest, Neck, Head,
        LeftUpperLeg, RightUpperLeg, LeftLowerLeg, RightLowerLeg, LeftFoot, RightFoot,
        LeftShoulder, RightShoulder, LeftUpperArm, RightUpperArm, LeftLowerArm, RightLowerArm,
        LeftHand, RightHand,
        LeftToes, RightToes, LeftEye, RightEye, Jaw,
        LeftThumbProximal, LeftThumbIntermediate, LeftThumbDistal,
        LeftIndexProximal, LeftIndexIntermediate, LeftIndexDistal,
        LeftMiddleProximal, LeftMiddleIntermediate, LeftMiddleDistal,
        LeftRingProximal, LeftRingIntermediate, LeftRingDistal,
        LeftLittleProximal, LeftLittleIntermediate, LeftLittleDistal,
        RightThumbProximal, RightThumbIntermediate, RightThumbDistal,
        RightIndexProximal, RightIndexIntermediate, RightIndexDistal,
        RightMiddleProximal, RightMiddleIntermediate, RightMiddleDistal,
        RightRingProximal, RightRingIntermediate, RightRingDistal,
        RightLittleProximal, RightLittleIntermediate, RightLittleDistal,
    ]
};

/// Bone index of the left thumb proximal in [`DEFAULT_ORDER`].
pub const LEFT_THUMB_PROXIMAL: usize = 25;
/// Channel the left hand block starts at.
pub const LEFT_HAND_SLOT: usize = 90;

impl HumanBone {
    pub fn name(self) -> &'static str {
        use HumanBone::*;
        match self {
            Hips => "Hips",
            Spine => "Spine",
            Chest => "Chest",
            UpperChest => "UpperChest",
            Neck => "Neck",
            Head => "Head",
            LeftUpperLeg => "LeftUpperLeg",
            RightUpperLeg => "RightUpperLeg",
            LeftLowerLeg => "LeftLowerLeg",
            RightLowerLeg => "RightLowerLeg",
            LeftFoot => "LeftFoot",
            RightFoot => "RightFoot",
            LeftShoulder => "LeftShoulder",
            RightShoulder => "RightShoulder",
            LeftUpperArm => "LeftUpperArm",
            RightUpperArm => "RightUpperArm",
            LeftLowerArm => "LeftLowerArm",
            RightLowerArm => "RightLowerArm",
            LeftHand => "LeftHand",
            RightHand => "RightHand",
            LeftToes => "LeftToes",
            RightToes => "RightToes",
            LeftEye => "LeftEye",
            RightEye => "RightEye",
            Jaw => "Jaw",
            LeftThumbProximal => "LeftThumbProximal",
            LeftThumbIntermediate => "LeftThumbIntermediate",
            LeftThumbDistal => "LeftThumbDistal",
            LeftIndexProximal => "LeftIndexProximal",
            LeftIndexIntermediate => "LeftIndexIntermediate",
            LeftIndexDistal => "LeftIndexDistal",
            LeftMiddleProximal => "LeftMiddleProximal",
            LeftMiddleIntermediate => "LeftMiddleIntermediate",
            LeftMiddleDistal => "LeftMiddleDistal",
            LeftRingProximal => "LeftRingProximal",
            LeftRingIntermediate => "LeftRingIntermediate",
            LeftRingDistal => "LeftRingDistal",
            LeftLittleProximal => "LeftLittleProximal",
            LeftLittleIntermediate => "LeftLittleIntermediate",
            LeftLittleDistal => "LeftLittleDistal",
            RightThumbProximal => "RightThumbProximal",
            RightThumbIntermediate => "RightThumbIntermediate",
            RightThumbDistal => "RightThumbDistal",
            RightIndexProximal => "RightIndexProximal",
            RightIndexIntermediate => "RightIndexIntermediate",
            RightIndexDistal => "RightIndexDistal",
            RightMiddleProximal => "RightMiddleProximal",
            RightMiddleIntermediate => "RightMiddleIntermediate",
            RightMiddleDistal => "RightMiddleDistal",
            RightRingProximal => "RightRingProximal",
            RightRingIntermediate => "RightRingIntermediate",
            RightRingDistal => "RightRingDistal",
            RightLittleProximal => "RightLittleProximal",
            RightLittleIntermediate => "RightLittleIntermediate",
            RightLittleDistal => "RightLittleDistal",
        }
    }

    pub fn parent(self) -> Option<HumanBone> {
        use HumanBone::*;
        Some(match self {
            Hips => return None,
            Spine | LeftUpperLeg | RightUpperLeg => Hips,
            Chest => Spine,
            UpperChest => Chest,
            Neck | LeftShoulder | RightShoulder => UpperChest,
            Head => Neck,
            LeftLowerLeg => LeftUpperLeg,
            RightLowerLeg => RightUpperLeg,
            LeftFoot => LeftLowerLeg,
            RightFoot => RightLowerLeg,
            LeftToes => LeftFoot,
            RightToes => RightFoot,
            LeftUpperArm => LeftShoulder,
            RightUpperArm => RightShoulder,
            LeftLowerArm => LeftUpperArm,
            RightLowerArm => RightUpperArm,
            LeftHand => LeftLowerArm,
            RightHand => RightLowerArm,
            LeftEye | RightEye | Jaw => Head,
            LeftThumbProximal | LeftIndexProximal | LeftMiddleProximal | LeftRingProximal
            | LeftLittleProximal => LeftHand,
            RightThumbProximal | RightIndexProximal | RightMiddleProximal
            | RightRingProximal | RightLittleProximal => RightHand,
            LeftThumbIntermediate => LeftThumbProximal,
            LeftThumbDistal => LeftThumbIntermediate,
            LeftIndexIntermediate => LeftIndexProximal,
            LeftIndexDistal => LeftIndexIntermediate,
            LeftMiddleIntermediate => LeftMiddleProximal,
            LeftMiddleDistal => LeftMiddleIntermediate,
            LeftRingIntermediate => LeftRingProximal,
            LeftRingDistal => LeftRingIntermediate,
            LeftLittleIntermediate => LeftLittleProximal,
            LeftLittleDistal => LeftLittleIntermediate,
            RightThumbIntermediate => RightThumbProximal,
            RightThumbDistal => RightThumbIntermediate,
            RightIndexIntermediate => RightIndexProximal,
            RightIndexDistal => RightIndexIntermediate,
            RightMiddleIntermediate => RightMiddleProximal,
            RightMiddleDistal => RightMiddleIntermediate,
            RightRingIntermediate => RightRingProximal,
            RightRingDistal => RightRingIntermediate,
            RightLittleIntermediate => RightLittleProximal,
            RightLittleDistal => RightLittleIntermediate,
        })
    }

    /// Axes with a muscle: x twists, y swings sideways, z bends forward.
    pub fn free_axes(self) -> &'static [Axis] {
        use HumanBone::*;
        match self {
            Hips | Spine | Chest | UpperChest | Neck | Head => &[X, Y, Z],
            LeftUpperLeg | RightUpperLeg | LeftUpperArm | RightUpperArm => &[X, Y, Z],
            LeftLowerLeg | RightLowerLeg | LeftFoot | RightFoot => &[X, Z],
            LeftLowerArm | RightLowerArm => &[X, Z],
            LeftShoulder | RightShoulder | LeftHand | RightHand => &[Y, Z],
            LeftEye | RightEye | Jaw => &[Y, Z],
            LeftToes | RightToes => &[Z],
            LeftThumbProximal | LeftIndexProximal | LeftMiddleProximal | LeftRingProximal
            | LeftLittleProximal | RightThumbProximal | RightIndexProximal
            | RightMiddleProximal | RightRingProximal | RightLittleProximal => &[Y, Z],
            _ => &[Z],
        }
    }

    /// Position in [`DEFAULT_ORDER`]; variants are declared in that order.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Armature for [`DEFAULT_ORDER`].
pub fn armature() -> Result<Armature> {
    let bones = DEFAULT_ORDER
        .iter()
        .map(|&bone| match bone.parent() {
            None => Bone::root(bone.name()),
            Some(parent) => Bone::child(
                bone.name(),
                parent.index(),
                AxisLimits::with_free(bone.free_axes()),
            ),
        })
        .collect();
    Armature::new(bones)
}

/// Overrides that pin the hands past the viseme block.
pub fn default_overrides() -> SlotOverrides {
    SlotOverrides::new().with(LEFT_THUMB_PROXIMAL, LEFT_HAND_SLOT)
}

/// Default config with the humanoid overrides.
pub fn default_config() -> FrameConfig {
    FrameConfig {
        overrides: default_overrides(),
        ..FrameConfig::default()
    }
}
