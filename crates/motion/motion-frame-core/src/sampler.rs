//! Per-frame pose sampling into a channel vector, and the inverse decode.
//!
//! The sampler owns nothing but the bound-bone flags; armature and layout are
//! borrowed read-only, so one layout can back any number of samplers.

use hashbrown::HashMap;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::armature::{Armature, Axis};
use crate::config::FrameConfig;
use crate::error::FrameError;
use crate::layout::{ChannelLayout, RootSlot};
use crate::pose::{ChannelVector, PoseSample, RootFrame};
use crate::Result;

const POSITION_SLOTS: [RootSlot; 3] = [
    RootSlot::PositionX,
    RootSlot::PositionY,
    RootSlot::PositionZ,
];
const ROTATION_SLOTS: [RootSlot; 4] = [
    RootSlot::RotationX,
    RootSlot::RotationY,
    RootSlot::RotationZ,
    RootSlot::RotationW,
];

/// Which armature bones exist on the runtime skeleton.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkeletonBinding {
    bound: Vec<bool>,
}

impl SkeletonBinding {
    /// Every bone bound.
    pub fn all(armature: &Armature) -> Self {
        Self {
            bound: vec![true; armature.len()],
        }
    }

    /// Explicit flags by bone index; bones past the end are unbound.
    pub fn from_flags(bound: Vec<bool>) -> Self {
        Self { bound }
    }

    /// Bones whose names appear in `present` are bound.
    pub fn from_names<I, S>(armature: &Armature, present: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bound = vec![false; armature.len()];
        for name in present {
            if let Some(i) = armature.bone_index(name.as_ref()) {
                bound[i] = true;
            }
        }
        Self { bound }
    }

    pub fn unbind(&mut self, bone: usize) {
        if let Some(flag) = self.bound.get_mut(bone) {
            *flag = false;
        }
    }

    #[inline]
    pub fn is_bound(&self, bone: usize) -> bool {
        self.bound.get(bone).copied().unwrap_or(false)
    }
}

/// Writes poses into channel vectors for one bound skeleton.
#[derive(Clone, Debug)]
pub struct PoseSampler<'a> {
    armature: &'a Armature,
    layout: &'a ChannelLayout,
    binding: SkeletonBinding,
    rest_value: f32,
}

impl<'a> PoseSampler<'a> {
    /// Fails when the layout was built for a different bone count.
    pub fn new(
        armature: &'a Armature,
        layout: &'a ChannelLayout,
        binding: SkeletonBinding,
        cfg: &FrameConfig,
    ) -> Result<Self> {
        if layout.bone_count() != armature.len() {
            return Err(FrameError::LayoutMismatch {
                layout_bones: layout.bone_count(),
                armature_bones: armature.len(),
            });
        }
        cfg.validate()?;

        let unbound: Vec<&str> = armature
            .bones()
            .iter()
            .enumerate()
            .filter(|(i, _)| !binding.is_bound(*i))
            .map(|(_, b)| b.name.as_str())
            .collect();
        if !unbound.is_empty() {
            warn!(
                "{} bones unbound, their channels stay at {}: {}",
                unbound.len(),
                cfg.rest_value,
                unbound.join(", ")
            );
        }

        Ok(Self {
            armature,
            layout,
            binding,
            rest_value: cfg.rest_value,
        })
    }

    /// A sampler without a bound root cannot produce frames.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.binding.is_bound(0)
    }

    #[inline]
    pub fn is_bound(&self, bone: usize) -> bool {
        self.binding.is_bound(bone)
    }

    pub fn armature(&self) -> &'a Armature {
        self.armature
    }

    pub fn layout(&self) -> &'a ChannelLayout {
        self.layout
    }

    pub fn rest_value(&self) -> f32 {
        self.rest_value
    }

    /// Encode one pose. Actuation values are written as given, without
    /// clamping. Channels of unbound bones, locked axes and reserved root
    /// slots hold the rest value.
    pub fn sample(&self, pose: &PoseSample, frame: &RootFrame) -> Result<ChannelVector> {
        if !self.is_valid() {
            return Err(FrameError::UnboundRoot);
        }
        let expected = self.armature.muscle_count();
        if pose.muscles.len() != expected {
            warn!(
                "rejecting pose with {} actuation values, expected {expected}",
                pose.muscles.len()
            );
            return Err(FrameError::MuscleCountMismatch {
                expected,
                actual: pose.muscles.len(),
            });
        }

        let mut out = ChannelVector::filled(self.layout.channel_count(), self.rest_value);

        let position = frame.encode_position(pose.body_position);
        let rotation = frame.encode_rotation(pose.body_rotation);
        for (slot, value) in POSITION_SLOTS.iter().zip(position) {
            if let Some(i) = self.layout.root_index(*slot) {
                out[i] = value;
            }
        }
        for (slot, value) in ROTATION_SLOTS.iter().zip(rotation) {
            if let Some(i) = self.layout.root_index(*slot) {
                out[i] = value;
            }
        }

        for bone in 1..self.layout.bone_count() {
            if !self.binding.is_bound(bone) {
                continue;
            }
            for (k, &axis) in self.layout.channels(bone).iter().enumerate() {
                let Some(axis) = Axis::from_index(axis) else {
                    continue;
                };
                let (Some(muscle), Some(index)) = (
                    self.armature.muscle_index(bone, axis),
                    self.layout.global_index(bone, k),
                ) else {
                    continue;
                };
                out[index] = pose.muscles[muscle];
            }
        }

        let shapes = self.layout.shape_indices();
        for shape in shapes {
            out[shape.index] = 0.0;
        }
        for shape in shapes {
            if let Some(weight) = pose.shapes.get(&shape.shape) {
                out[shape.index] += shape.weight * weight;
            }
        }

        Ok(out)
    }

    /// Rebuild a pose from a channel vector produced with the same layout.
    /// Unbound bones decode to the rest value. Only primary shapes are read
    /// back from the viseme channels; blended contributors are left out.
    pub fn decode(&self, channels: &ChannelVector, frame: &RootFrame) -> Result<PoseSample> {
        let expected = self.layout.channel_count();
        if channels.len() < expected {
            return Err(FrameError::ChannelCountMismatch {
                expected,
                actual: channels.len(),
            });
        }

        let read_root = |slot: RootSlot| {
            self.layout
                .root_index(slot)
                .and_then(|i| channels.get(i))
                .unwrap_or(self.rest_value)
        };
        let position = POSITION_SLOTS.map(read_root);
        let rotation = ROTATION_SLOTS.map(read_root);

        let mut muscles = vec![self.rest_value; self.armature.muscle_count()];
        for bone in 1..self.layout.bone_count() {
            if !self.binding.is_bound(bone) {
                continue;
            }
            for axis in Axis::ALL {
                if let (Some(muscle), Some(index)) = (
                    self.armature.muscle_index(bone, axis),
                    self.layout.axis_index(bone, axis),
                ) {
                    muscles[muscle] = channels[index];
                }
            }
        }

        // Blended contributors share channels with the primaries, so only a
        // primary (weight 1) can be read back.
        let mut shapes = HashMap::new();
        for shape in self.layout.shape_indices() {
            if shape.weight == 1.0 {
                shapes.insert(shape.shape.clone(), channels[shape.index]);
            }
        }

        Ok(PoseSample {
            body_position: frame.decode_position(position),
            body_rotation: frame.decode_rotation(rotation),
            muscles,
            shapes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::{AxisLimits, Bone};
    use crate::config::SlotOverrides;

    fn arm() -> Armature {
        Armature::new(vec![
            Bone::root("hips"),
            Bone::child("spine", 0, AxisLimits::free()),
            Bone::child("head", 1, AxisLimits::with_free(&[Axis::Y])),
        ])
        .unwrap()
    }

    #[test]
    fn binding_from_names() {
        let a = arm();
        let binding = SkeletonBinding::from_names(&a, ["hips", "head", "tail"]);
        assert!(binding.is_bound(0));
        assert!(!binding.is_bound(1));
        assert!(binding.is_bound(2));
        assert!(!binding.is_bound(3));
    }

    #[test]
    fn missing_root_invalidates_sampler() {
        let a = arm();
        let layout = ChannelLayout::build(&a, &SlotOverrides::new()).unwrap();
        let mut binding = SkeletonBinding::all(&a);
        binding.unbind(0);
        let sampler = PoseSampler::new(&a, &layout, binding, &FrameConfig::default()).unwrap();
        assert!(!sampler.is_valid());
        let err = sampler
            .sample(&PoseSample::rest(&a), &RootFrame::default())
            .unwrap_err();
        assert_eq!(err, FrameError::UnboundRoot);
    }

    #[test]
    fn layout_for_other_armature_is_rejected() {
        let a = arm();
        let small = Armature::new(vec![Bone::root("hips")]).unwrap();
        let layout = ChannelLayout::build(&small, &SlotOverrides::new()).unwrap();
        let err = PoseSampler::new(&a, &layout, SkeletonBinding::all(&a), &FrameConfig::default())
            .unwrap_err();
        assert!(matches!(err, FrameError::LayoutMismatch { .. }));
    }

    #[test]
    fn short_channel_vector_is_rejected() {
        let a = arm();
        let layout = ChannelLayout::build(&a, &SlotOverrides::new()).unwrap();
        let sampler =
            PoseSampler::new(&a, &layout, SkeletonBinding::all(&a), &FrameConfig::default())
                .unwrap();
        let err = sampler
            .decode(&ChannelVector::filled(4, 0.0), &RootFrame::default())
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
