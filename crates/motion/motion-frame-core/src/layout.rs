//! Channel layout: which global channel each (bone, axis) pair occupies.
//!
//! Layout is a single pass over the bones in index order with a running slot
//! cursor. The root always takes local slots 3..=14 at base 0, so its
//! position and rotation sit at fixed global indices no matter the armature;
//! slots 0..=2 stay free for auxiliary channels. Every other bone takes one
//! channel per free axis. An override forces the cursor forward to a given
//! slot before the bone is placed.

use log::debug;
use serde::Serialize;

use crate::armature::{Armature, Axis};
use crate::config::{FrameConfig, SlotOverrides};
use crate::error::FrameError;
use crate::viseme::{decode_table, encode_table, ShapeIndex};
use crate::Result;

/// First local slot of the root bone.
pub const ROOT_SLOT_START: usize = 3;
/// Channels carried by the root bone.
pub const ROOT_CHANNELS: usize = 12;
/// Slots the root reserves from the cursor (reserved prefix included).
pub const ROOT_FOOTPRINT: usize = ROOT_SLOT_START + ROOT_CHANNELS;

/// Meaning of each root slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum RootSlot {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
    RotationW,
    /// Slots 10..=14, written with the rest value.
    Reserved(u8),
}

impl RootSlot {
    pub fn from_slot(slot: usize) -> Option<Self> {
        Some(match slot {
            3 => RootSlot::PositionX,
            4 => RootSlot::PositionY,
            5 => RootSlot::PositionZ,
            6 => RootSlot::RotationX,
            7 => RootSlot::RotationY,
            8 => RootSlot::RotationZ,
            9 => RootSlot::RotationW,
            10..=14 => RootSlot::Reserved((slot - 10) as u8),
            _ => return None,
        })
    }

    pub fn slot(self) -> usize {
        match self {
            RootSlot::PositionX => 3,
            RootSlot::PositionY => 4,
            RootSlot::PositionZ => 5,
            RootSlot::RotationX => 6,
            RootSlot::RotationY => 7,
            RootSlot::RotationZ => 8,
            RootSlot::RotationW => 9,
            RootSlot::Reserved(i) => 10 + i as usize,
        }
    }
}

/// Per-bone channel assignment plus appended blend-shape channels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChannelLayout {
    /// Local slots per bone: 3..=14 for the root, free axis indices otherwise.
    channels: Vec<Vec<usize>>,
    base_indices: Vec<usize>,
    shape_indices: Vec<ShapeIndex>,
}

impl ChannelLayout {
    /// Assign channels for every bone of `armature`.
    ///
    /// Fails on an override that targets the root or an unknown bone, and on
    /// one that would move the cursor back over an assigned range.
    pub fn build(armature: &Armature, overrides: &SlotOverrides) -> Result<Self> {
        for (bone, _) in overrides.iter() {
            if bone >= armature.len() {
                return Err(FrameError::UnknownOverrideBone {
                    bone,
                    bone_count: armature.len(),
                });
            }
            if bone == 0 {
                return Err(FrameError::RootOverride { bone });
            }
        }

        let mut channels = Vec::with_capacity(armature.len());
        let mut base_indices = Vec::with_capacity(armature.len());
        let mut slot = 0;
        for (i, bone) in armature.bones().iter().enumerate() {
            let chan: Vec<usize> = if i == 0 {
                (ROOT_SLOT_START..ROOT_FOOTPRINT).collect()
            } else {
                bone.limits.free_axes().map(Axis::index).collect()
            };

            if let Some(forced) = overrides.get(i) {
                if forced < slot {
                    return Err(FrameError::OverrideOverlap {
                        bone: i,
                        slot: forced,
                        cursor: slot,
                    });
                }
                slot = forced;
            }
            base_indices.push(slot);
            slot += if i == 0 { ROOT_FOOTPRINT } else { chan.len() };
            channels.push(chan);
        }

        debug!(
            "channel layout built: {} bones, {} overrides, next free slot {}",
            armature.len(),
            overrides.len(),
            slot
        );
        Ok(Self {
            channels,
            base_indices,
            shape_indices: Vec::new(),
        })
    }

    /// Layout with the encoder viseme block at `cfg.viseme_base_index`.
    pub fn encoder(armature: &Armature, cfg: &FrameConfig) -> Result<Self> {
        let mut layout = Self::build(armature, &cfg.overrides)?;
        layout.add_encoder_viseme_shapes(cfg.viseme_base_index)?;
        Ok(layout)
    }

    /// Layout with viseme channels resolved against a target's blend shapes.
    pub fn decoder<S: AsRef<str>>(
        armature: &Armature,
        cfg: &FrameConfig,
        shape_names: &[S],
    ) -> Result<Self> {
        let mut layout = Self::build(armature, &cfg.overrides)?;
        layout.add_decoder_viseme_shapes(shape_names, cfg.viseme_base_index)?;
        Ok(layout)
    }

    /// Append the synthesized `v_<viseme>` shapes for every non-zero weight.
    pub fn add_encoder_viseme_shapes(&mut self, base_index: usize) -> Result<()> {
        self.append_shapes(encode_table(base_index))
    }

    /// Append the primary viseme shapes found among `shape_names`.
    pub fn add_decoder_viseme_shapes<S: AsRef<str>>(
        &mut self,
        shape_names: &[S],
        base_index: usize,
    ) -> Result<()> {
        self.append_shapes(decode_table(shape_names, base_index))
    }

    fn append_shapes(&mut self, shapes: Vec<ShapeIndex>) -> Result<()> {
        for shape in &shapes {
            if let Some(bone) = self.owner_of(shape.index) {
                return Err(FrameError::VisemeOverlap {
                    viseme: shape.shape.clone(),
                    index: shape.index,
                    bone,
                });
            }
        }
        self.shape_indices.extend(shapes);
        Ok(())
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.channels.len()
    }

    /// Local slots of `bone`; empty for unknown bones.
    pub fn channels(&self, bone: usize) -> &[usize] {
        self.channels.get(bone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn base_index(&self, bone: usize) -> Option<usize> {
        self.base_indices.get(bone).copied()
    }

    pub fn base_indices(&self) -> &[usize] {
        &self.base_indices
    }

    pub fn shape_indices(&self) -> &[ShapeIndex] {
        &self.shape_indices
    }

    /// Global index of the `position`-th channel of `bone`.
    pub fn global_index(&self, bone: usize, position: usize) -> Option<usize> {
        let base = self.base_index(bone)?;
        let slot = *self.channels(bone).get(position)?;
        Some(if bone == 0 { base + slot } else { base + position })
    }

    /// Global indices of every channel of `bone`, in channel-list order.
    pub fn global_indices(&self, bone: usize) -> Vec<usize> {
        (0..self.channels(bone).len())
            .filter_map(|k| self.global_index(bone, k))
            .collect()
    }

    /// Global index carrying `axis` of a non-root bone, if that axis is free.
    pub fn axis_index(&self, bone: usize, axis: Axis) -> Option<usize> {
        if bone == 0 {
            return None;
        }
        let position = self.channels(bone).iter().position(|&a| a == axis.index())?;
        self.global_index(bone, position)
    }

    /// Global index of a root slot.
    pub fn root_index(&self, slot: RootSlot) -> Option<usize> {
        self.base_index(0).map(|base| base + slot.slot())
    }

    /// Bone whose channel occupies global index `index`.
    pub fn owner_of(&self, index: usize) -> Option<usize> {
        (0..self.bone_count()).find(|&bone| self.global_indices(bone).contains(&index))
    }

    /// Length of a channel vector that holds every assigned channel.
    pub fn channel_count(&self) -> usize {
        let skeletal = (0..self.bone_count())
            .filter_map(|bone| self.global_indices(bone).last().map(|&i| i + 1))
            .max()
            .unwrap_or(0);
        let shapes = self
            .shape_indices
            .iter()
            .map(|s| s.index + 1)
            .max()
            .unwrap_or(0);
        skeletal.max(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armature::{AxisLimits, Bone};

    fn two_bone() -> Armature {
        Armature::new(vec![
            Bone::root("hips"),
            Bone::child("spine", 0, AxisLimits::with_free(&[Axis::X])),
        ])
        .unwrap()
    }

    #[test]
    fn root_slot_roundtrip() {
        for slot in ROOT_SLOT_START..ROOT_FOOTPRINT {
            assert_eq!(RootSlot::from_slot(slot).unwrap().slot(), slot);
        }
        assert_eq!(RootSlot::from_slot(2), None);
        assert_eq!(RootSlot::from_slot(15), None);
    }

    #[test]
    fn axis_and_root_lookup() {
        let layout = ChannelLayout::build(&two_bone(), &SlotOverrides::new()).unwrap();
        assert_eq!(layout.axis_index(1, Axis::X), Some(15));
        assert_eq!(layout.axis_index(1, Axis::Y), None);
        assert_eq!(layout.root_index(RootSlot::PositionX), Some(3));
        assert_eq!(layout.root_index(RootSlot::RotationW), Some(9));
        assert_eq!(layout.owner_of(2), None);
        assert_eq!(layout.owner_of(14), Some(0));
        assert_eq!(layout.owner_of(15), Some(1));
        assert_eq!(layout.channel_count(), 16);
    }

    #[test]
    fn override_on_root_is_rejected() {
        let err = ChannelLayout::build(&two_bone(), &SlotOverrides::new().with(0, 0)).unwrap_err();
        assert_eq!(err, FrameError::RootOverride { bone: 0 });
    }

    #[test]
    fn override_on_unknown_bone_is_rejected() {
        let err = ChannelLayout::build(&two_bone(), &SlotOverrides::new().with(5, 40)).unwrap_err();
        assert_eq!(
            err,
            FrameError::UnknownOverrideBone {
                bone: 5,
                bone_count: 2
            }
        );
    }

    #[test]
    fn viseme_block_in_reserved_prefix_is_allowed() {
        let mut layout = ChannelLayout::build(&two_bone(), &SlotOverrides::new()).unwrap();
        layout.add_encoder_viseme_shapes(0).unwrap();
        assert!(layout.shape_indices().iter().all(|s| s.index < 3));
        assert_eq!(layout.channel_count(), 16);
    }

    #[test]
    fn viseme_block_on_skeletal_channel_is_rejected() {
        let mut layout = ChannelLayout::build(&two_bone(), &SlotOverrides::new()).unwrap();
        let err = layout.add_encoder_viseme_shapes(13).unwrap_err();
        assert!(matches!(err, FrameError::VisemeOverlap { index: 13, bone: 0, .. }));
        assert!(layout.shape_indices().is_empty());
    }
}
