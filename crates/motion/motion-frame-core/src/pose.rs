//! Per-frame pose input, the armature's embedding frame, and the flat channel
//! vector handed to the transport.

use std::ops::{Index, IndexMut};

use hashbrown::HashMap;
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::armature::{Armature, Axis};

const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Sampled pose of one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    /// Body (root) position in world space, in normalized human units.
    pub body_position: [f32; 3],
    /// Body rotation in world space, (x, y, z, w).
    pub body_rotation: [f32; 4],
    /// One normalized actuation value per free non-root axis, ordered like
    /// the armature's actuation table.
    pub muscles: Vec<f32>,
    /// Blend-shape weights by shape name.
    #[serde(default)]
    pub shapes: HashMap<String, f32>,
}

impl PoseSample {
    /// Pose at the origin with identity rotation and all actuations zero.
    pub fn rest(armature: &Armature) -> Self {
        Self {
            body_position: [0.0; 3],
            body_rotation: IDENTITY_ROTATION,
            muscles: vec![0.0; armature.muscle_count()],
            shapes: HashMap::new(),
        }
    }

    pub fn muscle(&self, armature: &Armature, bone: usize, axis: Axis) -> Option<f32> {
        armature
            .muscle_index(bone, axis)
            .and_then(|i| self.muscles.get(i).copied())
    }

    /// Set the actuation of a free axis; returns false for locked axes.
    pub fn set_muscle(&mut self, armature: &Armature, bone: usize, axis: Axis, value: f32) -> bool {
        match armature
            .muscle_index(bone, axis)
            .and_then(|i| self.muscles.get_mut(i))
        {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

/// Where the armature sits in the world. Root motion is written relative to
/// this frame so the encoding does not depend on where the model is placed.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootFrame {
    /// Armature origin in world space.
    pub position: [f32; 3],
    /// Armature world rotation, (x, y, z, w).
    pub rotation: [f32; 4],
    /// Armature world (lossy) scale.
    pub scale: [f32; 3],
    /// Accumulated scale of the root bone's parent.
    pub parent_scale: [f32; 3],
    /// Overall skeleton size factor applied to the body position.
    pub human_scale: f32,
}

impl Default for RootFrame {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: IDENTITY_ROTATION,
            scale: [1.0; 3],
            parent_scale: [1.0; 3],
            human_scale: 1.0,
        }
    }
}

impl RootFrame {
    fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::new_normalize(to_quaternion(self.rotation))
    }

    /// `(R⁻¹ · (parent_scale ⊙ (body · human_scale − origin))) ⊘ scale`, the
    /// inverse of rotating a scaled local vector into world space.
    pub fn encode_position(&self, body_position: [f32; 3]) -> [f32; 3] {
        let world = Vector3::from(body_position) * self.human_scale - Vector3::from(self.position);
        let offset = Vector3::from(self.parent_scale).component_mul(&world);
        self.rotation()
            .inverse_transform_vector(&offset)
            .component_div(&Vector3::from(self.scale))
            .into()
    }

    /// Inverse of [`RootFrame::encode_position`].
    pub fn decode_position(&self, local: [f32; 3]) -> [f32; 3] {
        let scaled = Vector3::from(local).component_mul(&Vector3::from(self.scale));
        let world = self
            .rotation()
            .transform_vector(&scaled)
            .component_div(&Vector3::from(self.parent_scale));
        let body = (world + Vector3::from(self.position)) / self.human_scale;
        body.into()
    }

    /// Body rotation expressed relative to the armature, (x, y, z, w). The
    /// input is not renormalized.
    pub fn encode_rotation(&self, body_rotation: [f32; 4]) -> [f32; 4] {
        let local = self.rotation().inverse().quaternion() * to_quaternion(body_rotation);
        from_quaternion(&local)
    }

    /// Inverse of [`RootFrame::encode_rotation`].
    pub fn decode_rotation(&self, local: [f32; 4]) -> [f32; 4] {
        let world = self.rotation().quaternion() * to_quaternion(local);
        from_quaternion(&world)
    }
}

fn to_quaternion(q: [f32; 4]) -> Quaternion<f32> {
    Quaternion::new(q[3], q[0], q[1], q[2])
}

fn from_quaternion(q: &Quaternion<f32>) -> [f32; 4] {
    [q.i, q.j, q.k, q.w]
}

/// Flat channel values indexed by global channel index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelVector(Vec<f32>);

impl ChannelVector {
    /// `len` channels, all set to `fill`.
    pub fn filled(len: usize, fill: f32) -> Self {
        Self(vec![fill; len])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for ChannelVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

impl Index<usize> for ChannelVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

impl IndexMut<usize> for ChannelVector {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        &mut self.0[index]
    }
}
