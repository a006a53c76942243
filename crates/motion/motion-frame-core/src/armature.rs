//! Static skeleton description.
//!
//! An [`Armature`] is an ordered list of bones, root first, where every bone's
//! parent precedes it. Construction validates that ordering once and builds the
//! actuation table: a dense index for every free (bone, axis) pair of the
//! non-root bones. Pose samples carry one actuation value per entry of that
//! table, in the same order.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::Result;

/// Local rotation axis of a bone.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Signed range of motion per local axis. A zero-width range locks the axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl AxisLimits {
    /// All three axes locked.
    pub const fn locked() -> Self {
        Self {
            min: [0.0; 3],
            max: [0.0; 3],
        }
    }

    /// All three axes free over the normalized range.
    pub const fn free() -> Self {
        Self {
            min: [-1.0; 3],
            max: [1.0; 3],
        }
    }

    /// Free over the normalized range on `axes`, locked elsewhere.
    pub fn with_free(axes: &[Axis]) -> Self {
        let mut limits = Self::locked();
        for axis in axes {
            limits.min[axis.index()] = -1.0;
            limits.max[axis.index()] = 1.0;
        }
        limits
    }

    #[inline]
    pub fn range(&self, axis: Axis) -> f32 {
        self.max[axis.index()] - self.min[axis.index()]
    }

    #[inline]
    pub fn is_free(&self, axis: Axis) -> bool {
        self.range(axis) != 0.0
    }

    pub fn free_axes(&self) -> impl Iterator<Item = Axis> + '_ {
        Axis::ALL.into_iter().filter(move |a| self.is_free(*a))
    }
}

/// One bone of the armature. `parent == None` marks the root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<usize>,
    #[serde(default)]
    pub limits: AxisLimits,
}

impl Bone {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            limits: AxisLimits::free(),
        }
    }

    pub fn child(name: impl Into<String>, parent: usize, limits: AxisLimits) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            limits,
        }
    }
}

/// Serialized form of an [`Armature`]; deserialization goes through
/// [`Armature::new`] so the invariants hold for loaded data too.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArmatureDef {
    pub bones: Vec<Bone>,
}

/// Validated skeleton with its actuation table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArmatureDef", into = "ArmatureDef")]
pub struct Armature {
    bones: Vec<Bone>,
    muscles: Vec<[Option<usize>; 3]>,
    muscle_count: usize,
    by_name: HashMap<String, usize>,
}

impl Armature {
    /// Validate topology and build the actuation table.
    ///
    /// Rejects an empty list, a root anywhere but index 0, a parent index that
    /// does not precede its child, and duplicate bone names.
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        let Some(root) = bones.first() else {
            return Err(FrameError::EmptyArmature);
        };
        if let Some(parent) = root.parent {
            return Err(FrameError::RootHasParent {
                name: root.name.clone(),
                parent,
            });
        }

        let mut by_name = HashMap::with_capacity(bones.len());
        for (i, bone) in bones.iter().enumerate() {
            if i > 0 {
                match bone.parent {
                    None => {
                        return Err(FrameError::MultipleRoots {
                            bone: i,
                            name: bone.name.clone(),
                        })
                    }
                    Some(parent) if parent >= i => {
                        return Err(FrameError::ParentOrder {
                            bone: i,
                            name: bone.name.clone(),
                            parent,
                        })
                    }
                    Some(_) => {}
                }
            }
            if let Some(&first) = by_name.get(bone.name.as_str()) {
                return Err(FrameError::DuplicateBoneName {
                    bone: i,
                    first,
                    name: bone.name.clone(),
                });
            }
            by_name.insert(bone.name.clone(), i);
        }

        let mut muscles = vec![[None; 3]; bones.len()];
        let mut muscle_count = 0;
        for (i, bone) in bones.iter().enumerate().skip(1) {
            for axis in bone.limits.free_axes() {
                muscles[i][axis.index()] = Some(muscle_count);
                muscle_count += 1;
            }
        }

        Ok(Self {
            bones,
            muscles,
            muscle_count,
            by_name,
        })
    }

    /// Parse and validate an armature from JSON (`{ "bones": [...] }`).
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.bones.get(index).and_then(|b| b.parent)
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Dense actuation index of a free non-root axis; `None` for locked axes
    /// and for the root.
    #[inline]
    pub fn muscle_index(&self, bone: usize, axis: Axis) -> Option<usize> {
        self.muscles.get(bone).and_then(|m| m[axis.index()])
    }

    /// Number of actuation values a pose of this armature carries.
    #[inline]
    pub fn muscle_count(&self) -> usize {
        self.muscle_count
    }
}

impl TryFrom<ArmatureDef> for Armature {
    type Error = FrameError;

    fn try_from(def: ArmatureDef) -> Result<Self> {
        Armature::new(def.bones)
    }
}

impl From<Armature> for ArmatureDef {
    fn from(armature: Armature) -> Self {
        ArmatureDef {
            bones: armature.bones,
        }
    }
}
