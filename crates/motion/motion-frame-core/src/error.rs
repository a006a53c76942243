//! Error types for armature validation, layout building and sampling

use serde::{Deserialize, Serialize};

/// Every failure reported by the crate. Configuration problems (armature,
/// layout, config) are hard errors raised before any frame is sampled; sample
/// errors are per-frame and leave the sampler usable.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FrameError {
    /// Armature has no bones at all
    #[error("Armature has no bones")]
    EmptyArmature,

    /// Bone 0 must be the root
    #[error("Bone 0 ('{name}') must be the root but has parent {parent}")]
    RootHasParent { name: String, parent: usize },

    /// A second parentless bone
    #[error("Bone {bone} ('{name}') has no parent; only bone 0 may be the root")]
    MultipleRoots { bone: usize, name: String },

    /// Parent index not strictly before the child
    #[error("Bone {bone} ('{name}') has parent {parent}; parents must precede their children")]
    ParentOrder {
        bone: usize,
        name: String,
        parent: usize,
    },

    /// Two bones share a name
    #[error("Bone {bone} reuses the name '{name}' of bone {first}")]
    DuplicateBoneName {
        bone: usize,
        first: usize,
        name: String,
    },

    /// Override names a bone the armature does not have
    #[error("Override targets bone {bone}, armature has {bone_count} bones")]
    UnknownOverrideBone { bone: usize, bone_count: usize },

    /// The root range is fixed and cannot be relocated
    #[error("Override on root bone {bone} is not allowed; root channels are fixed at 3..=14")]
    RootOverride { bone: usize },

    /// Override would move the cursor back over an assigned range
    #[error("Override puts bone {bone} at slot {slot}, below the next free slot {cursor}")]
    OverrideOverlap {
        bone: usize,
        slot: usize,
        cursor: usize,
    },

    /// Viseme channel lands on a skeletal channel
    #[error("Viseme '{viseme}' channel {index} collides with a channel of bone {bone}")]
    VisemeOverlap {
        viseme: String,
        index: usize,
        bone: usize,
    },

    /// Sampler and layout disagree about the skeleton
    #[error("Layout covers {layout_bones} bones but armature has {armature_bones}")]
    LayoutMismatch {
        layout_bones: usize,
        armature_bones: usize,
    },

    /// Pose carries the wrong number of actuation values
    #[error("Pose has {actual} actuation values, armature expects {expected}")]
    MuscleCountMismatch { expected: usize, actual: usize },

    /// Channel vector too short for the layout
    #[error("Channel vector has {actual} channels, layout needs {expected}")]
    ChannelCountMismatch { expected: usize, actual: usize },

    /// Sampling on a binding without a root
    #[error("Sampler is not bound to a root bone")]
    UnboundRoot,

    /// Invalid configuration value
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

impl FrameError {
    /// Per-frame errors the caller can recover from by fixing the input and
    /// sampling again. Everything else means the setup itself is wrong.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MuscleCountMismatch { .. } | Self::ChannelCountMismatch { .. }
        )
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyArmature
            | Self::RootHasParent { .. }
            | Self::MultipleRoots { .. }
            | Self::ParentOrder { .. }
            | Self::DuplicateBoneName { .. } => "armature",
            Self::UnknownOverrideBone { .. }
            | Self::RootOverride { .. }
            | Self::OverrideOverlap { .. }
            | Self::VisemeOverlap { .. } => "layout",
            Self::LayoutMismatch { .. }
            | Self::MuscleCountMismatch { .. }
            | Self::ChannelCountMismatch { .. }
            | Self::UnboundRoot => "sample",
            Self::InvalidConfig { .. } => "config",
            Self::Serialization { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for FrameError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        let recoverable = FrameError::MuscleCountMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(recoverable.is_recoverable());

        let fatal = FrameError::OverrideOverlap {
            bone: 4,
            slot: 10,
            cursor: 18,
        };
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(FrameError::EmptyArmature.category(), "armature");
        assert_eq!(FrameError::RootOverride { bone: 0 }.category(), "layout");
        assert_eq!(FrameError::UnboundRoot.category(), "sample");
    }

    #[test]
    fn test_messages_name_the_bone() {
        let err = FrameError::ParentOrder {
            bone: 7,
            name: "LeftHand".into(),
            parent: 9,
        };
        let msg = err.to_string();
        assert!(msg.contains("Bone 7"));
        assert!(msg.contains("LeftHand"));
    }

    #[test]
    fn test_serialization() {
        let error = FrameError::InvalidConfig {
            reason: "test".into(),
        };
        let serialized = serde_json::to_string(&error).unwrap();
        let deserialized: FrameError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(error, deserialized);
    }
}
