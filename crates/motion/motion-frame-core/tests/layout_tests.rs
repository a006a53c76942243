use motion_frame_core::{
    humanoid, Armature, Axis, AxisLimits, Bone, ChannelLayout, FrameConfig, FrameError,
    SlotOverrides,
};

fn chain(limits: &[AxisLimits]) -> Armature {
    let mut bones = vec![Bone::root("root")];
    for (i, l) in limits.iter().enumerate() {
        bones.push(Bone::child(format!("b{}", i + 1), i, *l));
    }
    Armature::new(bones).expect("valid chain")
}

/// it should give locked bones no channels and the root exactly twelve
#[test]
fn channel_counts_follow_free_axes() {
    let arm = chain(&[
        AxisLimits::locked(),
        AxisLimits::with_free(&[Axis::Y]),
        AxisLimits::with_free(&[Axis::X, Axis::Z]),
        AxisLimits::free(),
    ]);
    let layout = ChannelLayout::build(&arm, &SlotOverrides::new()).unwrap();

    assert_eq!(layout.channels(0).len(), 12);
    assert_eq!(layout.channels(1), &[] as &[usize]);
    assert_eq!(layout.channels(2), &[1]);
    assert_eq!(layout.channels(3), &[0, 2]);
    assert_eq!(layout.channels(4), &[0, 1, 2]);
}

/// it should keep the root at 3..=14 even when its limits are locked
#[test]
fn root_ignores_its_limits() {
    let arm = Armature::new(vec![Bone {
        name: "root".into(),
        parent: None,
        limits: AxisLimits::locked(),
    }])
    .unwrap();
    let layout = ChannelLayout::build(&arm, &SlotOverrides::new()).unwrap();
    assert_eq!(layout.global_indices(0), (3..=14).collect::<Vec<_>>());
}

/// it should lay out the two-bone fixture as root at 0 and bone1 at 15
#[test]
fn two_bone_fixture_layout() {
    let arm: Armature = motion_test_fixtures::armatures::load("two-bone").unwrap();
    let layout = ChannelLayout::build(&arm, &SlotOverrides::new()).unwrap();

    assert_eq!(layout.base_index(0), Some(0));
    assert_eq!(layout.base_index(1), Some(15));
    assert_eq!(layout.channels(1), &[0]);
    assert_eq!(layout.global_indices(1), vec![15]);
}

/// it should assign non-decreasing bases without overrides
#[test]
fn bases_are_monotonic() {
    let arm = humanoid::armature().unwrap();
    let layout = ChannelLayout::build(&arm, &SlotOverrides::new()).unwrap();
    let bases = layout.base_indices();
    for i in 1..bases.len() {
        let prev_len = if i == 1 { 15 } else { layout.channels(i - 1).len() };
        assert!(bases[i] >= bases[i - 1] + prev_len, "bone {i}");
    }
    assert_eq!(layout.global_indices(0), (3..=14).collect::<Vec<_>>());
}

/// it should pin an overridden bone and continue after it
#[test]
fn override_forces_base() {
    let arm = chain(&[AxisLimits::free(), AxisLimits::free(), AxisLimits::free()]);
    let overrides = SlotOverrides::new().with(2, 40);
    let layout = ChannelLayout::build(&arm, &overrides).unwrap();

    assert_eq!(layout.base_index(1), Some(15));
    assert_eq!(layout.base_index(2), Some(40));
    assert_eq!(layout.base_index(3), Some(43));
    assert_eq!(layout.global_indices(0), (3..=14).collect::<Vec<_>>());
    assert_eq!(layout.channel_count(), 46);
}

/// it should reject an override that reaches back into an assigned range
#[test]
fn override_below_cursor_is_an_error() {
    let arm = chain(&[AxisLimits::free(), AxisLimits::free()]);
    let err = ChannelLayout::build(&arm, &SlotOverrides::new().with(2, 16)).unwrap_err();
    assert_eq!(
        err,
        FrameError::OverrideOverlap {
            bone: 2,
            slot: 16,
            cursor: 18
        }
    );
    assert!(err.to_string().contains("bone 2"));
}

/// it should reject a second override that lands inside the first pinned range
#[test]
fn colliding_overrides_are_an_error() {
    let arm = chain(&[AxisLimits::free(), AxisLimits::free(), AxisLimits::free()]);
    let overrides: SlotOverrides = [(2, 60), (3, 61)].into_iter().collect();
    let err = ChannelLayout::build(&arm, &overrides).unwrap_err();
    assert!(matches!(err, FrameError::OverrideOverlap { bone: 3, slot: 61, cursor: 63 }));
}

/// it should produce identical layouts on repeated builds
#[test]
fn build_is_deterministic() {
    let arm = humanoid::armature().unwrap();
    let overrides = humanoid::default_overrides();
    let a = ChannelLayout::build(&arm, &overrides).unwrap();
    let b = ChannelLayout::build(&arm, &overrides).unwrap();
    assert_eq!(a, b);
}

/// it should fit the humanoid body under the viseme block and start the hands at 90
#[test]
fn humanoid_default_layout() {
    let arm = humanoid::armature().unwrap();
    let cfg = humanoid::default_config();
    let layout = ChannelLayout::encoder(&arm, &cfg).unwrap();

    let jaw = arm.bone_index("Jaw").unwrap();
    let body_end = layout.global_indices(jaw).last().copied().unwrap();
    assert!(body_end < 80, "body ends at {body_end}");
    assert_eq!(layout.base_index(humanoid::LEFT_THUMB_PROXIMAL), Some(90));
    assert!(layout.shape_indices().iter().all(|s| (80..83).contains(&s.index)));
    assert_eq!(layout.channel_count(), 130);
}

/// it should load overrides and the viseme base from a config fixture
#[test]
fn config_fixture_drives_layout() {
    let arm: Armature = motion_test_fixtures::armatures::load("arm-chain").unwrap();
    let cfg = FrameConfig::from_json_str(
        &motion_test_fixtures::configs::json("pinned-hand").unwrap(),
    )
    .unwrap();
    let layout = ChannelLayout::encoder(&arm, &cfg).unwrap();

    let hand = arm.bone_index("hand").unwrap();
    let elbow = arm.bone_index("elbow_roll").unwrap();
    assert_eq!(layout.channels(elbow).len(), 0);
    assert_eq!(layout.base_index(hand), Some(50));
    assert_eq!(layout.axis_index(hand, Axis::Y), Some(50));
    assert_eq!(layout.axis_index(hand, Axis::Z), Some(51));
    assert!(layout.shape_indices().iter().all(|s| (40..43).contains(&s.index)));
}
