use anim_rescale::algebra::root_unrotation;
use anim_rescale::config::{DEFAULT_SCALE, SCALE_EPSILON};
use anim_rescale::value::{Quaternion, Transform, Vector3};
use anim_rescale::{scale_bone_key, BoneScaleConverter};
use approx::assert_abs_diff_eq;

fn samples() -> Vec<(Vector3, Vector3)> {
    vec![
        (Vector3::zero(), Vector3::new(1.0, 0.0, 0.0)),
        (Vector3::new(1.0, 2.0, 3.0), Vector3::new(-4.0, 0.5, 9.0)),
        (Vector3::new(0.0, 0.0, 90.0), Vector3::new(0.0, 0.0, 88.0)),
        (Vector3::new(-12.5, 3.0, 0.25), Vector3::new(7.0, 7.0, 7.0)),
    ]
}

#[test]
fn identity_scale_keeps_locations() {
    for (reference, anim) in samples() {
        let out = scale_bone_key(reference, anim, 1.0);
        assert!(out.abs_diff_le(&anim, 1e-9), "left={out:?} right={anim:?}");
    }
}

#[test]
fn displacement_length_scales_by_factor() {
    for scale in [0.0254, 0.5, 2.0, 100.0] {
        for (reference, anim) in samples() {
            let out = scale_bone_key(reference, anim, scale);
            let expected = (anim - reference).length() * scale;
            assert_abs_diff_eq!((out - reference).length(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn displacement_direction_is_preserved() {
    for (reference, anim) in samples() {
        let out = scale_bone_key(reference, anim, 3.5);
        let before = anim - reference;
        let after = out - reference;
        let cos = before.dot(&after) / (before.length() * after.length());
        assert_abs_diff_eq!(cos, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn zero_displacement_stays_at_reference() {
    let reference = Vector3::new(4.0, -2.0, 1.0);
    for scale in [0.0254, 1.0, 1000.0] {
        let out = scale_bone_key(reference, reference, scale);
        assert_eq!(out, reference);
        assert!(out.is_finite());
    }
}

#[test]
fn sub_epsilon_scale_uses_default() {
    for scale in [0.0, SCALE_EPSILON * 0.5, -3.0, f64::NAN] {
        let converter = BoneScaleConverter::new(scale, false);
        assert_eq!(converter.scale(), DEFAULT_SCALE);
    }
    assert_eq!(BoneScaleConverter::new(2.0, false).scale(), 2.0);
}

#[test]
fn zero_scale_matches_default_scale() {
    let reference = Transform::from_position(Vector3::new(0.0, 0.0, 100.0));
    let key = Transform::from_position(Vector3::new(30.0, 40.0, 100.0));
    let zero = BoneScaleConverter::new(0.0, false).convert_key(3, &reference, &key);
    let default = BoneScaleConverter::new(DEFAULT_SCALE, false).convert_key(3, &reference, &key);
    assert_eq!(zero, default);
}

#[test]
fn rotation_and_scale_pass_through_without_unrotate() {
    let converter = BoneScaleConverter::new(2.0, false);
    let reference = Transform::identity();
    let key = Transform::new(
        Vector3::new(1.0, 1.0, 1.0),
        Quaternion::new(0.1, 0.2, 0.3, 0.9273618495495704),
        Vector3::new(1.0, 0.5, 2.0),
    );
    for bone in 0..4 {
        let out = converter.convert_key(bone, &reference, &key);
        assert_eq!(out.rotation, key.rotation);
        assert_eq!(out.scale, key.scale);
    }
}

#[test]
fn unrotate_premultiplies_root_rotation_only() {
    let converter = BoneScaleConverter::new(1.0, true);
    let original = Quaternion::from_axis_angle(Vector3::new(0.0, 1.0, 0.0), 0.8);
    let key = Transform::from_rotation(original);

    let root = converter.convert_key(0, &Transform::identity(), &key);
    assert_eq!(root.rotation, root_unrotation() * original);
    assert!(root
        .rotation
        .same_rotation(&(Quaternion::from_rotation_z(-std::f64::consts::FRAC_PI_2) * original), 1e-12));

    let child = converter.convert_key(1, &Transform::identity(), &key);
    assert_eq!(child.rotation, original);
}
