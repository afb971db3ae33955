use super::*;

fn bone(name: &str, ax: f64, ay: f64, bx: f64, by: f64) -> Bone {
    Bone::new(name, Point::new(ax, ay), Point::new(bx, by)).unwrap()
}

#[test]
fn degenerate_bone_is_invalid() {
    let p = Point::new(0.5, 0.5);
    let err = Bone::new("spine", p, p).unwrap_err();
    assert!(matches!(err, WeightError::InvalidBone(_)));
    assert!(err.to_string().contains("spine"));
}

#[test]
fn bone_names_are_checked() {
    let (a, b) = (Point::new(0.0, 0.0), Point::new(1.0, 0.0));
    assert!(matches!(
        Bone::new("  ", a, b),
        Err(WeightError::InvalidBone(_))
    ));
    assert!(matches!(
        Bone::new("../evil", a, b),
        Err(WeightError::InvalidBone(_))
    ));
}

#[test]
fn from_pixels_divides_by_uv_size() {
    let b = Bone::from_pixels(
        "body",
        Point::new(512.0, 1024.0),
        Point::new(1024.0, 256.0),
        1024.0,
    )
    .unwrap();
    assert_eq!(b.segment().a(), Point::new(0.5, 1.0));
    assert_eq!(b.segment().b(), Point::new(1.0, 0.25));

    assert!(matches!(
        Bone::from_pixels("body", Point::ZERO, Point::new(1.0, 1.0), 0.0),
        Err(WeightError::Validation(_))
    ));
}

#[test]
fn duplicate_names_are_rejected() {
    let err = BoneSet::from_bones([
        bone("left", 0.0, 0.0, 0.0, 1.0),
        bone("left", 1.0, 0.0, 1.0, 1.0),
    ])
    .unwrap_err();
    assert!(matches!(err, WeightError::DuplicateBoneName(n) if n == "left"));
}

#[test]
fn set_keeps_declaration_order() {
    let set = BoneSet::new()
        .with(bone("pinky3", 0.8, 0.5, 0.9, 0.5))
        .unwrap()
        .with(bone("pinky1", 0.5, 0.5, 0.6, 0.5))
        .unwrap();
    assert_eq!(set.names().collect::<Vec<_>>(), ["pinky3", "pinky1"]);
    assert_eq!(set.index_of("pinky1"), Some(1));
    assert!(set.get("pinky2").is_none());
    assert_eq!(set.len(), 2);
}
