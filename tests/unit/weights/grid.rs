use super::*;
use crate::geometry::bone::Bone;

fn bone(name: &str, ax: f64, ay: f64, bx: f64, by: f64) -> Bone {
    Bone::new(name, Point::new(ax, ay), Point::new(bx, by)).unwrap()
}

fn left_right() -> BoneSet {
    BoneSet::from_bones([
        bone("left", 0.0, 0.0, 0.0, 1.0),
        bone("right", 1.0, 0.0, 1.0, 1.0),
    ])
    .unwrap()
}

fn three_columns() -> BoneSet {
    BoneSet::from_bones([
        bone("a", 0.1, 0.0, 0.1, 1.0),
        bone("b", 0.5, 0.0, 0.5, 1.0),
        bone("c", 0.9, 0.0, 0.9, 1.0),
    ])
    .unwrap()
}

fn res(w: u32, h: u32) -> Resolution {
    Resolution::new(w, h).unwrap()
}

fn assert_normalized<S: Stage>(map: &WeightMap<S>) {
    for j in 0..map.height() {
        for i in 0..map.width() {
            let sum = map.cell_sum(i, j);
            assert!(
                sum == 0.0 || (sum - 1.0).abs() < 1e-9,
                "cell ({i}, {j}) sums to {sum}"
            );
        }
    }
}

#[test]
fn two_bone_scenario() {
    let map = WeightMap::from_distances(res(10, 10), &left_right()).unwrap();
    assert_normalized(&map);
    for j in 0..10 {
        assert!(map.weight(0, j, "left") > 0.9);
        // Column 9 samples u = 0.9, where the split is exactly 0.9 / 0.1.
        assert!(map.weight(9, j, "right") >= 0.9 - 1e-9);
        assert!((map.weight(5, j, "left") - map.weight(5, j, "right")).abs() < 0.1);
    }
}

#[test]
fn sample_on_a_bone_is_clamped_not_infinite() {
    let map = WeightMap::from_distances(res(4, 4), &left_right()).unwrap();
    let w = map.weight(0, 2, "left");
    assert!(w.is_finite());
    assert!(w > 0.999_999);
}

#[test]
fn shared_endpoint_splits_evenly() {
    let set = BoneSet::from_bones([
        bone("upper", 0.5, 0.0, 0.5, 0.5),
        bone("lower", 0.5, 0.5, 0.5, 1.0),
    ])
    .unwrap();
    let map = WeightMap::from_distances(res(2, 2), &set).unwrap();
    assert!((map.weight(1, 1, "upper") - 0.5).abs() < 1e-9);
    assert!((map.weight(1, 1, "lower") - 0.5).abs() < 1e-9);
}

#[test]
fn empty_bone_set_is_rejected() {
    let err = WeightMap::from_distances(res(4, 4), &BoneSet::new()).unwrap_err();
    assert!(matches!(err, WeightError::Validation(_)));
}

#[test]
fn limit_keeps_the_largest_entries() {
    let before = WeightMap::from_distances(res(12, 3), &three_columns()).unwrap();
    let after = before.clone().limit_weight_count(2);
    assert_normalized(&after);

    for j in 0..3 {
        for i in 0..12 {
            assert!(after.entry_count(i, j) <= 2);
            let mut ranked: Vec<(&str, f64)> = before.cell(i, j).collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
            let mut kept: Vec<&str> = after.cell(i, j).map(|(n, _)| n).collect();
            let mut expected: Vec<&str> = ranked[..2].iter().map(|(n, _)| *n).collect();
            kept.sort_unstable();
            expected.sort_unstable();
            assert_eq!(kept, expected, "cell ({i}, {j})");
        }
    }
}

#[test]
fn limit_tie_drops_later_declared_bone() {
    // Cell column 5 samples u = 0.5, equidistant from both outer bones.
    let set = BoneSet::from_bones([
        bone("first", 0.25, 0.0, 0.25, 1.0),
        bone("second", 0.75, 0.0, 0.75, 1.0),
    ])
    .unwrap();
    let map = WeightMap::from_distances(res(10, 1), &set)
        .unwrap()
        .limit_weight_count(1);
    assert_eq!(map.entry(5, 0, "first"), Some(1.0));
    assert_eq!(map.entry(5, 0, "second"), None);
}

#[test]
fn limit_to_zero_empties_cells() {
    let map = WeightMap::from_distances(res(3, 3), &left_right())
        .unwrap()
        .limit_weight_count(0);
    assert_eq!(map.entry_count(1, 1), 0);
    assert_eq!(map.cell_sum(1, 1), 0.0);
}

#[test]
fn smoothing_is_zero_on_the_guide_and_grows_away_from_it() {
    let guide = Segment::new(Point::new(0.5, 0.0), Point::new(0.5, 1.0)).unwrap();
    let before = WeightMap::from_distances(res(10, 1), &left_right()).unwrap();
    let after = before
        .clone()
        .smooth_edge("right", &guide, 10.0)
        .unwrap();

    assert_eq!(after.weight(5, 0, "right"), 0.0);
    let mut last = 0.0;
    for i in 6..10 {
        let factor = after.weight(i, 0, "right") / before.weight(i, 0, "right");
        assert!((0.0..=1.0).contains(&factor));
        assert!(factor >= last, "factor must grow with guide distance");
        last = factor;
    }
    // Other channels are untouched.
    for i in 0..10 {
        assert_eq!(after.weight(i, 0, "left"), before.weight(i, 0, "left"));
    }
}

#[test]
fn smoothing_requires_renormalization() {
    let guide = Segment::new(Point::new(0.2, 0.0), Point::new(0.2, 1.0)).unwrap();
    let map = WeightMap::from_distances(res(10, 2), &left_right())
        .unwrap()
        .smooth_edge("left", &guide, 10.0)
        .unwrap();
    assert!(map.cell_sum(4, 0) < 1.0);
    assert_eq!(map.stage_name(), "smoothed");
    let map = map.normalize();
    assert_normalized(&map);
}

#[test]
fn smoothing_unknown_bone_is_a_no_op() {
    let guide = Segment::new(Point::new(0.2, 0.0), Point::new(0.2, 1.0)).unwrap();
    let before = WeightMap::from_distances(res(5, 5), &left_right()).unwrap();
    let after = before.clone().smooth_edge("tail", &guide, 10.0).unwrap();
    for j in 0..5 {
        for i in 0..5 {
            assert_eq!(after.cell_sum(i, j), before.cell_sum(i, j));
        }
    }
}

#[test]
fn smoothing_rejects_bad_strength() {
    let guide = Segment::new(Point::new(0.2, 0.0), Point::new(0.2, 1.0)).unwrap();
    let map = WeightMap::from_distances(res(2, 2), &left_right()).unwrap();
    assert!(map.clone().smooth_edge("left", &guide, f64::NAN).is_err());
    assert!(map.smooth_edge("left", &guide, -1.0).is_err());
}

#[test]
fn multiply_never_increases_weights() {
    let coarse = WeightMap::from_distances(res(8, 8), &left_right()).unwrap();
    let detail = WeightMap::from_distances(res(8, 8), &three_columns()).unwrap();
    let masked = detail.clone().multiply(&coarse, "left").unwrap();

    for j in 0..8 {
        for i in 0..8 {
            let factor = coarse.weight(i, j, "left");
            for (name, w) in detail.cell(i, j) {
                let m = masked.weight(i, j, name);
                assert!(m <= w + 1e-15);
                assert!((m - w * factor).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn multiply_by_unknown_bone_zeroes_everything() {
    let coarse = WeightMap::from_distances(res(4, 4), &left_right()).unwrap();
    let masked = WeightMap::from_distances(res(4, 4), &three_columns())
        .unwrap()
        .multiply(&coarse, "finger")
        .unwrap();
    for j in 0..4 {
        for i in 0..4 {
            assert_eq!(masked.cell_sum(i, j), 0.0);
            assert_eq!(masked.entry_count(i, j), 3);
        }
    }
}

#[test]
fn multiply_requires_matching_resolution() {
    let coarse = WeightMap::from_distances(res(4, 4), &left_right()).unwrap();
    let detail = WeightMap::from_distances(res(5, 4), &three_columns()).unwrap();
    assert!(matches!(
        detail.multiply(&coarse, "left"),
        Err(WeightError::Validation(_))
    ));
}

#[test]
#[should_panic(expected = "outside")]
fn out_of_range_cell_panics() {
    let map = WeightMap::from_distances(res(2, 2), &left_right()).unwrap();
    let _ = map.weight(2, 0, "left");
}
