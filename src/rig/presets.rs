//! Built-in rigs.

use crate::export::raster::ExportFormat;
use crate::foundation::core::Resolution;
use crate::rig::model::{BoneSpec, LineSpec, MapSpec, Rig, Step};

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &["bat-wing"];

/// Look up a built-in rig by name.
pub fn preset(name: &str) -> Option<Rig> {
    match name {
        "bat-wing" => Some(bat_wing_membrane()),
        _ => None,
    }
}

fn bone(name: &str, a: [f64; 2], b: [f64; 2]) -> BoneSpec {
    BoneSpec {
        name: name.to_owned(),
        a,
        b,
    }
}

fn smooth(bone: &str, a: [f64; 2], b: [f64; 2], strength: f64) -> Step {
    Step::SmoothEdge {
        bone: bone.to_owned(),
        line: LineSpec { a, b },
        strength,
    }
}

fn multiply(map: &str, bone: &str) -> Step {
    Step::Multiply {
        map: map.to_owned(),
        bone: bone.to_owned(),
    }
}

/// Weights for the wing membrane between the body and the last finger.
///
/// Engines such as Unity limit vertices to four bone influences, so the membrane is split into a
/// body side and a finger side with at most two bones each. A coarse body/finger map decides how
/// far each side reaches; each detail map is pruned to two bones, smoothed across the resulting
/// seam, normalized and masked by its side of the coarse map.
///
/// Coordinates are pixels on a 1024×1024 UV map; output is 100×100.
pub fn bat_wing_membrane() -> Rig {
    const STRENGTH: f64 = 10.0;

    let body_finger = MapSpec {
        name: "body_finger".to_owned(),
        bones: vec![
            bone("body", [470.0, 1020.0], [1024.0, 1020.0]),
            bone("finger", [542.0, 585.0], [995.0, 553.0]),
        ],
        steps: Vec::new(),
        export: false,
    };

    let body_detail = MapSpec {
        name: "body_detail".to_owned(),
        bones: vec![
            bone("upperleg", [1024.0, 1020.0], [852.0, 1020.0]),
            bone("hips", [825.0, 1020.0], [733.0, 1020.0]),
            // Spine and chest as one bone saves an influence.
            bone("spine", [733.0, 1020.0], [470.0, 1020.0]),
        ],
        steps: vec![
            Step::LimitWeightCount { count: 2 },
            smooth("upperleg", [0.78, 0.0], [0.78, 1.0], STRENGTH),
            smooth("spine", [0.78, 0.0], [0.78, 1.0], STRENGTH),
            Step::Normalize,
            multiply("body_finger", "body"),
        ],
        export: true,
    };

    let finger_detail = MapSpec {
        name: "finger_detail".to_owned(),
        bones: vec![
            bone("pinky1", [542.0, 585.0], [680.0, 567.0]),
            bone("pinky2", [680.0, 567.0], [838.0, 556.0]),
            bone("pinky3", [838.0, 556.0], [995.0, 553.0]),
        ],
        steps: vec![
            Step::LimitWeightCount { count: 2 },
            smooth("pinky1", [0.71, 0.0], [0.77, 1.0], STRENGTH),
            smooth("pinky3", [0.71, 0.0], [0.77, 1.0], STRENGTH),
            Step::Normalize,
            multiply("body_finger", "finger"),
        ],
        export: true,
    };

    Rig {
        resolution: Resolution {
            width: 100,
            height: 100,
        },
        uv_size: Some(1024.0),
        format: ExportFormat::Png,
        maps: vec![body_finger, body_detail, finger_detail],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/presets.rs"]
mod tests;
