use shared::domain::{PresetAngle, TransformationState};

/// Canonical transformation for a preset: the default state with exactly the
/// implied rotation axis overridden.
pub fn resolve(preset: PresetAngle) -> TransformationState {
    let mut transform = TransformationState::default();
    match preset {
        PresetAngle::Front => {}
        PresetAngle::Left => transform.rotate_y = -45.0,
        PresetAngle::Right => transform.rotate_y = 45.0,
        PresetAngle::Top => transform.rotate_x = 45.0,
        PresetAngle::Bottom => transform.rotate_x = -45.0,
        PresetAngle::Back => transform.rotate_y = 180.0,
    }
    transform
}
