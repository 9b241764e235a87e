use serde::{Deserialize, Serialize};

use crate::domain::{ImagePayload, PresetAngle, TransformationState};

/// Body POSTed to the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateViewRequest {
    pub image: ImagePayload,
    pub transformation: TransformationState,
    /// Preset label ("Left Side", ...) or null for free-form requests.
    pub preset: Option<String>,
}

impl GenerateViewRequest {
    pub fn new(
        image: &ImagePayload,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> Self {
        Self {
            image: image.clone(),
            transformation,
            preset: preset.map(|p| p.label().to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateViewResponse {
    pub image: ImagePayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_preset_label_and_camel_case_transform() {
        let request = GenerateViewRequest::new(
            &ImagePayload::new("data:image/png;base64,AAAA"),
            TransformationState::with_rotation(0.0, -45.0, 0.0),
            Some(PresetAngle::Left),
        );
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["image"], "data:image/png;base64,AAAA");
        assert_eq!(json["preset"], "Left Side");
        assert_eq!(json["transformation"]["rotateY"], -45.0);
    }

    #[test]
    fn custom_request_sends_null_preset() {
        let request = GenerateViewRequest::new(
            &ImagePayload::new("A"),
            TransformationState::default(),
            None,
        );
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json["preset"].is_null());
    }
}
