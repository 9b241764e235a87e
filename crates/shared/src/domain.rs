use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(HistoryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViewMode {
    #[default]
    Landing,
    Editor,
}

/// Named canonical viewpoints offered next to the free-form controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresetAngle {
    Front,
    Left,
    Right,
    Back,
    Top,
    Bottom,
}

impl PresetAngle {
    pub const ALL: [PresetAngle; 6] = [
        PresetAngle::Front,
        PresetAngle::Left,
        PresetAngle::Right,
        PresetAngle::Back,
        PresetAngle::Top,
        PresetAngle::Bottom,
    ];

    /// Human-readable label, also what the generation service receives.
    pub fn label(self) -> &'static str {
        match self {
            PresetAngle::Front => "Front",
            PresetAngle::Left => "Left Side",
            PresetAngle::Right => "Right Side",
            PresetAngle::Back => "Back",
            PresetAngle::Top => "Top-down",
            PresetAngle::Bottom => "Low angle",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "front" => Some(PresetAngle::Front),
            "left" | "left side" => Some(PresetAngle::Left),
            "right" | "right side" => Some(PresetAngle::Right),
            "back" => Some(PresetAngle::Back),
            "top" | "top-down" => Some(PresetAngle::Top),
            "bottom" | "low angle" => Some(PresetAngle::Bottom),
            _ => None,
        }
    }
}

impl std::fmt::Display for PresetAngle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_ZOOM: f64 = 1.0;
pub const DEFAULT_DISTORTION: f64 = 0.0;
pub const DEFAULT_LIGHTING_ANGLE: f64 = 45.0;

/// Requested viewpoint of the subject. Rotations are in degrees; `distortion`
/// is perspective strength.
///
/// This is a `Copy` value: every change produces a new value, so a state
/// stored in history can never be reached through the active controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationState {
    pub rotate_x: f64,
    pub rotate_y: f64,
    pub rotate_z: f64,
    pub zoom: f64,
    pub distortion: f64,
    pub lighting_angle: f64,
}

impl Default for TransformationState {
    fn default() -> Self {
        Self {
            rotate_x: 0.0,
            rotate_y: 0.0,
            rotate_z: 0.0,
            zoom: DEFAULT_ZOOM,
            distortion: DEFAULT_DISTORTION,
            lighting_angle: DEFAULT_LIGHTING_ANGLE,
        }
    }
}

impl TransformationState {
    pub fn with_rotation(rotate_x: f64, rotate_y: f64, rotate_z: f64) -> Self {
        Self {
            rotate_x,
            rotate_y,
            rotate_z,
            ..Self::default()
        }
    }
}

/// Encoded image as handed around by the upload widget and the generation
/// service, normally a `data:<mime>;base64,...` URL. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(String);

impl ImagePayload {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{mime_type};base64,{}", STANDARD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// MIME type from a data URL header, if there is one.
    pub fn mime_type(&self) -> Option<&str> {
        let header = self.0.strip_prefix("data:")?.split_once(',')?.0;
        let mime = header.split(';').next().unwrap_or_default();
        (!mime.is_empty()).then_some(mime)
    }

    /// Raw image bytes behind a base64 data URL or bare base64 text.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        let encoded = match self.0.strip_prefix("data:") {
            Some(rest) => {
                let (header, body) = rest.split_once(',')?;
                if !header.ends_with(";base64") {
                    return None;
                }
                body
            }
            None => self.0.as_str(),
        };
        STANDARD.decode(encoded.trim()).ok()
    }
}

impl From<String> for ImagePayload {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ImagePayload {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One successful generation. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: HistoryId,
    pub image_data: ImagePayload,
    pub thumbnail: ImagePayload,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub transformation: TransformationState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub last_modified: DateTime<Utc>,
    pub items: Vec<HistoryItem>,
}

impl Project {
    pub fn new(name: impl Into<String>, items: Vec<HistoryItem>) -> Self {
        let last_modified = items
            .iter()
            .map(|item| item.timestamp)
            .max()
            .unwrap_or_else(Utc::now);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            last_modified,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transformation_matches_neutral_view() {
        let t = TransformationState::default();
        assert_eq!(t.rotate_x, 0.0);
        assert_eq!(t.rotate_y, 0.0);
        assert_eq!(t.rotate_z, 0.0);
        assert_eq!(t.zoom, 1.0);
        assert_eq!(t.distortion, 0.0);
        assert_eq!(t.lighting_angle, 45.0);
    }

    #[test]
    fn transformation_serializes_with_camel_case_fields() {
        let json = serde_json::to_value(TransformationState::with_rotation(10.0, 20.0, 0.0))
            .expect("serialize");
        assert_eq!(json["rotateX"], 10.0);
        assert_eq!(json["rotateY"], 20.0);
        assert_eq!(json["lightingAngle"], 45.0);
    }

    #[test]
    fn preset_labels_and_parsing_agree() {
        for preset in PresetAngle::ALL {
            assert_eq!(PresetAngle::parse(preset.label()), Some(preset));
        }
        assert_eq!(PresetAngle::parse("LEFT"), Some(PresetAngle::Left));
        assert_eq!(PresetAngle::parse("sideways"), None);
    }

    #[test]
    fn payload_round_trips_bytes_through_data_url() {
        let payload = ImagePayload::from_bytes("image/png", b"\x89PNG-ish");
        assert_eq!(payload.mime_type(), Some("image/png"));
        assert_eq!(payload.decode_bytes().as_deref(), Some(&b"\x89PNG-ish"[..]));
    }

    #[test]
    fn opaque_payload_does_not_decode() {
        assert_eq!(ImagePayload::new("B").decode_bytes(), None);
        assert_eq!(ImagePayload::new("data:text/plain,hello").decode_bytes(), None);
        assert_eq!(ImagePayload::new("B").mime_type(), None);
    }

    #[test]
    fn project_tracks_latest_item_timestamp() {
        let older = Utc::now() - chrono::Duration::seconds(30);
        let newer = Utc::now();
        let item = |id, timestamp| HistoryItem {
            id: HistoryId(id),
            image_data: ImagePayload::new("x"),
            thumbnail: ImagePayload::new("x"),
            description: "Front View".into(),
            timestamp,
            transformation: TransformationState::default(),
        };
        let project = Project::new("shoe", vec![item(1, older), item(2, newer)]);
        assert_eq!(project.last_modified, newer);
        assert_eq!(project.items.len(), 2);
    }
}
