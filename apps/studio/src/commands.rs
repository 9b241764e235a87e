//! Line commands typed at the studio prompt.

use std::path::PathBuf;

use shared::domain::{HistoryId, PresetAngle, TransformationState};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  upload <path>                       load a source image
  preset <front|left|right|back|top|bottom>
                                      jump to a preset angle and generate it
  set <field> <value>                 change one control (rx ry rz zoom distortion light)
  transform <rx> <ry> <rz> <zoom> <distortion> <light>
                                      replace every control at once
  generate                            generate with the current controls
  history                             list generated views
  select <id>                         restore a generated view
  clear                               clear the history
  home                                drop the current image and history
  status                              show the current session
  project <name>                      print the history as project JSON
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    RotateX,
    RotateY,
    RotateZ,
    Zoom,
    Distortion,
    LightingAngle,
}

impl TransformField {
    fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "rx" | "rotatex" | "rotate_x" => Some(Self::RotateX),
            "ry" | "rotatey" | "rotate_y" => Some(Self::RotateY),
            "rz" | "rotatez" | "rotate_z" => Some(Self::RotateZ),
            "zoom" => Some(Self::Zoom),
            "distortion" | "perspective" => Some(Self::Distortion),
            "light" | "lighting" | "lightingangle" | "lighting_angle" => {
                Some(Self::LightingAngle)
            }
            _ => None,
        }
    }

    /// Copy of `base` with this field replaced.
    pub fn apply(self, base: TransformationState, value: f64) -> TransformationState {
        let mut next = base;
        match self {
            Self::RotateX => next.rotate_x = value,
            Self::RotateY => next.rotate_y = value,
            Self::RotateZ => next.rotate_z = value,
            Self::Zoom => next.zoom = value,
            Self::Distortion => next.distortion = value,
            Self::LightingAngle => next.lighting_angle = value,
        }
        next
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StudioCommand {
    Upload(PathBuf),
    Preset(PresetAngle),
    Set { field: TransformField, value: f64 },
    Transform(TransformationState),
    Generate,
    History,
    Select(HistoryId),
    Clear,
    Home,
    Status,
    Project(String),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("unknown control '{0}'")]
    UnknownField(String),
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("zoom must be greater than zero")]
    NonPositiveZoom,
}

pub fn parse_command(line: &str) -> Result<StudioCommand, CommandError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    if name.is_empty() {
        return Err(CommandError::Empty);
    }
    let args: Vec<&str> = rest.split_whitespace().collect();

    match name.to_ascii_lowercase().as_str() {
        "upload" | "open" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("upload <path>"));
            }
            Ok(StudioCommand::Upload(PathBuf::from(rest)))
        }
        "preset" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("preset <name>"));
            }
            PresetAngle::parse(rest)
                .map(StudioCommand::Preset)
                .ok_or_else(|| CommandError::UnknownPreset(rest.to_string()))
        }
        "set" => {
            let &[field, value] = args.as_slice() else {
                return Err(CommandError::Usage("set <field> <value>"));
            };
            let field = TransformField::parse(field)
                .ok_or_else(|| CommandError::UnknownField(field.to_string()))?;
            let value = parse_number(value)?;
            if field == TransformField::Zoom && value <= 0.0 {
                return Err(CommandError::NonPositiveZoom);
            }
            Ok(StudioCommand::Set { field, value })
        }
        "transform" => {
            let &[rx, ry, rz, zoom, distortion, light] = args.as_slice() else {
                return Err(CommandError::Usage(
                    "transform <rx> <ry> <rz> <zoom> <distortion> <light>",
                ));
            };
            let transform = TransformationState {
                rotate_x: parse_number(rx)?,
                rotate_y: parse_number(ry)?,
                rotate_z: parse_number(rz)?,
                zoom: parse_number(zoom)?,
                distortion: parse_number(distortion)?,
                lighting_angle: parse_number(light)?,
            };
            if transform.zoom <= 0.0 {
                return Err(CommandError::NonPositiveZoom);
            }
            Ok(StudioCommand::Transform(transform))
        }
        "generate" | "gen" => Ok(StudioCommand::Generate),
        "history" | "ls" => Ok(StudioCommand::History),
        "select" => {
            let &[id] = args.as_slice() else {
                return Err(CommandError::Usage("select <id>"));
            };
            id.parse::<i64>()
                .map(|id| StudioCommand::Select(HistoryId(id)))
                .map_err(|_| CommandError::NotANumber(id.to_string()))
        }
        "clear" => Ok(StudioCommand::Clear),
        "home" => Ok(StudioCommand::Home),
        "status" => Ok(StudioCommand::Status),
        "project" => {
            let name = if rest.is_empty() { "Untitled" } else { rest };
            Ok(StudioCommand::Project(name.to_string()))
        }
        "help" | "?" => Ok(StudioCommand::Help),
        "quit" | "exit" => Ok(StudioCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_number(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::NotANumber(raw.to_string()))
}
