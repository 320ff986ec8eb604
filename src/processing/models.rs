use serde::Serialize;

/// What kind of imagery a model was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scene {
    General,
    Anime,
}

/// A selectable upscaling model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: &'static str,
    pub scenes: &'static [Scene],
    /// Weights file the backend loads
    pub file_name: &'static str,
    /// Scale factor the network produces natively
    pub base_scale: f64,
}

pub const MODELS: &[Model] = &[
    Model {
        id: "real-esrgan-x4",
        scenes: &[Scene::General],
        file_name: "realesrgan_x4plus.onnx",
        base_scale: 4.0,
    },
    Model {
        id: "real-esrgan-anime-x4",
        scenes: &[Scene::Anime],
        file_name: "realesrgan_x4plus_anime.onnx",
        base_scale: 4.0,
    },
];

pub fn get_model_by_id(id: &str) -> Option<&'static Model> {
    MODELS.iter().find(|m| m.id == id)
}

pub fn get_model_by_file_name(file_name: &str) -> Option<&'static Model> {
    MODELS.iter().find(|m| m.file_name == file_name)
}
