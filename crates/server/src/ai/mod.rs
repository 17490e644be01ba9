use std::fmt;

use shared::{GenerateRequest, GenerateResponse};

use crate::AppState;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

const SYSTEM_PROMPT: &str = r##"
You are a 3D scene assistant. You help users furnish a 3D scene by proposing objects.
Units are meters, Y is up, rotations are radians.

Every object is a unit-sized shape stretched by its scale, so scale is the full
size of the object along each axis. Objects touch when their centers are
(scale_a + scale_b) / 2 apart on an axis.

Available shapes:
- { "type": "box" }
- { "type": "sphere" }
- { "type": "cylinder" }
- { "type": "torus" }
- { "type": "plane" }
- { "type": "icosahedron" }
- { "type": "heart" }
- { "type": "text", "text": string }

Respond with JSON only, containing "text" (short explanation) and "objects"
(array). Each object has "name", "shape", "position", "rotation", "scale" and
"color_hex" ("#rrggbb"). Never reference or modify existing objects.

Example response:
{
    "text": "A small table with four legs.",
    "objects": [
        {
            "name": "Table top",
            "shape": { "type": "box" },
            "position": [0, 0.75, 0],
            "rotation": [0, 0, 0],
            "scale": [1.2, 0.05, 0.8],
            "color_hex": "#a0522d"
        },
        {
            "name": "Leg",
            "shape": { "type": "cylinder" },
            "position": [0.55, 0.3625, 0.35],
            "rotation": [0, 0, 0],
            "scale": [0.05, 0.725, 0.05],
            "color_hex": "#8b4513"
        }
    ]
}
"##;

/// Ошибка генерации на стороне сервера
#[derive(Debug)]
pub enum AiError {
    /// ANTHROPIC_API_KEY не задан
    MissingApiKey,
    /// Сетевая ошибка при обращении к модели
    Upstream(String),
    /// Модель ответила не-2xx статусом
    UpstreamStatus(u16),
    /// Ответ модели не удалось разобрать или он содержит некорректные объекты
    Unparsable(String),
    Internal(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::MissingApiKey => write!(f, "ANTHROPIC_API_KEY not set"),
            AiError::Upstream(e) => write!(f, "model request failed: {e}"),
            AiError::UpstreamStatus(code) => write!(f, "model returned HTTP {code}"),
            AiError::Unparsable(e) => write!(f, "unusable model output: {e}"),
            AiError::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Upstream(e.to_string())
    }
}

pub async fn generate_objects(
    state: &AppState,
    request: &GenerateRequest,
) -> Result<GenerateResponse, AiError> {
    let api_key = state.ai_api_key.as_ref().ok_or(AiError::MissingApiKey)?;

    let scene_context =
        serde_json::to_string(&request.scene).map_err(|e| AiError::Internal(e.to_string()))?;

    let response = state
        .http
        .post(MESSAGES_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", "2023-06-01")
        .header("content-type", "application/json")
        .json(&serde_json::json!({
            "model": state.ai_model,
            "max_tokens": 4096,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": format!(
                        "Current scene:\n{}\n\nUser request: {}",
                        scene_context, request.prompt
                    )
                }
            ]
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AiError::UpstreamStatus(status.as_u16()));
    }

    let body: serde_json::Value = response.json().await?;

    // Извлекаем текст из ответа модели
    let content_text = body["content"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|block| block["text"].as_str())
        .ok_or_else(|| AiError::Unparsable("no text block in response".to_string()))?;

    parse_model_output(content_text)
}

/// Разбирает ответ модели в пакет объектов. Пакет принимается целиком
/// или отклоняется целиком.
pub fn parse_model_output(content_text: &str) -> Result<GenerateResponse, AiError> {
    let json = extract_json_object(content_text)
        .ok_or_else(|| AiError::Unparsable("no JSON object found".to_string()))?;

    let mut response: GenerateResponse =
        serde_json::from_str(json).map_err(|e| AiError::Unparsable(e.to_string()))?;

    if let Some(bad) = response.objects.iter().find(|o| !o.is_well_formed()) {
        return Err(AiError::Unparsable(format!("malformed object '{}'", bad.name)));
    }
    if response.text.is_empty() {
        response.text = format!("Added {} objects", response.objects.len());
    }
    Ok(response)
}

/// Модель иногда оборачивает JSON в markdown-блок или добавляет текст вокруг
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ShapeKind;

    #[test]
    fn test_parse_plain_json() {
        let text = r##"{"text": "A lamp", "objects": [
            {"name": "Lamp", "shape": {"type": "sphere"}, "position": [0, 2, 0],
             "scale": [0.2, 0.2, 0.2], "color_hex": "#ffee88"}
        ]}"##;
        let resp = parse_model_output(text).unwrap();
        assert_eq!(resp.text, "A lamp");
        assert_eq!(resp.objects.len(), 1);
        assert_eq!(resp.objects[0].shape, ShapeKind::Sphere);
        assert_eq!(resp.objects[0].rotation, [0.0; 3]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "Here you go:\n```json\n{\"objects\": [{\"name\": \"Sign\", \"shape\": {\"type\": \"text\", \"text\": \"Hi\"}, \"position\": [0,1,0], \"scale\": [1,1,0.2], \"color_hex\": \"#000000\"}]}\n```";
        let resp = parse_model_output(text).unwrap();
        assert_eq!(resp.objects.len(), 1);
        assert_eq!(resp.text, "Added 1 objects");
        assert_eq!(
            resp.objects[0].shape,
            ShapeKind::Text {
                text: "Hi".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_whole_batch_on_bad_object() {
        let text = r##"{"objects": [
            {"name": "Ok", "shape": {"type": "box"}, "position": [0, 0, 0], "scale": [1, 1, 1], "color_hex": "#ffffff"},
            {"name": "Flat", "shape": {"type": "box"}, "position": [0, 0, 0], "scale": [1, 0, 1], "color_hex": "#ffffff"}
        ]}"##;
        let err = parse_model_output(text).unwrap_err();
        assert!(matches!(err, AiError::Unparsable(_)));
    }

    #[test]
    fn test_parse_rejects_unknown_shape() {
        let text = r##"{"objects": [{"name": "Cone", "shape": {"type": "cone"}, "position": [0, 0, 0], "scale": [1, 1, 1], "color_hex": "#ffffff"}]}"##;
        assert!(parse_model_output(text).is_err());
    }

    #[test]
    fn test_parse_no_json() {
        assert!(matches!(
            parse_model_output("I cannot help with that."),
            Err(AiError::Unparsable(_))
        ));
    }
}
