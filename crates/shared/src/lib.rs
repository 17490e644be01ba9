use serde::{Deserialize, Serialize};

/// Уникальный идентификатор объекта в сцене
pub type ObjectId = String;

/// Трёхкомпонентный вектор (x, y, z), в метрах для позиций
pub type Vector3 = [f64; 3];

fn default_true() -> bool {
    true
}

/// Ось мировой системы координат
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Индекс компоненты в `Vector3`
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Тип фигуры: закрытый набор вариантов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Torus,
    Plane,
    Icosahedron,
    Heart,
    /// Объёмный текст: строка хранится прямо в варианте
    Text { text: String },
}

impl ShapeKind {
    /// Название для отображения и имён по умолчанию
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Box => "Box",
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Cylinder => "Cylinder",
            ShapeKind::Torus => "Torus",
            ShapeKind::Plane => "Plane",
            ShapeKind::Icosahedron => "Icosahedron",
            ShapeKind::Heart => "Heart",
            ShapeKind::Text { .. } => "Text",
        }
    }

    /// Масштаб нового объекта (геометрия единичного размера)
    pub fn default_scale(&self) -> Vector3 {
        match self {
            ShapeKind::Plane => [1.0, 1.0, 0.01],
            ShapeKind::Text { .. } => [1.0, 1.0, 0.2],
            _ => [1.0, 1.0, 1.0],
        }
    }
}

/// Тип материала (влияет только на отрисовку)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialKind {
    #[default]
    Standard,
    Metal,
    Wood,
    Glass,
    Plastic,
}

impl MaterialKind {
    /// Цвет по умолчанию для нового объекта
    pub fn default_color(self) -> &'static str {
        match self {
            MaterialKind::Standard => "#9ca3af",
            MaterialKind::Metal => "#c0c4cc",
            MaterialKind::Wood => "#a0522d",
            MaterialKind::Glass => "#a5d8ff",
            MaterialKind::Plastic => "#e03131",
        }
    }
}

/// Трансформация объекта
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Transform {
    pub position: Vector3,
    /// Углы Эйлера XYZ в радианах
    pub rotation: Vector3,
    pub scale: Vector3,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn with_scale(mut self, scale: Vector3) -> Self {
        self.scale = scale;
        self
    }
}

/// Объект сцены: одна размещённая фигура
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Неизменяемый уникальный идентификатор
    pub id: ObjectId,
    /// Имя (редактируется пользователем, может повторяться)
    pub name: String,
    pub shape: ShapeKind,
    pub transform: Transform,
    /// Цвет в формате `#rrggbb`
    pub color_hex: String,
    #[serde(default)]
    pub material: MaterialKind,
    /// Невидимые объекты не участвуют в привязке и размерах
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl SceneObject {
    /// Габариты объекта по осям.
    ///
    /// Геометрия единичного размера, поэтому габарит совпадает с масштабом.
    pub fn extents(&self) -> Vector3 {
        self.transform.scale
    }

    pub fn position(&self) -> Vector3 {
        self.transform.position
    }
}

/// Описание сцены: содержимое одного снимка истории
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SceneDescription {
    pub objects: Vec<SceneObject>,
}

impl SceneDescription {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        Self { objects }
    }

    pub fn get(&self, id: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.iter().any(|o| o.id == id)
    }

    /// Каждый id встречается в снимке не более одного раза
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.objects.len());
        self.objects.iter().all(|o| seen.insert(o.id.as_str()))
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    /// Только видимые объекты
    pub fn visible(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.visible)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Проверка цвета вида `#rrggbb`
pub fn is_valid_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Приводит `RRGGBB` / `#RRGGBB` к виду `#rrggbb`
pub fn normalize_hex_color(color: &str) -> Option<String> {
    let trimmed = color.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    let candidate = format!("#{}", digits.to_ascii_lowercase());
    is_valid_hex_color(&candidate).then_some(candidate)
}

// ============================================================================
// AI-генерация сцены
// ============================================================================

/// Запрос на генерацию объектов по текстовому описанию
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Текущая сцена (контекст для модели)
    #[serde(default)]
    pub scene: SceneDescription,
}

/// Объект, предложенный генератором (id назначает редактор)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedObject {
    pub name: String,
    pub shape: ShapeKind,
    pub position: Vector3,
    /// Радианы
    #[serde(default)]
    pub rotation: Vector3,
    pub scale: Vector3,
    pub color_hex: String,
}

impl GeneratedObject {
    /// Все числа конечны, масштаб положительный, цвет корректный
    pub fn is_well_formed(&self) -> bool {
        let finite = self
            .position
            .iter()
            .chain(self.rotation.iter())
            .chain(self.scale.iter())
            .all(|v| v.is_finite());
        finite
            && self.scale.iter().all(|s| *s > 0.0)
            && normalize_hex_color(&self.color_hex).is_some()
    }
}

/// Ответ генератора: пояснение и пакет объектов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub text: String,
    pub objects: Vec<GeneratedObject>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(val: &T) {
        let json = serde_json::to_string(val).expect("serialize");
        let back: T = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(*val, back);
    }

    fn object(id: &str) -> SceneObject {
        SceneObject {
            id: id.to_string(),
            name: "Box 1".to_string(),
            shape: ShapeKind::Box,
            transform: Transform::new(),
            color_hex: "#ffffff".to_string(),
            material: MaterialKind::Standard,
            visible: true,
        }
    }

    #[test]
    fn test_shape_box_serde() {
        let json = serde_json::to_string(&ShapeKind::Box).unwrap();
        assert_eq!(json, r#"{"type":"box"}"#);
    }

    #[test]
    fn test_shape_text_carries_string() {
        let s = ShapeKind::Text { text: "Hi".to_string() };
        roundtrip(&s);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""type":"text""#));
        assert!(json.contains(r#""text":"Hi""#));
    }

    #[test]
    fn test_text_without_string_rejected() {
        let res: Result<ShapeKind, _> = serde_json::from_str(r#"{"type":"text"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_material_serde() {
        let json = serde_json::to_string(&MaterialKind::Wood).unwrap();
        assert_eq!(json, r#""wood""#);
    }

    #[test]
    fn test_object_visible_defaults_true() {
        let json = r##"{
            "id": "a", "name": "A", "shape": {"type": "sphere"},
            "transform": {"position": [0,0,0], "rotation": [0,0,0], "scale": [1,1,1]},
            "color_hex": "#ff0000"
        }"##;
        let obj: SceneObject = serde_json::from_str(json).unwrap();
        assert!(obj.visible);
        assert_eq!(obj.material, MaterialKind::Standard);
    }

    #[test]
    fn test_scene_lookup() {
        let mut scene = SceneDescription::new(vec![object("a"), object("b")]);
        scene.objects[1].visible = false;
        assert!(scene.contains("a"));
        assert_eq!(scene.position_of("b"), Some(1));
        assert_eq!(scene.visible().count(), 1);
        assert!(scene.get("zzz").is_none());
        roundtrip(&scene);
    }

    #[test]
    fn test_hex_color() {
        assert!(is_valid_hex_color("#a0b1c2"));
        assert!(!is_valid_hex_color("a0b1c2"));
        assert!(!is_valid_hex_color("#a0b1cz"));
        assert_eq!(normalize_hex_color("FF00AA").as_deref(), Some("#ff00aa"));
        assert_eq!(normalize_hex_color("#123"), None);
    }

    #[test]
    fn test_generated_object_well_formed() {
        let mut g = GeneratedObject {
            name: "Leg".to_string(),
            shape: ShapeKind::Cylinder,
            position: [0.0, 0.5, 0.0],
            rotation: [0.0; 3],
            scale: [0.1, 1.0, 0.1],
            color_hex: "#8b4513".to_string(),
        };
        assert!(g.is_well_formed());
        g.scale[1] = 0.0;
        assert!(!g.is_well_formed());
        g.scale[1] = 1.0;
        g.position[0] = f64::NAN;
        assert!(!g.is_well_formed());
    }

    #[test]
    fn test_generate_response_defaults() {
        let json = r#"{"objects": []}"#;
        let resp: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(resp.text.is_empty());
        assert!(resp.objects.is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let scene = SceneDescription::new(vec![object("a"), object("b")]);
        assert!(scene.has_unique_ids());
        assert!(SceneDescription::default().has_unique_ids());

        let twins = SceneDescription::new(vec![object("a"), object("b"), object("a")]);
        assert!(!twins.has_unique_ids());
    }

    #[test]
    fn test_axis_index() {
        let idx: Vec<usize> = Axis::ALL.iter().map(|a| a.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }
}
