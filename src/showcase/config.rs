use crate::geometry::TextOptions;

/// One line of extruded text and where its centre ends up.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub size: f32,
    pub offset: [f32; 3],
}

impl TextLine {
    pub fn new(text: &str, size: f32, offset: [f32; 3]) -> Self {
        Self {
            text: text.to_string(),
            size,
            offset,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TorusParams {
    pub radius: f32,
    pub tube: f32,
    pub radial_segments: u32,
    pub tubular_segments: u32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CuboidParams {
    pub size: [f32; 3],
    pub segments: [u32; 3],
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TetrahedronParams {
    pub radius: f32,
    pub detail: u32,
}

/// Per-frame increments of the animation. They are applied once per frame,
/// not scaled by frame time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationSteps {
    pub item_rotation: f32,
    /// Drift per frame is `sin(t) / drift_divisor` on x and `cos(t) / drift_divisor` on z.
    pub drift_divisor: f32,
    pub text_rotation: f32,
}

impl Default for AnimationSteps {
    fn default() -> Self {
        Self {
            item_rotation: 0.01,
            drift_divisor: 200.0,
            text_rotation: 0.001,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraParams {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub damping_factor: f32,
}

/// Everything that shapes the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowcaseConfig {
    pub font_path: String,
    pub matcap_path: String,
    /// `0xRRGGBB`, sRGB.
    pub background: u32,
    pub camera: CameraParams,
    pub lines: Vec<TextLine>,
    /// Shared by every line; `size` is replaced by the line's own size.
    pub text: TextOptions,
    pub items_per_kind: usize,
    /// Edge length of the cube primitives are scattered in, centred on the origin.
    pub spawn_range: f32,
    pub torus: TorusParams,
    pub cuboid: CuboidParams,
    pub tetrahedron: TetrahedronParams,
    pub steps: AnimationSteps,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            font_path: "fonts/helvetiker_regular.typeface.json".to_string(),
            matcap_path: "textures/matcaps/8.png".to_string(),
            background: 0x40e0d0,
            camera: CameraParams {
                fov_degrees: 75.0,
                near: 0.1,
                far: 100.0,
                position: [1.0, 1.0, 2.0],
                damping_factor: 0.05,
            },
            lines: vec![
                TextLine::new("Winson Cheng", 0.5, [0.0, 0.6, 0.0]),
                TextLine::new("Software Engineer", 0.3, [-0.4, 0.0, 0.0]),
                TextLine::new("AI + Theory", 0.3, [-1.1, -0.5, 0.0]),
            ],
            text: TextOptions {
                depth: 0.2,
                curve_segments: 12,
                bevel_enabled: true,
                bevel_thickness: 0.03,
                bevel_size: 0.02,
                bevel_offset: 0.0,
                bevel_segments: 5,
                ..Default::default()
            },
            items_per_kind: 150,
            spawn_range: 20.0,
            torus: TorusParams {
                radius: 0.3,
                tube: 0.2,
                radial_segments: 32,
                tubular_segments: 64,
            },
            cuboid: CuboidParams {
                size: [0.5, 0.5, 0.5],
                segments: [4, 4, 4],
            },
            tetrahedron: TetrahedronParams {
                radius: 0.5,
                detail: 2,
            },
            steps: AnimationSteps::default(),
        }
    }
}
