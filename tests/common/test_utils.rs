use floating_showcase::{
    ShowcaseConfig,
    data_structures::scene_graph::Scene,
    resources::font::Font,
    showcase::Showcase,
};
use rand::{SeedableRng, rngs::StdRng};

/// A tiny typeface: a square `?` that every unknown character falls back to,
/// an `O` with a hole and a blank space.
pub const FIXTURE_FONT: &str = r#"{
    "familyName": "Fixture",
    "resolution": 1000,
    "boundingBox": { "xMin": 0, "xMax": 700, "yMin": -200, "yMax": 800 },
    "underlineThickness": 50,
    "glyphs": {
        "?": { "ha": 700, "o": "m 0 0 l 600 0 l 600 700 l 0 700 z" },
        "O": { "ha": 700, "o": "m 0 0 l 0 700 l 600 700 l 600 0 z m 150 150 l 450 150 l 450 550 l 150 550 z" },
        " ": { "ha": 300 }
    }
}"#;

pub fn fixture_font() -> Font {
    Font::from_json(FIXTURE_FONT).expect("fixture font parses")
}

/// A font whose only glyph has an outline the parser rejects.
pub fn broken_font() -> Font {
    Font::from_json(&FIXTURE_FONT.replace("l 600 0 l 600 700", "x 600 0 l 600 700"))
        .expect("broken font still parses as json")
}

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

/// A bootstrapped scene that has not received its font yet.
pub fn bootstrapped() -> (Showcase, Scene) {
    let showcase = Showcase::new(ShowcaseConfig::default(), seeded_rng());
    let mut scene = Scene::default();
    showcase.bootstrap(&mut scene);
    (showcase, scene)
}

/// A bootstrapped scene after the fixture font has arrived.
pub fn populated() -> (Showcase, Scene) {
    let (mut showcase, mut scene) = bootstrapped();
    let built = showcase
        .on_font_loaded(&mut scene, &fixture_font())
        .expect("fixture font builds the scene");
    assert!(built);
    (showcase, scene)
}
