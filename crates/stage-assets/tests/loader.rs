//! Integration tests: bundle and single-path loading through an in-memory
//! source (stage-assets).

use pretty_assertions::assert_eq;
use stage_assets::{AssetError, AssetLoader, AssetSource, Manifest, MemorySource, Resource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const FONT: &[u8] = include_bytes!("fixtures/DejaVuSansMono-Oblique.ttf");

const MANIFEST: &str = r#"{
    "bundles": [
        {
            "name": "game_screen",
            "assets": [
                { "alias": "bubble_bomb", "src": "images/game-screen/bubble_bomb.png" },
                { "alias": "sample", "src": "images/game-screen/sample.png" }
            ]
        },
        {
            "name": "broken",
            "assets": [
                { "alias": "sample", "src": "images/game-screen/sample.png" },
                { "alias": "ghost", "src": "images/missing.png" }
            ]
        }
    ]
}"#;

const SHEET: &str = r#"{
    "frames": {
        "button-mark.png": { "frame": { "x": 0, "y": 0, "w": 32, "h": 32 } },
        "button-undo.png": { "frame": { "x": 32, "y": 0, "w": 32, "h": 32 } }
    },
    "meta": { "image": "cvc-assets.png" }
}"#;

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn source() -> MemorySource {
    MemorySource::new()
        .with_file("images/game-screen/bubble_bomb.png", png(8, 6))
        .with_file("images/game-screen/sample.png", png(4, 4))
        .with_file("sprites/cvc-assets.json", SHEET.as_bytes().to_vec())
        .with_file("sprites/cvc-assets.png", png(64, 32))
        .with_file("fonts/DejaVuSansMono-Oblique.ttf", FONT.to_vec())
        .with_file("manifest.json", MANIFEST.as_bytes().to_vec())
}

/// A memory source with a per-path fetch delay.
struct PacedSource {
    files: MemorySource,
    delays: HashMap<&'static str, Duration>,
}

impl PacedSource {
    fn new(files: MemorySource, delays: &[(&'static str, u64)]) -> Self {
        let delays = delays
            .iter()
            .map(|&(path, ms)| (path, Duration::from_millis(ms)))
            .collect();
        Self { files, delays }
    }
}

impl AssetSource for PacedSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        self.files.fetch(path).await
    }
}

const FAST_FAIL_MANIFEST: &str = r#"{
    "bundles": [
        {
            "name": "mixed",
            "assets": [
                { "alias": "ghost", "src": "ghost.png" },
                { "alias": "slow", "src": "slow.png" }
            ]
        }
    ]
}"#;

fn paced_loader() -> (Arc<PacedSource>, AssetLoader<Arc<PacedSource>>) {
    let files = MemorySource::new().with_file("slow.png", png(2, 2));
    let source = Arc::new(PacedSource::new(files, &[("ghost.png", 5), ("slow.png", 50)]));
    let manifest = Manifest::from_json(FAST_FAIL_MANIFEST).unwrap();
    let loader = AssetLoader::with_manifest(Arc::clone(&source), manifest);
    (source, loader)
}

fn loader() -> AssetLoader<MemorySource> {
    AssetLoader::with_manifest(source(), Manifest::from_json(MANIFEST).unwrap())
}

// ─── Bundles ────────────────────────────────────────────────────────────

#[tokio::test]
async fn bundle_keys_match_declared_names() {
    let loader = loader();
    let bundle = loader.load_bundle("game_screen").await.unwrap();

    assert_eq!(bundle.name(), "game_screen");
    assert_eq!(bundle.names(), vec!["bubble_bomb", "sample"]);
    let bomb = bundle.texture("bubble_bomb").unwrap();
    assert_eq!((bomb.width(), bomb.height()), (8.0, 6.0));
    assert_eq!(loader.fetch_count(), 2);
}

#[tokio::test]
async fn unknown_bundle_is_manifest_not_found() {
    let err = loader().load_bundle("title_screen").await.unwrap_err();
    assert_eq!(
        err,
        AssetError::ManifestNotFound {
            bundle: "title_screen".into()
        }
    );
}

#[tokio::test]
async fn empty_bundle_name_is_manifest_not_found() {
    let err = loader().load_bundle("").await.unwrap_err();
    assert!(matches!(err, AssetError::ManifestNotFound { .. }));
}

#[tokio::test]
async fn bundles_need_a_manifest() {
    let loader = AssetLoader::new(source());
    let err = loader.load_bundle("game_screen").await.unwrap_err();
    assert!(matches!(err, AssetError::ManifestNotFound { .. }));
}

#[tokio::test]
async fn bundle_with_missing_file_fails_whole() {
    let err = loader().load_bundle("broken").await.unwrap_err();
    match err {
        AssetError::AssetLoadFailure { path, .. } => assert_eq!(path, "images/missing.png"),
        other => panic!("expected AssetLoadFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn init_reads_manifest_through_source() {
    let loader = AssetLoader::init(source(), "./manifest.json").await.unwrap();
    let names: Vec<&str> = loader.manifest().unwrap().bundle_names().collect();
    assert_eq!(names, vec!["game_screen", "broken"]);
}

#[tokio::test]
async fn init_with_missing_manifest_is_invalid() {
    let err = AssetLoader::init(MemorySource::new(), "manifest.json")
        .await
        .unwrap_err();
    assert!(matches!(err, AssetError::InvalidManifest(_)));
}

#[tokio::test]
async fn loader_debug_names_its_state() {
    let loader = loader();
    loader.load_single("images/game-screen/sample.png").await.unwrap();
    let debug = format!("{loader:?}");
    assert!(debug.starts_with("AssetLoader"));
    assert!(debug.contains("fetches: 1"));
}

// ─── Cache ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_load_hits_cache() {
    let loader = loader();
    let first = loader.load_single("images/game-screen/sample.png").await.unwrap();
    let second = loader.load_single("./images/game-screen/sample.png").await.unwrap();

    assert!(first.same_as(&second));
    assert_eq!(loader.fetch_count(), 1);
    assert_eq!(loader.cached_paths(), vec!["images/game-screen/sample.png".to_string()]);
}

#[tokio::test]
async fn concurrent_loads_share_one_fetch() {
    let source = Arc::new(source().with_latency(Duration::from_millis(20)));
    let loader = AssetLoader::new(Arc::clone(&source));
    let path = "images/game-screen/bubble_bomb.png";

    let (a, b) = tokio::join!(loader.load_single(path), loader.load_single(path));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert!(a.same_as(&b));
    assert_eq!(source.fetches_of(path), 1);
    assert_eq!(loader.fetch_count(), 1);
}

#[tokio::test]
async fn failed_bundle_leaves_shared_loads_running() {
    let (source, loader) = paced_loader();
    let second = loader.clone();

    let (bundle, single) = tokio::join!(loader.load_bundle("mixed"), async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        second.load_single("slow.png").await
    });

    match bundle {
        Err(AssetError::AssetLoadFailure { path, .. }) => assert_eq!(path, "ghost.png"),
        other => panic!("expected AssetLoadFailure, got {other:?}"),
    }
    assert!(single.is_ok());
    assert_eq!(source.files.fetches_of("slow.png"), 1);
    assert_eq!(
        loader.cached_paths(),
        vec!["ghost.png".to_string(), "slow.png".to_string()]
    );
}

#[tokio::test]
async fn dropped_bundle_load_still_fills_the_cache() {
    let (source, loader) = paced_loader();

    let timed_out =
        tokio::time::timeout(Duration::from_millis(1), loader.load_bundle("mixed")).await;
    assert!(timed_out.is_err());

    let texture = loader.load_texture("slow.png").await.unwrap();
    assert_eq!((texture.width(), texture.height()), (2.0, 2.0));
    assert_eq!(source.files.fetches_of("slow.png"), 1);
}

#[tokio::test]
async fn bundle_reuses_assets_loaded_singly() {
    let loader = loader();
    let single = loader.load_texture("images/game-screen/sample.png").await.unwrap();
    let bundle = loader.load_bundle("game_screen").await.unwrap();

    assert!(single.ptr_eq(bundle.texture("sample").unwrap()));
    assert_eq!(loader.fetch_count(), 2);
}

#[tokio::test]
async fn failures_are_not_retried() {
    let source = Arc::new(source());
    let loader = AssetLoader::new(Arc::clone(&source));

    let first = loader.load_single("images/missing.png").await.unwrap_err();
    let second = loader.load_single("images/missing.png").await.unwrap_err();

    assert_eq!(first, second);
    assert_eq!(source.fetches_of("images/missing.png"), 1);
}

// ─── Decoding ───────────────────────────────────────────────────────────

#[tokio::test]
async fn font_exposes_family_name() {
    let font = loader()
        .load_font("fonts/DejaVuSansMono-Oblique.ttf")
        .await
        .unwrap();
    assert_eq!(font.family(), "DejaVu Sans Mono");
    assert_eq!(font.data().len(), FONT.len());
}

#[tokio::test]
async fn missing_font_is_font_failure() {
    let err = loader().load_font("fonts/Ludicrous.ttf").await.unwrap_err();
    assert!(matches!(err, AssetError::FontLoadFailure { .. }));
}

#[tokio::test]
async fn spritesheet_frames_share_the_sheet_image() {
    let loader = loader();
    let sheet = loader
        .load_spritesheet("sprites/cvc-assets.json")
        .await
        .unwrap();

    let mark = sheet.texture("button-mark.png").unwrap();
    let undo = sheet.texture("button-undo.png").unwrap();
    assert!(Arc::ptr_eq(mark.source(), undo.source()));
    assert_eq!(undo.frame().x, 32.0);

    // The sheet image is cached under its own path.
    let image = loader.load_texture("sprites/cvc-assets.png").await.unwrap();
    assert!(Arc::ptr_eq(image.source(), mark.source()));
    assert_eq!(
        loader.cached_paths(),
        vec![
            "sprites/cvc-assets.json".to_string(),
            "sprites/cvc-assets.png".to_string()
        ]
    );
    assert_eq!(loader.fetch_count(), 2);
}

#[tokio::test]
async fn typed_helper_rejects_wrong_kind() {
    let err = loader()
        .load_font("images/game-screen/sample.png")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("expected a font"));

    let resource = loader()
        .load_single("images/game-screen/sample.png")
        .await
        .unwrap();
    assert!(matches!(resource, Resource::Texture(_)));
}
