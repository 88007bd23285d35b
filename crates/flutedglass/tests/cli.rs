use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_stripes(path: &Path, width: u32, height: u32) {
    let image = RgbaImage::from_fn(width, height, |x, _| {
        if (x / 6) % 2 == 0 {
            Rgba([240, 200, 40, 255])
        } else {
            Rgba([30, 60, 160, 255])
        }
    });
    image.save(path).unwrap();
}

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("config")).unwrap();
        write_stripes(&root.path().join("source.png"), 48, 32);
        Self { root }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_flutedglass"))
            .env("FLUTEDGLASS_CONFIG_DIR", self.path("config"))
            .env_remove("FLUTEDGLASS_CONFIG")
            .env("RUST_LOG", "warn")
            .args(args)
            .output()
            .expect("failed to run flutedglass")
    }
}

#[test]
fn render_writes_png_of_requested_size() {
    let ws = Workspace::new();
    let source = ws.path("source.png");
    let out = ws.path("out/frame.png");
    let output = ws.run(&[
        "render",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--size",
        "64x40",
        "--segments",
        "12",
        "--overlay",
        "50",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let frame = image::open(&out).unwrap();
    assert_eq!((frame.width(), frame.height()), (64, 40));
}

#[test]
fn render_defaults_to_image_size() {
    let ws = Workspace::new();
    let source = ws.path("source.png");
    let out = ws.path("plain.png");
    let output = ws.run(&[
        "render",
        source.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let frame = image::open(&out).unwrap();
    assert_eq!((frame.width(), frame.height()), (48, 32));
}

#[test]
fn pointer_position_changes_output() {
    let ws = Workspace::new();
    let source = ws.path("source.png");
    let left = ws.path("left.png");
    let right = ws.path("right.png");
    for (out, x) in [(&left, "2"), (&right, "40")] {
        let output = ws.run(&[
            "render",
            source.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
            "--mode",
            "pointer",
            "--segments",
            "8",
            "--pointer-x",
            x,
        ]);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }
    let left = image::open(&left).unwrap().to_rgba8();
    let right = image::open(&right).unwrap().to_rgba8();
    assert_ne!(left, right);
}

#[test]
fn sequence_writes_numbered_frames() {
    let ws = Workspace::new();
    let source = ws.path("source.png");
    let dir = ws.path("frames");
    let output = ws.run(&[
        "sequence",
        source.to_str().unwrap(),
        "--out-dir",
        dir.to_str().unwrap(),
        "--frames",
        "3",
        "--mode",
        "scroll",
        "--size",
        "24x16",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    for index in 0..3 {
        assert!(dir.join(format!("frame_{index:04}.png")).is_file());
    }
    assert!(!dir.join("frame_0003.png").exists());
}

#[test]
fn config_command_reports_layered_settings() {
    let ws = Workspace::new();
    fs::write(
        ws.path("config/effect.toml"),
        "version = 1\n\n[effect]\nsegments = 24\nmode = \"mouse\"\n",
    )
    .unwrap();
    let source = ws.path("source.png");
    let output = ws.run(&[
        "config",
        "--image",
        source.to_str().unwrap(),
        "--overlay",
        "250",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["resolved"]["segment_count"], 24.0);
    assert_eq!(report["resolved"]["interaction_mode"], "pointer");
    assert_eq!(report["resolved"]["overlay_opacity_percent"], 100.0);
    assert_eq!(report["resolved"]["image_aspect_ratio"], 1.5);
}

#[test]
fn unsupported_config_version_fails() {
    let ws = Workspace::new();
    fs::write(ws.path("config/effect.toml"), "version = 2\n").unwrap();
    let output = ws.run(&["config"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version"), "{stderr}");
}

#[test]
fn missing_image_fails_cleanly() {
    let ws = Workspace::new();
    let out = ws.path("never.png");
    let output = ws.run(&[
        "render",
        ws.path("absent.png").to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!out.exists());
}
