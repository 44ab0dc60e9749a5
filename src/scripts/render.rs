//! Renders the repository's SVG artwork into fixed-width PNGs.

use std::path::PathBuf;

use anyhow::{Context, Result};

pub struct RenderTarget {
    pub svg_path: PathBuf,
    pub png_path: PathBuf,
    pub width: u32,
}

/// The fixed source/output pairs rendered for packaging.
pub fn default_targets() -> Vec<RenderTarget> {
    vec![
        RenderTarget {
            svg_path: PathBuf::from("media/icon.svg"),
            png_path: PathBuf::from("media/icon.png"),
            width: 128,
        },
        RenderTarget {
            svg_path: PathBuf::from("media/banner.svg"),
            png_path: PathBuf::from("media/banner.png"),
            width: 1400,
        },
    ]
}

pub fn render_all(targets: &[RenderTarget]) -> Result<()> {
    for target in targets {
        render_target(target)?;
        println!("rendered {}", target.png_path.display());
    }
    Ok(())
}

/// Render one SVG to PNG, scaled to fit the target width.
pub fn render_target(target: &RenderTarget) -> Result<()> {
    let svg = std::fs::read_to_string(&target.svg_path)
        .with_context(|| format!("reading {}", target.svg_path.display()))?;

    let options = resvg::usvg::Options::default();
    let tree = resvg::usvg::Tree::from_str(&svg, &options)
        .with_context(|| format!("parsing {}", target.svg_path.display()))?;

    let size = tree.size();
    let scale = target.width as f32 / size.width();
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(target.width, height)
        .context("allocating output pixmap")?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    if let Some(parent) = target.png_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    pixmap
        .save_png(&target.png_path)
        .with_context(|| format!("writing {}", target.png_path.display()))?;
    Ok(())
}
