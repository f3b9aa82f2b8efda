//! textforge demo binary
//!
//! Imports a TTF, packs it into a bitmap atlas, renders a string
//! through the render cache and CPU painter, and writes the result as a
//! PNG. Exercises every public operation end-to-end:
//!
//! ```text
//! textforge DejaVuSans.ttf "Hello, atlas" --size 24 --out hello.png
//! ```

use anyhow::{anyhow, Context, Result};
use log::info;
use std::sync::Arc;

use textforge::font::registry::VectorFontParams;
use textforge::{
    Align, Color, CpuPainter, Dispatcher, DirStore, FontRegistry, Rect, TextRenderCache,
};

struct Args {
    font_path: String,
    text: String,
    pixel_height: i32,
    box_size: Option<(i32, i32)>,
    color: Color,
    align: Align,
    shadow: bool,
    out: String,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let font_path = args.next().ok_or_else(usage)?;
    let text = args.next().ok_or_else(usage)?;

    let mut parsed = Args {
        font_path,
        text,
        pixel_height: 16,
        box_size: None,
        color: Color::WHITE,
        align: Align::TOP_LEFT,
        shadow: false,
        out: "text.png".to_string(),
    };

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--size" => {
                let v = args.next().ok_or_else(usage)?;
                parsed.pixel_height = v.parse().context("--size expects a number")?;
            }
            "--box" => {
                let v = args.next().ok_or_else(usage)?;
                let (w, h) = v
                    .split_once('x')
                    .ok_or_else(|| anyhow!("--box expects WxH"))?;
                parsed.box_size = Some((w.parse()?, h.parse()?));
            }
            "--color" => {
                let v = args.next().ok_or_else(usage)?;
                parsed.color =
                    Color::from_hex(&v).ok_or_else(|| anyhow!("invalid color '{}'", v))?;
            }
            "--align" => {
                let v = args.next().ok_or_else(usage)?;
                parsed.align = match v.as_str() {
                    "left" => Align::TOP_LEFT,
                    "right" => Align::RIGHT | Align::TOP,
                    "center" => Align::CENTER,
                    other => return Err(anyhow!("unknown alignment '{}'", other)),
                };
            }
            "--shadow" => parsed.shadow = true,
            "--out" => parsed.out = args.next().ok_or_else(usage)?,
            other => return Err(anyhow!("unknown flag '{}'", other)),
        }
    }
    Ok(parsed)
}

fn usage() -> anyhow::Error {
    anyhow!("usage: textforge <font.ttf> <text> [--size PX] [--box WxH] [--color HEX] [--align left|right|center] [--shadow] [--out PATH]")
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let store = Arc::new(DirStore::new("."));
    let dispatcher = Arc::new(Dispatcher::new());
    let registry = FontRegistry::new(store.clone(), dispatcher.clone());

    registry.import_from_vector_source(
        "demo",
        &args.font_path,
        VectorFontParams::new(args.pixel_height),
        true,
    );
    if !registry.exists("demo") {
        return Err(anyhow!("font import failed, see log"));
    }
    let font = registry.get("demo");

    let (box_w, box_h) = args.box_size.unwrap_or_else(|| {
        let measured = font.measure_text(&args.text);
        (measured.width + 2, measured.height + 2)
    });

    let cache = TextRenderCache::new(registry.clone(), store, dispatcher);
    let mut painter = CpuPainter::new(box_w.max(1) as u32, box_h.max(1) as u32);
    cache.draw_text(
        &mut painter,
        Rect::new(0, 0, box_w, box_h),
        &args.text,
        &font,
        args.color,
        args.align,
        args.shadow,
    );

    painter
        .canvas()
        .save(&args.out)
        .with_context(|| format!("writing '{}'", args.out))?;
    info!("wrote {} ({}x{})", args.out, box_w, box_h);
    Ok(())
}
