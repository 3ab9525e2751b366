use std::borrow::Cow;
use std::io::Cursor;
use std::sync::Arc;

use vello_cpu::peniko;

use crate::foundation::error::{WaylineError, WaylineResult};
use crate::journey::progress::ProgressRecord;

/// Card width in pixels.
pub const CARD_WIDTH: u32 = 750;
/// Card height in pixels.
pub const CARD_HEIGHT: u32 = 225;

// Fixed layout: title stack at the top, time labels in the middle band, bar
// near the bottom with its percent label on top of it.
const MARGIN: f64 = 20.0;
const FRAME_INSET: f64 = 1.0;
const FRAME_WIDTH: f64 = 2.0;
const BAR_TOP: f64 = CARD_HEIGHT as f64 - 50.0;
const BAR_HEIGHT: f64 = 20.0;
const BAR_WIDTH: f64 = CARD_WIDTH as f64 - 2.0 * MARGIN;
const TITLE_TOP: f64 = 16.0;
const HEADLINE_TOP: f64 = 42.0;
const TIMES_TOP: f64 = 80.0;
const TIMES_LINE_STEP: f64 = 15.0;
const BAR_LABEL_TOP: f64 = 179.0;

// Straight-alpha palette. Every paint is fully opaque, so premultiplied
// pixels equal straight ones end-to-end.
const BACKGROUND: [u8; 3] = [0x2c, 0x3e, 0x50];
const FRAME: [u8; 3] = [0x34, 0x49, 0x5e];
const TRACK: [u8; 3] = [0x34, 0x49, 0x5e];
const TRACK_EDGE: [u8; 3] = [0x5d, 0x6d, 0x7e];
const INK: [u8; 3] = [0xec, 0xf0, 0xf1];
const INK_DIM: [u8; 3] = [0xbd, 0xc3, 0xc7];
const ACCENT: [u8; 3] = [0xe7, 0x4c, 0x3c];
/// Three-stop bar fill ramp, dark to light, left to right.
const RAMP: [[u8; 3]; 3] = [
    [0x27, 0xae, 0x60],
    [0x2e, 0xcc, 0x71],
    [0x58, 0xd6, 0x8d],
];

/// RGBA8 brush color carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

#[derive(Clone, Copy)]
enum Anchor {
    Center,
    Left(f64),
    Right(f64),
}

/// Shapes and lays out card text with a single registered face.
struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
}

impl TextEngine {
    fn new(font_bytes: &[u8]) -> WaylineResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| WaylineError::font("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| WaylineError::font("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        weight: parley::style::FontWeight,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

/// Renders [`ProgressRecord`]s into fixed-layout 750×225 PNG cards.
///
/// Construction front-loads the only environment dependency (the font);
/// after that, rendering touches no IO and is byte-stable for identical
/// input. A missing or unusable font is fatal, not recovered.
pub struct CardRenderer {
    text: TextEngine,
    font: peniko::FontData,
    ctx: Option<vello_cpu::RenderContext>,
}

impl CardRenderer {
    /// Build a renderer around the given font bytes.
    pub fn new(font_bytes: Vec<u8>) -> WaylineResult<Self> {
        let text = TextEngine::new(&font_bytes)?;
        let font = peniko::FontData::new(peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            text,
            font,
            ctx: None,
        })
    }

    /// Rasterize `record` and encode the card as PNG bytes.
    #[tracing::instrument(skip(self, record), fields(percent = record.percent))]
    pub fn render(&mut self, record: &ProgressRecord) -> WaylineResult<Vec<u8>> {
        let width = CARD_WIDTH as u16;
        let height = CARD_HEIGHT as u16;
        let mut ctx = self
            .ctx
            .take()
            .unwrap_or_else(|| vello_cpu::RenderContext::new(width, height));
        ctx.reset();
        ctx.set_blend_mode(peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        draw_panel(&mut ctx);
        draw_bar(&mut ctx, record.percent)?;
        self.draw_labels(&mut ctx, record);

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        self.ctx = Some(ctx);

        let mut png = Vec::new();
        image::write_buffer_with_format(
            &mut Cursor::new(&mut png),
            pixmap.data_as_u8_slice(),
            CARD_WIDTH,
            CARD_HEIGHT,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| WaylineError::render(format!("encode png: {e}")))?;
        Ok(png)
    }

    fn draw_labels(&mut self, ctx: &mut vello_cpu::RenderContext, record: &ProgressRecord) {
        use parley::style::FontWeight;

        self.draw_text(
            ctx,
            "Journey Progress",
            18.0,
            FontWeight::BOLD,
            INK,
            Anchor::Center,
            TITLE_TOP,
        );
        let headline = format!("Remaining: {:.1}%", 100.0 - record.percent);
        self.draw_text(
            ctx,
            &headline,
            24.0,
            FontWeight::BOLD,
            ACCENT,
            Anchor::Center,
            HEADLINE_TOP,
        );

        self.draw_text(
            ctx,
            &format!("Elapsed: {}", record.elapsed),
            12.0,
            FontWeight::NORMAL,
            INK_DIM,
            Anchor::Left(MARGIN),
            TIMES_TOP,
        );
        self.draw_text(
            ctx,
            &format!("Remaining: {}", record.remaining),
            12.0,
            FontWeight::NORMAL,
            INK_DIM,
            Anchor::Left(MARGIN),
            TIMES_TOP + TIMES_LINE_STEP,
        );
        self.draw_text(
            ctx,
            &format!("Start: {}", record.start_label),
            12.0,
            FontWeight::NORMAL,
            INK_DIM,
            Anchor::Right(MARGIN),
            TIMES_TOP,
        );
        self.draw_text(
            ctx,
            &format!("End: {}", record.end_label),
            12.0,
            FontWeight::NORMAL,
            INK_DIM,
            Anchor::Right(MARGIN),
            TIMES_TOP + TIMES_LINE_STEP,
        );

        let bar_label = format!("{:.1}%", record.percent);
        self.draw_text(
            ctx,
            &bar_label,
            12.0,
            FontWeight::BOLD,
            INK,
            Anchor::Center,
            BAR_LABEL_TOP,
        );
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        size_px: f32,
        weight: parley::style::FontWeight,
        color: [u8; 3],
        anchor: Anchor,
        top: f64,
    ) {
        let brush = TextBrush {
            r: color[0],
            g: color[1],
            b: color[2],
            a: 0xff,
        };
        let layout = self.text.layout(text, size_px, weight, brush);
        let x = match anchor {
            Anchor::Center => (f64::from(CARD_WIDTH) - f64::from(layout.width())) / 2.0,
            Anchor::Left(x) => x,
            Anchor::Right(margin) => f64::from(CARD_WIDTH) - margin - f64::from(layout.width()),
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, top)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let b = run.style().brush;
                ctx.set_paint(peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }
}

fn draw_panel(ctx: &mut vello_cpu::RenderContext) {
    let w = f64::from(CARD_WIDTH);
    let h = f64::from(CARD_HEIGHT);
    fill_rect(ctx, kurbo::Rect::new(0.0, 0.0, w, h), BACKGROUND);
    fill_frame(
        ctx,
        kurbo::Rect::new(FRAME_INSET, FRAME_INSET, w - FRAME_INSET, h - FRAME_INSET),
        FRAME_WIDTH,
        FRAME,
    );
}

fn draw_bar(ctx: &mut vello_cpu::RenderContext, percent: f64) -> WaylineResult<()> {
    let track = kurbo::Rect::new(MARGIN, BAR_TOP, MARGIN + BAR_WIDTH, BAR_TOP + BAR_HEIGHT);
    fill_rect(ctx, track, TRACK);
    fill_frame(ctx, track, 1.0, TRACK_EDGE);

    // Clamp guards against percent drifting slightly outside [0, 100].
    let fill_w = (BAR_WIDTH * percent / 100.0).clamp(0.0, BAR_WIDTH);
    let fill_px = fill_w.round() as u32;
    if fill_px == 0 {
        return Ok(());
    }

    let paint = ramp_paint(fill_px, BAR_HEIGHT as u32)?;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((MARGIN, BAR_TOP)));
    ctx.set_paint(paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(fill_px),
        BAR_HEIGHT,
    ));
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

fn fill_rect(ctx: &mut vello_cpu::RenderContext, r: kurbo::Rect, rgb: [u8; 3]) {
    ctx.set_paint(peniko::Color::from_rgba8(rgb[0], rgb[1], rgb[2], 0xff));
    ctx.fill_rect(&rect_to_cpu(r));
}

/// Fill the four edge strips of `r`, `width` px thick, inward.
fn fill_frame(ctx: &mut vello_cpu::RenderContext, r: kurbo::Rect, width: f64, rgb: [u8; 3]) {
    fill_rect(ctx, kurbo::Rect::new(r.x0, r.y0, r.x1, r.y0 + width), rgb);
    fill_rect(ctx, kurbo::Rect::new(r.x0, r.y1 - width, r.x1, r.y1), rgb);
    fill_rect(ctx, kurbo::Rect::new(r.x0, r.y0, r.x0 + width, r.y1), rgb);
    fill_rect(ctx, kurbo::Rect::new(r.x1 - width, r.y0, r.x1, r.y1), rgb);
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

/// Build the horizontal three-stop ramp paint for the filled bar width.
fn ramp_paint(w: u32, h: u32) -> WaylineResult<vello_cpu::Image> {
    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    let w1 = (w.max(1) - 1) as f32;
    for x in 0..w {
        let t = if w1 <= 0.0 { 0.0 } else { (x as f32) / w1 };
        let c = ramp_color(t);
        for y in 0..h {
            let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
            bytes[idx] = c[0];
            bytes[idx + 1] = c[1];
            bytes[idx + 2] = c[2];
            bytes[idx + 3] = 0xff;
        }
    }
    rgba_premul_to_image(&bytes, w, h)
}

/// Sample the ramp at `t` in `[0, 1]`, stops at 0, 1/2 and 1.
fn ramp_color(t: f32) -> [u8; 3] {
    let (from, to, local) = if t < 0.5 {
        (RAMP[0], RAMP[1], t * 2.0)
    } else {
        (RAMP[1], RAMP[2], (t - 0.5) * 2.0)
    };
    let lerp = |a: u8, b: u8| -> u8 {
        let af = f32::from(a);
        let bf = f32::from(b);
        (af + (bf - af) * local).round().clamp(0.0, 255.0) as u8
    };
    [
        lerp(from[0], to[0]),
        lerp(from[1], to[1]),
        lerp(from[2], to[2]),
    ]
}

fn rgba_premul_to_image(bytes: &[u8], width: u32, height: u32) -> WaylineResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WaylineError::render("paint width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WaylineError::render("paint height exceeds u16"))?;
    // Pixmap stores PremulRgba8; the opaque ramp bytes are already premultiplied.
    let mut pixels = Vec::<peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/card.rs"]
mod tests;
