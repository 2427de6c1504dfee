use anyhow::{Context as _, Result};
use dialradio_core::{SkinConfig, WidgetConfig};
use dialradio_messages::Degrees;
use eframe::egui::{
    Align2, Color32, ColorImage, Context, FontData, FontDefinitions, FontFamily, FontId,
    Image, Pos2, Rect, Stroke, TextureHandle, TextureOptions, Ui, Vec2, pos2, vec2,
};
use log::{error, warn};
use std::path::Path;
use std::sync::Arc;

const FONT_NAME: &str = "seven-segment";
/// Painted knob radius when the knob image is missing.
const FALLBACK_KNOB_RADIUS: f32 = 24.0;

/// Window size: the background image's size, or the configured fallback.
pub(crate) fn window_size(config: &WidgetConfig) -> [f32; 2] {
    match image::image_dimensions(&config.skin.background) {
        Ok((w, h)) => [w as f32, h as f32],
        Err(e) => {
            warn!(
                "Could not read background {}: {}",
                config.skin.background.display(),
                e
            );
            config.window.fallback_size
        }
    }
}

/// Textures, font and layout for the widget face.
///
/// Any image that fails to load is replaced by painted shapes.
pub(crate) struct Skin {
    background: Option<TextureHandle>,
    knob: Option<TextureHandle>,
    close_button: Option<TextureHandle>,
    size: Vec2,
    label_font: FontId,
    label_color: Color32,
    label_y: f32,
    close_center: Pos2,
    close_radius: f32,
}

impl Skin {
    pub fn load(ctx: &Context, config: &WidgetConfig) -> Self {
        let skin = &config.skin;

        if let Err(e) = install_font(ctx, &skin.font) {
            error!("Error loading custom font: {:#}", e);
        }

        let [w, h] = window_size(config);
        Self {
            background: texture_or_warn(ctx, "background", &skin.background),
            knob: texture_or_warn(ctx, "knob", &skin.knob),
            close_button: texture_or_warn(ctx, "close_button", &skin.close_button),
            size: vec2(w, h),
            label_font: FontId::new(skin.font_size, FontFamily::Proportional),
            label_color: label_color(skin),
            label_y: skin.label_y,
            close_center: pos2(skin.close_center[0], skin.close_center[1]),
            close_radius: skin.close_radius.max(1.0),
        }
    }

    /// Whether a press at `pos` lands on the close button.
    pub fn hits_close(&self, pos: Pos2) -> bool {
        let half = match &self.close_button {
            Some(texture) => texture.size_vec2() / 2.0,
            None => Vec2::splat(self.close_radius),
        };
        (pos.x - self.close_center.x).abs() <= half.x && (pos.y - self.close_center.y).abs() <= half.y
    }

    pub fn paint_background(&self, ui: &Ui) {
        let rect = Rect::from_min_size(Pos2::ZERO, self.size);
        match &self.background {
            Some(texture) => Image::new(texture).paint_at(ui, rect),
            None => {
                ui.painter()
                    .rect_filled(rect, 12.0, Color32::from_rgb(48, 40, 36));
            }
        }
    }

    /// Paint a knob rotated counter-clockwise by `angle` around `center`.
    pub fn paint_knob(&self, ui: &Ui, center: [f32; 2], angle: Degrees) {
        let center = pos2(center[0], center[1]);
        match &self.knob {
            Some(texture) => {
                let rect = Rect::from_center_size(center, texture.size_vec2());
                Image::new(texture)
                    .rotate(-angle.to_radians(), Vec2::splat(0.5))
                    .paint_at(ui, rect);
            }
            None => paint_fallback_knob(ui, center, angle),
        }
    }

    pub fn paint_close_button(&self, ui: &Ui) {
        match &self.close_button {
            Some(texture) => {
                let rect = Rect::from_center_size(self.close_center, texture.size_vec2());
                Image::new(texture).paint_at(ui, rect);
            }
            None => {
                let painter = ui.painter();
                painter.circle_filled(self.close_center, self.close_radius, Color32::DARK_RED);
                painter.text(
                    self.close_center,
                    Align2::CENTER_CENTER,
                    "×",
                    FontId::proportional(self.close_radius * 1.4),
                    Color32::WHITE,
                );
            }
        }
    }

    pub fn paint_label(&self, ui: &Ui, text: &str) {
        ui.painter().text(
            pos2(self.size.x / 2.0, self.label_y),
            Align2::CENTER_CENTER,
            text,
            self.label_font.clone(),
            self.label_color,
        );
    }
}

fn paint_fallback_knob(ui: &Ui, center: Pos2, angle: Degrees) {
    let painter = ui.painter();
    let radius = FALLBACK_KNOB_RADIUS;
    painter.circle_filled(center, radius, Color32::from_rgb(55, 55, 68));
    painter.circle_stroke(center, radius, Stroke::new(2.0, Color32::from_rgb(90, 90, 100)));

    // Rest position points up; screen y grows downward.
    let theta = (-90.0 - angle.as_degrees()).to_radians();
    let tip = pos2(
        center.x + theta.cos() * (radius - 6.0),
        center.y + theta.sin() * (radius - 6.0),
    );
    painter.line_segment([center, tip], Stroke::new(3.0, Color32::from_rgb(230, 230, 230)));
    painter.circle_filled(center, 3.0, Color32::from_rgb(230, 230, 230));
}

fn label_color(skin: &SkinConfig) -> Color32 {
    let [r, g, b] = skin.label_color;
    Color32::from_rgb(r, g, b)
}

fn texture_or_warn(ctx: &Context, name: &str, path: &Path) -> Option<TextureHandle> {
    match load_texture(ctx, name, path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            warn!("Using painted {} instead of image: {:#}", name, e);
            None
        }
    }
}

fn load_texture(ctx: &Context, name: &str, path: &Path) -> Result<TextureHandle> {
    let image = image::open(path)
        .with_context(|| format!("failed to load {}", path.display()))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    let pixels = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
    Ok(ctx.load_texture(name, pixels, TextureOptions::LINEAR))
}

/// Put the configured TTF in front of the default proportional fonts so
/// missing glyphs still render.
fn install_font(ctx: &Context, path: &Path) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let mut fonts = FontDefinitions::default();
    fonts
        .font_data
        .insert(FONT_NAME.to_owned(), Arc::new(FontData::from_owned(bytes)));
    fonts
        .families
        .entry(FontFamily::Proportional)
        .or_default()
        .insert(0, FONT_NAME.to_owned());
    ctx.set_fonts(fonts);
    Ok(())
}
