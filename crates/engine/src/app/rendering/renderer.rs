use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::metrics::LoopMetrics;
use crate::app::{EntitySlot, EntitySlots, Role, SpeedFactor};
use crate::config::ActionTable;

use super::canvas::{fit_scale, Canvas};
use super::text::{draw_text, fit_tail, text_width, GLYPH_ADVANCE, LINE_ADVANCE};

const CLEAR_COLOR: [u8; 4] = [18, 18, 22, 255];
const PANEL_BG_COLOR: [u8; 4] = [28, 28, 34, 255];
const PANEL_BORDER_COLOR: [u8; 4] = [70, 70, 84, 255];
const ACTIVE_BORDER_COLOR: [u8; 4] = [220, 200, 255, 255];
const TEXT_PRIMARY_COLOR: [u8; 4] = [236, 240, 244, 255];
const TEXT_DIM_COLOR: [u8; 4] = [150, 160, 176, 255];
const TEXT_ERROR_COLOR: [u8; 4] = [255, 110, 110, 255];
const PROMPT_BG_COLOR: [u8; 4] = [10, 10, 12, 255];
const PROMPT_TEXT_COLOR: [u8; 4] = [210, 230, 210, 255];
const PADDING: i32 = 8;
const PROMPT_PREFIX: &str = "load> ";
const EMPTY_SLOT_TEXT: &str = "(empty)";

/// Everything the HUD shows for one frame.
pub(crate) struct HudView<'a> {
    pub(crate) slots: &'a EntitySlots,
    pub(crate) actions: &'a ActionTable,
    pub(crate) controls_line: &'a str,
    pub(crate) speed: SpeedFactor,
    pub(crate) error_text: &'a str,
    pub(crate) prompt_line: Option<&'a str>,
    pub(crate) metrics: LoopMetrics,
}

pub(crate) struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub(crate) fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub(crate) fn render(&mut self, view: &HudView<'_>) -> Result<(), Error> {
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }
        let mut canvas = Canvas::new(self.pixels.frame_mut(), self.width, self.height);
        draw_hud(&mut canvas, view);
        self.pixels.render()
    }
}

/// Lays out two slot panels over a text area listing actions, speed, errors
/// and the prompt.
pub(crate) fn draw_hud(canvas: &mut Canvas<'_>, view: &HudView<'_>) {
    canvas.clear(CLEAR_COLOR);
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;

    let action_lines: Vec<String> = view
        .actions
        .key_names()
        .map(|(action, key)| format!("{key}: {action}"))
        .collect();
    let footer_lines = 4 + i32::from(view.prompt_line.is_some());
    let text_height = (footer_lines + action_lines.len() as i32) * LINE_ADVANCE + 2 * PADDING;
    let panel_height = (height - text_height).max(height / 2);
    let panel_width = width / 2;

    for (column, slot) in view.slots.iter().enumerate() {
        let x = column as i32 * panel_width;
        draw_slot_panel(canvas, slot, x, 0, panel_width, panel_height);
    }

    let mut y = panel_height + PADDING;
    for line in &action_lines {
        draw_text(canvas, PADDING, y, line, TEXT_DIM_COLOR);
        y += LINE_ADVANCE;
    }
    draw_text(canvas, PADDING, y, view.controls_line, TEXT_DIM_COLOR);
    y += LINE_ADVANCE;
    draw_text(canvas, PADDING, y, &format!("Speed: {}", view.speed), TEXT_PRIMARY_COLOR);
    let fps = format!(
        "{:.0} fps  {:.1} ms  worst {:.1} ms",
        view.metrics.fps, view.metrics.frame_time_ms, view.metrics.worst_frame_ms
    );
    draw_text(canvas, width - PADDING - text_width(&fps), y, &fps, TEXT_DIM_COLOR);
    y += LINE_ADVANCE;
    if !view.error_text.is_empty() {
        let error = fit_tail(view.error_text, width - 2 * PADDING);
        draw_text(canvas, PADDING, y, error, TEXT_ERROR_COLOR);
    }
    y += LINE_ADVANCE;

    if let Some(line) = view.prompt_line {
        canvas.fill_rect(0, y - PADDING / 2, width, LINE_ADVANCE + PADDING, PROMPT_BG_COLOR);
        let available = width - 2 * PADDING - text_width(PROMPT_PREFIX) - GLYPH_ADVANCE;
        let text = format!("{PROMPT_PREFIX}{}_", fit_tail(line, available));
        draw_text(canvas, PADDING, y, &text, PROMPT_TEXT_COLOR);
    }
}

fn draw_slot_panel(
    canvas: &mut Canvas<'_>,
    slot: &EntitySlot,
    x: i32,
    y: i32,
    panel_width: i32,
    panel_height: i32,
) {
    canvas.fill_rect(x, y, panel_width, panel_height, PANEL_BG_COLOR);

    let [r, g, b] = slot.tint().0;
    let band_top = y + panel_height / 3;
    canvas.fill_rect(x, band_top, panel_width, panel_height / 3, [r, g, b, 255]);

    let border = match slot.role() {
        Role::Active => ACTIVE_BORDER_COLOR,
        Role::Peer => PANEL_BORDER_COLOR,
    };
    canvas.outline_rect(x, y, panel_width, panel_height, border);

    let title = fit_tail(slot.source_path(), panel_width - 2 * PADDING - text_width("box1: "));
    draw_text(
        canvas,
        x + PADDING,
        y + PADDING,
        &format!("{}: {}", slot.name(), if title.is_empty() { EMPTY_SLOT_TEXT } else { title }),
        TEXT_PRIMARY_COLOR,
    );

    let status_y = y + panel_height - PADDING - LINE_ADVANCE;
    let Some(animation) = slot.animation() else {
        return;
    };
    if let Some(frame) = animation.frame() {
        let box_width = (panel_width - 2 * PADDING).max(1) as u32;
        let box_height = (status_y - y - 2 * LINE_ADVANCE).max(1) as u32;
        let scale = fit_scale(frame, box_width, box_height);
        canvas.blit_centered_scaled(frame, x + panel_width / 2, y + panel_height / 2, scale);
    }
    let status = animation.status_line();
    draw_text(
        canvas,
        x + PADDING,
        status_y,
        fit_tail(&status, panel_width - 2 * PADDING),
        TEXT_PRIMARY_COLOR,
    );
}
