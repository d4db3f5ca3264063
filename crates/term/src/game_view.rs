//! GameView: draws a `LevelSnapshot` into a terminal framebuffer.
//!
//! Pure (no I/O), so it can be unit-tested against a framebuffer.

use crate::core::{CarPhase, ContainerView, HolePhase, HoleView, LevelSnapshot};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{FailReason, HoleColor, LevelStatus};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

/// Everything drawn besides the level itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hud<'a> {
    /// Zero-based.
    pub level_index: usize,
    pub level_count: usize,
    pub cursor: usize,
    /// Short-lived message, e.g. when no container is free.
    pub toast: Option<&'a str>,
    pub adapter: Option<&'a AdapterStatusView>,
}

const PLAY_BG: Rgb = Rgb::new(24, 26, 34);
const FRAME: CellStyle = CellStyle::fg(Rgb::new(190, 190, 200));
const LABEL: CellStyle = CellStyle::fg(Rgb::new(220, 220, 220)).bold();
const VALUE: CellStyle = CellStyle::fg(Rgb::new(200, 200, 200));
const WARN: CellStyle = CellStyle::fg(Rgb::new(240, 80, 70)).bold();

/// Rows above the board inside the frame: containers, gap, cursor.
const HEADER_ROWS: u16 = 3;

pub struct GameView {
    /// Terminal columns per hole (including one column of gap).
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // Three glyphs plus a gap reads as a roughly square hole.
        Self { cell_w: 4 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(2),
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &LevelSnapshot, hud: &Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &LevelSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(Default::default());

        let columns = snap.columns.len() as u16;
        let depth = snap.columns.iter().map(Vec::len).max().unwrap_or(0) as u16;
        let board_w = columns * self.cell_w;
        let containers_w = (snap.containers.len() as u16 * (self.cell_w + 2)).saturating_sub(1);
        let inner_w = board_w.max(containers_w) + 2;
        let inner_h = HEADER_ROWS + depth.max(1);
        let frame_w = inner_w + 2;
        let frame_h = inner_h + 2;

        let panel_w = 22;
        let x0 = viewport.width.saturating_sub(frame_w + panel_w) / 2;
        let y0 = viewport.height.saturating_sub(frame_h + 2) / 2;

        fb.fill_rect(x0 + 1, y0 + 1, inner_w, inner_h, ' ', CellStyle::default().on(PLAY_BG));
        fb.draw_frame(x0, y0, frame_w, frame_h, FRAME);

        self.draw_containers(fb, &snap.containers, x0 + 1, y0 + 1, inner_w);

        let board_x = x0 + 1 + inner_w.saturating_sub(board_w) / 2;
        let board_y = y0 + 1 + HEADER_ROWS;
        if !snap.columns.is_empty() {
            let cursor = hud.cursor.min(snap.columns.len() - 1) as u16;
            let marker_x = board_x + cursor * self.cell_w + (self.cell_w - 1) / 2;
            fb.put_char(marker_x, board_y - 1, '▼', LABEL.on(PLAY_BG));
        }
        self.draw_board(fb, &snap.columns, board_x, board_y);

        self.draw_side_panel(fb, snap, hud, viewport, x0 + frame_w + 2, y0);

        if let Some(toast) = hud.toast {
            fb.put_str_centered(x0, y0 + frame_h, frame_w, toast, WARN);
        }
        self.draw_overlay(fb, snap.status, x0, y0, frame_w, frame_h);
    }

    fn draw_containers(
        &self,
        fb: &mut FrameBuffer,
        containers: &[ContainerView],
        x: u16,
        y: u16,
        inner_w: u16,
    ) {
        let slot_w = self.cell_w + 2;
        let total = (containers.len() as u16 * (slot_w + 1)).saturating_sub(1);
        let mut cx = x + inner_w.saturating_sub(total) / 2;
        let bracket = FRAME.on(PLAY_BG);
        for container in containers {
            fb.put_char(cx, y, '[', bracket);
            let (ch, style) = match (container.hole, container.phase) {
                (Some(hole), Some(phase)) => {
                    let ch = match phase {
                        HolePhase::Moving => '░',
                        HolePhase::Waiting => '█',
                        HolePhase::Claimed => '▒',
                    };
                    (ch, hole_style(&hole))
                }
                _ => ('·', CellStyle::fg(Rgb::new(90, 90, 100)).on(PLAY_BG).dim()),
            };
            fb.fill_rect(cx + 1, y, self.cell_w, 1, ch, style);
            fb.put_char(cx + 1 + self.cell_w, y, ']', bracket);
            cx += slot_w + 1;
        }
    }

    fn draw_board(&self, fb: &mut FrameBuffer, columns: &[Vec<HoleView>], x: u16, y: u16) {
        let glyphs = self.cell_w - 1;
        for (c, holes) in columns.iter().enumerate() {
            let cx = x + c as u16 * self.cell_w;
            for (r, hole) in holes.iter().enumerate() {
                let ch = match (hole.color, hole.grouped) {
                    (None, _) => '?',
                    (Some(_), true) => '▓',
                    (Some(_), false) => '█',
                };
                fb.fill_rect(cx, y + r as u16, glyphs, 1, ch, hole_style(hole));
            }
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &LevelSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        x: u16,
        top: u16,
    ) {
        if x.saturating_add(12) > viewport.width {
            return;
        }
        let mut y = top;

        fb.put_str(x, y, "HOLE MATCH", LABEL);
        y += 2;

        fb.put_str(x, y, "LEVEL", LABEL);
        y += 1;
        let end = fb.put_u32(x, y, hud.level_index as u32 + 1, VALUE);
        fb.put_char(end, y, '/', VALUE);
        fb.put_u32(end + 1, y, hud.level_count as u32, VALUE);
        y += 2;

        fb.put_str(x, y, "TIME", LABEL);
        y += 1;
        match snap.time_remaining_secs {
            Some(secs) => {
                let style = if snap.timer_warning { WARN } else { VALUE };
                let end = fb.put_u32(x, y, secs, style);
                fb.put_char(end, y, 's', style);
            }
            None => {
                fb.put_str(x, y, "--", VALUE);
            }
        }
        y += 2;

        let parked = snap
            .cars
            .iter()
            .filter(|c| c.phase == CarPhase::Parked)
            .count();
        fb.put_str(x, y, "CARS", LABEL);
        y += 1;
        let end = fb.put_u32(x, y, parked as u32, VALUE);
        let end = fb.put_str(end, y, " parked / ", VALUE.dim());
        fb.put_u32(end, y, snap.cars.len() as u32, VALUE);
        y += 1;
        let list_end = viewport.height.saturating_sub(6);
        for car in snap.cars.iter().filter(|c| c.phase != CarPhase::Parked) {
            if y >= list_end {
                break;
            }
            fb.put_char(x, y, '■', CellStyle::fg(hole_rgb(car.color)));
            let phase = match car.phase {
                CarPhase::Parked => "parked",
                CarPhase::Driving => "driving",
                CarPhase::Returning => "returning",
                CarPhase::Falling => "falling",
            };
            fb.put_str(x + 2, y, phase, VALUE.dim());
            y += 1;
        }
        y += 1;

        if !snap.pending_partners.is_empty() {
            fb.put_str(x, y, "QUEUED", LABEL);
            fb.put_u32(x + 7, y, snap.pending_partners.len() as u32, VALUE);
            y += 2;
        }

        fb.put_str(x, y, "AI", LABEL);
        y += 1;
        match hud.adapter {
            Some(st) => {
                let end = fb.put_str(x, y, "ON ", VALUE);
                let end = fb.put_u32(end, y, u32::from(st.client_count), VALUE);
                fb.put_str(end, y, " clients", VALUE.dim());
                y += 1;
                let end = fb.put_str(x, y, "CTRL ", VALUE);
                match st.controller_id {
                    Some(id) => {
                        fb.put_u32(end, y, id as u32, VALUE);
                    }
                    None => {
                        fb.put_char(end, y, '-', VALUE);
                    }
                }
            }
            None => {
                fb.put_str(x, y, "OFF", VALUE);
            }
        }
    }

    fn draw_overlay(
        &self,
        fb: &mut FrameBuffer,
        status: LevelStatus,
        x: u16,
        y: u16,
        frame_w: u16,
        frame_h: u16,
    ) {
        let (title, hint) = match status {
            LevelStatus::Playing => return,
            LevelStatus::Won => ("LEVEL COMPLETE", "n: next  r: replay"),
            LevelStatus::Failed(FailReason::TimeUp) => ("TIME UP", "r: retry"),
            LevelStatus::Failed(FailReason::NoSpace) => ("OUT OF SPACE", "r: retry"),
        };
        let mid = y + frame_h / 2;
        let banner = CellStyle::fg(Rgb::new(255, 255, 255)).bold();
        fb.fill_rect(x + 1, mid.saturating_sub(1), frame_w.saturating_sub(2), 3, ' ', CellStyle::default());
        fb.put_str_centered(x, mid.saturating_sub(1), frame_w, title, banner);
        fb.put_str_centered(x, mid + 1, frame_w, hint, VALUE.dim());
    }
}

fn hole_style(hole: &HoleView) -> CellStyle {
    match hole.color {
        Some(color) => CellStyle::fg(hole_rgb(color)).on(PLAY_BG),
        None => CellStyle::fg(Rgb::new(150, 150, 160)).on(Rgb::new(50, 50, 60)).bold(),
    }
}

/// Terminal colour for a hole / car tag.
pub fn hole_rgb(color: HoleColor) -> Rgb {
    match color {
        HoleColor::Red => Rgb::new(220, 60, 60),
        HoleColor::Yellow => Rgb::new(240, 220, 70),
        HoleColor::Purple => Rgb::new(150, 80, 200),
        HoleColor::Pink => Rgb::new(235, 100, 170),
        HoleColor::LightPink => Rgb::new(250, 180, 210),
        HoleColor::Orange => Rgb::new(250, 150, 40),
        HoleColor::Blue => Rgb::new(60, 110, 230),
        HoleColor::LightBlue => Rgb::new(120, 200, 250),
        HoleColor::DarkBlue => Rgb::new(30, 50, 140),
        HoleColor::Green => Rgb::new(70, 190, 80),
        HoleColor::LightGreen => Rgb::new(150, 230, 140),
        HoleColor::DarkGreen => Rgb::new(30, 110, 50),
        HoleColor::LightBrown => Rgb::new(190, 140, 90),
        HoleColor::DarkBrown => Rgb::new(110, 70, 40),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_color_is_distinct() {
        for (i, a) in HoleColor::ALL.iter().enumerate() {
            for b in &HoleColor::ALL[i + 1..] {
                assert_ne!(hole_rgb(*a), hole_rgb(*b), "{a} and {b}");
            }
        }
    }
}
