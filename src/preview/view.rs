use raylib::prelude::*;

use crate::sequencer::Snapshot;
use crate::simulation::Simulation;

const ACCENT: Color = Color::new(249, 115, 22, 255);
const DOT_RADIUS: f32 = 7.0;
const DOT_SPACING: i32 = 28;
const MARGIN: i32 = 64;
const WRAP_COLUMNS: usize = 64;

// One tint per clip layer, cycled.
const LAYER_TINTS: [Color; 4] = [
    Color::new(30, 58, 95, 255),
    Color::new(20, 83, 45, 255),
    Color::new(88, 28, 135, 255),
    Color::new(127, 29, 29, 255),
];

fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

fn eased(progress: f32) -> f32 {
    ease::sine_in_out(progress, 0.0, 1.0, 1.0)
}

fn dot_center(index: usize, screen_height: i32) -> (i32, i32) {
    (MARGIN + index as i32 * DOT_SPACING, screen_height - MARGIN)
}

/// Index of the indicator dot under `mouse`, if any.
pub fn indicator_hit(mouse: Vector2, slide_count: usize, screen_height: i32) -> Option<usize> {
    (0..slide_count).find(|&index| {
        let (x, y) = dot_center(index, screen_height);
        let dx = mouse.x - x as f32;
        let dy = mouse.y - y as f32;
        dx * dx + dy * dy <= (DOT_RADIUS * 2.0).powi(2)
    })
}

fn wrap(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + word.len() + 1 > WRAP_COLUMNS {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

pub fn draw(d: &mut RaylibDrawHandle, simulation: &Simulation, time: f64) {
    let snapshot = simulation.snapshot();
    let width = d.get_screen_width();
    let height = d.get_screen_height();

    d.clear_background(Color::BLACK);

    draw_layers(d, &snapshot, width, height);
    draw_content(d, &snapshot, height);
    draw_indicators(d, &snapshot, height);
    draw_status(d, simulation, &snapshot, width, height);

    if !snapshot.ready {
        let center = Vector2::new(width as f32 * 0.5, height as f32 * 0.5);
        let start = (time * 360.0) as f32 % 360.0;
        d.draw_ring(center, 18.0, 24.0, start, start + 270.0, 32, ACCENT);
    }
}

fn draw_layers(d: &mut RaylibDrawHandle, snapshot: &Snapshot, width: i32, height: i32) {
    // Slide crossfade: the whole stack fades in over the previous slide.
    let slide_alpha = snapshot.slide_crossfade.map_or(1.0, |fade| eased(fade.progress));

    for (index, target) in snapshot.clip_opacity.iter().enumerate() {
        let mut alpha = *target;
        if let Some(fade) = snapshot.clip_crossfade {
            if fade.to == index {
                alpha *= eased(fade.progress);
            }
        }
        if alpha <= 0.0 {
            continue;
        }
        let tint = LAYER_TINTS[(snapshot.slide + index) % LAYER_TINTS.len()];
        // Darkened like the page's brightness filter.
        d.draw_rectangle(0, 0, width, height, with_alpha(tint, alpha * slide_alpha * 0.4));
    }
}

fn draw_content(d: &mut RaylibDrawHandle, snapshot: &Snapshot, height: i32) {
    let mut y = height / 3;
    d.draw_text(&snapshot.title, MARGIN, y, 60, Color::WHITE);
    y += 84;

    for line in wrap(&snapshot.description) {
        d.draw_text(&line, MARGIN, y, 22, Color::LIGHTGRAY);
        y += 30;
    }

    if !snapshot.cta_label.is_empty() {
        y += 24;
        d.draw_rectangle(MARGIN, y, 260, 52, ACCENT);
        d.draw_text(&snapshot.cta_label, MARGIN + 20, y + 16, 20, Color::WHITE);
        d.draw_text(&snapshot.cta_target, MARGIN + 280, y + 16, 20, Color::GRAY);
    }
}

fn draw_indicators(d: &mut RaylibDrawHandle, snapshot: &Snapshot, height: i32) {
    for (index, active) in snapshot.indicators.iter().enumerate() {
        let (x, y) = dot_center(index, height);
        if *active {
            d.draw_circle(x, y, DOT_RADIUS * 1.6, with_alpha(ACCENT, 0.2));
            d.draw_circle(x, y, DOT_RADIUS, ACCENT);
        } else {
            d.draw_circle(x, y, DOT_RADIUS, with_alpha(Color::WHITE, 0.3));
        }
    }
}

fn draw_status(d: &mut RaylibDrawHandle, simulation: &Simulation, snapshot: &Snapshot, width: i32, height: i32) {
    let sequencer = simulation.sequencer();
    let clip = sequencer
        .player(snapshot.slide)
        .and_then(|player| player.clip(snapshot.clip));

    let (position, duration) = clip.map_or((0.0, None), |clip| (clip.position(), clip.duration()));
    let status = format!(
        "slide {}/{}  clip {}/{}  {:.1}s / {}  {:?}",
        snapshot.slide + 1,
        snapshot.indicators.len(),
        snapshot.clip + 1,
        snapshot.clip_opacity.len(),
        position,
        duration.map_or("?".to_string(), |value| format!("{value:.1}s")),
        snapshot.phase,
    );
    d.draw_text(&status, width - 520, 20, 18, Color::GRAY);

    if let Some(duration) = duration {
        let fraction = (position / duration).clamp(0.0, 1.0) as f32;
        let bar_width = width - MARGIN * 2;
        d.draw_rectangle(MARGIN, height - 24, bar_width, 3, with_alpha(Color::WHITE, 0.2));
        d.draw_rectangle(MARGIN, height - 24, (bar_width as f32 * fraction) as i32, 3, ACCENT);
    }
}
