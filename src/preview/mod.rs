//! Interactive preview window. Clips are drawn as tinted layers since no video
//! is decoded here; everything else is what the page would render.

mod view;

use raylib::prelude::*;
use tracing::warn;

use crate::constants::*;
use crate::simulation::Simulation;

pub fn run(simulation: &mut Simulation) {
    let (mut rl, thread) = raylib::init()
        .size(PREVIEW_WIDTH, PREVIEW_HEIGHT)
        .title("Hero Reel Preview")
        .vsync()
        .resizable()
        .build();
    rl.set_target_fps(FPS);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let slide_count = simulation.sequencer().track().len();

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        simulation.step(dt);

        // --- Input: indicator clicks and arrow keys jump ---
        let current = simulation.sequencer().position().slide;
        let mut jump = None;
        if rl.is_mouse_button_pressed(MouseButton::MOUSE_BUTTON_LEFT) {
            let mouse = rl.get_mouse_position();
            let height = rl.get_screen_height();
            jump = view::indicator_hit(mouse, slide_count, height);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_RIGHT) {
            jump = Some((current + 1) % slide_count);
        }
        if rl.is_key_pressed(KeyboardKey::KEY_LEFT) {
            jump = Some((current + slide_count - 1) % slide_count);
        }
        if let Some(index) = jump {
            if let Err(e) = simulation.jump_to(index) {
                warn!(error = %e, "jump ignored");
            }
        }

        let time = rl.get_time();
        let mut d = rl.begin_drawing(&thread);
        view::draw(&mut d, simulation, time);
    }
}
