//! Quad Fusion headless driver
//!
//! Runs one mode at a fixed frame step and logs what the simulation did.
//! Windowing, drawing and audio belong to a presentation layer built on top
//! of `quad_fusion::sim::App`.
//!
//! Usage: `quad-fusion [debug|arcade] [frames] [seed] [config.json]`

use glam::Vec2;

use quad_fusion::Tuning;
use quad_fusion::consts::FRAME_DT;
use quad_fusion::hud::format_time;
use quad_fusion::sim::{App, ArcadeInput, Screen, ScreenEvent};

fn load_tuning(path: Option<&str>) -> Tuning {
    let Some(path) = path else {
        return Tuning::default();
    };
    match Tuning::load(path) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::warn!("{}; using default tuning", e);
            Tuning::default()
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("arcade");
    let frames: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(600);
    let seed: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(12345);
    let tuning = load_tuning(args.get(3).map(String::as_str));

    log::info!("Quad Fusion (headless) starting: mode={} frames={} seed={}", mode, frames, seed);

    let mut app = App::new(tuning, seed);
    match mode {
        "debug" => app.handle(ScreenEvent::SelectDebug),
        "arcade" => app.handle(ScreenEvent::SelectArcade),
        other => {
            log::error!("unknown mode '{}', expected 'debug' or 'arcade'", other);
            std::process::exit(2);
        }
    }
    app.handle(ScreenEvent::ToggleGrid);

    let mut fusions = 0;
    let mut peak_collisions = 0;
    for frame in 0..frames {
        // Circle the center so the arcade player is not a sitting duck
        let angle = frame as f32 * FRAME_DT;
        let input = ArcadeInput {
            direction: Vec2::new(angle.cos(), angle.sin()),
        };
        let Some(report) = app.frame(FRAME_DT, &input) else {
            break;
        };
        fusions += report.fusions;
        peak_collisions = peak_collisions.max(report.collisions);
        if report.game_over {
            log::info!("Round ended on frame {}", frame);
            break;
        }
    }

    let view = app.view();
    let nodes = view.grid.as_ref().map_or(0, Vec::len);
    let max_stage = view.entities.iter().map(|e| e.fusion_stage).max().unwrap_or(0);
    match view.screen {
        Screen::Debug => println!(
            "debug: {} entities, {} colliding now, peak overlaps {}, {} index nodes",
            view.entities.len(),
            view.entities.iter().filter(|e| e.colliding).count(),
            peak_collisions,
            nodes
        ),
        Screen::Arcade => println!(
            "arcade: survived {}{}, {} enemies, {} fusions, max stage {}, {} index nodes",
            format_time(view.survival_time),
            if view.game_over { " (game over)" } else { "" },
            view.entities.len(),
            fusions,
            max_stage,
            nodes
        ),
        Screen::Menu => {}
    }
}
