//! Ripple - headless SPH fluid demo
//!
//! Runs a fixed number of frames while a scripted cursor sweeps across the
//! viewport, alternately attracting and repelling the fluid, and logs the
//! density error as it goes.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use ripple::prelude::*;

const FRAMES: u32 = 600;
const REPORT_EVERY: u64 = 60;

fn main() {
    let mut app = build_app("presets.json");

    app.finish();
    app.cleanup();
    for _ in 0..FRAMES {
        app.update();
    }

    if let Some(simulation) = app.world().get_resource::<FluidSimulation>() {
        info!(
            "Finished {} frames: density error {:.3}, kinetic energy {:.1}",
            simulation.frame(),
            simulation.average_density_error(),
            simulation.kinetic_energy()
        );
    }
}

/// Demo app with logging installed ahead of preset loading, so preset
/// warnings reach the log.
fn build_app(preset_path: &str) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let params = PresetLibrary::load_or_builtin(preset_path)
        .current_preset()
        .map(|preset| preset.params)
        .unwrap_or_default()
        .with_viewport(1280.0, 720.0)
        .with_window(1280.0, 720.0);

    app.add_plugins(
        FluidPlugin::with_params(params)
            .with_particle_count(4000)
            .with_seed(42)
            .with_fixed_timestep(1.0 / 60.0),
    )
    .add_systems(Update, (sweep_cursor, report_progress));
    app
}

/// Move the cursor along a figure eight, switching between attract and
/// repel every two seconds of simulated time.
fn sweep_cursor(state: Res<FluidState>, mut params: ResMut<SimParams>) {
    let t = state.frame as f32 / 60.0;
    let center = params.viewport() * 0.5;
    let reach = params.viewport() * 0.3;

    params.mouse_x = center.x + reach.x * t.sin();
    params.mouse_y = center.y + reach.y * (2.0 * t).sin() * 0.5;
    params.mouse_strength = if (t / 2.0) as u32 % 2 == 0 {
        -MOUSE_STRENGTH
    } else {
        MOUSE_STRENGTH
    };
}

fn report_progress(state: Res<FluidState>) {
    if state.frame > 0 && state.frame % REPORT_EVERY == 0 {
        info!(
            "Frame {}: {} particles, density error {:.3}",
            state.frame, state.particle_count, state.avg_density_error
        );
    }
}
