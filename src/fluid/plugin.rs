//! Bevy plugin for fluid simulation.

use bevy::prelude::*;

use super::params::{SimParams, MOUSE_STRENGTH};
use super::simulation::FluidSimulation;

/// Plugin that adds the SPH fluid simulation to a Bevy app.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use ripple::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(MinimalPlugins)
///         .add_plugins(FluidPlugin::default().with_particle_count(2000))
///         .run();
/// }
/// ```
#[derive(Clone, Debug)]
pub struct FluidPlugin {
    /// Number of particles scattered at startup.
    pub particle_count: usize,
    /// Seed for the initial scatter. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Fixed frame time. `None` uses the frame delta.
    pub fixed_timestep: Option<f32>,
    /// Upper bound on a frame's `delta_t`.
    pub max_timestep: f32,
    /// Parameters installed at startup.
    pub params: SimParams,
}

impl Default for FluidPlugin {
    fn default() -> Self {
        Self {
            particle_count: 4000,
            seed: None,
            fixed_timestep: None,
            max_timestep: 1.0 / 30.0,
            params: SimParams::default(),
        }
    }
}

impl FluidPlugin {
    pub fn with_params(params: SimParams) -> Self {
        Self {
            params,
            ..default()
        }
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_fixed_timestep(mut self, dt: f32) -> Self {
        self.fixed_timestep = Some(dt);
        self
    }
}

/// Startup and timing settings copied out of [`FluidPlugin`].
#[derive(Resource, Clone, Debug)]
pub struct FluidSettings {
    pub particle_count: usize,
    pub seed: Option<u64>,
    pub fixed_timestep: Option<f32>,
    pub max_timestep: f32,
}

/// Simulation state for the host UI.
#[derive(Resource, Default, Debug)]
pub struct FluidState {
    pub paused: bool,
    pub step_requested: bool,
    pub frame: u64,
    pub particle_count: usize,
    pub avg_density_error: f32,
}

impl FluidState {
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advance exactly one frame while paused.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }
}

/// Interaction strength for the held mouse button: left attracts, right
/// repels, anything else is neutral.
pub fn mouse_strength_for(button: Option<MouseButton>) -> f32 {
    match button {
        Some(MouseButton::Left) => -MOUSE_STRENGTH,
        Some(MouseButton::Right) => MOUSE_STRENGTH,
        _ => 0.0,
    }
}

impl Plugin for FluidPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.params)
            .insert_resource(FluidSettings {
                particle_count: self.particle_count,
                seed: self.seed,
                fixed_timestep: self.fixed_timestep,
                max_timestep: self.max_timestep,
            })
            .init_resource::<FluidState>();

        app.add_systems(Startup, seed_particles);
        app.add_systems(Update, (apply_mouse_buttons, run_simulation).chain());
    }
}

/// Scatter the initial population.
fn seed_particles(
    mut commands: Commands,
    settings: Res<FluidSettings>,
    params: Res<SimParams>,
    mut state: ResMut<FluidState>,
) {
    let simulation = match settings.seed {
        Some(seed) => FluidSimulation::with_seed(settings.particle_count, *params, seed),
        None => FluidSimulation::new(settings.particle_count, *params),
    };

    match simulation {
        Ok(simulation) => {
            state.particle_count = simulation.particle_count();
            commands.insert_resource(simulation);
        }
        Err(err) => error!("Failed to start fluid simulation: {err}"),
    }
}

/// Map held mouse buttons to the interaction strength.
fn apply_mouse_buttons(
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    mut params: ResMut<SimParams>,
) {
    let Some(buttons) = buttons else {
        return;
    };
    let held = [MouseButton::Left, MouseButton::Right]
        .into_iter()
        .find(|&button| buttons.pressed(button));
    let strength = mouse_strength_for(held);
    if params.mouse_strength != strength {
        params.mouse_strength = strength;
    }
}

/// Step the simulation with this frame's parameter snapshot.
fn run_simulation(
    time: Res<Time>,
    settings: Res<FluidSettings>,
    params: Res<SimParams>,
    simulation: Option<ResMut<FluidSimulation>>,
    mut state: ResMut<FluidState>,
) {
    let Some(mut simulation) = simulation else {
        return;
    };

    if state.paused && !state.step_requested {
        return;
    }
    state.step_requested = false;

    let dt = settings
        .fixed_timestep
        .unwrap_or(time.delta_secs())
        .min(settings.max_timestep);
    if dt <= 0.0 {
        return;
    }

    let snapshot = params.with_delta_t(dt);
    if let Err(err) = simulation.step_frame(&snapshot) {
        warn!("Skipping fluid frame: {err}");
        return;
    }

    state.frame = simulation.frame();
    state.particle_count = simulation.particle_count();
    state.avg_density_error = simulation.average_density_error();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(plugin: FluidPlugin) -> App {
        let mut app = App::new();
        app.init_resource::<Time>();
        app.add_plugins(plugin);
        app
    }

    #[test]
    fn test_mouse_button_mapping() {
        assert_eq!(mouse_strength_for(Some(MouseButton::Left)), -MOUSE_STRENGTH);
        assert_eq!(mouse_strength_for(Some(MouseButton::Right)), MOUSE_STRENGTH);
        assert_eq!(mouse_strength_for(Some(MouseButton::Middle)), 0.0);
        assert_eq!(mouse_strength_for(None), 0.0);
    }

    #[test]
    fn test_plugin_steps_simulation() {
        let mut app = test_app(
            FluidPlugin::default()
                .with_particle_count(200)
                .with_seed(3)
                .with_fixed_timestep(1.0 / 60.0),
        );
        app.update();
        app.update();

        let state = app.world().resource::<FluidState>();
        assert_eq!(state.particle_count, 200);
        assert_eq!(state.frame, 2);

        let simulation = app.world().resource::<FluidSimulation>();
        assert_eq!(simulation.frame(), 2);
        assert!((simulation.params().delta_t - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_paused_state_single_steps() {
        let mut app = test_app(
            FluidPlugin::default()
                .with_particle_count(50)
                .with_seed(1)
                .with_fixed_timestep(1.0 / 60.0),
        );
        app.world_mut().resource_mut::<FluidState>().toggle_pause();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<FluidSimulation>().frame(), 0);

        app.world_mut().resource_mut::<FluidState>().request_step();
        app.update();
        app.update();
        assert_eq!(app.world().resource::<FluidSimulation>().frame(), 1);
    }

    #[test]
    fn test_timestep_clamped() {
        let mut app = test_app(
            FluidPlugin::default()
                .with_particle_count(20)
                .with_seed(1)
                .with_fixed_timestep(0.5),
        );
        app.update();

        let simulation = app.world().resource::<FluidSimulation>();
        assert!((simulation.params().delta_t - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_startup_params_leave_no_simulation() {
        let params = SimParams {
            smoothing_radius: 0.0,
            ..default()
        };
        let mut app = test_app(FluidPlugin::with_params(params).with_fixed_timestep(1.0 / 60.0));
        app.update();

        assert!(app.world().get_resource::<FluidSimulation>().is_none());
        assert_eq!(app.world().resource::<FluidState>().frame, 0);
    }

    #[test]
    fn test_mouse_buttons_set_strength() {
        let mut app = test_app(
            FluidPlugin::default()
                .with_particle_count(20)
                .with_seed(1)
                .with_fixed_timestep(1.0 / 60.0),
        );
        let mut buttons = ButtonInput::<MouseButton>::default();
        buttons.press(MouseButton::Left);
        app.insert_resource(buttons);
        app.update();

        assert_eq!(
            app.world().resource::<SimParams>().mouse_strength,
            -MOUSE_STRENGTH
        );
    }
}
