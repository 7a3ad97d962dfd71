//! Screen state machine
//!
//! The presentation layer maps keys to [`ScreenEvent`]s (1, 2, M, R, Space,
//! Esc) and draws whatever [`App::view`] returns. The simulations themselves
//! never look at which screen is active.

use super::state::Entity;
use super::tick::{ArcadeInput, ArcadeSim, DebugSim, FrameReport};
use crate::{Rect, Tuning};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    /// Free-roaming quadtree demonstration
    Debug,
    /// Survival round
    Arcade,
}

/// Discrete input events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    SelectDebug,
    SelectArcade,
    ToMenu,
    Reset,
    ToggleGrid,
    Quit,
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone)]
pub struct FrameView<'a> {
    pub screen: Screen,
    pub entities: &'a [Entity],
    pub player: Option<&'a Entity>,
    /// Index node boundaries, present only when the overlay is on
    pub grid: Option<Vec<Rect>>,
    pub survival_time: f32,
    pub game_over: bool,
}

/// Top-level application state
#[derive(Debug, Clone)]
pub struct App {
    pub screen: Screen,
    pub tuning: Tuning,
    debug: Option<DebugSim>,
    arcade: Option<ArcadeSim>,
    show_grid_debug: bool,
    show_grid_arcade: bool,
    quit: bool,
    seed: u64,
}

impl App {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            screen: Screen::Menu,
            tuning,
            debug: None,
            arcade: None,
            show_grid_debug: false,
            show_grid_arcade: false,
            quit: false,
            seed,
        }
    }

    /// Each fresh simulation gets its own seed so restarts differ
    fn next_seed(&mut self) -> u64 {
        let seed = self.seed;
        self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        seed
    }

    fn start_debug(&mut self) {
        let seed = self.next_seed();
        self.debug = Some(DebugSim::new(self.tuning.clone(), seed));
    }

    fn start_arcade(&mut self) {
        let seed = self.next_seed();
        self.arcade = Some(ArcadeSim::new(self.tuning.clone(), seed));
    }

    /// Apply one input event. Events that mean nothing on the current screen
    /// are ignored.
    pub fn handle(&mut self, event: ScreenEvent) {
        let before = self.screen;
        match (self.screen, event) {
            (_, ScreenEvent::Quit) => self.quit = true,
            (Screen::Menu, ScreenEvent::SelectDebug) => {
                self.start_debug();
                self.screen = Screen::Debug;
            }
            (Screen::Menu, ScreenEvent::SelectArcade) => {
                self.start_arcade();
                self.screen = Screen::Arcade;
            }
            (Screen::Debug | Screen::Arcade, ScreenEvent::ToMenu) => self.screen = Screen::Menu,
            (Screen::Arcade, ScreenEvent::Reset) => self.start_arcade(),
            (Screen::Debug, ScreenEvent::Reset) => self.start_debug(),
            (Screen::Debug, ScreenEvent::ToggleGrid) => self.show_grid_debug = !self.show_grid_debug,
            (Screen::Arcade, ScreenEvent::ToggleGrid) => {
                self.show_grid_arcade = !self.show_grid_arcade
            }
            _ => {}
        }
        if self.screen != before {
            log::info!("Screen {:?} -> {:?}", before, self.screen);
        }
    }

    /// Advance the active simulation. The menu does not simulate.
    pub fn frame(&mut self, dt: f32, input: &ArcadeInput) -> Option<FrameReport> {
        let dt = dt.max(0.0);
        match self.screen {
            Screen::Menu => None,
            Screen::Debug => self.debug.as_mut().map(|sim| sim.step(dt)),
            Screen::Arcade => self.arcade.as_mut().map(|sim| sim.step(dt, input)),
        }
    }

    /// Snapshot for drawing
    pub fn view(&self) -> FrameView<'_> {
        let empty = FrameView {
            screen: self.screen,
            entities: &[],
            player: None,
            grid: None,
            survival_time: 0.0,
            game_over: false,
        };
        match self.screen {
            Screen::Menu => empty,
            Screen::Debug => match &self.debug {
                Some(sim) => FrameView {
                    entities: sim.entities(),
                    grid: self.show_grid_debug.then(|| sim.debug_rects()),
                    ..empty
                },
                None => empty,
            },
            Screen::Arcade => match &self.arcade {
                Some(sim) => FrameView {
                    entities: sim.entities(),
                    player: sim.player(),
                    grid: self.show_grid_arcade.then(|| sim.debug_rects()),
                    survival_time: sim.survival_time,
                    game_over: sim.game_over,
                    ..empty
                },
                None => empty,
            },
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn debug_sim(&self) -> Option<&DebugSim> {
        self.debug.as_ref()
    }

    pub fn arcade_sim(&self) -> Option<&ArcadeSim> {
        self.arcade.as_ref()
    }

    /// Mutable access for scripted scenarios
    pub fn arcade_sim_mut(&mut self) -> Option<&mut ArcadeSim> {
        self.arcade.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_transitions() {
        let mut app = App::new(Tuning::default(), 1);
        assert_eq!(app.screen, Screen::Menu);

        // Reset and grid toggles mean nothing on the menu
        app.handle(ScreenEvent::Reset);
        app.handle(ScreenEvent::ToggleGrid);
        assert_eq!(app.screen, Screen::Menu);
        assert!(app.arcade_sim().is_none());

        app.handle(ScreenEvent::SelectDebug);
        assert_eq!(app.screen, Screen::Debug);
        // Selecting another mode requires going through the menu
        app.handle(ScreenEvent::SelectArcade);
        assert_eq!(app.screen, Screen::Debug);

        app.handle(ScreenEvent::ToMenu);
        app.handle(ScreenEvent::SelectArcade);
        assert_eq!(app.screen, Screen::Arcade);
        assert!(!app.should_quit());

        app.handle(ScreenEvent::Quit);
        assert!(app.should_quit());
    }

    #[test]
    fn test_menu_frame_does_nothing() {
        let mut app = App::new(Tuning::default(), 1);
        assert!(app.frame(0.016, &ArcadeInput::default()).is_none());
        let view = app.view();
        assert!(view.entities.is_empty());
        assert!(view.grid.is_none());
    }

    #[test]
    fn test_grid_overlay_toggle() {
        let mut app = App::new(Tuning::default(), 1);
        app.handle(ScreenEvent::SelectDebug);
        app.frame(0.016, &ArcadeInput::default());
        assert!(app.view().grid.is_none());

        app.handle(ScreenEvent::ToggleGrid);
        let grid = app.view().grid.expect("overlay enabled");
        assert_eq!(grid[0], app.tuning.world());
        // 80 entities with capacity 4 must have subdivided
        assert!(grid.len() > 1);

        app.handle(ScreenEvent::ToggleGrid);
        assert!(app.view().grid.is_none());
    }

    #[test]
    fn test_returning_to_menu_keeps_round_but_reselect_restarts() {
        let mut app = App::new(Tuning::default(), 1);
        app.handle(ScreenEvent::SelectArcade);
        for _ in 0..10 {
            app.frame(0.016, &ArcadeInput::default());
        }
        let time = app.arcade_sim().map(|s| s.survival_time).unwrap_or(0.0);
        assert!(time > 0.0);

        app.handle(ScreenEvent::ToMenu);
        assert!(app.arcade_sim().is_some());

        app.handle(ScreenEvent::SelectArcade);
        assert_eq!(app.arcade_sim().map(|s| s.survival_time), Some(0.0));
    }
}
