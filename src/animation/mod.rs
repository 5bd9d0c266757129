//! Generative background animations keyed by [`AnimationType`].
//!
//! An [`Animator`] owns the per-type scene state and draws onto any [`Surface`].
//! Frames are driven explicitly by the owner; there is no internal loop, so a
//! detached animator can never keep drawing.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::theme::color::{self, ColorError, Rgb};
use crate::theme::AnimationType;

pub mod scenes;
pub mod svg;

pub use scenes::Scene;
pub use svg::SvgSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Rgb,
    pub alpha: f64,
}

impl Rgba {
    pub fn new(rgb: Rgb, alpha: f64) -> Self {
        Self { rgb, alpha }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Rgba),
    LinearGradient {
        from: (f64, f64),
        to: (f64, f64),
        stops: Vec<(f64, Rgba)>,
    },
}

/// Minimal 2D drawing target, shaped after a canvas context.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, paint: &Paint);
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: Rgba);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), color: Rgba, width: f64);
    fn stroke_path(&mut self, points: &[(f64, f64)], color: Rgba, width: f64);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64, color: Rgba);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationConfig {
    pub animation: AnimationType,
    pub accent: Rgb,
}

impl AnimationConfig {
    pub fn new(animation: AnimationType, accent_hex: &str) -> Result<Self, ColorError> {
        Ok(Self {
            animation,
            accent: color::hex_to_rgb(accent_hex)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Uninitialized,
    Running,
    Stopped,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnimatorError {
    #[error("Cannot {action} an animator that is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: AnimatorState,
    },
}

pub struct Animator {
    state: AnimatorState,
    config: AnimationConfig,
    width: f64,
    height: f64,
    t: u64,
    scene: Scene,
    rng: StdRng,
    restarts: u64,
}

impl Animator {
    pub fn new(config: AnimationConfig, seed: u64) -> Self {
        Self {
            state: AnimatorState::Uninitialized,
            config,
            width: 0.0,
            height: 0.0,
            t: 0,
            scene: Scene::Idle,
            rng: StdRng::seed_from_u64(seed),
            restarts: 0,
        }
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn config(&self) -> AnimationConfig {
        self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of stop/reinit/restart cycles caused by configuration changes.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn attach(&mut self, width: f64, height: f64) -> Result<(), AnimatorError> {
        if self.state != AnimatorState::Uninitialized {
            return Err(AnimatorError::InvalidTransition { action: "attach", state: self.state });
        }
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.reseed();
        self.state = AnimatorState::Running;
        Ok(())
    }

    /// Switching animation type or accent tears the scene down and rebuilds it
    /// from scratch; nothing carries over from the previous configuration.
    pub fn configure(&mut self, config: AnimationConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        if self.state == AnimatorState::Running {
            self.scene = Scene::Idle;
            self.reseed();
            self.restarts += 1;
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        if self.state == AnimatorState::Running {
            self.reseed();
        }
    }

    /// Advances one tick and draws it. Returns `false` when nothing was drawn.
    pub fn frame(&mut self, surface: &mut dyn Surface) -> bool {
        if self.state != AnimatorState::Running || self.config.animation == AnimationType::None {
            return false;
        }
        self.t += 1;
        self.scene.draw(
            self.t,
            self.width,
            self.height,
            self.config.accent,
            surface,
            &mut self.rng,
        );
        true
    }

    pub fn detach(&mut self) -> Result<(), AnimatorError> {
        if self.state != AnimatorState::Running {
            return Err(AnimatorError::InvalidTransition { action: "detach", state: self.state });
        }
        self.scene = Scene::Idle;
        self.state = AnimatorState::Stopped;
        Ok(())
    }

    fn reseed(&mut self) {
        self.scene = Scene::seed(self.config.animation, self.width, self.height, &mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        clears: usize,
        rects: usize,
        circles: usize,
        lines: usize,
        paths: usize,
        texts: usize,
    }

    impl Surface for Recorder {
        fn clear(&mut self, _: f64, _: f64) {
            self.clears += 1;
        }
        fn fill_rect(&mut self, _: f64, _: f64, _: f64, _: f64, _: &Paint) {
            self.rects += 1;
        }
        fn fill_circle(&mut self, _: f64, _: f64, _: f64, _: Rgba) {
            self.circles += 1;
        }
        fn stroke_line(&mut self, _: (f64, f64), _: (f64, f64), _: Rgba, _: f64) {
            self.lines += 1;
        }
        fn stroke_path(&mut self, _: &[(f64, f64)], _: Rgba, _: f64) {
            self.paths += 1;
        }
        fn fill_text(&mut self, _: &str, _: f64, _: f64, _: f64, _: Rgba) {
            self.texts += 1;
        }
    }

    fn config(animation: AnimationType) -> AnimationConfig {
        AnimationConfig::new(animation, "#8b5cf6").unwrap()
    }

    #[test]
    fn lifecycle_transitions() {
        let mut anim = Animator::new(config(AnimationType::Snow), 1);
        assert_eq!(anim.state(), AnimatorState::Uninitialized);
        assert!(anim.detach().is_err());
        anim.attach(800.0, 600.0).unwrap();
        assert_eq!(anim.state(), AnimatorState::Running);
        assert!(anim.attach(800.0, 600.0).is_err());
        anim.detach().unwrap();
        assert_eq!(anim.state(), AnimatorState::Stopped);
        assert_eq!(anim.scene().element_count(), 0);

        let mut rec = Recorder::default();
        assert!(!anim.frame(&mut rec));
        assert_eq!(rec.circles, 0);
    }

    #[test]
    fn frames_only_draw_while_running() {
        let mut anim = Animator::new(config(AnimationType::Snow), 7);
        let mut rec = Recorder::default();
        assert!(!anim.frame(&mut rec));
        anim.attach(400.0, 300.0).unwrap();
        assert!(anim.frame(&mut rec));
        assert_eq!(rec.clears, 1);
        assert_eq!(rec.circles, 80);
    }

    #[test]
    fn none_draws_nothing() {
        let mut anim = Animator::new(config(AnimationType::None), 1);
        anim.attach(400.0, 300.0).unwrap();
        let mut rec = Recorder::default();
        assert!(!anim.frame(&mut rec));
        assert_eq!(anim.scene().element_count(), 0);
    }

    #[test]
    fn switching_type_fully_reinitializes() {
        let mut anim = Animator::new(config(AnimationType::Particles), 3);
        anim.attach(1000.0, 500.0).unwrap();
        assert!(matches!(anim.scene(), Scene::Particles(p) if p.len() == 50));
        let mut rec = Recorder::default();
        anim.frame(&mut rec);

        anim.configure(config(AnimationType::Waves));
        assert_eq!(anim.restarts(), 1);
        assert!(matches!(anim.scene(), Scene::Waves));
        assert_eq!(anim.scene().element_count(), 0);

        let mut rec = Recorder::default();
        anim.frame(&mut rec);
        assert_eq!(rec.circles, 0);
        assert_eq!(rec.paths, 5);
    }

    #[test]
    fn accent_change_restarts_but_same_config_does_not() {
        let mut anim = Animator::new(config(AnimationType::Matrix), 3);
        anim.attach(320.0, 200.0).unwrap();
        anim.configure(config(AnimationType::Matrix));
        assert_eq!(anim.restarts(), 0);
        anim.configure(AnimationConfig::new(AnimationType::Matrix, "#ff0000").unwrap());
        assert_eq!(anim.restarts(), 1);
        assert_eq!(anim.scene().element_count(), 20);
    }

    #[test]
    fn resize_reseeds_from_new_dimensions() {
        let mut anim = Animator::new(config(AnimationType::Particles), 9);
        anim.attach(100.0, 100.0).unwrap();
        assert_eq!(anim.scene().element_count(), 1);
        anim.resize(1000.0, 1000.0);
        assert_eq!(anim.scene().element_count(), 100);
        assert_eq!(anim.size(), (1000.0, 1000.0));
    }

    #[test]
    fn invalid_accent_is_rejected() {
        assert!(AnimationConfig::new(AnimationType::Snow, "purple").is_err());
    }
}
