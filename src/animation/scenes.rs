use rand::Rng;
use std::f64::consts::PI;

use super::{Paint, Rgba, Surface};
use crate::theme::color::Rgb;
use crate::theme::AnimationType;

const LINK_DISTANCE: f64 = 120.0;
const MATRIX_COLUMN_WIDTH: f64 = 16.0;
const MATRIX_FONT_SIZE: f64 = 14.0;
const MATRIX_GLYPHS: usize = 20;
const SNOW_FLAKES: usize = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub r: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixColumn {
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub glyphs: Vec<char>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snowflake {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub speed: f64,
    pub wobble: f64,
}

/// Per-type animation state. `Gradient` and `Waves` are pure functions of the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Scene {
    Idle,
    Particles(Vec<Particle>),
    Gradient,
    Waves,
    Matrix(Vec<MatrixColumn>),
    Snow(Vec<Snowflake>),
}

impl Scene {
    pub fn seed<R: Rng + ?Sized>(animation: AnimationType, width: f64, height: f64, rng: &mut R) -> Self {
        match animation {
            AnimationType::None => Scene::Idle,
            AnimationType::Gradient => Scene::Gradient,
            AnimationType::Waves => Scene::Waves,
            AnimationType::Particles => {
                let count = (width * height / 10_000.0).floor() as usize;
                Scene::Particles(
                    (0..count)
                        .map(|_| Particle {
                            x: rng.gen::<f64>() * width,
                            y: rng.gen::<f64>() * height,
                            vx: (rng.gen::<f64>() - 0.5) * 0.5,
                            vy: (rng.gen::<f64>() - 0.5) * 0.5,
                            r: rng.gen::<f64>() * 2.0 + 0.5,
                            alpha: rng.gen::<f64>() * 0.5 + 0.15,
                        })
                        .collect(),
                )
            }
            AnimationType::Matrix => {
                let columns = (width / MATRIX_COLUMN_WIDTH).floor() as usize;
                Scene::Matrix(
                    (0..columns)
                        .map(|i| MatrixColumn {
                            x: i as f64 * MATRIX_COLUMN_WIDTH,
                            y: -rng.gen::<f64>() * height,
                            speed: rng.gen::<f64>() * 3.0 + 1.5,
                            glyphs: (0..MATRIX_GLYPHS).map(|_| katakana(rng)).collect(),
                        })
                        .collect(),
                )
            }
            AnimationType::Snow => Scene::Snow(
                (0..SNOW_FLAKES)
                    .map(|_| Snowflake {
                        x: rng.gen::<f64>() * width,
                        y: rng.gen::<f64>() * height,
                        r: rng.gen::<f64>() * 3.0 + 1.0,
                        speed: rng.gen::<f64>() * 0.8 + 0.2,
                        wobble: rng.gen::<f64>() * PI * 2.0,
                    })
                    .collect(),
            ),
        }
    }

    /// Number of stateful elements (particles, columns or flakes).
    pub fn element_count(&self) -> usize {
        match self {
            Scene::Particles(p) => p.len(),
            Scene::Matrix(c) => c.len(),
            Scene::Snow(f) => f.len(),
            Scene::Idle | Scene::Gradient | Scene::Waves => 0,
        }
    }

    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        t: u64,
        width: f64,
        height: f64,
        accent: Rgb,
        surface: &mut dyn Surface,
        rng: &mut R,
    ) {
        let t = t as f64;
        match self {
            Scene::Idle => {}
            Scene::Particles(particles) => draw_particles(particles, width, height, accent, surface),
            Scene::Gradient => {
                let shift = t * 0.005;
                let paint = Paint::LinearGradient {
                    from: (width * (0.5 + 0.5 * shift.sin()), 0.0),
                    to: (width * (0.5 + 0.5 * shift.cos()), height),
                    stops: vec![
                        (0.0, Rgba::new(accent, 0.12)),
                        (0.5, Rgba::new(accent, 0.04)),
                        (1.0, Rgba::new(accent, 0.1)),
                    ],
                };
                surface.fill_rect(0.0, 0.0, width, height, &paint);
            }
            Scene::Waves => {
                surface.clear(width, height);
                for line in 0..5 {
                    let l = line as f64;
                    let base_y = height * 0.3 + l * (height * 0.12);
                    let amp = 30.0 + l * 8.0;
                    let freq = 0.004 - l * 0.0005;
                    let phase = t * (0.02 + l * 0.005);
                    let mut points = Vec::new();
                    let mut x = 0.0;
                    while x <= width {
                        points.push((x, base_y + (x * freq + phase).sin() * amp));
                        x += 3.0;
                    }
                    surface.stroke_path(&points, Rgba::new(accent, 0.15 - l * 0.02), 1.5);
                }
            }
            Scene::Matrix(columns) => {
                let fade = Paint::Solid(Rgba::new(Rgb { r: 0, g: 0, b: 0 }, 0.06));
                surface.fill_rect(0.0, 0.0, width, height, &fade);
                for col in columns.iter_mut() {
                    if col.glyphs.is_empty() {
                        continue;
                    }
                    let glyph = col.glyphs[rng.gen_range(0..col.glyphs.len())];
                    surface.fill_text(
                        glyph.encode_utf8(&mut [0; 4]),
                        col.x,
                        col.y,
                        MATRIX_FONT_SIZE,
                        Rgba::new(accent, 0.7),
                    );
                    col.y += col.speed;
                    if col.y > height {
                        col.y = -20.0;
                    }
                }
            }
            Scene::Snow(flakes) => {
                surface.clear(width, height);
                for flake in flakes.iter_mut() {
                    flake.wobble += 0.01;
                    flake.x += flake.wobble.sin() * 0.5;
                    flake.y += flake.speed;
                    if flake.y > height {
                        flake.y = -5.0;
                        flake.x = rng.gen::<f64>() * width;
                    }
                    surface.fill_circle(flake.x, flake.y, flake.r, Rgba::new(accent, 0.4));
                }
            }
        }
    }
}

fn draw_particles(particles: &mut [Particle], width: f64, height: f64, accent: Rgb, surface: &mut dyn Surface) {
    surface.clear(width, height);
    for p in particles.iter_mut() {
        p.x += p.vx;
        p.y += p.vy;
        if p.x < 0.0 {
            p.x = width;
        } else if p.x > width {
            p.x = 0.0;
        }
        if p.y < 0.0 {
            p.y = height;
        } else if p.y > height {
            p.y = 0.0;
        }
        surface.fill_circle(p.x, p.y, p.r, Rgba::new(accent, p.alpha));
    }
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            let d = (a.x - b.x).hypot(a.y - b.y);
            if d < LINK_DISTANCE {
                surface.stroke_line(
                    (a.x, a.y),
                    (b.x, b.y),
                    Rgba::new(accent, 0.08 * (1.0 - d / LINK_DISTANCE)),
                    1.0,
                );
            }
        }
    }
}

/// A katakana-block glyph in U+30A0..U+3100.
fn katakana<R: Rng + ?Sized>(rng: &mut R) -> char {
    let offset = (rng.gen::<f64>() * 96.0).floor() as u32;
    char::from_u32(0x30A0 + offset).unwrap_or('\u{30A0}')
}
