//! Particle burst engine - spawn, physics step, and lifecycle

use std::time::{Duration, Instant};

/// Fixed celebration palette (RGB). Drawn from uniformly at spawn time.
pub const PALETTE: [(u8, u8, u8); 7] = [
    (232, 93, 117),  // primary pink
    (255, 123, 147), // light pink
    (249, 168, 37),  // gold
    (255, 217, 90),  // light gold
    (255, 255, 255), // white
    (100, 181, 246), // light blue
    (186, 104, 200), // purple
];

/// Particle shape. Rectangles render at 0.6x aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rect,
    Circle,
}

/// A single confetti particle. Engine-owned, mutated every frame.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// RGB color from [`PALETTE`]
    pub color: (u8, u8, u8),
    pub size: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Rotation speed in degrees per frame
    pub rotation_speed: f32,
    pub shape: Shape,
    /// 1.0 at spawn, decays once the particle drops below the fade line
    pub opacity: f32,
}

/// Engine tuning. Presentation constants, not algorithmic requirements.
#[derive(Debug, Clone)]
pub struct ConfettiConfig {
    /// Particles spawned per burst
    pub particle_count: usize,
    /// Downward velocity gain per frame
    pub gravity: f32,
    /// Multiplicative velocity damping per frame
    pub friction: f32,
    /// Unconditional auto-stop after a burst
    pub duration: Duration,
    /// Fraction of surface height below which opacity starts decaying
    pub fade_line: f32,
    /// Opacity lost per frame below the fade line
    pub fade_rate: f32,
    /// Particles this far past the bottom edge are dropped
    pub kill_margin: f32,
}

impl Default for ConfettiConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            gravity: 0.3,
            friction: 0.99,
            duration: Duration::from_millis(4000),
            fade_line: 0.8,
            fade_rate: 0.02,
            kill_margin: 50.0,
        }
    }
}

/// Confetti burst engine.
///
/// Owns the live particle set and a virtual pixel surface. `burst` replaces
/// any existing particles outright; `step` advances physics one frame and
/// reports whether the loop should keep running. The auto-stop deadline is
/// unconditional and independent of particle state.
pub struct ConfettiEngine {
    config: ConfettiConfig,
    particles: Vec<Particle>,
    width: f32,
    height: f32,
    running: bool,
    stop_at: Option<Instant>,
}

impl ConfettiEngine {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_config(width, height, ConfettiConfig::default())
    }

    pub fn with_config(width: f32, height: f32, config: ConfettiConfig) -> Self {
        Self {
            config,
            particles: Vec::new(),
            width,
            height,
            running: false,
            stop_at: None,
        }
    }

    /// Resize the surface. Valid at any time, including mid-animation; the
    /// next frame simply uses the new bounds.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Spawn a burst at the given point, replacing any live particle set.
    /// Starts the loop if idle and arms the unconditional stop deadline.
    pub fn burst(&mut self, x: f32, y: f32, now: Instant) {
        self.particles.clear();
        self.particles.reserve(self.config.particle_count);
        for _ in 0..self.config.particle_count {
            self.particles.push(self.spawn_particle(x, y));
        }
        self.running = true;
        self.stop_at = Some(now + self.config.duration);
    }

    /// Burst at the surface center.
    pub fn burst_center(&mut self, now: Instant) {
        self.burst(self.width / 2.0, self.height / 2.0, now);
    }

    /// Halt the loop and drop all particles. The caller is expected to
    /// clear its drawing surface on the next frame.
    pub fn stop(&mut self) {
        self.running = false;
        self.stop_at = None;
        self.particles.clear();
    }

    /// Advance one animation frame. Returns true while the loop is live.
    ///
    /// Applies the physics step to every particle, drops dead ones, and
    /// self-stops when the set empties or the deadline passes.
    pub fn step(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }

        if let Some(deadline) = self.stop_at {
            if now >= deadline {
                self.stop();
                return false;
            }
        }

        let fade_y = self.height * self.config.fade_line;
        for p in &mut self.particles {
            p.vy += self.config.gravity;
            p.vx *= self.config.friction;
            p.vy *= self.config.friction;
            p.x += p.vx;
            p.y += p.vy;
            p.rotation += p.rotation_speed;

            // The only opacity decay trigger: below the fade line.
            if p.y > fade_y {
                p.opacity -= self.config.fade_rate;
            }
        }

        let kill_y = self.height + self.config.kill_margin;
        self.particles.retain(|p| p.opacity > 0.0 && p.y < kill_y);

        if self.particles.is_empty() {
            self.stop();
            return false;
        }

        true
    }

    fn spawn_particle(&self, x: f32, y: f32) -> Particle {
        let angle = fastrand::f32() * std::f32::consts::TAU;
        let speed = 8.0 + fastrand::f32() * 8.0;

        Particle {
            x,
            y,
            vx: angle.cos() * speed,
            // Upward bias so the burst rises before it rains down
            vy: angle.sin() * speed - 5.0,
            color: PALETTE[fastrand::usize(..PALETTE.len())],
            size: 4.0 + fastrand::f32() * 6.0,
            rotation: fastrand::f32() * 360.0,
            rotation_speed: (fastrand::f32() - 0.5) * 10.0,
            shape: if fastrand::bool() {
                Shape::Rect
            } else {
                Shape::Circle
            },
            opacity: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ConfettiEngine {
        ConfettiEngine::new(800.0, 600.0)
    }

    #[test]
    fn test_burst_spawns_configured_count() {
        let mut e = engine();
        e.burst(400.0, 300.0, Instant::now());
        assert_eq!(e.particles().len(), 150);
        assert!(e.is_running());
    }

    #[test]
    fn test_spawn_ranges() {
        let mut e = engine();
        e.burst(400.0, 300.0, Instant::now());
        for p in e.particles() {
            assert!((4.0..10.0).contains(&p.size));
            assert!((0.0..360.0).contains(&p.rotation));
            assert!((-5.0..5.0).contains(&p.rotation_speed));
            assert_eq!(p.opacity, 1.0);
            assert!(PALETTE.contains(&p.color));
            // Speed in [8, 16) plus the -5 vertical bias
            let speed = (p.vx * p.vx + (p.vy + 5.0) * (p.vy + 5.0)).sqrt();
            assert!(speed >= 7.9 && speed < 16.1, "speed out of range: {speed}");
        }
    }

    #[test]
    fn test_count_monotonically_non_increasing() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 10.0, start);
        let mut prev = e.particles().len();
        assert!(prev <= 150);
        // Keep the deadline out of play; observe pure physics decay.
        for i in 1..400 {
            let now = start + Duration::from_millis(i);
            e.step(now);
            let count = e.particles().len();
            assert!(count <= prev, "count grew from {prev} to {count}");
            prev = count;
            if count == 0 {
                break;
            }
        }
    }

    #[test]
    fn test_self_stops_when_all_particles_die() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 300.0, start);
        // Long before the 4s deadline in simulated time, every particle
        // will have fallen past height + margin and been dropped.
        for i in 1..2000 {
            if !e.step(start + Duration::from_millis(i)) {
                break;
            }
        }
        assert!(!e.is_running());
        assert!(e.particles().is_empty());
    }

    #[test]
    fn test_deadline_stop_is_unconditional() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 300.0, start);
        assert!(e.is_running());
        // One step past the deadline stops regardless of live particles.
        let stopped = e.step(start + Duration::from_millis(4001));
        assert!(!stopped);
        assert!(!e.is_running());
        assert!(e.particles().is_empty());
    }

    #[test]
    fn test_reentrant_burst_replaces_set() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 300.0, start);
        for i in 1..50 {
            e.step(start + Duration::from_millis(i));
        }
        e.burst(100.0, 100.0, start + Duration::from_millis(50));
        assert_eq!(e.particles().len(), 150);
        assert!(e.particles().iter().all(|p| p.opacity == 1.0));
    }

    #[test]
    fn test_fade_only_below_fade_line() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 10.0, start);
        e.step(start + Duration::from_millis(1));
        for p in e.particles() {
            if p.y <= 600.0 * 0.8 {
                assert_eq!(p.opacity, 1.0);
            }
        }
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 300.0, start);
        let vy_before: f32 = e.particles().iter().map(|p| p.vy).sum();
        for i in 1..30 {
            e.step(start + Duration::from_millis(i));
        }
        let vy_after: f32 = e.particles().iter().map(|p| p.vy).sum();
        assert!(vy_after > vy_before);
    }

    #[test]
    fn test_stop_clears_everything() {
        let mut e = engine();
        e.burst_center(Instant::now());
        e.stop();
        assert!(!e.is_running());
        assert!(e.particles().is_empty());
        // Stepping a stopped engine is a no-op.
        assert!(!e.step(Instant::now()));
    }

    #[test]
    fn test_resize_mid_animation() {
        let mut e = engine();
        let start = Instant::now();
        e.burst(400.0, 300.0, start);
        e.step(start + Duration::from_millis(1));
        e.resize(200.0, 100.0);
        // Next frame uses the new bounds without panicking or pausing.
        assert!(e.step(start + Duration::from_millis(2)) || e.particles().is_empty());
    }
}
