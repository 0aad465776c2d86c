use crate::config::SimulationConfig;
use crate::constants::{MAX_MOTION_STEP_MS, MIN_MOTION_STEP_MS};
use crate::data::{OwnerChange, ProjectileStore, SimulationData, Territory};
use crate::types::{CellCoord, Projectile, ProjectileId, SimulationEvent, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capture {
    pub projectile: ProjectileId,
    pub cell: CellCoord,
    pub change: OwnerChange,
}

/// Projectile motion inside the arena and the hit → ownership flip rule.
///
/// Projectiles are circles of `radius`; cells are `cell_size` squares laid
/// out from the origin. Overlap is strict, so a circle that only touches a
/// cell edge does not hit it.
#[derive(Debug, Clone, Copy)]
pub struct CaptureEngine {
    cell_size: f32,
    radius: f32,
    max_step_ms: f64,
}

impl CaptureEngine {
    pub fn new(cell_size: f32, radius: f32) -> Self {
        Self {
            cell_size: cell_size.max(f32::EPSILON),
            radius: radius.max(0.0),
            max_step_ms: MAX_MOTION_STEP_MS,
        }
    }

    /// Slices are sized so a projectile travels at most one radius between
    /// capture checks.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let engine = Self::new(config.cell_size, config.projectile_radius);
        let speed = f64::from(config.projectile_speed.abs());
        if speed > 0.0 {
            let per_radius_ms = 1000.0 * f64::from(engine.radius) / speed;
            engine.with_max_step_ms(per_radius_ms)
        } else {
            engine
        }
    }

    pub fn with_max_step_ms(mut self, max_step_ms: f64) -> Self {
        self.max_step_ms = max_step_ms.clamp(MIN_MOTION_STEP_MS, MAX_MOTION_STEP_MS);
        self
    }

    pub fn max_step_ms(&self) -> f64 {
        self.max_step_ms
    }

    pub fn overlaps(&self, center: Vec2, coord: CellCoord) -> bool {
        let min_x = coord.x as f32 * self.cell_size;
        let min_y = coord.y as f32 * self.cell_size;
        let nearest_x = center.x.clamp(min_x, min_x + self.cell_size);
        let nearest_y = center.y.clamp(min_y, min_y + self.cell_size);
        let dx = center.x - nearest_x;
        let dy = center.y - nearest_y;
        dx * dx + dy * dy < self.radius * self.radius
    }

    /// Cells whose box the projectile may overlap, in row-major order.
    fn candidates(&self, territory: &Territory, center: Vec2) -> Vec<CellCoord> {
        let span = |low: f32, high: f32, cells: u32| -> Option<(u32, u32)> {
            if cells == 0 {
                return None;
            }
            let first = (low / self.cell_size).floor();
            let last = (high / self.cell_size).floor();
            if last < 0.0 || first >= cells as f32 {
                return None;
            }
            Some((first.max(0.0) as u32, (last as u32).min(cells - 1)))
        };

        let Some((x0, x1)) = span(
            center.x - self.radius,
            center.x + self.radius,
            territory.width(),
        ) else {
            return Vec::new();
        };
        let Some((y0, y1)) = span(
            center.y - self.radius,
            center.y + self.radius,
            territory.height(),
        ) else {
            return Vec::new();
        };

        (y0..=y1)
            .flat_map(|y| (x0..=x1).map(move |x| CellCoord::new(x, y)))
            .collect()
    }

    /// First enemy cell the projectile overlaps. Friendly cells are passed
    /// through.
    pub fn find_target(&self, projectile: &Projectile, territory: &Territory) -> Option<CellCoord> {
        self.candidates(territory, projectile.position)
            .into_iter()
            .filter(|&coord| self.overlaps(projectile.position, coord))
            .find(|&coord| territory.owner_of(coord) != projectile.firing_faction)
    }

    /// Hand the struck cell to the firing faction. The caller removes the
    /// projectile.
    pub fn capture(&self, projectile: &Projectile, territory: &mut Territory) -> Option<Capture> {
        let cell = self.find_target(projectile, territory)?;
        let change = territory.set_owner(cell, projectile.firing_faction, projectile.firing_color);
        Some(Capture {
            projectile: projectile.id,
            cell,
            change,
        })
    }

    /// Run capture detection for every live projectile in firing order.
    /// Later captures see earlier ones, so when two projectiles hit the same
    /// cell in one tick the last one applied keeps it.
    pub fn resolve(&self, data: &mut SimulationData) -> usize {
        let mut spent = Vec::new();
        for i in 0..data.projectiles.len() {
            let projectile = &data.projectiles[i];
            let to = projectile.firing_faction;
            let Some(capture) = self.capture(projectile, &mut data.territory) else {
                continue;
            };

            if capture.change.cannon_lost {
                data.aim.cannon_lost(capture.cell);
            }
            data.metrics.captures += 1;
            tracing::debug!(
                target: "conquest::capture",
                from = %capture.change.previous_owner,
                to = %to,
                cell.x = capture.cell.x,
                cell.y = capture.cell.y,
                cannon_lost = capture.change.cannon_lost,
                "cell.captured"
            );
            data.emit(SimulationEvent::CellCaptured {
                cell: capture.cell,
                from: capture.change.previous_owner,
                to,
                projectile: capture.projectile,
                cannon_lost: capture.change.cannon_lost,
            });
            spent.push(capture.projectile);
        }
        data.projectiles.remove_all(&spent);
        spent.len()
    }

    /// Move projectiles over `span_ms` and resolve captures after each slice.
    /// Returns the number of cells captured.
    pub fn step(&self, data: &mut SimulationData, span_ms: f64) -> usize {
        if span_ms <= 0.0 || data.projectiles.is_empty() {
            return 0;
        }
        let slices = (span_ms / self.max_step_ms).ceil().max(1.0);
        let slice_ms = span_ms / slices;
        let extent = self.arena_extent(&data.territory);
        let mut captured = 0;
        for _ in 0..slices as u64 {
            if data.projectiles.is_empty() {
                break;
            }
            self.advance(&mut data.projectiles, extent, slice_ms);
            captured += self.resolve(data);
        }
        captured
    }

    /// Integrate every projectile over `dt_ms` and bounce it off the arena
    /// walls. The border never removes a projectile.
    pub fn advance(&self, projectiles: &mut ProjectileStore, extent: Vec2, dt_ms: f64) {
        let dt = (dt_ms.max(0.0) / 1000.0) as f32;
        for projectile in projectiles.iter_mut() {
            projectile.position = projectile.position + projectile.velocity * dt;
            let (x, vx) = reflect(projectile.position.x, projectile.velocity.x, self.radius, extent.x);
            let (y, vy) = reflect(projectile.position.y, projectile.velocity.y, self.radius, extent.y);
            projectile.position = Vec2::new(x, y);
            projectile.velocity = Vec2::new(vx, vy);
        }
    }

    pub fn arena_extent(&self, territory: &Territory) -> Vec2 {
        Vec2::new(
            territory.width() as f32 * self.cell_size,
            territory.height() as f32 * self.cell_size,
        )
    }
}

fn reflect(position: f32, velocity: f32, radius: f32, extent: f32) -> (f32, f32) {
    let low = radius;
    let high = extent - radius;
    if high <= low {
        return (extent / 2.0, velocity);
    }
    if position < low {
        ((2.0 * low - position).min(high), velocity.abs())
    } else if position > high {
        ((2.0 * high - position).max(low), -velocity.abs())
    } else {
        (position, velocity)
    }
}
