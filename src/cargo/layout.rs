//! Deterministic cargo box layout for a container at a given fill level.
//!
//! Boxes are placed on a regular grid derived from the container's inner
//! dimensions and filled bottom-up (layer), back-to-front (row), then
//! left-to-right (column). A small per-box size and offset variation comes
//! from [`seeded_unit`], so identical inputs always produce identical output.

use bevy::prelude::*;

/// Cardboard box colors, indexed by box number.
pub const CARDBOARD_COLORS: [Color; 8] = [
    Color::srgb(0.769, 0.584, 0.416), // #c4956a
    Color::srgb(0.722, 0.537, 0.369), // #b8895e
    Color::srgb(0.831, 0.647, 0.455), // #d4a574
    Color::srgb(0.753, 0.565, 0.376), // #c09060
    Color::srgb(0.745, 0.580, 0.408), // #be9468
    Color::srgb(0.796, 0.667, 0.478), // #cbaa7a
    Color::srgb(0.702, 0.522, 0.314), // #b38550
    Color::srgb(0.812, 0.659, 0.439), // #cfa870
];

/// Packing tape colors, indexed by box number.
pub const TAPE_COLORS: [Color; 3] = [
    Color::srgb(0.831, 0.773, 0.627), // #d4c5a0
    Color::srgb(0.878, 0.835, 0.710), // #e0d5b5
    Color::srgb(0.800, 0.741, 0.596), // #ccbd98
];

/// Outer dimensions of a cargo container, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContainerDims {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
}

impl ContainerDims {
    pub const fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

/// Grid sizing rules for [`generate_layout`].
#[derive(Resource, Clone, Debug)]
pub struct CargoLayoutConfig {
    /// Clearance between the container wall and the boxes, per side.
    pub padding: f32,
    /// Nominal box width (x).
    pub unit_width: f32,
    /// Nominal box height (y).
    pub unit_height: f32,
    /// Nominal box depth (z).
    pub unit_depth: f32,
    /// Minimum columns, layers and rows regardless of container size.
    pub min_cols: u32,
    pub min_layers: u32,
    pub min_rows: u32,
}

impl Default for CargoLayoutConfig {
    fn default() -> Self {
        Self {
            padding: 0.06,
            unit_width: 0.38,
            unit_height: 0.35,
            unit_depth: 0.45,
            min_cols: 2,
            min_layers: 2,
            min_rows: 3,
        }
    }
}

/// Slot grid inside a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CargoGrid {
    pub cols: u32,
    pub layers: u32,
    pub rows: u32,
}

impl CargoGrid {
    pub fn for_container(dims: ContainerDims, config: &CargoLayoutConfig) -> Self {
        let inner = inner_dims(dims, config);
        Self {
            cols: cells(inner.x, config.unit_width, config.min_cols),
            layers: cells(inner.y, config.unit_height, config.min_layers),
            rows: cells(inner.z, config.unit_depth, config.min_rows),
        }
    }

    /// Saturates instead of overflowing for absurdly large containers.
    pub fn total_slots(&self) -> u64 {
        u64::from(self.cols)
            .saturating_mul(u64::from(self.layers))
            .saturating_mul(u64::from(self.rows))
    }

    /// Number of slots occupied at `fill_pct` percent.
    ///
    /// Any positive fill occupies at least one slot; fills above 100 % are
    /// clamped.
    pub fn filled_slots(&self, fill_pct: f32) -> u64 {
        if fill_pct.is_nan() || fill_pct <= 0.0 {
            return 0;
        }
        let total = self.total_slots();
        let wanted = (total as f64 * f64::from(fill_pct.min(100.0)) / 100.0).round() as u64;
        wanted.clamp(1, total)
    }
}

fn inner_dims(dims: ContainerDims, config: &CargoLayoutConfig) -> Vec3 {
    dims.as_vec3() - Vec3::splat(config.padding * 2.0)
}

fn cells(extent: f32, unit: f32, min: u32) -> u32 {
    if unit <= 0.0 || !extent.is_finite() || extent <= 0.0 {
        return min;
    }
    ((extent / unit).round() as u32).max(min)
}

/// One box of a generated layout, in container-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CargoBoxPlacement {
    /// Box center; the container is centered on the origin.
    pub position: Vec3,
    pub size: Vec3,
    pub color_index: usize,
}

impl CargoBoxPlacement {
    pub fn cardboard_color(&self) -> Color {
        CARDBOARD_COLORS[self.color_index % CARDBOARD_COLORS.len()]
    }

    pub fn tape_color(&self) -> Color {
        TAPE_COLORS[self.color_index % TAPE_COLORS.len()]
    }
}

/// Hash-style pseudo random value in `[0, 1)` for box `i`.
pub fn seeded_unit(i: u32) -> f64 {
    let x = (f64::from(i) * 127.1 + 311.7).sin() * 43758.5453;
    x - x.floor()
}

/// Box placements filling `fill_pct` percent of a container.
pub fn generate_layout(
    fill_pct: f32,
    dims: ContainerDims,
    config: &CargoLayoutConfig,
) -> Vec<CargoBoxPlacement> {
    let grid = CargoGrid::for_container(dims, config);
    let filled = grid.filled_slots(fill_pct) as usize;
    if filled == 0 {
        return Vec::new();
    }

    let inner = inner_dims(dims, config);
    let cell = inner / Vec3::new(grid.cols as f32, grid.layers as f32, grid.rows as f32);
    let origin = -inner / 2.0 + cell / 2.0;

    let mut boxes = Vec::with_capacity(filled);
    'fill: for layer in 0..grid.layers {
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                if boxes.len() == filled {
                    break 'fill;
                }
                let idx = boxes.len() as u32;
                let shrink = 0.82 + seeded_unit(idx) as f32 * 0.14;
                let jitter_x = (seeded_unit(idx + 50) as f32 - 0.5) * 0.02;
                let jitter_z = (seeded_unit(idx + 100) as f32 - 0.5) * 0.02;

                let slot = origin + cell * Vec3::new(col as f32, layer as f32, row as f32);
                boxes.push(CargoBoxPlacement {
                    position: slot + Vec3::new(jitter_x, 0.0, jitter_z),
                    size: cell * shrink - Vec3::splat(0.02),
                    color_index: idx as usize,
                });
            }
        }
    }

    boxes
}
