// Procedural heightfield sampled by nearest cell.

use crate::domain::tuning::WorldTuning;

/// Square grid of heights centred on the world origin. Immutable after generation.
#[derive(Debug, Clone)]
pub struct Heightfield {
    cells: usize,
    cell_size: f32,
    origin: f32,
    heights: Vec<f32>,
}

impl Heightfield {
    /// Builds the rolling-hills terrain covering the playable area.
    pub fn generate(tuning: &WorldTuning) -> Self {
        let cells = tuning.terrain_cells.max(2);
        let size = tuning.half_extent * 2.0;
        let cell_size = size / (cells - 1) as f32;
        let origin = -tuning.half_extent;
        let amp = tuning.terrain_amplitude;
        let freq = tuning.terrain_frequency;
        // Phase offsets keep different seeds from producing identical hills.
        let phase = (tuning.seed % 1024) as f32 * 0.618;

        let mut heights = Vec::with_capacity(cells * cells);
        for iz in 0..cells {
            for ix in 0..cells {
                let x = origin + ix as f32 * cell_size;
                let z = origin + iz as f32 * cell_size;
                let mut h = (x * freq + phase).sin() * amp + (z * freq * 1.3 + phase).cos() * amp;
                h += (x * freq * 2.7 - z * freq * 1.9).sin() * amp * 0.35;
                // Flatten the spawn area so the player starts on level ground.
                let r = (x * x + z * z).sqrt();
                let flatten = (r / tuning.spawn_safe_radius.max(1.0)).min(1.0);
                heights.push(h * flatten);
            }
        }

        Self {
            cells,
            cell_size,
            origin,
            heights,
        }
    }

    /// Uniform terrain at `height`. Useful for deterministic scenarios.
    pub fn flat(half_extent: f32, cells: usize, height: f32) -> Self {
        let cells = cells.max(2);
        Self {
            cells,
            cell_size: (half_extent * 2.0) / (cells - 1) as f32,
            origin: -half_extent,
            heights: vec![height; cells * cells],
        }
    }

    /// Nearest-cell lookup. Coordinates outside the grid clamp to the edge cell.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let ix = self.index_for(x);
        let iz = self.index_for(z);
        self.heights[iz * self.cells + ix]
    }

    fn index_for(&self, coord: f32) -> usize {
        let idx = ((coord - self.origin) / self.cell_size).round();
        if !idx.is_finite() || idx <= 0.0 {
            0
        } else {
            (idx as usize).min(self.cells - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Heightfield {
        // 3x3 grid over [-1, 1], height = ix + 10 * iz.
        let mut field = Heightfield::flat(1.0, 3, 0.0);
        for iz in 0..3 {
            for ix in 0..3 {
                field.heights[iz * 3 + ix] = ix as f32 + 10.0 * iz as f32;
            }
        }
        field
    }

    #[test]
    fn nearest_cell_without_interpolation() {
        let field = ramp();
        assert_eq!(field.height_at(-1.0, -1.0), 0.0);
        assert_eq!(field.height_at(0.4, -1.0), 1.0);
        assert_eq!(field.height_at(0.6, -1.0), 2.0);
        assert_eq!(field.height_at(0.0, 0.0), 11.0);
    }

    #[test]
    fn out_of_bounds_clamps_to_edge() {
        let field = ramp();
        assert_eq!(field.height_at(-500.0, -500.0), 0.0);
        assert_eq!(field.height_at(500.0, 500.0), 22.0);
        assert_eq!(field.height_at(500.0, -500.0), 2.0);
        assert_eq!(field.height_at(f32::NAN, 0.0), 10.0);
    }

    #[test]
    fn generated_spawn_is_flat() {
        let field = Heightfield::generate(&WorldTuning::default());
        // The nearest cell sits a couple of units off-centre where flattening is ~95%.
        assert!(field.height_at(0.0, 0.0).abs() < 0.5);
    }
}
