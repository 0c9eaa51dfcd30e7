use chase_engine::{
    BodyDesc, BodyHandle, ColliderDesc, ColliderMaterial, PhysicsWorld, RandomSource, RenderPose,
};
use glam::Vec2;
use serde::Deserialize;

use super::error::TerrainError;
use crate::layers::{MeshKind, TERRAIN_FILTER};

/// Shape of one corridor segment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Cross-sections per chunk.
    pub parts: usize,
    /// Distance between cross-sections along the forward axis.
    pub tile: f32,
    /// Half the corridor width.
    pub width: f32,
    /// Random lateral drift per section, uniform in `[-jitter, jitter)`.
    pub jitter: f32,
    pub wave_frequency: f32,
    pub wave_amplitude: f32,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            parts: 10,
            tile: 20.0,
            width: 15.0,
            jitter: 10.0,
            wave_frequency: 100.0,
            wave_amplitude: 3.0,
        }
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.parts < 2 {
            return Err(TerrainError::InvalidConfig("parts must be at least 2"));
        }
        if !(self.tile.is_finite() && self.tile > 0.0) {
            return Err(TerrainError::InvalidConfig("tile must be positive"));
        }
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(TerrainError::InvalidConfig("width must be positive"));
        }
        if !(self.jitter.is_finite() && self.jitter >= 0.0) {
            return Err(TerrainError::InvalidConfig("jitter must be non-negative"));
        }
        if !(self.wave_frequency.is_finite() && self.wave_amplitude.is_finite()) {
            return Err(TerrainError::InvalidConfig("wave parameters must be finite"));
        }
        Ok(())
    }

    /// Extent of a chunk along the forward axis.
    pub fn length(&self) -> f32 {
        (self.parts - 1) as f32 * self.tile
    }
}

/// Generated corridor geometry, in chunk-local coordinates unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGeometry {
    origin: Vec2,
    /// `[left, centre, right]` per cross-section.
    sections: Vec<[Vec2; 3]>,
    /// Boundary segments, left rail then right rail for each section pair.
    edges: Vec<[Vec2; 2]>,
    exit_anchor: Vec2,
    length: f32,
    width: f32,
}

impl ChunkGeometry {
    /// Lay out one corridor segment starting at `entry`.
    ///
    /// Deterministic for a given entry, config and random sequence.
    pub fn generate(
        entry: Vec2,
        config: &ChunkConfig,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, TerrainError> {
        if !entry.is_finite() {
            return Err(TerrainError::NonFiniteAnchor {
                x: entry.x,
                y: entry.y,
            });
        }
        config.validate()?;

        let mut sections: Vec<[Vec2; 3]> = Vec::with_capacity(config.parts);
        let mut edges = Vec::with_capacity(2 * (config.parts - 1));
        let mut offset = 0.0f32;

        for i in 0..config.parts {
            let y = i as f32 * config.tile;
            let section = [
                Vec2::new(offset - config.width, y),
                Vec2::new(offset, y),
                Vec2::new(offset + config.width, y),
            ];

            if let Some(prev) = sections.last() {
                edges.push([prev[0], section[0]]);
                edges.push([prev[2], section[2]]);
            }
            sections.push(section);

            if i == 0 {
                continue;
            }
            let wave = ((i as f64) * config.wave_frequency as f64).cos() as f32;
            offset += rng.range(-config.jitter, config.jitter) + wave * config.wave_amplitude;
        }

        let exit_anchor = entry + sections[config.parts - 1][1];

        Ok(Self {
            origin: entry,
            sections,
            edges,
            exit_anchor,
            length: config.length(),
            width: config.width,
        })
    }

    /// World-space entry anchor (chunk origin).
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World-space point the next chunk chains from.
    pub fn exit_anchor(&self) -> Vec2 {
        self.exit_anchor
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn corridor_width(&self) -> f32 {
        self.width
    }

    pub fn sections(&self) -> &[[Vec2; 3]] {
        &self.sections
    }

    /// Centreline offset of every cross-section.
    pub fn lateral_offsets(&self) -> Vec<f32> {
        self.sections.iter().map(|s| s[1].x).collect()
    }

    pub fn edges(&self) -> &[[Vec2; 2]] {
        &self.edges
    }

    /// Boundary edges translated by the chunk origin.
    pub fn world_edges(&self) -> impl Iterator<Item = [Vec2; 2]> + '_ {
        self.edges
            .iter()
            .map(move |[a, b]| [*a + self.origin, *b + self.origin])
    }

    /// Surface mesh vertices, three per cross-section.
    pub fn vertices(&self) -> Vec<Vec2> {
        self.sections.iter().flatten().copied().collect()
    }

    /// Surface mesh triangles indexing [`vertices`](Self::vertices), four per section pair.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        (1..self.sections.len() as u32)
            .flat_map(|i| {
                let index = i * 3;
                [
                    [index, index - 2, index - 3],
                    [index, index + 1, index - 2],
                    [index + 1, index - 1, index - 2],
                    [index + 1, index + 2, index - 1],
                ]
            })
            .collect()
    }
}

/// Identifies a live chunk within its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub u64);

/// A generated segment together with its static collision body.
pub struct TerrainChunk {
    id: ChunkId,
    geometry: ChunkGeometry,
    body: BodyHandle,
    disposed: bool,
}

impl TerrainChunk {
    /// Create the static body: one segment collider per boundary edge.
    pub fn build(physics: &mut PhysicsWorld, id: ChunkId, geometry: ChunkGeometry) -> Self {
        let body = physics.create_body(&BodyDesc::fixed().with_position(geometry.origin()));
        for [a, b] in geometry.edges() {
            physics.add_collider(
                body,
                &ColliderDesc::Segment { a: *a, b: *b },
                TERRAIN_FILTER,
                ColliderMaterial::default(),
            );
        }

        Self {
            id,
            geometry,
            body,
            disposed: false,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn geometry(&self) -> &ChunkGeometry {
        &self.geometry
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn entry_anchor(&self) -> Vec2 {
        self.geometry.origin()
    }

    pub fn exit_anchor(&self) -> Vec2 {
        self.geometry.exit_anchor()
    }

    /// Forward-axis span `[start, end]` in world space.
    pub fn span(&self) -> (f32, f32) {
        let start = self.geometry.origin().y;
        (start, start + self.geometry.length())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn render(&self) -> RenderPose {
        let origin = self.geometry.origin();
        RenderPose::new(origin.x, origin.y, 0.0).with_kind(MeshKind::Chunk.id())
    }

    /// Release the collision body. Returns `false` if it was already released.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld) -> bool {
        if self.disposed {
            return false;
        }
        physics.remove_body(self.body);
        self.disposed = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Scripted;
    use chase_engine::Rng;

    #[test]
    fn same_seed_same_corridor() {
        let config = ChunkConfig::default();
        let a = ChunkGeometry::generate(Vec2::ZERO, &config, &mut Rng::new(7));
        let b = ChunkGeometry::generate(Vec2::ZERO, &config, &mut Rng::new(7));
        assert_eq!(a, b);

        let c = ChunkGeometry::generate(Vec2::ZERO, &config, &mut Rng::new(8));
        assert_ne!(a, c);
    }

    #[test]
    fn sections_are_tile_spaced_with_three_samples() {
        let config = ChunkConfig::default();
        let geometry = ChunkGeometry::generate(Vec2::ZERO, &config, &mut Rng::new(1)).unwrap();

        assert_eq!(geometry.sections().len(), 10);
        for (i, [left, centre, right]) in geometry.sections().iter().enumerate() {
            let y = i as f32 * 20.0;
            assert_eq!(left.y, y);
            assert_eq!(centre.y, y);
            assert!((centre.x - left.x - 15.0).abs() < 1e-4);
            assert!((right.x - centre.x - 15.0).abs() < 1e-4);
        }
        assert_eq!(geometry.length(), 180.0);
    }

    #[test]
    fn offsets_accumulate_from_second_section() {
        // 0.5 maps to the middle of [-jitter, jitter), leaving only the wave.
        let config = ChunkConfig::default();
        let geometry =
            ChunkGeometry::generate(Vec2::ZERO, &config, &mut Scripted::constant(0.5)).unwrap();

        let offsets = geometry.lateral_offsets();
        assert_eq!(offsets[0], 0.0);
        assert_eq!(offsets[1], 0.0);

        let mut expected = 0.0f32;
        for i in 1..config.parts - 1 {
            expected += ((i as f64) * 100.0).cos() as f32 * 3.0;
            assert!((offsets[i + 1] - expected).abs() < 1e-3, "section {}: {} vs {}", i + 1, offsets[i + 1], expected);
        }
    }

    #[test]
    fn rails_are_continuous_polylines() {
        let geometry =
            ChunkGeometry::generate(Vec2::ZERO, &ChunkConfig::default(), &mut Rng::new(3)).unwrap();
        let edges = geometry.edges();
        assert_eq!(edges.len(), 18);

        for rail in 0..2 {
            let segments: Vec<_> = edges.iter().skip(rail).step_by(2).collect();
            assert_eq!(segments.len(), 9);
            for pair in segments.windows(2) {
                assert_eq!(pair[0][1], pair[1][0], "gap in rail {}", rail);
            }
        }
    }

    #[test]
    fn exit_anchor_is_last_centre_plus_origin() {
        let entry = Vec2::new(12.0, 360.0);
        let geometry =
            ChunkGeometry::generate(entry, &ChunkConfig::default(), &mut Rng::new(5)).unwrap();
        let last = geometry.sections()[9][1];
        assert_eq!(geometry.exit_anchor(), entry + last);
        assert_eq!(geometry.exit_anchor().y, 540.0);
    }

    #[test]
    fn mesh_matches_sections() {
        let geometry =
            ChunkGeometry::generate(Vec2::ZERO, &ChunkConfig::default(), &mut Rng::new(2)).unwrap();
        let vertices = geometry.vertices();
        let triangles = geometry.triangles();

        assert_eq!(vertices.len(), 30);
        assert_eq!(triangles.len(), 36);
        assert_eq!(triangles[0], [3, 1, 0]);
        assert!(triangles.iter().flatten().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn rejects_bad_anchor_and_config() {
        let mut rng = Rng::new(1);
        assert_eq!(
            ChunkGeometry::generate(Vec2::new(f32::NAN, 0.0), &ChunkConfig::default(), &mut rng)
                .err()
                .map(|e| matches!(e, TerrainError::NonFiniteAnchor { .. })),
            Some(true)
        );

        for config in [
            ChunkConfig { parts: 1, ..ChunkConfig::default() },
            ChunkConfig { tile: 0.0, ..ChunkConfig::default() },
            ChunkConfig { width: -1.0, ..ChunkConfig::default() },
            ChunkConfig { jitter: f32::INFINITY, ..ChunkConfig::default() },
        ] {
            let result = ChunkGeometry::generate(Vec2::ZERO, &config, &mut rng);
            assert!(matches!(result, Err(TerrainError::InvalidConfig(_))), "{:?}", config);
        }
    }

    #[test]
    fn build_creates_one_segment_per_edge() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        let geometry =
            ChunkGeometry::generate(Vec2::new(0.0, 180.0), &ChunkConfig::default(), &mut Rng::new(4))
                .unwrap();
        let mut chunk = TerrainChunk::build(&mut physics, ChunkId(0), geometry);

        assert_eq!(physics.body_count(), 1);
        assert_eq!(physics.collider_count(), 18);
        assert_eq!(chunk.span(), (180.0, 360.0));

        let geometry = chunk.geometry();
        for ([a, b], [wa, wb]) in geometry.edges().iter().zip(geometry.world_edges()) {
            assert_eq!(physics.world_point(chunk.body(), *a), wa);
            assert_eq!(physics.world_point(chunk.body(), *b), wb);
        }
        let first_rail = geometry.world_edges().next().unwrap();
        assert_eq!(first_rail[0].y, 180.0);

        assert!(chunk.dispose(&mut physics));
        assert!(!chunk.dispose(&mut physics));
        assert_eq!(physics.body_count(), 0);
        assert!(chunk.is_disposed());
    }

    #[test]
    fn walls_stop_a_sliding_box() {
        let mut physics = PhysicsWorld::new(Vec2::ZERO);
        physics.set_dt(1.0 / 60.0);
        let config = ChunkConfig { jitter: 0.0, wave_amplitude: 0.0, ..ChunkConfig::default() };
        let geometry = ChunkGeometry::generate(Vec2::ZERO, &config, &mut Rng::new(1)).unwrap();
        TerrainChunk::build(&mut physics, ChunkId(0), geometry);

        let body = physics.create_body(
            &BodyDesc::dynamic()
                .with_position(Vec2::new(0.0, 90.0))
                .with_velocity(Vec2::new(30.0, 0.0)),
        );
        physics.add_collider(
            body,
            &ColliderDesc::Cuboid { half_width: 1.0, half_height: 1.0 },
            crate::layers::VEHICLE_FILTER,
            ColliderMaterial::default(),
        );
        for _ in 0..120 {
            physics.step();
        }

        let x = physics.position(body).x;
        assert!(x < 15.0, "box escaped the corridor: x={}", x);
    }
}
