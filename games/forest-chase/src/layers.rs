//! Collision categories and render mesh kinds shared by every entity.

use chase_engine::CollisionFilter;

pub const VEHICLE: u32 = 1;
pub const TERRAIN: u32 = 2;
pub const PURSUER: u32 = 4;

/// Chassis and wheels touch everything.
pub const VEHICLE_FILTER: CollisionFilter = CollisionFilter::new(VEHICLE, u32::MAX);
/// Corridor walls only stop the vehicle.
pub const TERRAIN_FILTER: CollisionFilter = CollisionFilter::new(TERRAIN, VEHICLE);
/// Pursuer hull: hits the vehicle and other pursuers.
pub const PURSUER_FILTER: CollisionFilter = CollisionFilter::new(PURSUER, VEHICLE | PURSUER);
/// Pursuer personal-space ring: only pushes other pursuers apart.
pub const SEPARATION_FILTER: CollisionFilter = CollisionFilter::new(PURSUER, PURSUER);

/// Mesh the host should draw for a [`chase_engine::RenderPose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MeshKind {
    Chassis = 0,
    Wheel = 1,
    Pursuer = 2,
    Chunk = 3,
}

impl MeshKind {
    pub fn id(self) -> u32 {
        self as u32
    }
}
