use bytemuck::{Pod, Zeroable};

/// Per-entity pose published to the host renderer after each simulation step.
/// Must match the host protocol: 6 floats = 24 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderPose {
    /// X position in world space.
    pub x: f32,
    /// Y position in world space (forward axis).
    pub y: f32,
    /// Heading in radians.
    pub yaw: f32,
    /// Accumulated roll angle for wheel meshes, 0 for everything else.
    pub spin: f32,
    /// Game-defined mesh kind.
    pub kind: f32,
    /// Uniform mesh scale.
    pub scale: f32,
}

impl RenderPose {
    pub const FLOATS: usize = 6;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(x: f32, y: f32, yaw: f32) -> Self {
        Self {
            x,
            y,
            yaw,
            spin: 0.0,
            kind: 0.0,
            scale: 1.0,
        }
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_kind(mut self, kind: u32) -> Self {
        self.kind = kind as f32;
        self
    }
}

/// Pose records for one frame, read by the host through a raw pointer.
pub struct PoseBuffer {
    poses: Vec<RenderPose>,
    capacity: usize,
}

impl PoseBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            poses: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn clear(&mut self) {
        self.poses.clear();
    }

    /// Append a pose. Returns `false` and drops the pose once the buffer is full.
    pub fn push(&mut self, pose: RenderPose) -> bool {
        if self.poses.len() >= self.capacity {
            return false;
        }
        self.poses.push(pose);
        true
    }

    pub fn poses(&self) -> &[RenderPose] {
        &self.poses
    }

    pub fn pose_count(&self) -> u32 {
        self.poses.len() as u32
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Flat float view of every pose, `FLOATS` per entry.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.poses)
    }

    /// Raw pointer to pose data for host reads.
    pub fn poses_ptr(&self) -> *const f32 {
        self.poses.as_ptr() as *const f32
    }
}

impl Default for PoseBuffer {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pose_is_6_floats() {
        assert_eq!(std::mem::size_of::<RenderPose>(), 24);
        assert_eq!(RenderPose::FLOATS, 6);
    }

    #[test]
    fn pose_buffer_push_and_count() {
        let mut buf = PoseBuffer::new(8);
        buf.push(RenderPose::new(1.0, 2.0, 0.5));
        buf.push(RenderPose::new(3.0, 4.0, 0.0).with_spin(1.5).with_kind(2));
        assert_eq!(buf.pose_count(), 2);
        assert_eq!(&buf.as_floats()[6..], &[3.0, 4.0, 0.0, 1.5, 2.0, 1.0]);

        buf.clear();
        assert_eq!(buf.pose_count(), 0);
    }

    #[test]
    fn pose_buffer_drops_overflow() {
        let mut buf = PoseBuffer::new(1);
        assert!(buf.push(RenderPose::default()));
        assert!(!buf.push(RenderPose::default()));
        assert_eq!(buf.pose_count(), 1);
    }
}
