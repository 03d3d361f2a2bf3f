// GPU-facing data. Layouts mirror the structs in scene.wgsl.

/// Per-frame scene uniform
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub time: f32,
    pub sun_direction: [f32; 3],
    pub sun_intensity: f32,
    pub sun_color: [f32; 3],
    pub fog_near: f32,
    pub ambient_color: [f32; 3],
    pub fog_far: f32,
    pub fog_color: [f32; 3],
    pub dust_size: f32,
}

/// Terrain vertex, rewritten every frame
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl TerrainVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Unit-sphere vertex shared by every orb instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-orb instance data
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OrbInstance {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 3],
    pub metalness: f32,
    pub rotation: [f32; 4],
    pub opacity: f32,
    pub _pad: [f32; 3],
}

impl OrbInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Billboard corner for dust quads
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadCorner {
    pub corner: [f32; 2],
}

impl QuadCorner {
    pub const QUAD: [QuadCorner; 6] = [
        QuadCorner { corner: [-1.0, -1.0] },
        QuadCorner { corner: [1.0, -1.0] },
        QuadCorner { corner: [1.0, 1.0] },
        QuadCorner { corner: [-1.0, -1.0] },
        QuadCorner { corner: [1.0, 1.0] },
        QuadCorner { corner: [-1.0, 1.0] },
    ];

    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Dust positions are uploaded straight from the flat xyz buffer
pub fn dust_instance_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &ATTRIBUTES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_uniform_matches_wgsl_layout() {
        // mat4 + five vec3/f32 pairs
        assert_eq!(std::mem::size_of::<SceneUniform>(), 64 + 5 * 16);
    }

    #[test]
    fn instance_strides() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);
        assert_eq!(std::mem::size_of::<SphereVertex>(), 24);
        assert_eq!(std::mem::size_of::<OrbInstance>(), 64);
        assert_eq!(std::mem::size_of::<QuadCorner>(), 8);
    }

    #[test]
    fn layouts_use_step_modes() {
        assert_eq!(TerrainVertex::layout().step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(OrbInstance::layout().step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(dust_instance_layout().array_stride, 12);
    }
}
