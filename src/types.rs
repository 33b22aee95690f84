/// Per-frame scene uniform for all three pipelines
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub tube_model: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub fog_density: f32,
    pub camera_right: [f32; 3],
    pub tube_opacity: f32,
    pub camera_up: [f32; 3],
    pub star_opacity: f32,
    pub label_opacity: f32,
    pub star_size: f32,
    /// Global brightness applied to every pipeline's alpha
    pub intensity: f32,
    pub _pad: f32,
}

/// Tube vertex: position plus accent color (linear)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TubeVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

/// One star billboard
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
}

/// One label billboard; `uv_rows` selects its row in the label atlas
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub _pad: f32,
    pub size: [f32; 2],
    pub uv_rows: [f32; 2],
}
