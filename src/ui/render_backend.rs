use crate::error::RenderError;
use glam::{IVec2, Mat4, Vec2, Vec3, Vec4};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(pub u32);

/// A texture uploaded by the renderer together with its pixel size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn size(&self) -> IVec2 {
        IVec2::new(self.width as i32, self.height as i32)
    }
}

/// The shader programs the toolkit draws with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Program {
    SolidUi,
    TexturedUi,
    Font,
    Gradient,
    Hue,
}

impl Program {
    pub const ALL: [Program; 5] = [
        Program::SolidUi,
        Program::TexturedUi,
        Program::Font,
        Program::Gradient,
        Program::Hue,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Program::SolidUi => "solid_ui",
            Program::TexturedUi => "textured_ui",
            Program::Font => "font",
            Program::Gradient => "gradient",
            Program::Hue => "hue",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Uniform {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Sampler(i32),
}

/// Vertex data for one indexed triangle batch. Positions are in pixels.
#[derive(Clone, Copy, Debug)]
pub struct BatchData<'a> {
    pub positions: &'a [Vec3],
    pub uvs: &'a [Vec2],
    pub indices: &'a [u32],
}

impl BatchData<'_> {
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions)
    }

    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.uvs)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices)
    }
}

/// The GPU surface the toolkit draws through. Window creation and buffer
/// presentation stay with the platform layer.
pub trait Renderer {
    fn compile_program(
        &mut self,
        program: Program,
        vertex: &str,
        fragment: &str,
    ) -> Result<(), RenderError>;
    fn use_program(&mut self, program: Program);
    fn set_uniform(&mut self, program: Program, name: &str, value: Uniform);
    fn load_texture(&mut self, path: &Path) -> Result<Texture, RenderError>;
    fn release_texture(&mut self, texture: TextureId);
    fn bind_texture(&mut self, texture: TextureId);
    fn set_blending(&mut self, enabled: bool);
    fn create_batch(
        &mut self,
        program: Program,
        data: BatchData<'_>,
    ) -> Result<BatchId, RenderError>;
    /// Overwrites positions and uvs of a batch in place. The vertex count
    /// must match the one the batch was created with.
    fn update_batch(&mut self, batch: BatchId, positions: &[Vec3], uvs: &[Vec2]);
    fn release_batch(&mut self, batch: BatchId);
    fn draw_batch(&mut self, batch: BatchId, index_count: usize);
}

pub(crate) const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Axis-aligned quad geometry spanning `(0,0)..size` with full-texture uvs.
pub(crate) struct Quad {
    positions: [Vec3; 4],
    uvs: [Vec2; 4],
}

impl Quad {
    pub(crate) fn new(size: IVec2) -> Self {
        let size = size.as_vec2();
        Self {
            positions: [
                Vec3::ZERO,
                Vec3::new(size.x, 0.0, 0.0),
                Vec3::new(size.x, size.y, 0.0),
                Vec3::new(0.0, size.y, 0.0),
            ],
            uvs: [Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y],
        }
    }

    pub(crate) fn data(&self) -> BatchData<'_> {
        BatchData {
            positions: &self.positions,
            uvs: &self.uvs,
            indices: &QUAD_INDICES,
        }
    }

    pub(crate) fn upload(
        size: IVec2,
        program: Program,
        renderer: &mut dyn Renderer,
    ) -> Result<BatchId, RenderError> {
        renderer.create_batch(program, Quad::new(size).data())
    }
}
