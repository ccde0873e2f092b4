use crate::error::RenderError;
use crate::ui::{BatchData, BatchId, Program, Renderer, Texture, TextureId, Uniform};
use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

/// One renderer command, as observed by [`RecordingRenderer`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCall {
    CompileProgram(Program),
    UseProgram(Program),
    SetUniform {
        program: Program,
        name: String,
        value: Uniform,
    },
    LoadTexture(TextureId),
    ReleaseTexture(TextureId),
    BindTexture(TextureId),
    SetBlending(bool),
    CreateBatch {
        batch: BatchId,
        program: Program,
        vertices: usize,
        indices: usize,
    },
    UpdateBatch {
        batch: BatchId,
        vertices: usize,
    },
    ReleaseBatch(BatchId),
    Draw {
        batch: BatchId,
        indices: usize,
    },
}

#[derive(Clone, Debug)]
pub struct BatchRecord {
    pub program: Program,
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

/// Headless renderer that records every call and serves textures from an
/// in-memory size table. Useful for tests and for tooling that wants to
/// inspect a frame without a GL context.
#[derive(Default)]
pub struct RecordingRenderer {
    calls: Vec<RenderCall>,
    batches: FxHashMap<BatchId, BatchRecord>,
    texture_sizes: FxHashMap<PathBuf, (u32, u32)>,
    textures: FxHashMap<TextureId, PathBuf>,
    next_batch: u32,
    next_texture: u32,
    uploaded_bytes: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture file the renderer will pretend to load.
    pub fn with_texture(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.texture_sizes.insert(path.into(), (width, height));
        self
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn batch(&self, batch: BatchId) -> Option<&BatchRecord> {
        self.batches.get(&batch)
    }

    pub fn live_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.uploaded_bytes
    }

    /// Batches drawn since the last `take_calls`, in draw order.
    pub fn draws(&self) -> Vec<(BatchId, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RenderCall::Draw { batch, indices } => Some((*batch, *indices)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn compile_program(
        &mut self,
        program: Program,
        vertex: &str,
        fragment: &str,
    ) -> Result<(), RenderError> {
        if vertex.is_empty() || fragment.is_empty() {
            return Err(RenderError::ShaderCompile {
                program: program.name(),
                log: "empty shader source".to_string(),
            });
        }
        self.calls.push(RenderCall::CompileProgram(program));
        Ok(())
    }

    fn use_program(&mut self, program: Program) {
        self.calls.push(RenderCall::UseProgram(program));
    }

    fn set_uniform(&mut self, program: Program, name: &str, value: Uniform) {
        self.calls.push(RenderCall::SetUniform {
            program,
            name: name.to_string(),
            value,
        });
    }

    fn load_texture(&mut self, path: &Path) -> Result<Texture, RenderError> {
        let Some(&(width, height)) = self.texture_sizes.get(path) else {
            return Err(RenderError::TextureNotFound(path.to_path_buf()));
        };
        self.next_texture += 1;
        let id = TextureId(self.next_texture);
        self.textures.insert(id, path.to_path_buf());
        self.calls.push(RenderCall::LoadTexture(id));
        Ok(Texture { id, width, height })
    }

    fn release_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.calls.push(RenderCall::ReleaseTexture(texture));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(RenderCall::BindTexture(texture));
    }

    fn set_blending(&mut self, enabled: bool) {
        self.calls.push(RenderCall::SetBlending(enabled));
    }

    fn create_batch(
        &mut self,
        program: Program,
        data: BatchData<'_>,
    ) -> Result<BatchId, RenderError> {
        if data.positions.len() != data.uvs.len() {
            return Err(RenderError::Backend(format!(
                "{} positions but {} uvs",
                data.positions.len(),
                data.uvs.len()
            )));
        }
        self.next_batch += 1;
        let batch = BatchId(self.next_batch);
        self.uploaded_bytes +=
            data.position_bytes().len() + data.uv_bytes().len() + data.index_bytes().len();
        self.batches.insert(
            batch,
            BatchRecord {
                program,
                positions: data.positions.to_vec(),
                uvs: data.uvs.to_vec(),
                indices: data.indices.to_vec(),
            },
        );
        self.calls.push(RenderCall::CreateBatch {
            batch,
            program,
            vertices: data.positions.len(),
            indices: data.indices.len(),
        });
        Ok(batch)
    }

    fn update_batch(&mut self, batch: BatchId, positions: &[Vec3], uvs: &[Vec2]) {
        if let Some(record) = self.batches.get_mut(&batch) {
            let count = record.positions.len().min(positions.len());
            record.positions[..count].copy_from_slice(&positions[..count]);
            let count = record.uvs.len().min(uvs.len());
            record.uvs[..count].copy_from_slice(&uvs[..count]);
            self.uploaded_bytes += bytemuck::cast_slice::<Vec3, u8>(positions).len()
                + bytemuck::cast_slice::<Vec2, u8>(uvs).len();
        }
        self.calls.push(RenderCall::UpdateBatch {
            batch,
            vertices: positions.len(),
        });
    }

    fn release_batch(&mut self, batch: BatchId) {
        self.batches.remove(&batch);
        self.calls.push(RenderCall::ReleaseBatch(batch));
    }

    fn draw_batch(&mut self, batch: BatchId, index_count: usize) {
        self.calls.push(RenderCall::Draw {
            batch,
            indices: index_count,
        });
    }
}
