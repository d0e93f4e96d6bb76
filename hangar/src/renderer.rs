use glam::Vec2;
use glyph_brush::{
    ab_glyph::{Font as _, PxScale, ScaleFont},
    BrushAction, BrushError, GlyphBrushBuilder, GlyphCruncher, Layout, Section,
};
use miniquad::*;
use palette::LinSrgba;
use std::{collections::HashMap, ops::Range};
use tread::{Mesh, Rect, RenderTarget, Text, TextStyle, Transform, Vertex};

use crate::{asset, Font, RenderingContext};

type GlyphBrush = glyph_brush::GlyphBrush<([Vertex; 4], usize)>;

mod shader {
    use glam::Vec2;
    use miniquad::*;

    pub const VERTEX: &str = r#"#version 100
    const vec2 FLIP_Y = vec2(1.0, -1.0);

    attribute vec2 in_pos;
    attribute vec2 in_uv;
    attribute vec4 in_color;

    uniform vec2 screen_size;

    varying lowp vec2 texcoord;
    varying lowp vec4 color;

    void main() {
        gl_Position = vec4((in_pos / screen_size * 2.0 - 1.0) * FLIP_Y, 0.0, 1.0);
        texcoord = in_uv;
        color = in_color;
    }"#;

    pub const FRAGMENT: &str = r#"#version 100
    varying lowp vec2 texcoord;
    varying lowp vec4 color;

    uniform sampler2D tex;
    uniform sampler2D mask;

    void main() {
        mediump float alpha = texture2D(mask, texcoord).r;
        if (alpha <= 0.0) {
            discard;
        }
        gl_FragColor = texture2D(tex, texcoord) * color * vec4(1.0, 1.0, 1.0, alpha);
    }"#;

    pub fn meta() -> ShaderMeta {
        ShaderMeta {
            images: vec!["tex".to_string(), "mask".to_string()],
            uniforms: UniformBlockLayout {
                uniforms: vec![UniformDesc::new("screen_size", UniformType::Float2)],
            },
        }
    }

    pub fn attributes() -> [VertexAttribute; 3] {
        [
            VertexAttribute::new("in_pos", VertexFormat::Float2),
            VertexAttribute::new("in_uv", VertexFormat::Float2),
            VertexAttribute::new("in_color", VertexFormat::Float4),
        ]
    }

    #[repr(C)]
    pub struct Uniforms {
        pub screen_size: Vec2,
    }
}

const WHITE_PIXEL_KEY: u32 = 0;
const INVALID_TEXTURE_KEY: u32 = 1;
const MAX_BATCH_VERTICES: usize = u16::MAX as usize + 1;
const MAX_GLYPH_QUADS: usize = MAX_BATCH_VERTICES / 4;

struct GlyphLayer {
    layer: usize,
    combine: bool,
}

impl GlyphLayer {
    fn new() -> Self {
        GlyphLayer {
            layer: 0,
            combine: true,
        }
    }
    fn next(&mut self) -> usize {
        if !self.combine {
            self.layer += 1;
            self.combine = true;
        }
        self.layer
    }
    fn finish(&mut self) {
        self.combine = false;
    }
    fn reset(&mut self) {
        self.combine = true;
        self.layer = 0;
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
enum Batch {
    Mesh {
        texture: u32,
        vertices: Range<usize>,
        indices: Range<usize>,
    },
    Text(usize),
}

/// Queued triangles for one frame, grouped into draw calls. Consecutive meshes
/// with the same texture share a batch as long as their indices fit in `u16`.
#[derive(Default)]
struct Batcher {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    batches: Vec<Batch>,
}

impl Batcher {
    fn push_mesh(&mut self, texture: u32, mesh: &Mesh) {
        if mesh.is_empty() || mesh.vertices.len() > MAX_BATCH_VERTICES {
            return;
        }
        let vertex_start = self.vertices.len();
        let index_start = self.indices.len();
        let base = match self.batches.last_mut() {
            Some(Batch::Mesh {
                texture: batch_texture,
                vertices,
                indices,
            }) if *batch_texture == texture
                && vertices.len() + mesh.vertices.len() <= MAX_BATCH_VERTICES =>
            {
                let base = vertices.len();
                vertices.end = vertex_start + mesh.vertices.len();
                indices.end = index_start + mesh.indices.len();
                base
            }
            _ => {
                self.batches.push(Batch::Mesh {
                    texture,
                    vertices: vertex_start..vertex_start + mesh.vertices.len(),
                    indices: index_start..index_start + mesh.indices.len(),
                });
                0
            }
        };
        self.vertices.extend_from_slice(&mesh.vertices);
        self.indices
            .extend(mesh.indices.iter().map(|&index| index + base as u16));
    }
    fn push_text(&mut self, layer: usize) {
        if self.batches.last() != Some(&Batch::Text(layer)) {
            self.batches.push(Batch::Text(layer));
        }
    }
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.batches.clear();
    }
}

/// Vertex and index buffers that grow when a batch does not fit.
struct StreamBuffers {
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl StreamBuffers {
    fn new(context: &mut RenderingContext) -> Self {
        let vertex_capacity = 1024;
        let index_capacity = 1536;
        StreamBuffers {
            vertex_buffer: context.new_buffer(
                BufferType::VertexBuffer,
                BufferUsage::Stream,
                BufferSource::empty::<Vertex>(vertex_capacity),
            ),
            index_buffer: context.new_buffer(
                BufferType::IndexBuffer,
                BufferUsage::Stream,
                BufferSource::empty::<u16>(index_capacity),
            ),
            vertex_capacity,
            index_capacity,
        }
    }

    fn upload(&mut self, context: &mut RenderingContext, vertices: &[Vertex], indices: &[u16]) {
        if vertices.len() > self.vertex_capacity {
            self.vertex_capacity = vertices.len().next_power_of_two();
            context.delete_buffer(self.vertex_buffer);
            self.vertex_buffer = context.new_buffer(
                BufferType::VertexBuffer,
                BufferUsage::Stream,
                BufferSource::empty::<Vertex>(self.vertex_capacity),
            );
        }
        if indices.len() > self.index_capacity {
            self.index_capacity = indices.len().next_power_of_two();
            context.delete_buffer(self.index_buffer);
            self.index_buffer = context.new_buffer(
                BufferType::IndexBuffer,
                BufferUsage::Stream,
                BufferSource::empty::<u16>(self.index_capacity),
            );
        }
        context.buffer_update(self.vertex_buffer, BufferSource::slice(vertices));
        context.buffer_update(self.index_buffer, BufferSource::slice(indices));
    }

    fn bindings(&self, texture: TextureId, mask: TextureId) -> Bindings {
        Bindings {
            vertex_buffers: vec![self.vertex_buffer],
            index_buffer: self.index_buffer,
            images: vec![texture, mask],
        }
    }
}

/// Screen position of the text's layout origin and the pixel scale of its
/// glyphs. Rotation is not applied.
fn text_placement(text: &Text) -> (Vec2, PxScale) {
    let transform = &text.transform;
    let size = text.character_size as f32;
    (
        transform.position - transform.origin * transform.scale,
        PxScale {
            x: size * transform.scale.x,
            y: size * transform.scale.y,
        },
    )
}

/// Directions the glyphs are repeated in to draw an outline.
fn outline_offsets(thickness: f32) -> Vec<Vec2> {
    if thickness <= 0. {
        return Vec::new();
    }
    let diagonal = thickness * std::f32::consts::FRAC_1_SQRT_2;
    vec![
        Vec2::new(-thickness, 0.),
        Vec2::new(thickness, 0.),
        Vec2::new(0., -thickness),
        Vec2::new(0., thickness),
        Vec2::new(-diagonal, -diagonal),
        Vec2::new(diagonal, -diagonal),
        Vec2::new(-diagonal, diagonal),
        Vec2::new(diagonal, diagonal),
    ]
}

/// Underline and strike-through bars in the text's local coordinates, for a
/// line `width` wide whose baseline is `ascent` below the top.
fn decoration_rects(style: TextStyle, width: f32, ascent: f32, size: f32) -> Vec<Rect> {
    let thickness = (size / 15.).max(1.);
    let mut rects = Vec::new();
    if style.contains(TextStyle::UNDERLINED) {
        rects.push(Rect::new(0., ascent + size * 0.1, width, thickness));
    }
    if style.contains(TextStyle::STRIKE_THROUGH) {
        rects.push(Rect::new(0., ascent - size * 0.3, width, thickness));
    }
    rects
}

fn text_layout(string: &str) -> Layout<glyph_brush::BuiltInLineBreaker> {
    if string.contains('\n') {
        Layout::default_wrap()
    } else {
        Layout::default_single_line()
    }
}

fn glyph_quad(glyph_vertex: glyph_brush::GlyphVertex) -> ([Vertex; 4], usize) {
    let pos = glyph_vertex.pixel_coords;
    let uv = glyph_vertex.tex_coords;
    let color = glyph_vertex.extra.color;
    let corner = |x: f32, y: f32, u: f32, v: f32| Vertex {
        position: Vec2::new(x, y),
        uv: Vec2::new(u, v),
        color,
    };
    (
        [
            corner(pos.min.x, pos.min.y, uv.min.x, uv.min.y),
            corner(pos.max.x, pos.min.y, uv.max.x, uv.min.y),
            corner(pos.max.x, pos.max.y, uv.max.x, uv.max.y),
            corner(pos.min.x, pos.max.y, uv.min.x, uv.max.y),
        ],
        glyph_vertex.extra.z as usize,
    )
}

fn quad_indices(count: usize) -> Vec<u16> {
    (0..count as u16)
        .flat_map(|i| {
            let base = i * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect()
}

/// Draws widget meshes and text with miniquad. Everything queued during a
/// frame is flushed by [`ShapeRenderer::render_pass`].
pub struct ShapeRenderer {
    screen_size: Vec2,
    clear_color: LinSrgba,
    pipeline: Pipeline,
    buffers: StreamBuffers,
    batcher: Batcher,
    textures: HashMap<u32, TextureId>,
    next_texture_key: u32,
    glyph_brush: GlyphBrush,
    glyph_texture: TextureId,
    glyph_layer: GlyphLayer,
    glyph_quads: Vec<Vec<[Vertex; 4]>>,
}

impl ShapeRenderer {
    fn create_glyph_texture(
        context: &mut RenderingContext,
        (width, height): (u32, u32),
    ) -> TextureId {
        context.new_texture(
            TextureAccess::Static,
            TextureSource::Empty,
            TextureParams {
                kind: TextureKind::Texture2D,
                format: TextureFormat::Alpha,
                wrap: TextureWrap::Clamp,
                min_filter: FilterMode::Linear,
                mag_filter: FilterMode::Linear,
                mipmap_filter: MipmapFilterMode::None,
                width,
                height,
                allocate_mipmaps: false,
            },
        )
    }

    pub fn new(context: &mut RenderingContext, fonts: Vec<Font>) -> Self {
        let shader = context
            .new_shader(
                ShaderSource::Glsl {
                    vertex: shader::VERTEX,
                    fragment: shader::FRAGMENT,
                },
                shader::meta(),
            )
            .expect("built-in shader must compile");
        let pipeline = context.new_pipeline(
            &[BufferLayout::default()],
            &shader::attributes(),
            shader,
            PipelineParams {
                color_blend: Some(BlendState::new(
                    Equation::Add,
                    BlendFactor::Value(BlendValue::SourceAlpha),
                    BlendFactor::OneMinusValue(BlendValue::SourceAlpha),
                )),
                ..Default::default()
            },
        );

        let mut textures = HashMap::new();
        textures.insert(
            WHITE_PIXEL_KEY,
            context.new_texture_from_rgba8(1, 1, &[255; 4]),
        );
        textures.insert(
            INVALID_TEXTURE_KEY,
            context.new_texture_from_rgba8(1, 1, &[255, 0, 255, 255]),
        );
        let glyph_brush = GlyphBrushBuilder::using_fonts(fonts).build();
        let glyph_texture = Self::create_glyph_texture(context, glyph_brush.texture_dimensions());

        ShapeRenderer {
            screen_size: Vec2::ONE,
            clear_color: tread::defs::WHITE,
            pipeline,
            buffers: StreamBuffers::new(context),
            batcher: Batcher::default(),
            textures,
            next_texture_key: INVALID_TEXTURE_KEY + 1,
            glyph_brush,
            glyph_texture,
            glyph_layer: GlyphLayer::new(),
            glyph_quads: Vec::new(),
        }
    }

    pub fn set_screen_size(&mut self, width: f32, height: f32) {
        self.screen_size = Vec2::new(width, height);
    }
    pub fn set_clear_color(&mut self, color: LinSrgba) {
        self.clear_color = color;
    }

    pub fn add_texture(
        &mut self,
        context: &mut RenderingContext,
        width: u16,
        height: u16,
        rgba: &[u8],
    ) -> tread::Texture {
        let key = self.next_texture_key;
        self.next_texture_key += 1;
        self.textures
            .insert(key, context.new_texture_from_rgba8(width, height, rgba));
        tread::Texture::new(key, glam::UVec2::new(width.into(), height.into()))
    }
    pub fn load_texture(
        &mut self,
        context: &mut RenderingContext,
        prefix: &str,
        file: &str,
    ) -> asset::Result<tread::Texture> {
        let pixels = asset::load_png_file(prefix, file)?;
        let (Ok(width), Ok(height)) = (pixels.width.try_into(), pixels.height.try_into()) else {
            return Err(asset::AssetError::new(
                asset::get_path(prefix, file),
                asset::Access::Read,
                asset::ErrorKind::Format(format!(
                    "texture is too large ({}x{})",
                    pixels.width, pixels.height
                )),
            ));
        };
        Ok(self.add_texture(context, width, height, &pixels.rgba))
    }
    pub fn remove_texture(&mut self, context: &mut RenderingContext, texture: tread::Texture) {
        if texture.key() <= INVALID_TEXTURE_KEY {
            return;
        }
        if let Some(id) = self.textures.remove(&texture.key()) {
            context.delete_texture(id);
        }
    }
    /// Magenta placeholder for textures that failed to load.
    pub fn invalid_texture(&self) -> tread::Texture {
        tread::Texture::new(INVALID_TEXTURE_KEY, glam::UVec2::ONE)
    }

    fn texture_id(&self, key: u32) -> TextureId {
        self.textures
            .get(&key)
            .or_else(|| self.textures.get(&INVALID_TEXTURE_KEY))
            .copied()
            .unwrap_or(self.glyph_texture)
    }

    fn queue_glyphs(
        &mut self,
        text: &Text,
        position: Vec2,
        scale: PxScale,
        color: LinSrgba,
        layer: usize,
    ) {
        let section = Section::default()
            .with_screen_position((position.x, position.y))
            .with_layout(text_layout(&text.string))
            .add_text(
                glyph_brush::Text::new(&text.string)
                    .with_scale(scale)
                    .with_font_id(text.font)
                    .with_color(<[f32; 4]>::from(color))
                    .with_z(layer as f32),
            );
        self.glyph_brush.queue(section);
    }

    fn ascent(&self, text: &Text) -> f32 {
        self.glyph_brush
            .fonts()
            .get(text.font.0)
            .map(|font| font.as_scaled(text.character_size as f32).ascent())
            .unwrap_or(text.character_size as f32)
    }

    fn process_queued_text(&mut self, context: &mut RenderingContext) {
        let brush_action = loop {
            let glyph_texture = self.glyph_texture;
            let action = self.glyph_brush.process_queued(
                |rect, tex_data| {
                    // Update part of gpu texture with new glyph alpha values
                    context.texture_update_part(
                        glyph_texture,
                        rect.min[0] as i32,
                        rect.min[1] as i32,
                        rect.width() as i32,
                        rect.height() as i32,
                        tex_data,
                    );
                },
                glyph_quad,
            );

            // If the cache texture is too small to fit all the glyphs, resize and try again
            match action {
                Ok(action) => break action,
                Err(BrushError::TextureTooSmall { suggested, .. }) => {
                    log::debug!("Resizing glyph texture to {}x{}", suggested.0, suggested.1);
                    context.delete_texture(self.glyph_texture);
                    self.glyph_texture = Self::create_glyph_texture(context, suggested);
                    self.glyph_brush.resize_texture(suggested.0, suggested.1);
                }
            }
        };

        // If the text has changed from what was last drawn, store new quads
        if let BrushAction::Draw(quads) = brush_action {
            self.glyph_quads.clear();
            self.glyph_quads
                .resize(self.glyph_layer.layer + 1, Vec::new());
            for (quad, layer) in quads {
                if let Some(layer_quads) = self.glyph_quads.get_mut(layer) {
                    layer_quads.push(quad);
                }
            }
        }
    }

    pub fn render(&mut self, context: &mut RenderingContext) {
        self.process_queued_text(context);
        context.apply_pipeline(&self.pipeline);
        context.apply_uniforms(UniformsSource::table(&shader::Uniforms {
            screen_size: self.screen_size,
        }));
        let white_pixel = self.texture_id(WHITE_PIXEL_KEY);
        let batches = std::mem::take(&mut self.batcher.batches);
        for batch in batches {
            match batch {
                Batch::Mesh {
                    texture,
                    vertices,
                    indices,
                } => {
                    let count = indices.len();
                    self.buffers.upload(
                        context,
                        &self.batcher.vertices[vertices],
                        &self.batcher.indices[indices],
                    );
                    let texture = self.texture_id(texture);
                    context.apply_bindings(&self.buffers.bindings(texture, white_pixel));
                    context.draw(0, count as i32, 1);
                }
                Batch::Text(layer) => {
                    let Some(quads) = self.glyph_quads.get(layer) else {
                        continue;
                    };
                    for chunk in quads.chunks(MAX_GLYPH_QUADS) {
                        let vertices: Vec<Vertex> = chunk.iter().flatten().copied().collect();
                        let indices = quad_indices(chunk.len());
                        self.buffers.upload(context, &vertices, &indices);
                        context.apply_bindings(
                            &self.buffers.bindings(white_pixel, self.glyph_texture),
                        );
                        context.draw(0, indices.len() as i32, 1);
                    }
                }
            }
        }
        self.batcher.clear();
        self.glyph_layer.reset();
    }
    pub fn render_pass(&mut self, context: &mut RenderingContext) {
        let (red, green, blue, alpha) = self.clear_color.into_components();
        context.begin_default_pass(PassAction::clear_color(red, green, blue, alpha));
        self.render(context);
        context.end_render_pass();
    }
}

impl RenderTarget for ShapeRenderer {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.glyph_layer.finish();
        let texture = mesh.texture.map_or(WHITE_PIXEL_KEY, |texture| texture.key());
        self.batcher.push_mesh(texture, mesh);
    }

    fn draw_text(&mut self, text: &Text) {
        if text.string.is_empty() {
            return;
        }
        let layer = self.glyph_layer.next();
        let (position, scale) = text_placement(text);
        let screen_scale = text.transform.scale;
        for offset in outline_offsets(text.outline_thickness) {
            self.queue_glyphs(
                text,
                position + offset * screen_scale,
                scale,
                text.outline_color,
                layer,
            );
        }
        self.queue_glyphs(text, position, scale, text.fill_color, layer);
        if text.style.contains(TextStyle::BOLD) {
            let offset = Vec2::new(scale.x / 30., 0.).max(Vec2::new(1., 0.));
            self.queue_glyphs(text, position + offset, scale, text.fill_color, layer);
        }
        self.batcher.push_text(layer);

        if !text.style.contains(TextStyle::UNDERLINED)
            && !text.style.contains(TextStyle::STRIKE_THROUGH)
        {
            return;
        }
        let decorations = decoration_rects(
            text.style,
            self.text_bounds(text).width(),
            self.ascent(text),
            text.character_size as f32,
        );
        let transform = Transform {
            rotation: 0.,
            ..text.transform
        };
        for rect in decorations {
            self.draw_mesh(&Mesh::quad(transform.apply_rect(rect), text.fill_color));
        }
    }

    fn text_bounds(&mut self, text: &Text) -> Rect {
        if text.string.is_empty() {
            return Rect::ZERO;
        }
        let section = Section::default()
            .with_layout(text_layout(&text.string))
            .add_text(
                glyph_brush::Text::new(&text.string)
                    .with_scale(text.character_size as f32)
                    .with_font_id(text.font),
            );
        let Some(bounds) = self.glyph_brush.glyph_bounds(&section) else {
            return Rect::ZERO;
        };
        let rect = Rect::new(
            bounds.min.x,
            bounds.min.y,
            bounds.width(),
            bounds.height(),
        );
        let outline = text.outline_thickness.max(0.);
        rect.expand(tread::Margins::splat(outline))
    }
}
