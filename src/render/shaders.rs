use crate::error::RenderError;
use crate::ui::{Program, Renderer, Uniform};
use glam::Mat4;

pub const PROJECTION_UNIFORM: &str = "ui_projection_matrix";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ShaderVersion {
    Glsl120,
    #[default]
    Glsl140,
}

#[derive(Clone, Copy, Debug)]
pub struct ShaderSource {
    pub vertex: &'static str,
    pub fragment: &'static str,
}

pub fn shader_source(program: Program) -> ShaderSource {
    match program {
        Program::SolidUi => ShaderSource {
            vertex: SOLID_VERTEX,
            fragment: SOLID_FRAGMENT,
        },
        Program::TexturedUi => ShaderSource {
            vertex: TEXTURED_VERTEX,
            fragment: TEXTURED_FRAGMENT,
        },
        Program::Font => ShaderSource {
            vertex: FONT_VERTEX,
            fragment: FONT_FRAGMENT,
        },
        Program::Gradient => ShaderSource {
            vertex: TEXTURED_VERTEX,
            fragment: GRADIENT_FRAGMENT,
        },
        Program::Hue => ShaderSource {
            vertex: TEXTURED_VERTEX,
            fragment: HUE_FRAGMENT,
        },
    }
}

/// Rewrites a `#version 140` shader for GLSL 1.20 style drivers. The
/// version line becomes `#version 130`, `in` becomes
/// `attribute` (vertex) or `varying` (fragment), vertex `out` becomes
/// `varying`, and the fragment output is routed to `gl_FragColor`.
pub fn convert_to_glsl120(source: &str, vertex_stage: bool) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.split('\n') {
        let line = line.trim_end_matches('\r');
        if line.starts_with("#version 140") {
            out.push_str("#version 130");
        } else if let Some(rest) = line.strip_prefix("in ") {
            out.push_str(if vertex_stage { "attribute " } else { "varying " });
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("out ") {
            if vertex_stage {
                out.push_str("varying ");
                out.push_str(rest);
            }
        } else if vertex_stage {
            out.push_str(line);
        } else {
            out.push_str(&line.replace("fragment_color", "gl_FragColor"));
        }
        out.push('\n');
    }
    out
}

pub fn compile_programs(
    renderer: &mut dyn Renderer,
    version: ShaderVersion,
) -> Result<(), RenderError> {
    for program in Program::ALL {
        let source = shader_source(program);
        let result = match version {
            ShaderVersion::Glsl140 => {
                renderer.compile_program(program, source.vertex, source.fragment)
            }
            ShaderVersion::Glsl120 => renderer.compile_program(
                program,
                &convert_to_glsl120(source.vertex, true),
                &convert_to_glsl120(source.fragment, false),
            ),
        };
        if let Err(err) = result {
            tracing::error!(program = program.name(), error = %err, "shader compile failed");
            return Err(err);
        }
        tracing::debug!(program = program.name(), ?version, "compiled shader program");
    }
    Ok(())
}

pub fn push_projection(renderer: &mut dyn Renderer, projection: Mat4) {
    for program in Program::ALL {
        renderer.use_program(program);
        renderer.set_uniform(program, PROJECTION_UNIFORM, Uniform::Mat4(projection));
    }
}

const SOLID_VERTEX: &str = r#"#version 140

uniform vec3 position;
uniform mat4 ui_projection_matrix;

in vec3 in_position;

void main(void)
{
  gl_Position = ui_projection_matrix * vec4(position + in_position, 1);
}"#;

const SOLID_FRAGMENT: &str = r#"#version 140

uniform vec4 color;

out vec4 fragment_color;

void main(void)
{
  fragment_color = color;
}"#;

const TEXTURED_VERTEX: &str = r#"#version 140

uniform vec3 position;
uniform mat4 ui_projection_matrix;

in vec3 in_position;
in vec2 in_uv;

out vec2 uv;
out vec2 local;

void main(void)
{
  uv = in_uv;
  local = in_position.xy;
  gl_Position = ui_projection_matrix * vec4(position + in_position, 1);
}"#;

const TEXTURED_FRAGMENT: &str = r#"#version 140

uniform sampler2D active_texture;

in vec2 uv;
in vec2 local;

out vec4 fragment_color;

void main(void)
{
  fragment_color = texture2D(active_texture, uv);
}"#;

const FONT_VERTEX: &str = r#"#version 140

uniform vec2 position;
uniform mat4 ui_projection_matrix;

in vec3 in_position;
in vec2 in_uv;

out vec2 uv;

void main(void)
{
  uv = in_uv;
  gl_Position = ui_projection_matrix * vec4(in_position.xy + position, 0, 1);
}"#;

const FONT_FRAGMENT: &str = r#"#version 140

uniform sampler2D active_texture;
uniform vec3 color;

in vec2 uv;

out vec4 fragment_color;

void main(void)
{
  vec4 t = texture2D(active_texture, uv);
  fragment_color = vec4(t.rgb * color, t.a);
}"#;

const GRADIENT_FRAGMENT: &str = r#"#version 140

uniform vec3 hue;
uniform vec2 sel;
uniform vec2 size;

in vec2 uv;
in vec2 local;

out vec4 fragment_color;

void main(void)
{
  int posx = int(local.x);
  int posy = int(local.y);

  if (posx == 0 || posx == int(size.x) - 1 || posy == 0 || posy == int(size.y) - 1)
  {
    fragment_color = vec4(0, 0, 0, 1);
  }
  else
  {
    vec3 gradient = mix(vec3(1, 1, 1), hue, uv.x);
    float d = (uv.x - sel.x) * (uv.x - sel.x) + (uv.y - sel.y) * (uv.y - sel.y);
    bool outer = (d >= 0.0005 && d < 0.001);
    bool middle = (d >= 0.00025 && d < 0.0005);
    bool inner = (d >= 0.0001 && d < 0.00025);
    if (outer || inner) fragment_color = vec4(0, 0, 0, 1);
    else if (middle) fragment_color = vec4(1, 1, 1, 1);
    else fragment_color = vec4(gradient * uv.y, 1);
  }
}"#;

const HUE_FRAGMENT: &str = r#"#version 140

uniform float hue;
uniform vec2 size;

in vec2 uv;
in vec2 local;

out vec4 fragment_color;

float hue_to_channel(float p, float q, float t)
{
  if (t < 0.0) t += 1.0;
  if (t > 1.0) t -= 1.0;
  if (t < 1.0 / 6.0) return p + (q - p) * 6.0 * t;
  if (t < 1.0 / 2.0) return q;
  if (t < 2.0 / 3.0) return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
  return p;
}

vec3 hue_to_rgb(float h)
{
  return vec3(hue_to_channel(0.0, 1.0, h + 1.0 / 3.0),
              hue_to_channel(0.0, 1.0, h),
              hue_to_channel(0.0, 1.0, h - 1.0 / 3.0));
}

void main(void)
{
  int posx = int(local.x);
  int posy = int(local.y);

  if (posx == 10 || posx == int(size.x) - 1) fragment_color = vec4(0, 0, 0, 1);
  else if (local.x >= 10.0)
  {
    bool border = (posy == 0 || posy == int(size.y) - 1);
    fragment_color = border ? vec4(0, 0, 0, 1) : vec4(hue_to_rgb(uv.y), 1);
  }
  else if (local.x < 8.0)
  {
    float d = abs(local.y - hue * size.y);
    if (int(6.0 - local.x) == int(d)) fragment_color = vec4(0, 0, 0, 1);
    else if (6.0 - local.x > d) fragment_color = vec4(hue_to_rgb(hue), 1);
    else fragment_color = vec4(0, 0, 0, 0);
  }
  else fragment_color = vec4(0, 0, 0, 0);
}"#;
