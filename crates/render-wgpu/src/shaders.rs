use cubegrid_render::ProgramSource;

/// WGSL vertex stage for flat-colored sub-cubes.
///
/// View and projection live in group 0 and are set once per frame. The model
/// matrix lives in group 1 behind a dynamic offset, one slot per draw.
pub const CUBE_VERTEX_SHADER: &str = r#"
struct Frame {
    uView: mat4x4<f32>,
    uProjection: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

@group(1) @binding(0)
var<uniform> uModel: mat4x4<f32>;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = frame.uProjection * frame.uView * uModel * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}
"#;

/// WGSL fragment stage: the interpolated vertex color, unlit.
pub const CUBE_FRAGMENT_SHADER: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

pub const CUBE_PROGRAM: ProgramSource<'static> = ProgramSource {
    vertex: CUBE_VERTEX_SHADER,
    fragment: CUBE_FRAGMENT_SHADER,
};

#[cfg(test)]
mod tests {
    use super::*;
    use cubegrid_render::{MODEL_UNIFORM, PROJECTION_UNIFORM, VIEW_UNIFORM};

    #[test]
    fn vertex_stage_declares_scene_uniforms() {
        for name in [MODEL_UNIFORM, VIEW_UNIFORM, PROJECTION_UNIFORM] {
            assert!(CUBE_VERTEX_SHADER.contains(name), "{name} missing");
        }
    }

    #[test]
    fn entry_points_present() {
        assert!(CUBE_VERTEX_SHADER.contains("fn vs_main"));
        assert!(CUBE_FRAGMENT_SHADER.contains("fn fs_main"));
    }
}
