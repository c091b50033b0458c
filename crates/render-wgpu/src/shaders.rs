/// WGSL shader for the water mesh: two scrolled texture tiles, vertex color,
/// ambient plus directional lighting, linear depth fog.
///
/// Vertex inputs match `tidewater_common::Vertex`: fixed-point position,
/// snorm normal, unorm color, and texel coordinates with 5 fractional bits.
pub const WATER_SHADER: &str = r#"
struct Globals {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    fog_color: vec4<f32>,
    // near, far, enabled, unused
    fog_params: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: array<vec4<f32>, 4>,
    light_color: array<vec4<f32>, 4>,
    // x = enabled light count
    light_params: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
    // tile 0 (s, t), tile 1 (s, t), in texels
    tile_offset: vec4<f32>,
    // tile 0 (w, h), tile 1 (w, h), in texels
    tile_size: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> draw: Draw;

@group(2) @binding(0)
var tile0: texture_2d<f32>;
@group(2) @binding(1)
var tile1: texture_2d<f32>;
@group(2) @binding(2)
var tile_sampler: sampler;

struct VertexInput {
    @location(0) position: vec4<i32>,
    @location(1) normal: vec4<f32>,
    @location(2) color: vec4<f32>,
    @location(3) uv: vec2<i32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv0: vec2<f32>,
    @location(1) uv1: vec2<f32>,
    @location(2) color: vec4<f32>,
    @location(3) fog: f32,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world_pos = draw.model * vec4<f32>(vec3<f32>(in.position.xyz), 1.0);
    let view_pos = globals.view * world_pos;
    let normal = normalize((draw.model * vec4<f32>(in.normal.xyz, 0.0)).xyz);

    var light = globals.ambient.rgb;
    let count = u32(globals.light_params.x);
    for (var i = 0u; i < count; i = i + 1u) {
        let d = max(dot(normal, globals.light_dir[i].xyz), 0.0);
        light = light + globals.light_color[i].rgb * d;
    }

    let texels = vec2<f32>(in.uv) / 32.0;

    var fog = 0.0;
    if (globals.fog_params.z > 0.5) {
        let near = globals.fog_params.x;
        let far = globals.fog_params.y;
        fog = clamp((-view_pos.z - near) / max(far - near, 0.0001), 0.0, 1.0);
    }

    var out: VertexOutput;
    out.clip_position = globals.projection * view_pos;
    out.uv0 = (texels + draw.tile_offset.xy) / draw.tile_size.xy;
    out.uv1 = (texels + draw.tile_offset.zw) / draw.tile_size.zw;
    out.color = vec4<f32>(in.color.rgb * min(light, vec3<f32>(1.0)), in.color.a);
    out.fog = fog;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let a = textureSample(tile0, tile_sampler, in.uv0);
    let b = textureSample(tile1, tile_sampler, in.uv1);
    let texel = (a + b) * 0.5;
    let lit = texel.rgb * in.color.rgb;
    let rgb = mix(lit, globals.fog_color.rgb, in.fog);
    return vec4<f32>(rgb, 1.0);
}
"#;
