use bytemuck::{Pod, Zeroable};

/// Size in bytes of the uniform block shared with `shader.wgsl`.
pub const UNIFORM_SIZE: u64 = 32;

/// Per-frame inputs for the backdrop shader.
///
/// Field order mirrors `struct Uniforms` in the WGSL source: eight `f32`
/// values, no implicit padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BackdropUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub intensity: f32,
    pub pointer_mix: f32,
    pub padding: f32,
}

const _: () = assert!(std::mem::size_of::<BackdropUniforms>() as u64 == UNIFORM_SIZE);

impl BackdropUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_layout_follows_field_order() {
        let uniforms = BackdropUniforms {
            resolution: [640.0, 480.0],
            pointer: [0.25, 0.75],
            time: 3.5,
            intensity: 1.0,
            pointer_mix: 1.0,
            padding: 0.0,
        };
        let floats: &[f32] = bytemuck::cast_slice(uniforms.as_bytes());
        assert_eq!(floats, &[640.0, 480.0, 0.25, 0.75, 3.5, 1.0, 1.0, 0.0]);
    }
}
