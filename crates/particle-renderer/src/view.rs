//! Orthographic box view

use bytemuck::{Pod, Zeroable};

/// How the box maps onto the window: the full box fills the viewport,
/// with the origin in the bottom-left corner.
#[derive(Clone, Copy, Debug)]
pub struct BoxView {
    pub width: f32,
    pub height: f32,
    /// Point radius in box units.
    pub point_radius: f32,
}

impl BoxView {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            point_radius: 2.5,
        }
    }

    pub fn to_uniform(&self) -> ViewUniform {
        ViewUniform {
            box_size: [self.width, self.height],
            point_radius: self.point_radius,
            _pad: 0.0,
        }
    }
}

/// View data in the layout the shaders expect.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ViewUniform {
    pub box_size: [f32; 2],
    pub point_radius: f32,
    pub _pad: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_matches_the_shader_layout() {
        assert_eq!(std::mem::size_of::<ViewUniform>(), 16);
    }

    #[test]
    fn uniform_carries_the_view() {
        let view = BoxView::new(1800.0, 1000.0);
        let uniform = view.to_uniform();

        assert_eq!(uniform.box_size, [1800.0, 1000.0]);
        assert_eq!(uniform.point_radius, 2.5);
    }
}
