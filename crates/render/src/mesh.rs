use bytemuck::{Pod, Zeroable};
use cubegrid_common::{Face, FaceColors};

/// Vertex of a colored cube: position and RGBA color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

const P: f32 = 0.5;

/// Corners of each face, counter-clockwise when seen from outside.
#[rustfmt::skip]
const FACE_CORNERS: [(Face, [[f32; 3]; 4]); 6] = [
    (Face::Front, [[-P, -P,  P], [ P, -P,  P], [ P,  P,  P], [-P,  P,  P]]),
    (Face::Back,  [[ P, -P, -P], [-P, -P, -P], [-P,  P, -P], [ P,  P, -P]]),
    (Face::Right, [[ P, -P,  P], [ P, -P, -P], [ P,  P, -P], [ P,  P,  P]]),
    (Face::Left,  [[-P, -P, -P], [-P, -P,  P], [-P,  P,  P], [-P,  P, -P]]),
    (Face::Up,    [[-P,  P,  P], [ P,  P,  P], [ P,  P, -P], [-P,  P, -P]]),
    (Face::Down,  [[-P, -P, -P], [ P, -P, -P], [ P, -P,  P], [-P, -P,  P]]),
];

/// Number of indices in a cube mesh.
pub const CUBE_INDEX_COUNT: u32 = 36;

/// Unit cube centered at the origin, each face flat-colored.
pub fn cube_mesh(colors: &FaceColors) -> (Vec<Vertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(CUBE_INDEX_COUNT as usize);
    for (face, corners) in FACE_CORNERS {
        let base = vertices.len() as u16;
        let color = colors[face].0;
        vertices.extend(corners.iter().map(|&position| Vertex { position, color }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubegrid_common::Rgba;
    use glam::Vec3;

    #[test]
    fn mesh_sizes() {
        let (v, i) = cube_mesh(&FaceColors::default());
        assert_eq!(v.len(), 24);
        assert_eq!(i.len(), CUBE_INDEX_COUNT as usize);
        assert!(i.iter().all(|&idx| (idx as usize) < v.len()));
    }

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        let (v, i) = cube_mesh(&FaceColors::default());
        for tri in i.chunks(3) {
            let a = Vec3::from(v[tri[0] as usize].position);
            let b = Vec3::from(v[tri[1] as usize].position);
            let c = Vec3::from(v[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            let center = (a + b + c) / 3.0;
            assert!(normal.dot(center) > 0.0, "triangle {tri:?} faces inward");
        }
    }

    #[test]
    fn face_vertices_carry_face_color() {
        let mut colors = FaceColors::default();
        colors.up = Rgba::GREEN;
        let (v, _) = cube_mesh(&colors);
        for vertex in &v {
            let on_top = vertex.position[1] == P;
            if vertex.color == Rgba::GREEN.0 {
                assert!(on_top);
            }
        }
        assert_eq!(v.iter().filter(|x| x.color == Rgba::GREEN.0).count(), 4);
    }

    #[test]
    fn vertex_is_pod() {
        let (v, _) = cube_mesh(&FaceColors::default());
        let bytes: &[u8] = bytemuck::cast_slice(&v);
        assert_eq!(bytes.len(), v.len() * std::mem::size_of::<Vertex>());
    }
}
