use glam::{Mat4, Vec3, Vec4};

use super::ColorVertex;

/// Output of a vertex stage: clip-space position plus the colour varying.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipVertex {
    pub position: Vec4,
    pub color: Vec4,
}

/// `vs_passthrough`: homogenizes the position (w = 1), colour unchanged.
#[inline]
pub fn vertex_passthrough(v: &ColorVertex) -> ClipVertex {
    ClipVertex {
        position: Vec3::from_array(v.position).extend(1.0),
        color: Vec4::from_array(v.color),
    }
}

/// Transforms an already homogeneous position by `mvp`; colour unchanged.
#[inline]
pub fn vertex_transform(mvp: Mat4, position: Vec4, color: Vec4) -> ClipVertex {
    ClipVertex {
        position: mvp * position,
        color,
    }
}

/// `vs_mvp`: homogenizes the position, then transforms it by `mvp`.
#[inline]
pub fn vertex_mvp(mvp: Mat4, v: &ColorVertex) -> ClipVertex {
    let h = vertex_passthrough(v);
    vertex_transform(mvp, h.position, h.color)
}

/// Rasterizer varying: linear blend of the three vertex colours.
///
/// `weights` are barycentric and expected to sum to one; they are not
/// renormalized, matching the fixed-function behaviour for noperspective
/// varyings.
#[inline]
pub fn interpolate(a: &ClipVertex, b: &ClipVertex, c: &ClipVertex, weights: [f32; 3]) -> Vec4 {
    let [wa, wb, wc] = weights;
    a.color * wa + b.color * wb + c.color * wc
}

/// `fs_main`: the fragment colour is the interpolated colour.
#[inline]
pub fn fragment_passthrough(color: Vec4) -> Vec4 {
    color
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(position: [f32; 3], color: [f32; 4]) -> ColorVertex {
        ColorVertex::new(position, color)
    }

    // ── vertex: passthrough ───────────────────────────────────────────────

    #[test]
    fn passthrough_appends_w_one() {
        let out = vertex_passthrough(&v([3.5, -2.0, 0.25], [0.1, 0.2, 0.3, 0.4]));
        assert_eq!(out.position, Vec4::new(3.5, -2.0, 0.25, 1.0));
        assert_eq!(out.color, Vec4::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn passthrough_keeps_out_of_range_color() {
        let out = vertex_passthrough(&v([0.0; 3], [-1.0, 7.5, 0.0, 2.0]));
        assert_eq!(out.color, Vec4::new(-1.0, 7.5, 0.0, 2.0));
    }

    #[test]
    fn passthrough_propagates_nan() {
        let out = vertex_passthrough(&v([f32::NAN, 0.0, 0.0], [1.0; 4]));
        assert!(out.position.x.is_nan());
        assert_eq!(out.position.w, 1.0);
    }

    // ── vertex: transform ─────────────────────────────────────────────────

    #[test]
    fn transform_is_matrix_times_vector() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, //
            5.0, 6.0, 7.0, 8.0, //
            9.0, 10.0, 11.0, 12.0, //
            13.0, 14.0, 15.0, 16.0,
        ]);
        let p = Vec4::new(1.0, -1.0, 0.5, 2.0);
        let out = vertex_transform(m, p, Vec4::ONE);

        // Column-major: result = x*c0 + y*c1 + z*c2 + w*c3.
        let expected = Vec4::new(
            1.0 - 5.0 + 4.5 + 26.0,
            2.0 - 6.0 + 5.0 + 28.0,
            3.0 - 7.0 + 5.5 + 30.0,
            4.0 - 8.0 + 6.0 + 32.0,
        );
        assert!(out.position.abs_diff_eq(expected, 1e-5));
        assert_eq!(out.color, Vec4::ONE);
    }

    #[test]
    fn transform_identity_is_noop() {
        let p = Vec4::new(0.3, 0.6, -0.9, 1.0);
        let c = Vec4::new(0.0, 0.5, 1.0, 0.75);
        let out = vertex_transform(Mat4::IDENTITY, p, c);
        assert_eq!(out.position, p);
        assert_eq!(out.color, c);
    }

    #[test]
    fn transform_respects_w_for_translation() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let point = vertex_transform(m, Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::ONE);
        let direction = vertex_transform(m, Vec4::new(1.0, 0.0, 0.0, 0.0), Vec4::ONE);
        assert_eq!(point.position.x, 11.0);
        assert_eq!(direction.position.x, 1.0);
    }

    #[test]
    fn mvp_stage_homogenizes_before_transform() {
        let m = Mat4::from_scale(Vec3::splat(2.0));
        let out = vertex_mvp(m, &v([1.0, 2.0, 3.0], [0.0, 0.0, 1.0, 1.0]));
        assert_eq!(out.position, Vec4::new(2.0, 4.0, 6.0, 1.0));
        assert_eq!(out.color, Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    // ── fragment ──────────────────────────────────────────────────────────

    #[test]
    fn fragment_returns_input_exactly() {
        for c in [
            Vec4::new(0.0, 0.0, 0.0, 0.0),
            Vec4::new(0.2, 0.4, 0.6, 0.8),
            Vec4::new(-0.5, 1.5, -3.0, 42.0),
            Vec4::new(f32::MAX, f32::MIN, f32::EPSILON, -0.0),
        ] {
            let out = fragment_passthrough(c);
            assert_eq!(out.to_array().map(f32::to_bits), c.to_array().map(f32::to_bits));
        }
    }

    // ── rasterizer varying ────────────────────────────────────────────────

    #[test]
    fn interpolation_at_a_vertex_is_that_vertex_color() {
        let a = vertex_passthrough(&v([0.0; 3], [1.0, 0.0, 0.0, 1.0]));
        let b = vertex_passthrough(&v([0.0; 3], [0.0, 1.0, 0.0, 1.0]));
        let c = vertex_passthrough(&v([0.0; 3], [0.0, 0.0, 1.0, 1.0]));
        assert_eq!(interpolate(&a, &b, &c, [0.0, 1.0, 0.0]), b.color);
    }

    #[test]
    fn interpolation_at_centroid_averages() {
        let a = vertex_passthrough(&v([0.0; 3], [3.0, 0.0, 0.0, 1.0]));
        let b = vertex_passthrough(&v([0.0; 3], [0.0, 3.0, 0.0, 1.0]));
        let c = vertex_passthrough(&v([0.0; 3], [0.0, 0.0, 3.0, 1.0]));
        let third = 1.0 / 3.0;
        let got = interpolate(&a, &b, &c, [third, third, third]);
        assert!(got.abs_diff_eq(Vec4::new(1.0, 1.0, 1.0, 1.0), 1e-6));
    }

    // ── end to end ────────────────────────────────────────────────────────

    #[test]
    fn red_vertex_end_to_end() {
        let out = vertex_passthrough(&v([1.0, 0.0, 0.0], [1.0, 0.0, 0.0, 1.0]));
        assert_eq!(out.position, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(out.color, Vec4::new(1.0, 0.0, 0.0, 1.0));

        // A degenerate triangle made of the same vertex rasterizes to its colour.
        let pixel = fragment_passthrough(interpolate(&out, &out, &out, [0.25, 0.25, 0.5]));
        assert_eq!(pixel, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }
}
