use super::{split_point, Scalar, VectorKernels};
use num_complex::Complex32;
use wide::{f32x4, f32x8};

macro_rules! lane_kernels {
    ($(#[$meta:meta])* $name:ident, $vector:ty, $lanes:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl $name {
            #[inline(always)]
            fn load(src: &[f32]) -> $vector {
                let mut lanes = [0.0f32; $lanes];
                lanes.copy_from_slice(src);
                <$vector>::from(lanes)
            }

            // Complex products gather real and imaginary parts into separate
            // registers element by element. They reproduce `Scalar` bit for
            // bit, but the gather costs about as much as the lane arithmetic saves.
            #[inline(always)]
            fn load_split(src: &[Complex32]) -> ($vector, $vector) {
                let mut re = [0.0f32; $lanes];
                let mut im = [0.0f32; $lanes];
                for (i, c) in src.iter().enumerate() {
                    re[i] = c.re;
                    im[i] = c.im;
                }
                (<$vector>::from(re), <$vector>::from(im))
            }

            #[inline(always)]
            fn store_split(dst: &mut [Complex32], re: $vector, im: $vector) {
                let re = re.to_array();
                let im = im.to_array();
                for (i, c) in dst.iter_mut().enumerate() {
                    *c = Complex32::new(re[i], im[i]);
                }
            }
        }

        impl VectorKernels for $name {
            fn lanes(&self) -> usize {
                $lanes
            }

            fn real_multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
                let len = out.len().min(a.len()).min(b.len());
                let (head, body_end) = split_point(out.as_ptr(), len, $lanes);
                Scalar.real_multiply(&a[..head], &b[..head], &mut out[..head]);
                for ((o, x), y) in out[head..body_end]
                    .chunks_exact_mut($lanes)
                    .zip(a[head..body_end].chunks_exact($lanes))
                    .zip(b[head..body_end].chunks_exact($lanes))
                {
                    o.copy_from_slice(&(Self::load(x) * Self::load(y)).to_array());
                }
                Scalar.real_multiply(&a[body_end..len], &b[body_end..len], &mut out[body_end..len]);
            }

            fn complex_multiply(&self, a: &mut [Complex32], b: &[Complex32]) {
                let len = a.len().min(b.len());
                let (head, body_end) = split_point(a.as_ptr(), len, $lanes);
                Scalar.complex_multiply(&mut a[..head], &b[..head]);
                for (x, y) in a[head..body_end]
                    .chunks_exact_mut($lanes)
                    .zip(b[head..body_end].chunks_exact($lanes))
                {
                    let (xr, xi) = Self::load_split(x);
                    let (yr, yi) = Self::load_split(y);
                    Self::store_split(x, xr * yr - xi * yi, xr * yi + xi * yr);
                }
                Scalar.complex_multiply(&mut a[body_end..len], &b[body_end..len]);
            }

            fn complex_multiply_conjugate(&self, a: &mut [Complex32], b: &[Complex32]) {
                let len = a.len().min(b.len());
                let (head, body_end) = split_point(a.as_ptr(), len, $lanes);
                Scalar.complex_multiply_conjugate(&mut a[..head], &b[..head]);
                for (x, y) in a[head..body_end]
                    .chunks_exact_mut($lanes)
                    .zip(b[head..body_end].chunks_exact($lanes))
                {
                    let (xr, xi) = Self::load_split(x);
                    let (yr, yi) = Self::load_split(y);
                    Self::store_split(x, xr * yr + xi * yi, xi * yr - xr * yi);
                }
                Scalar.complex_multiply_conjugate(&mut a[body_end..len], &b[body_end..len]);
            }

            fn complex_conjugate(&self, a: &mut [Complex32]) {
                // Works on the interleaved `re, im` storage: odd positions flip sign.
                let flat: &mut [f32] = bytemuck::cast_slice_mut(a);
                let (head, body_end) = split_point(flat.as_ptr(), flat.len(), $lanes);
                let mut signs = [1.0f32; $lanes];
                for (i, sign) in signs.iter_mut().enumerate() {
                    if (head + i) % 2 == 1 {
                        *sign = -1.0;
                    }
                }
                let signs = <$vector>::from(signs);
                for x in flat[head..body_end].chunks_exact_mut($lanes) {
                    x.copy_from_slice(&(Self::load(x) * signs).to_array());
                }
                let len = flat.len();
                for i in (1..head).step_by(2).chain(((body_end | 1)..len).step_by(2)) {
                    flat[i] = -flat[i];
                }
            }

            fn scale(&self, a: &mut [f32], factor: f32) {
                let (head, body_end) = split_point(a.as_ptr(), a.len(), $lanes);
                let factor_vec = <$vector>::splat(factor);
                Scalar.scale(&mut a[..head], factor);
                for x in a[head..body_end].chunks_exact_mut($lanes) {
                    let v = Self::load(x) * factor_vec;
                    x.copy_from_slice(&v.to_array());
                }
                Scalar.scale(&mut a[body_end..], factor);
            }

            fn sum(&self, a: &[f32]) -> f32 {
                let (head, body_end) = split_point(a.as_ptr(), a.len(), $lanes);
                let mut acc = <$vector>::splat(0.0);
                for x in a[head..body_end].chunks_exact($lanes) {
                    acc = acc + Self::load(x);
                }
                let body: f32 = acc.to_array().iter().sum();
                Scalar.sum(&a[..head]) + body + Scalar.sum(&a[body_end..])
            }

            fn add_to_all(&self, a: &mut [f32], value: f32) {
                let (head, body_end) = split_point(a.as_ptr(), a.len(), $lanes);
                let value_vec = <$vector>::splat(value);
                Scalar.add_to_all(&mut a[..head], value);
                for x in a[head..body_end].chunks_exact_mut($lanes) {
                    let v = Self::load(x) + value_vec;
                    x.copy_from_slice(&v.to_array());
                }
                Scalar.add_to_all(&mut a[body_end..], value);
            }
        }
    };
}

lane_kernels!(
    /// Four-lane kernels backed by [`wide::f32x4`].
    Lanes4,
    f32x4,
    4
);

lane_kernels!(
    /// Eight-lane kernels backed by [`wide::f32x8`].
    Lanes8,
    f32x8,
    8
);
