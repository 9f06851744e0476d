use super::VectorKernels;
use num_complex::Complex32;

/// Portable one-element-at-a-time kernels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scalar;

impl VectorKernels for Scalar {
    fn lanes(&self) -> usize {
        1
    }

    fn real_multiply(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
            *o = x * y;
        }
    }

    fn complex_multiply(&self, a: &mut [Complex32], b: &[Complex32]) {
        for (x, y) in a.iter_mut().zip(b) {
            let re = x.re * y.re - x.im * y.im;
            let im = x.re * y.im + x.im * y.re;
            *x = Complex32::new(re, im);
        }
    }

    fn complex_multiply_conjugate(&self, a: &mut [Complex32], b: &[Complex32]) {
        for (x, y) in a.iter_mut().zip(b) {
            let re = x.re * y.re + x.im * y.im;
            let im = x.im * y.re - x.re * y.im;
            *x = Complex32::new(re, im);
        }
    }

    fn complex_conjugate(&self, a: &mut [Complex32]) {
        for x in a.iter_mut() {
            x.im = -x.im;
        }
    }

    fn scale(&self, a: &mut [f32], factor: f32) {
        for x in a.iter_mut() {
            *x *= factor;
        }
    }

    fn sum(&self, a: &[f32]) -> f32 {
        a.iter().sum()
    }

    fn add_to_all(&self, a: &mut [f32], value: f32) {
        for x in a.iter_mut() {
            *x += value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complex_products_match_num_complex() {
        let a = [Complex32::new(1.0, 2.0), Complex32::new(-3.0, 0.5)];
        let b = [Complex32::new(0.5, -1.0), Complex32::new(2.0, 4.0)];

        let mut product = a;
        Scalar.complex_multiply(&mut product, &b);
        assert_eq!(product[0], a[0] * b[0]);
        assert_eq!(product[1], a[1] * b[1]);

        let mut conj_product = a;
        Scalar.complex_multiply_conjugate(&mut conj_product, &b);
        assert_eq!(conj_product[0], a[0] * b[0].conj());
        assert_eq!(conj_product[1], a[1] * b[1].conj());
    }

    #[test]
    fn reductions_and_updates() {
        let mut a = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(Scalar.sum(&a), 10.0);
        Scalar.scale(&mut a, 0.5);
        assert_eq!(a, [0.5, 1.0, 1.5, 2.0]);
        Scalar.add_to_all(&mut a, 1.0);
        assert_eq!(a, [1.5, 2.0, 2.5, 3.0]);

        let mut out = [0.0f32; 4];
        Scalar.real_multiply(&a, &[2.0, 2.0, 2.0, 2.0], &mut out);
        assert_eq!(out, [3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn conjugate_flips_imaginary_part() {
        let mut a = [Complex32::new(1.0, 2.0), Complex32::new(0.0, -1.0)];
        Scalar.complex_conjugate(&mut a);
        assert_eq!(a, [Complex32::new(1.0, -2.0), Complex32::new(0.0, 1.0)]);
    }
}
