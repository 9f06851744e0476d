use super::ConfigError;
use ndarray::{ArrayBase, Data, DataMut, Ix1};

/// Signal storage that can be borrowed as one contiguous slice.
///
/// Callers keep their own buffer types: std containers always qualify, and
/// any one-dimensional `ndarray` qualifies while it has unit stride.
pub trait Samples<T> {
    /// Borrow the samples.
    fn samples(&self) -> Result<&[T], ConfigError>;
}

/// Output storage that can be borrowed as one contiguous mutable slice.
pub trait SamplesMut<T> {
    /// Borrow the samples mutably.
    fn samples_mut(&mut self) -> Result<&mut [T], ConfigError>;
}

macro_rules! contiguous_samples {
    ($([$($param:tt)*] $container:ty;)*) => {$(
        impl<$($param)*> Samples<T> for $container {
            fn samples(&self) -> Result<&[T], ConfigError> {
                Ok(&self[..])
            }
        }

        impl<$($param)*> SamplesMut<T> for $container {
            fn samples_mut(&mut self) -> Result<&mut [T], ConfigError> {
                Ok(&mut self[..])
            }
        }
    )*};
}

contiguous_samples! {
    [T] [T];
    [T, const N: usize] [T; N];
    [T] Vec<T>;
    [T] Box<[T]>;
}

/// Owned arrays, views and shared arrays alike; reversed or strided layouts
/// are reported as [`ConfigError::NonContiguous`].
impl<T, S> Samples<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
{
    fn samples(&self) -> Result<&[T], ConfigError> {
        self.as_slice()
            .ok_or(ConfigError::NonContiguous { arg: "ndarray" })
    }
}

impl<T, S> SamplesMut<T> for ArrayBase<S, Ix1>
where
    S: DataMut<Elem = T>,
{
    fn samples_mut(&mut self) -> Result<&mut [T], ConfigError> {
        self.as_slice_mut()
            .ok_or(ConfigError::NonContiguous { arg: "ndarray" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{s, Array1};

    fn total<S: Samples<f32> + ?Sized>(buffer: &S) -> f32 {
        buffer.samples().map_or(f32::NAN, |v| v.iter().sum())
    }

    #[test]
    fn std_containers() {
        let fixed = [1.0f32, 2.0, 3.0];
        assert_eq!(total(&fixed), 6.0);
        assert_eq!(total(&fixed[1..]), 5.0);
        assert_eq!(total(&vec![0.5f32; 4]), 2.0);

        let mut boxed: Box<[f32]> = vec![0.0; 2].into_boxed_slice();
        boxed.samples_mut().expect("boxed").copy_from_slice(&[5.0, 6.0]);
        assert_eq!(&*boxed, &[5.0, 6.0]);
    }

    #[test]
    fn unit_stride_arrays_and_views() {
        let mut arr = Array1::from(vec![1.0f32, 2.0, 3.0, 4.0]);
        arr.samples_mut().expect("owned")[0] = 9.0;
        assert_eq!(total(&arr), 18.0);
        assert_eq!(total(&arr.slice(s![1..3])), 5.0);

        let mut tail = arr.slice_mut(s![2..]);
        tail.samples_mut().expect("view mut").fill(0.0);
        assert_eq!(arr.to_vec(), vec![9.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn strided_or_reversed_views_are_rejected() {
        let arr = Array1::from(vec![1.0f32, 2.0, 3.0, 4.0]);
        let expected = Err(ConfigError::NonContiguous { arg: "ndarray" });
        assert_eq!(arr.slice(s![..;2]).samples(), expected);
        assert_eq!(arr.slice(s![..;-1]).samples(), expected);
    }
}
