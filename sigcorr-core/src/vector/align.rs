use core::mem::size_of;

/// Number of leading elements to process before `ptr` reaches an address
/// aligned to a full vector of `lanes` elements.
///
/// Returns `0` when `ptr` is already aligned. The result may exceed the
/// length of the buffer behind `ptr`; callers clamp it.
pub fn align_complement<T>(ptr: *const T, lanes: usize) -> usize {
    let width = lanes.max(1) * size_of::<T>().max(1);
    if !width.is_power_of_two() {
        return 0;
    }
    ptr.align_offset(width)
}

/// Splits `len` elements starting at `ptr` into a scalar prologue
/// `[0, head)`, a vector body `[head, body_end)` whose length is a multiple
/// of `lanes`, and a scalar epilogue `[body_end, len)`.
pub(crate) fn split_point<T>(ptr: *const T, len: usize, lanes: usize) -> (usize, usize) {
    let head = align_complement(ptr, lanes).min(len);
    let body_end = head + (len - head) / lanes * lanes;
    (head, body_end)
}
