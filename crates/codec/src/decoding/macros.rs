/// Copies the first `$size` bytes of the slice into `$ty` using `$ty::from_be_bytes` and advances
/// the buffer. Evaluates to [`crate::DecodingError::Eof`] if the slice is shorter than `$size`.
#[macro_export]
macro_rules! from_be_bytes_slice_and_advance_buf {
    ($ty: ty, $slice: expr) => {{ $crate::from_be_bytes_slice_and_advance_buf!($ty, ::std::mem::size_of::<$ty>(), $slice) }};
    ($ty:ty, $size: expr, $slice: expr) => {{
        let size = $size;
        if $slice.len() < size {
            Err($crate::DecodingError::Eof)
        } else {
            let mut arr = [0u8; ::std::mem::size_of::<$ty>()];
            let size_of = ::std::mem::size_of::<$ty>();
            arr[size_of - size..].copy_from_slice(&$slice[0..size]);
            ::alloy_primitives::bytes::Buf::advance($slice, size);
            Ok(<$ty>::from_be_bytes(arr))
        }
    }};
}
