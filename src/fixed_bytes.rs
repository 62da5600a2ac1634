//! FixedBytes: fixed-width, memory-copyable types that can live in a
//! [`ByteTable`](crate::ByteTable) through a [`TypedTable`](crate::TypedTable).
//!
//! Encoding is native-endian, so blocks are only meaningful inside the
//! process that wrote them.

/// A `Copy` type with a fixed byte encoding of exactly `WIDTH` bytes.
pub trait FixedBytes: Copy {
    const WIDTH: usize;

    /// Run `f` over the encoded bytes of `self`.
    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R;

    /// Decode from exactly `WIDTH` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != WIDTH`.
    fn from_bytes(bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_bytes_num {
    ($($t:ty),* $(,)?) => {
        $(
            impl FixedBytes for $t {
                const WIDTH: usize = core::mem::size_of::<$t>();

                #[inline]
                fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
                    f(&self.to_ne_bytes())
                }

                #[inline]
                fn from_bytes(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; core::mem::size_of::<$t>()];
                    buf.copy_from_slice(bytes);
                    <$t>::from_ne_bytes(buf)
                }
            }
        )*
    };
}

impl_fixed_bytes_num!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl FixedBytes for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&[u8::from(*self)])
    }

    #[inline]
    fn from_bytes(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

impl FixedBytes for char {
    const WIDTH: usize = 4;

    #[inline]
    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        u32::from(*self).with_bytes(f)
    }

    // Lossy: bytes that are not a Unicode scalar value (e.g. written through
    // `ByteTable::iter_mut`) decode to U+FFFD.
    #[inline]
    fn from_bytes(bytes: &[u8]) -> Self {
        char::from_u32(u32::from_bytes(bytes)).unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}

impl<T: FixedBytes, const N: usize> FixedBytes for [T; N] {
    const WIDTH: usize = T::WIDTH * N;

    fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let mut buf = Vec::with_capacity(Self::WIDTH);
        for item in self {
            item.with_bytes(|b| buf.extend_from_slice(b));
        }
        f(&buf)
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        core::array::from_fn(|i| T::from_bytes(&bytes[i * T::WIDTH..(i + 1) * T::WIDTH]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: FixedBytes + PartialEq + core::fmt::Debug>(x: T) {
        let bytes = x.with_bytes(|b| b.to_vec());
        assert_eq!(bytes.len(), T::WIDTH);
        assert_eq!(T::from_bytes(&bytes), x);
    }

    #[test]
    fn widths_match_type_sizes() {
        assert_eq!(<u8 as FixedBytes>::WIDTH, 1);
        assert_eq!(<i32 as FixedBytes>::WIDTH, 4);
        assert_eq!(<f64 as FixedBytes>::WIDTH, 8);
        assert_eq!(<u128 as FixedBytes>::WIDTH, 16);
        assert_eq!(<[u16; 3] as FixedBytes>::WIDTH, 6);
        assert_eq!(<[[u8; 2]; 4] as FixedBytes>::WIDTH, 8);
    }

    #[test]
    fn encodings_decode_to_the_same_value() {
        round_trip(-7i32);
        round_trip(1.5f64);
        round_trip(u64::MAX);
        round_trip(true);
        round_trip('λ');
        round_trip([1u32, 2, 3]);
        round_trip([[1i8, -1], [2, -2]]);
    }

    /// Invariant: a block that is not a scalar value decodes to U+FFFD.
    #[test]
    fn invalid_char_block_decodes_to_replacement() {
        let surrogate = 0xD800u32.to_ne_bytes();
        assert_eq!(char::from_bytes(&surrogate), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    #[should_panic]
    fn short_block_panics() {
        let _ = u32::from_bytes(&[1, 2]);
    }

    /// Invariant: encoding is the native-endian image of the value.
    #[test]
    fn encoding_is_native_endian() {
        assert_eq!(0x0102_0304u32.with_bytes(|b| b.to_vec()), 0x0102_0304u32.to_ne_bytes());
        let expected = [1u16.to_ne_bytes(), 2u16.to_ne_bytes()].concat();
        assert_eq!([1u16, 2].with_bytes(|b| b.to_vec()), expected);
    }
}
