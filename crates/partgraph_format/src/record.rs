//! Fixed-size edge-data records.

use bytes::{Buf, BufMut};
use std::fmt;

/// A fixed-size, little-endian edge-data record.
///
/// The record type is chosen once, when a graph or loader is constructed.
/// [`NoEdgeData`] (size zero) selects graphs without an edge-data region.
pub trait EdgeRecord: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decodes one record from the front of `buf`.
    ///
    /// `buf` must hold at least [`Self::SIZE`] bytes.
    fn decode(buf: &mut impl Buf) -> Self;

    /// Appends the encoded record to `buf`.
    fn encode(&self, buf: &mut impl BufMut);
}

/// Marker record for graphs whose edges carry no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoEdgeData;

impl EdgeRecord for NoEdgeData {
    const SIZE: usize = 0;

    fn decode(_buf: &mut impl Buf) -> Self {
        Self
    }

    fn encode(&self, _buf: &mut impl BufMut) {}
}

macro_rules! impl_edge_record {
    ($($ty:ty => $get:ident, $put:ident;)*) => {
        $(
            impl EdgeRecord for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn decode(buf: &mut impl Buf) -> Self {
                    buf.$get()
                }

                fn encode(&self, buf: &mut impl BufMut) {
                    buf.$put(*self);
                }
            }
        )*
    };
}

impl_edge_record! {
    u32 => get_u32_le, put_u32_le;
    i32 => get_i32_le, put_i32_le;
    u64 => get_u64_le, put_u64_le;
    i64 => get_i64_le, put_i64_le;
    f32 => get_f32_le, put_f32_le;
    f64 => get_f64_le, put_f64_le;
}
