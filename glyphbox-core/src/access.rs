//! Typed, offset-addressed access to byte buffers and seekable streams.
//!
//! ```text
//!   read::<T>(access, offset, swap) ──► T
//!        │
//!        ▼
//!   Access::read_bytes(offset, &mut [u8; size_of::<T>()])
//!        │
//!        ├── BinaryBlob / Vec<u8>     (bounds-checked memcpy)
//!        └── StreamAccess<S>          (seek + read_exact)
//! ```
//!
//! Values are stored in native byte order. When `swap` is set every
//! multi-byte field is byte-swapped independently on its way in or out,
//! which is how a buffer written on a machine of the other endianness
//! is consumed. The wire format never records its own byte order.

use std::io::{Read, Seek, SeekFrom, Write};

use bytemuck::Pod;

use crate::blob::{try_alloc, BinaryBlob};
use crate::error::{AccessError, Error, Result};

// ── Backend trait ───────────────────────────────────────────────────

/// Random-access byte storage.
pub trait Access {
    /// Total addressable size in bytes.
    fn size(&mut self) -> std::result::Result<u64, AccessError>;

    /// Fill `buf` with the bytes at `offset..offset + buf.len()`.
    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError>;

    /// Overwrite the bytes at `offset..offset + buf.len()`.
    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError>;
}

/// Resolve `offset..offset + len` against a slice of `size` bytes.
fn checked_range(
    offset: u64,
    len: usize,
    size: usize,
) -> std::result::Result<std::ops::Range<usize>, AccessError> {
    let start = usize::try_from(offset).ok();
    match start.and_then(|s| s.checked_add(len).map(|e| s..e)) {
        Some(range) if range.end <= size => Ok(range),
        _ => Err(AccessError::OutOfBounds {
            offset,
            len,
            size: size as u64,
        }),
    }
}

impl Access for [u8] {
    fn size(&mut self) -> std::result::Result<u64, AccessError> {
        Ok(self.len() as u64)
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError> {
        let range = checked_range(offset, buf.len(), self.len())?;
        buf.copy_from_slice(&self[range]);
        Ok(())
    }

    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError> {
        let range = checked_range(offset, buf.len(), self.len())?;
        self[range].copy_from_slice(buf);
        Ok(())
    }
}

impl Access for Vec<u8> {
    fn size(&mut self) -> std::result::Result<u64, AccessError> {
        self.as_mut_slice().size()
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError> {
        self.as_mut_slice().read_bytes(offset, buf)
    }

    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError> {
        self.as_mut_slice().write_bytes(offset, buf)
    }
}

impl Access for BinaryBlob {
    fn size(&mut self) -> std::result::Result<u64, AccessError> {
        Ok(self.len() as u64)
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError> {
        if self.is_null() {
            return Err(AccessError::NullBuffer);
        }
        self.as_mut_slice().read_bytes(offset, buf)
    }

    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError> {
        if self.is_null() {
            return Err(AccessError::NullBuffer);
        }
        self.as_mut_slice().write_bytes(offset, buf)
    }
}

impl<A: Access + ?Sized> Access for &mut A {
    fn size(&mut self) -> std::result::Result<u64, AccessError> {
        (**self).size()
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError> {
        (**self).read_bytes(offset, buf)
    }

    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError> {
        (**self).write_bytes(offset, buf)
    }
}

// ── Stream backend ──────────────────────────────────────────────────

/// Adapts any seekable stream (typically a `std::fs::File`) to [`Access`].
///
/// Each call seeks to the requested offset first, so reads and writes
/// may arrive in any order.
pub struct StreamAccess<S> {
    stream: S,
}

impl<S> StreamAccess<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write + Seek> Access for StreamAccess<S> {
    fn size(&mut self) -> std::result::Result<u64, AccessError> {
        let pos = self.stream.stream_position()?;
        let end = self.stream.seek(SeekFrom::End(0))?;
        self.stream.seek(SeekFrom::Start(pos))?;
        Ok(end)
    }

    fn read_bytes(&mut self, offset: u64, buf: &mut [u8]) -> std::result::Result<(), AccessError> {
        let size = self.size()?;
        let fits = offset
            .checked_add(buf.len() as u64)
            .is_some_and(|end| end <= size);
        if !fits {
            return Err(AccessError::OutOfBounds {
                offset,
                len: buf.len(),
                size,
            });
        }
        self.stream.seek(SeekFrom::Start(offset))?;
        self.stream.read_exact(buf)?;
        Ok(())
    }

    fn write_bytes(&mut self, offset: u64, buf: &[u8]) -> std::result::Result<(), AccessError> {
        self.stream.seek(SeekFrom::Start(offset))?;
        self.stream.write_all(buf)?;
        Ok(())
    }
}

// ── Byte order ──────────────────────────────────────────────────────

/// Field-wise byte swap.
///
/// Composite types swap each multi-byte field on its own; the struct as
/// a whole is never reversed.
pub trait SwapBytes: Sized {
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_swap_bytes {
    ($($ty:ty),*) => {
        $(
            impl SwapBytes for $ty {
                #[inline(always)]
                fn swap_bytes(self) -> Self {
                    <$ty>::swap_bytes(self)
                }
            }
        )*
    };
}

impl_swap_bytes!(u8, i8, u16, i16, u32, i32, u64, i64);

// ── Typed helpers ───────────────────────────────────────────────────

/// Read a `T` at `offset`, swapping its fields when `swap` is set.
pub fn read<T, A>(access: &mut A, offset: u64, swap: bool) -> std::result::Result<T, AccessError>
where
    T: Pod + SwapBytes,
    A: Access + ?Sized,
{
    let mut value: T = bytemuck::Zeroable::zeroed();
    access.read_bytes(offset, bytemuck::bytes_of_mut(&mut value))?;
    Ok(if swap { value.swap_bytes() } else { value })
}

/// Write `value` at `offset`, swapping its fields when `swap` is set.
pub fn write<T, A>(
    access: &mut A,
    offset: u64,
    value: &T,
    swap: bool,
) -> std::result::Result<(), AccessError>
where
    T: Pod + SwapBytes,
    A: Access + ?Sized,
{
    if swap {
        let swapped = value.swap_bytes();
        access.write_bytes(offset, bytemuck::bytes_of(&swapped))
    } else {
        access.write_bytes(offset, bytemuck::bytes_of(value))
    }
}

/// Copy `len` bytes starting at `offset` out of `access` into a new blob.
///
/// A zero-length range yields a null blob without touching the backend.
pub fn read_range<A>(access: &mut A, offset: u64, len: usize) -> Result<BinaryBlob>
where
    A: Access + ?Sized,
{
    if len == 0 {
        return Ok(BinaryBlob::new());
    }
    let mut bytes = try_alloc(len)?;
    access.read_bytes(offset, &mut bytes)?;
    Ok(BinaryBlob::from_vec(bytes))
}

/// Read a `u32` length prefix followed by that many UTF-8 bytes.
///
/// The declared length is checked against the backend size before the
/// string is allocated.
pub fn read_string<A>(access: &mut A, offset: u64, swap: bool) -> Result<String>
where
    A: Access + ?Sized,
{
    let len: u32 = read(access, offset, swap)?;
    let start = offset + std::mem::size_of::<u32>() as u64;
    let size = access.size()?;
    if start.checked_add(u64::from(len)).map_or(true, |end| end > size) {
        return Err(AccessError::OutOfBounds {
            offset: start,
            len: len as usize,
            size,
        }
        .into());
    }

    let mut bytes = try_alloc(len as usize)?;
    access.read_bytes(start, &mut bytes)?;
    String::from_utf8(bytes).map_err(|_| AccessError::InvalidUtf8 { offset: start }.into())
}

/// Write `value` as a `u32` length prefix plus its bytes.
///
/// Returns the number of bytes written.
pub fn write_string<A>(access: &mut A, offset: u64, value: &str, swap: bool) -> Result<u64>
where
    A: Access + ?Sized,
{
    let len = u32::try_from(value.len())
        .map_err(|_| Error::InvalidParameter("string longer than u32::MAX bytes"))?;
    write(access, offset, &len, swap)?;
    let prefix = std::mem::size_of::<u32>() as u64;
    access.write_bytes(offset + prefix, value.as_bytes())?;
    Ok(prefix + u64::from(len))
}

// ===================================================================
// Tests
// ===================================================================
