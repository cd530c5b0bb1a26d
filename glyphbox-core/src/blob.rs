//! Owning byte buffer with an explicit null state.
//!
//! A [`BinaryBlob`] either owns a non-empty heap allocation or is *null*.
//! Ownership moves with the value; [`BinaryBlob::take`] moves the bytes
//! out and leaves the source null. Cloning performs a deep copy.

use crate::error::{AccessError, Error, Result};

/// Owning, move-only byte buffer.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BinaryBlob {
    data: Option<Box<[u8]>>,
}

/// Allocate `len` zeroed bytes, reporting allocator refusal as an error
/// instead of aborting.
pub(crate) fn try_alloc(len: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(len).map_err(|_| {
        log::error!("Memory allocation failed ({len} bytes)");
        Error::AllocationFailure { bytes: len }
    })?;
    bytes.resize(len, 0);
    Ok(bytes)
}

impl BinaryBlob {
    /// Null blob. Does not allocate.
    pub const fn new() -> Self {
        Self { data: None }
    }

    /// Take ownership of `bytes`. An empty vector produces a null blob.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            Self::new()
        } else {
            Self {
                data: Some(bytes.into_boxed_slice()),
            }
        }
    }

    /// Allocate `len` zero bytes.
    pub fn zeroed(len: usize) -> Result<Self> {
        Ok(Self::from_vec(try_alloc(len)?))
    }

    /// Copy `source[offset..offset + len]` into a fresh blob.
    ///
    /// A zero-length range yields a null blob. Copying a non-empty range
    /// out of a null source is an [`Error::InvalidParameter`].
    pub fn copy_range(source: &BinaryBlob, offset: usize, len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Self::new());
        }
        if source.is_null() {
            return Err(Error::InvalidParameter("source blob is null"));
        }

        let bytes = source.as_slice();
        let range = offset
            .checked_add(len)
            .filter(|&end| end <= bytes.len())
            .map(|end| offset..end)
            .ok_or(AccessError::OutOfBounds {
                offset: offset as u64,
                len,
                size: bytes.len() as u64,
            })?;

        let mut copy = try_alloc(len)?;
        copy.copy_from_slice(&bytes[range]);
        Ok(Self::from_vec(copy))
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.data.is_none()
    }

    /// Free the allocation. Idempotent.
    pub fn release(&mut self) {
        self.data = None;
    }

    /// Move the bytes out, leaving `self` null.
    pub fn take(&mut self) -> Self {
        Self {
            data: self.data.take(),
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data.map(Vec::from).unwrap_or_default()
    }
}

impl From<Vec<u8>> for BinaryBlob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<&[u8]> for BinaryBlob {
    fn from(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }
}

impl AsRef<[u8]> for BinaryBlob {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl std::fmt::Debug for BinaryBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.data {
            None => f.write_str("BinaryBlob(null)"),
            Some(d) => write!(f, "BinaryBlob({} bytes)", d.len()),
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
