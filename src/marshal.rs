//! Buffer Marshaling
//!
//! Moves caller byte slices into fixed-size buffers the backends consume and
//! scopes backend-native secret values.
//!
//! - `with_native` checks the exact length and copies into a zeroizing buffer
//! - `Native` holds a promoted backend value and wipes it on drop
//!
//! Both guards release on every exit path, including early `?` returns.

use crate::error::{EngineError, EngineResult};
use std::ops::Deref;
use zeroize::Zeroizing;

// MARK: - Fixed Buffers

/// Exact-length copy of caller bytes, zeroed when dropped
pub struct NativeBuffer<const N: usize> {
    bytes: Zeroizing<[u8; N]>,
}

impl<const N: usize> NativeBuffer<N> {
    pub fn as_array(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Deref for NativeBuffer<N> {
    type Target = [u8; N];

    fn deref(&self) -> &[u8; N] {
        &self.bytes
    }
}

/// Copy `bytes` into an `N`-byte buffer, rejecting any other length
pub fn with_native<const N: usize>(bytes: &[u8], field: &'static str) -> EngineResult<NativeBuffer<N>> {
    if bytes.len() != N {
        return Err(EngineError::invalid_length(field, expected_len(N), bytes.len()));
    }
    let mut buffer = Zeroizing::new([0u8; N]);
    buffer.copy_from_slice(bytes);
    Ok(NativeBuffer { bytes: buffer })
}

fn expected_len(n: usize) -> &'static str {
    match n {
        4 => "4 bytes",
        32 => "32 bytes",
        33 => "33 bytes",
        64 => "64 bytes",
        65 => "65 bytes",
        _ => "a fixed number of bytes",
    }
}

// MARK: - Native Values

/// Backend value that holds secret material
pub(crate) trait Wipe {
    fn wipe(&mut self);
}

/// Scope guard for a promoted backend value
pub(crate) struct Native<T: Wipe>(T);

impl<T: Wipe> Native<T> {
    pub(crate) fn promote(value: T) -> Self {
        Self(value)
    }
}

impl<T: Wipe> Deref for Native<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: Wipe> Drop for Native<T> {
    fn drop(&mut self) {
        self.0.wipe();
    }
}
