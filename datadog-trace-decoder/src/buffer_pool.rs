// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// A concurrency-safe cache of scratch byte buffers used for request body
/// reads, so each request does not pay a fresh allocation.
///
/// `acquire` pops a buffer in O(1) or allocates when the pool is empty. The
/// returned [`PooledBuffer`] clears itself and goes back to the pool when
/// dropped, on every exit path. Contents must never be read after return.
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_pooled: usize,
}

/// Buffers larger than this are dropped instead of pooled, so one oversized
/// request does not pin its allocation forever.
const MAX_POOLED_CAPACITY: usize = 1024 * 1024;

impl BufferPool {
    pub fn new(max_pooled: usize) -> Self {
        BufferPool {
            buffers: Mutex::new(Vec::new()),
            max_pooled,
        }
    }

    /// Hands out an empty scratch buffer, reusing a pooled one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = match self.buffers.lock() {
            Ok(mut buffers) => buffers.pop().unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        PooledBuffer { pool: self, buf }
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        buf.clear();
        if let Ok(mut buffers) = self.buffers.lock() {
            if buffers.len() < self.max_pooled {
                buffers.push(buf);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        BufferPool::new(32)
    }
}

/// Scoped handle to a pooled buffer. Dereferences to `Vec<u8>`.
pub struct PooledBuffer<'a> {
    pool: &'a BufferPool,
    buf: Vec<u8>,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
