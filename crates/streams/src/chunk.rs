//! Splitting a sequence into contiguous chunks of at most `n` elements.
//!
//! There are two flavors:
//!
//! - [chunked] hands out each chunk as a `Vec`.  Chunks are independent of each other and of the source, so they may be
//!   stored, reordered, or dropped freely.
//! - [ichunked] hands out each chunk as a [Chunk], a lazy view that pulls from the shared source as it is consumed.  A
//!   chunk borrows the [LazyChunks] it came from, so the borrow checker forces one chunk to be finished with before the
//!   next is requested.  A chunk which is dropped before it is exhausted leaves its remaining elements in the source: the
//!   next chunk starts with them, so chunk boundaries then no longer fall on multiples of `n`.  Only consume lazy chunks
//!   to the end if boundaries matter.
//!
//! In both flavors the final chunk may be short, chunks are never empty, and empty input produces no chunks.  A chunk
//! size of zero is rejected before anything is pulled.
use std::iter::{Fuse, Peekable};
use std::num::NonZeroUsize;

use crate::errors::*;

fn check_size(size: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(size).ok_or(Error::InvalidChunkSize(size))
}

/// Split `items` into `Vec`s of `size` elements, the last of which may be shorter.
pub fn chunked<I: IntoIterator>(items: I, size: usize) -> Result<Chunked<I::IntoIter>> {
    Ok(Chunked {
        source: items.into_iter().fuse(),
        size: check_size(size)?,
    })
}

/// Split `items` into lazy chunks of `size` elements, the last of which may be shorter.
pub fn ichunked<I: IntoIterator>(items: I, size: usize) -> Result<LazyChunks<I::IntoIter>> {
    Ok(LazyChunks {
        source: items.into_iter().peekable(),
        size: check_size(size)?,
    })
}

/// Iterator returned by [chunked].
#[derive(Debug)]
pub struct Chunked<I> {
    source: Fuse<I>,
    size: NonZeroUsize,
}

impl<I: Iterator> Iterator for Chunked<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Vec<I::Item>> {
        let chunk = self
            .source
            .by_ref()
            .take(self.size.get())
            .collect::<Vec<_>>();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.source.size_hint();
        let n = self.size.get();
        (
            lower / n + usize::from(lower % n != 0),
            upper.map(|x| x / n + usize::from(x % n != 0)),
        )
    }
}

/// Lazy chunks returned by [ichunked].
///
/// This can't be an [Iterator] because each [Chunk] borrows it; use [LazyChunks::next_chunk] in a `while let` loop or
/// [LazyChunks::try_for_each_chunk].
pub struct LazyChunks<I: Iterator> {
    source: Peekable<I>,
    size: NonZeroUsize,
}

impl<I: Iterator> LazyChunks<I> {
    /// Get the next chunk, or `None` if the source is exhausted.
    ///
    /// This pulls at most one element from the source, to learn whether there is a next chunk at all.
    pub fn next_chunk(&mut self) -> Option<Chunk<'_, I>> {
        self.source.peek()?;
        Some(Chunk {
            source: &mut self.source,
            remaining: self.size.get(),
        })
    }

    /// Call `f` with every chunk in order, stopping at the first error.
    pub fn try_for_each_chunk<E>(
        mut self,
        mut f: impl FnMut(Chunk<'_, I>) -> Result<(), E>,
    ) -> Result<(), E> {
        while let Some(chunk) = self.next_chunk() {
            f(chunk)?;
        }
        Ok(())
    }

    pub fn chunk_size(&self) -> usize {
        self.size.get()
    }
}

/// One lazily materialized chunk; see [LazyChunks].
pub struct Chunk<'a, I: Iterator> {
    source: &'a mut Peekable<I>,
    remaining: usize,
}

impl<'a, I: Iterator> Iterator for Chunk<'a, I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.remaining == 0 {
            return None;
        }

        match self.source.next() {
            Some(x) => {
                self.remaining -= 1;
                Some(x)
            }
            None => {
                self.remaining = 0;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.source.size_hint();
        (
            lower.min(self.remaining),
            Some(upper.map_or(self.remaining, |x| x.min(self.remaining))),
        )
    }
}
