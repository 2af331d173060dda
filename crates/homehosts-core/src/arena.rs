//! Two-region bump allocator over a caller-supplied buffer.
//!
//! The forward region grows up from offset 0 and holds fixed-layout data (names,
//! address payloads, pointer tables). The backward region grows down from the end
//! and holds variable-length alias strings. Every allocation is checked against the
//! opposite cursor *before* any byte is written, including the pointer slots the
//! caller says it will still need, so the regions can never overlap.
//!
//! Offsets are relative to the buffer start. Alignment is computed on absolute
//! addresses so pointer tables are correctly aligned even when the caller's buffer
//! is not.

use thiserror::Error;

/// Size of one pointer slot in a NULL-terminated table.
pub const PTR_SIZE: usize = core::mem::size_of::<usize>();
/// Required alignment of a pointer table.
pub const PTR_ALIGN: usize = core::mem::align_of::<usize>();

/// An allocation did not fit between the two cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("need {needed} bytes between cursors, {available} available")]
pub struct ArenaFull {
    pub needed: usize,
    pub available: usize,
}

/// Forward/backward bump allocator.
#[derive(Debug)]
pub struct TwoRegionArena<'a> {
    buf: &'a mut [u8],
    base: usize,
    front: usize,
    back: usize,
}

impl<'a> TwoRegionArena<'a> {
    #[must_use]
    pub fn new(buf: &'a mut [u8]) -> Self {
        let base = buf.as_ptr() as usize;
        let back = buf.len();
        Self {
            buf,
            base,
            front: 0,
            back,
        }
    }

    /// Absolute address of offset 0.
    #[must_use]
    pub fn base_addr(&self) -> usize {
        self.base
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// First free byte of the forward region.
    #[must_use]
    pub fn front(&self) -> usize {
        self.front
    }

    /// First occupied byte of the backward region.
    #[must_use]
    pub fn back(&self) -> usize {
        self.back
    }

    /// Round `offset` up so that `base + offset` is a multiple of `align`.
    #[must_use]
    pub fn align_offset(&self, offset: usize, align: usize) -> usize {
        debug_assert!(align.is_power_of_two());
        let addr = self.base.wrapping_add(offset);
        let padded = addr.wrapping_add(align - 1) & !(align - 1);
        offset + padded.wrapping_sub(addr)
    }

    /// Forward end after `slots` pointer slots are appended at `front`.
    #[must_use]
    pub fn project_tables(&self, front: usize, slots: usize) -> usize {
        if slots == 0 {
            return front;
        }
        self.align_offset(front, PTR_ALIGN) + slots * PTR_SIZE
    }

    /// Bytes between the current cursors that moving them to `front`/`back` would use,
    /// counting the reserved tail slots.
    fn demand(&self, front: usize, back: usize, tail_slots: usize) -> usize {
        self.project_tables(front, tail_slots).saturating_sub(self.front)
            + self.back.saturating_sub(back)
    }

    fn check(&self, front: usize, back: usize, tail_slots: usize) -> Result<(), ArenaFull> {
        if front > back || self.project_tables(front, tail_slots) > back {
            return Err(ArenaFull {
                needed: self.demand(front, back, tail_slots),
                available: self.back - self.front,
            });
        }
        Ok(())
    }

    /// Copy `data` into the forward region at `align`, optionally NUL-terminated.
    ///
    /// `tail_slots` pointer slots must still fit after the allocation.
    pub fn alloc_front(
        &mut self,
        data: &[u8],
        nul: bool,
        align: usize,
        tail_slots: usize,
    ) -> Result<usize, ArenaFull> {
        let start = self.align_offset(self.front, align);
        let end = start + data.len() + usize::from(nul);
        self.check(end, self.back, tail_slots)?;
        self.buf[start..start + data.len()].copy_from_slice(data);
        if nul {
            self.buf[start + data.len()] = 0;
        }
        self.front = end;
        Ok(start)
    }

    /// Copy `data` plus a NUL terminator into the backward region.
    ///
    /// `tail_slots` pointer slots must still fit in the forward region afterwards.
    pub fn alloc_back_str(&mut self, data: &[u8], tail_slots: usize) -> Result<usize, ArenaFull> {
        let len = data.len() + 1;
        let Some(start) = self.back.checked_sub(len) else {
            return Err(ArenaFull {
                needed: self.demand(self.front, self.back, tail_slots) + len,
                available: self.back - self.front,
            });
        };
        self.check(self.front, start, tail_slots)?;
        self.buf[start..start + data.len()].copy_from_slice(data);
        self.buf[start + data.len()] = 0;
        self.back = start;
        Ok(start)
    }

    /// Write a NULL-terminated pointer table whose entries point at `targets`.
    ///
    /// `tail_slots` counts slots of tables that will follow this one.
    pub fn alloc_ptr_table(
        &mut self,
        targets: &[usize],
        tail_slots: usize,
    ) -> Result<usize, ArenaFull> {
        let start = self.align_offset(self.front, PTR_ALIGN);
        let end = start + (targets.len() + 1) * PTR_SIZE;
        self.check(end, self.back, tail_slots)?;
        let mut at = start;
        for &target in targets {
            let ptr = self.base.wrapping_add(target);
            self.buf[at..at + PTR_SIZE].copy_from_slice(&ptr.to_ne_bytes());
            at += PTR_SIZE;
        }
        self.buf[at..at + PTR_SIZE].fill(0);
        self.front = end;
        Ok(start)
    }
}

/// Read one pointer slot written by [`TwoRegionArena::alloc_ptr_table`].
#[must_use]
pub fn read_ptr(buf: &[u8], offset: usize) -> Option<usize> {
    let bytes = buf.get(offset..offset.checked_add(PTR_SIZE)?)?;
    let mut raw = [0u8; PTR_SIZE];
    raw.copy_from_slice(bytes);
    Some(usize::from_ne_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pointer-aligned window of `len` bytes inside `storage`.
    fn aligned(storage: &mut Vec<u8>, len: usize) -> &mut [u8] {
        storage.clear();
        storage.resize(len + PTR_ALIGN, 0);
        let pad = storage.as_ptr().align_offset(PTR_ALIGN);
        &mut storage[pad..pad + len]
    }

    #[test]
    fn front_and_back_grow_toward_each_other() {
        let mut storage = [0u8; 64];
        let mut arena = TwoRegionArena::new(&mut storage);
        let a = arena.alloc_front(b"abc", true, 1, 0).unwrap();
        assert_eq!(a, 0);
        assert_eq!(arena.front(), 4);
        let b = arena.alloc_back_str(b"xy", 0).unwrap();
        assert_eq!(b, 61);
        assert_eq!(arena.back(), 61);
        assert_eq!(&storage[..4], b"abc\0");
        assert_eq!(&storage[61..], b"xy\0");
    }

    #[test]
    fn collision_is_reported_before_writing() {
        let mut storage = [0xAAu8; 8];
        let mut arena = TwoRegionArena::new(&mut storage);
        arena.alloc_front(b"abcd", false, 1, 0).unwrap();
        let err = arena.alloc_back_str(b"wxyz", 0).unwrap_err();
        assert_eq!(err.available, 4);
        assert_eq!(arena.back(), 8);
        assert_eq!(&storage[4..], &[0xAA; 4]);
    }

    #[test]
    fn exact_fit_is_allowed() {
        let mut storage = [0u8; 8];
        let mut arena = TwoRegionArena::new(&mut storage);
        arena.alloc_front(b"abc", true, 1, 0).unwrap();
        arena.alloc_back_str(b"xyz", 0).unwrap();
        assert_eq!(arena.front(), arena.back());
        assert!(arena.alloc_front(b"", false, 1, 0).is_ok());
        assert!(arena.alloc_front(b"", true, 1, 0).is_err());
    }

    #[test]
    fn back_failure_reports_string_and_tables() {
        let mut storage = Vec::new();
        let bytes = aligned(&mut storage, 4 * PTR_SIZE);
        let mut arena = TwoRegionArena::new(bytes);
        arena.alloc_front(b"ab", false, 1, 0).unwrap();
        // Tables start at the next aligned slot; the alias takes 3 + 1 bytes.
        let err = arena.alloc_back_str(b"xyz", 3).unwrap_err();
        assert_eq!(err.needed, (PTR_ALIGN + 3 * PTR_SIZE - 2) + 4);
        assert_eq!(err.available, 4 * PTR_SIZE - 2);
        assert!(err.needed > err.available);

        let mut small = [0u8; 4];
        let mut arena = TwoRegionArena::new(&mut small);
        let err = arena.alloc_back_str(b"toolong", 0).unwrap_err();
        assert_eq!(err.needed, 8);
        assert_eq!(err.available, 4);
    }

    #[test]
    fn back_alloc_larger_than_buffer() {
        let mut storage = [0u8; 4];
        let mut arena = TwoRegionArena::new(&mut storage);
        assert!(arena.alloc_back_str(b"toolong", 0).is_err());
    }

    #[test]
    fn tail_slots_are_reserved() {
        let mut storage = Vec::new();
        let bytes = aligned(&mut storage, 4 * PTR_SIZE);
        let mut arena = TwoRegionArena::new(bytes);
        // One data byte pads out to a full slot, leaving room for three more.
        assert!(arena.alloc_front(b"a", false, 1, 4).is_err());
        assert_eq!(arena.front(), 0);
        assert!(arena.alloc_front(b"a", false, 1, 3).is_ok());
        assert!(arena.alloc_back_str(b"", 3).is_err());
    }

    #[test]
    fn pointer_table_is_aligned_and_points_inside() {
        let mut storage = Vec::new();
        let bytes = aligned(&mut storage, 128);
        let base = bytes.as_ptr() as usize;
        let mut arena = TwoRegionArena::new(bytes);
        let s = arena.alloc_front(b"name", true, 1, 0).unwrap();
        let t = arena.alloc_back_str(b"alias", 0).unwrap();
        let table = arena.alloc_ptr_table(&[s, t], 0).unwrap();
        assert_eq!((base + table) % PTR_ALIGN, 0);
        assert_eq!(arena.front(), table + 3 * PTR_SIZE);
        assert_eq!(read_ptr(bytes_of(&storage, base), table), Some(base + s));
        assert_eq!(
            read_ptr(bytes_of(&storage, base), table + PTR_SIZE),
            Some(base + t)
        );
        assert_eq!(
            read_ptr(bytes_of(&storage, base), table + 2 * PTR_SIZE),
            Some(0)
        );
    }

    fn bytes_of(storage: &[u8], base: usize) -> &[u8] {
        let pad = base - storage.as_ptr() as usize;
        &storage[pad..]
    }

    #[test]
    fn align_offset_uses_absolute_address() {
        let mut storage = Vec::new();
        let bytes = aligned(&mut storage, 64);
        let arena = TwoRegionArena::new(&mut bytes[1..]);
        let off = arena.align_offset(0, PTR_ALIGN);
        assert_eq!(off, PTR_ALIGN - 1);
        assert_eq!((arena.base_addr() + off) % PTR_ALIGN, 0);
    }

    #[test]
    fn read_ptr_out_of_bounds() {
        let bytes = [0u8; PTR_SIZE];
        assert_eq!(read_ptr(&bytes, 0), Some(0));
        assert_eq!(read_ptr(&bytes, 1), None);
        assert_eq!(read_ptr(&bytes, usize::MAX), None);
    }
}
