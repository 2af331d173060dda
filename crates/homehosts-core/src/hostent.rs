//! `struct hostent` packing.
//!
//! [`HostentBuilder`] accumulates one lookup's answer directly in the caller's buffer:
//!
//! ```text
//! offset 0                                                            buflen
//! | query echo | addr | addr | canonical | pad | addr ptrs | alias ptrs | ... | alias2 | alias1 |
//! |-------------------- forward region ------------------->|           <--- backward region ---|
//! ```
//!
//! Names and addresses are written as soon as they are discovered. Every allocation
//! first checks that the pointer tables `finalize` will write (sized by the current
//! counts) still fit, so exhaustion is reported before anything is written out of
//! place.

use crate::arena::{ArenaFull, PTR_SIZE, TwoRegionArena, read_ptr};
use crate::inet::{AddressFamily, HostAddr};

/// Address payloads are kept at `in_addr` alignment.
const ADDR_ALIGN: usize = 4;

/// Where the pieces of a packed `hostent` live inside the caller buffer.
///
/// All values are byte offsets from the buffer start. The two tables are
/// NULL-terminated arrays of absolute pointers into the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostentLayout {
    /// `h_name`.
    pub name: Option<usize>,
    pub family: AddressFamily,
    /// `h_addr_list`.
    pub addr_list: usize,
    pub addr_count: usize,
    /// `h_aliases`.
    pub aliases: usize,
    pub alias_count: usize,
}

impl HostentLayout {
    #[must_use]
    pub fn h_addrtype(&self) -> i32 {
        self.family.raw()
    }

    #[must_use]
    pub fn h_length(&self) -> i32 {
        self.family.width() as i32
    }
}

/// Incremental writer for one lookup result.
#[derive(Debug)]
pub struct HostentBuilder<'a> {
    arena: TwoRegionArena<'a>,
    family: AddressFamily,
    name: Option<usize>,
    addrs: Vec<usize>,
    aliases: Vec<usize>,
}

impl<'a> HostentBuilder<'a> {
    #[must_use]
    pub fn new(buf: &'a mut [u8], family: AddressFamily) -> Self {
        Self {
            arena: TwoRegionArena::new(buf),
            family,
            name: None,
            addrs: Vec::new(),
            aliases: Vec::new(),
        }
    }

    #[must_use]
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    #[must_use]
    pub fn address_count(&self) -> usize {
        self.addrs.len()
    }

    #[must_use]
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    #[must_use]
    pub fn has_canonical(&self) -> bool {
        self.name.is_some()
    }

    /// Slots both tables need with `extra_addrs`/`extra_aliases` more entries.
    fn table_slots(&self, extra_addrs: usize, extra_aliases: usize) -> usize {
        (self.addrs.len() + extra_addrs + 1) + (self.aliases.len() + extra_aliases + 1)
    }

    /// Write the query name as the placeholder `h_name`.
    pub fn set_query_echo(&mut self, name: &[u8]) -> Result<(), ArenaFull> {
        let slots = self.table_slots(0, 0);
        let off = self.arena.alloc_front(name, true, 1, slots)?;
        self.name = Some(off);
        Ok(())
    }

    /// Set `h_name` if it is still empty. Returns false when a name was already set.
    pub fn set_canonical(&mut self, name: &[u8]) -> Result<bool, ArenaFull> {
        if self.name.is_some() {
            return Ok(false);
        }
        let slots = self.table_slots(0, 0);
        let off = self.arena.alloc_front(name, true, 1, slots)?;
        self.name = Some(off);
        Ok(true)
    }

    /// Append an address payload. Its family must match the builder's.
    pub fn add_address(&mut self, addr: &HostAddr) -> Result<(), ArenaFull> {
        debug_assert_eq!(addr.family(), self.family);
        let slots = self.table_slots(1, 0);
        let off = self
            .arena
            .alloc_front(addr.octets(), false, ADDR_ALIGN, slots)?;
        self.addrs.push(off);
        Ok(())
    }

    /// Append an alias string at the top of the backward region.
    pub fn add_alias(&mut self, name: &[u8]) -> Result<(), ArenaFull> {
        let slots = self.table_slots(0, 1);
        let off = self.arena.alloc_back_str(name, slots)?;
        self.aliases.push(off);
        Ok(())
    }

    /// Write `h_addr_list` and `h_aliases` and return the final layout.
    ///
    /// Aliases are listed in discovery order.
    pub fn finalize(mut self) -> Result<HostentLayout, ArenaFull> {
        let alias_slots = self.aliases.len() + 1;
        let addr_list = self.arena.alloc_ptr_table(&self.addrs, alias_slots)?;
        let aliases = self.arena.alloc_ptr_table(&self.aliases, 0)?;
        Ok(HostentLayout {
            name: self.name,
            family: self.family,
            addr_list,
            addr_count: self.addrs.len(),
            aliases,
            alias_count: self.aliases.len(),
        })
    }
}

/// Owned decoding of a packed `hostent`, read back through its pointer tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostentView {
    pub name: Option<Vec<u8>>,
    pub family: AddressFamily,
    pub addresses: Vec<HostAddr>,
    pub aliases: Vec<Vec<u8>>,
}

impl HostentView {
    /// Decode `layout` from `buf`, following the embedded pointers.
    ///
    /// Returns `None` if any pointer falls outside `buf`, a string is unterminated,
    /// or a table's length disagrees with the layout counts.
    #[must_use]
    pub fn decode(buf: &[u8], layout: &HostentLayout) -> Option<Self> {
        let base = buf.as_ptr() as usize;
        let name = match layout.name {
            Some(off) => Some(read_cstr(buf, off)?.to_vec()),
            None => None,
        };

        let width = layout.family.width();
        let mut addresses = Vec::with_capacity(layout.addr_count);
        for ptr in read_table(buf, layout.addr_list)? {
            let off = ptr.checked_sub(base)?;
            let bytes = buf.get(off..off.checked_add(width)?)?;
            addresses.push(HostAddr::from_raw_parts(layout.family, bytes)?);
        }
        if addresses.len() != layout.addr_count {
            return None;
        }

        let mut aliases = Vec::with_capacity(layout.alias_count);
        for ptr in read_table(buf, layout.aliases)? {
            aliases.push(read_cstr(buf, ptr.checked_sub(base)?)?.to_vec());
        }
        if aliases.len() != layout.alias_count {
            return None;
        }

        Some(Self {
            name,
            family: layout.family,
            addresses,
            aliases,
        })
    }

    /// `h_name` as text (lossy).
    #[must_use]
    pub fn name_lossy(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(|n| String::from_utf8_lossy(n).into_owned())
    }

    #[must_use]
    pub fn aliases_lossy(&self) -> Vec<String> {
        self.aliases
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect()
    }
}

fn read_table(buf: &[u8], mut off: usize) -> Option<Vec<usize>> {
    let mut out = Vec::new();
    loop {
        let ptr = read_ptr(buf, off)?;
        if ptr == 0 {
            return Some(out);
        }
        out.push(ptr);
        off = off.checked_add(PTR_SIZE)?;
    }
}

fn read_cstr(buf: &[u8], off: usize) -> Option<&[u8]> {
    let tail = buf.get(off..)?;
    let len = tail.iter().position(|&b| b == 0)?;
    Some(&tail[..len])
}
