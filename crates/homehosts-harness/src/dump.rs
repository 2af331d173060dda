//! Hex/ASCII rendering of a packed `hostent` buffer.

use std::fmt::Write;

use homehosts_core::HostentLayout;

/// Bytes per dump row.
pub const ROW: usize = 16;

/// Classic `offset: hex  |ascii|` dump of `buf`.
#[must_use]
pub fn hex_dump(buf: &[u8]) -> String {
    let mut out = String::new();
    for (row, chunk) in buf.chunks(ROW).enumerate() {
        let _ = write!(out, "{:06x}: ", row * ROW);
        for i in 0..ROW {
            match chunk.get(i) {
                Some(b) => {
                    let _ = write!(out, "{b:02x} ");
                }
                None => out.push_str("   "),
            }
            if i == ROW / 2 - 1 {
                out.push(' ');
            }
        }
        out.push('|');
        for &b in chunk {
            out.push(if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            });
        }
        out.push_str("|\n");
    }
    out
}

/// Region map for a layout followed by the full hex dump.
#[must_use]
pub fn render(buf: &[u8], layout: Option<&HostentLayout>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "buffer: {} bytes", buf.len());
    if let Some(layout) = layout {
        match layout.name {
            Some(off) => {
                let _ = writeln!(out, "h_name      @ {off:#06x}");
            }
            None => out.push_str("h_name      = NULL\n"),
        }
        let _ = writeln!(
            out,
            "h_addr_list @ {:#06x} ({} entries, {} bytes each, {})",
            layout.addr_list,
            layout.addr_count,
            layout.h_length(),
            layout.family.name()
        );
        let _ = writeln!(
            out,
            "h_aliases   @ {:#06x} ({} entries)",
            layout.aliases, layout.alias_count
        );
    }
    out.push_str(&hex_dump(buf));
    out
}
