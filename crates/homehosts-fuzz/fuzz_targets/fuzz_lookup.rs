#![no_main]
use libfuzzer_sys::fuzz_target;

use homehosts_core::arena::{PTR_SIZE, read_ptr};
use homehosts_core::inet::parse_addr;
use homehosts_core::{AddressFamily, HostentView, LookupConfig, Query, resolve, resolve_any_family};

fuzz_target!(|data: &[u8]| {
    // Layout: [mode][buflen lo][buflen hi][query len][query bytes][file bytes]
    if data.len() < 4 {
        return;
    }
    let mode = data[0];
    let buflen = usize::from(u16::from_le_bytes([data[1], data[2]])) % 2048;
    let qlen = usize::from(data[3]).min(data.len() - 4);
    let query_bytes = &data[4..4 + qlen];
    let contents = &data[4 + qlen..];

    let config = LookupConfig {
        multi: mode & 0x80 != 0,
    };
    // Bits 4..7 of mode misalign the caller buffer.
    let mut storage = vec![0u8; buflen + 16];
    let pad = storage.as_ptr().align_offset(8).min(8);
    let skew = usize::from((mode >> 4) & 0x7);
    let buf = &mut storage[pad + skew..][..buflen];

    // Should never panic regardless of input
    let result = match mode & 0x3 {
        0 => resolve(
            contents,
            &Query::ByName {
                name: query_bytes,
                family: AddressFamily::Inet,
            },
            &config,
            buf,
        ),
        1 => resolve(
            contents,
            &Query::ByName {
                name: query_bytes,
                family: AddressFamily::Inet6,
            },
            &config,
            buf,
        ),
        2 => resolve_any_family(contents, query_bytes, &config, buf),
        _ => match parse_addr(query_bytes) {
            Some(addr) => resolve(contents, &Query::ByAddress(addr), &config, buf),
            None => return,
        },
    };

    let Ok(layout) = result else {
        return;
    };
    let base = buf.as_ptr() as usize;
    let end = base + buf.len();
    for (table, count) in [
        (layout.addr_list, layout.addr_count),
        (layout.aliases, layout.alias_count),
    ] {
        assert!(table + (count + 1) * PTR_SIZE <= buf.len());
        for i in 0..count {
            let p = read_ptr(buf, table + i * PTR_SIZE).unwrap_or(0);
            assert!(p >= base && p < end, "table entry escapes the buffer");
        }
        assert_eq!(read_ptr(buf, table + count * PTR_SIZE), Some(0));
    }
    assert!(HostentView::decode(buf, &layout).is_some());
});
