use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use homehosts_core::arena::PTR_ALIGN;
use homehosts_core::{
    AddressFamily, HostAddr, HostentView, HostsFile, LookupConfig, LookupError, Query,
    lookup_by_address, lookup_by_name, lookup_by_name_any_family, resolve,
};

static TEST_SEQ: AtomicU64 = AtomicU64::new(0);

const SAMPLE: &[u8] = b"\
# personal overrides
127.0.0.1   localhost
::1         localhost ip6-localhost
192.168.1.10 myhost alias1 alias2
10.0.0.5    foo # bar baz
10.0.0.20   web cache
10.0.0.21   db
10.0.0.22   WEB cache mirror
";

#[derive(Clone, Copy)]
struct Case {
    label: &'static str,
    query: Query<'static>,
    multi: bool,
    expected_name: Option<&'static str>,
    expected_addrs: &'static [&'static str],
    expected_aliases: &'static [&'static str],
}

fn v4(text: &str) -> HostAddr {
    homehosts_core::inet::parse_addr(text.as_bytes()).unwrap()
}

fn by_name(name: &'static str, family: AddressFamily) -> Query<'static> {
    Query::ByName {
        name: name.as_bytes(),
        family,
    }
}

/// Pointer-aligned window of `len` bytes, so every slice of it shares one base.
fn aligned(storage: &mut Vec<u8>, len: usize) -> &mut [u8] {
    storage.clear();
    storage.resize(len + PTR_ALIGN, 0);
    let pad = storage.as_ptr().align_offset(PTR_ALIGN);
    &mut storage[pad..pad + len]
}

fn temp_hosts(content: &[u8]) -> HostsFile {
    let seq = TEST_SEQ.fetch_add(1, Ordering::Relaxed);
    let path: PathBuf = std::env::temp_dir().join(format!(
        "homehosts-core-{}-{seq}.hosts",
        std::process::id()
    ));
    fs::write(&path, content).expect("temporary hosts file should be writable");
    HostsFile::at(path)
}

fn matrix_cases() -> Vec<Case> {
    vec![
        Case {
            label: "example record by name",
            query: by_name("myhost", AddressFamily::Inet),
            multi: false,
            expected_name: Some("myhost"),
            expected_addrs: &["192.168.1.10"],
            expected_aliases: &["alias1", "alias2"],
        },
        Case {
            label: "alias column hit echoes the query",
            query: by_name("ALIAS2", AddressFamily::Inet),
            multi: false,
            expected_name: Some("ALIAS2"),
            expected_addrs: &["192.168.1.10"],
            expected_aliases: &["myhost", "alias1"],
        },
        Case {
            label: "reverse lookup",
            query: Query::ByAddress(HostAddr::V4([192, 168, 1, 10])),
            multi: false,
            expected_name: Some("myhost"),
            expected_addrs: &["192.168.1.10"],
            expected_aliases: &["alias1", "alias2"],
        },
        Case {
            label: "inline comment strips aliases",
            query: by_name("foo", AddressFamily::Inet),
            multi: false,
            expected_name: Some("foo"),
            expected_addrs: &["10.0.0.5"],
            expected_aliases: &[],
        },
        Case {
            label: "multi off keeps first line",
            query: by_name("web", AddressFamily::Inet),
            multi: false,
            expected_name: Some("web"),
            expected_addrs: &["10.0.0.20"],
            expected_aliases: &["cache"],
        },
        Case {
            label: "multi on gathers every line",
            query: by_name("web", AddressFamily::Inet),
            multi: true,
            expected_name: Some("web"),
            expected_addrs: &["10.0.0.20", "10.0.0.22"],
            expected_aliases: &["cache", "cache", "mirror"],
        },
        Case {
            label: "ipv6 record",
            query: by_name("ip6-localhost", AddressFamily::Inet6),
            multi: false,
            expected_name: Some("ip6-localhost"),
            expected_addrs: &["::1"],
            expected_aliases: &["localhost"],
        },
    ]
}

#[test]
fn lookup_matrix() {
    for case in matrix_cases() {
        let mut buf = vec![0u8; 1024];
        let layout = resolve(
            SAMPLE,
            &case.query,
            &LookupConfig { multi: case.multi },
            &mut buf,
        )
        .unwrap_or_else(|e| panic!("{}: unexpected error {e}", case.label));
        let view = HostentView::decode(&buf, &layout).expect("layout should decode");
        assert_eq!(
            view.name_lossy().as_deref(),
            case.expected_name,
            "{}",
            case.label
        );
        let addrs: Vec<String> = view.addresses.iter().map(ToString::to_string).collect();
        assert_eq!(addrs, case.expected_addrs, "{}", case.label);
        assert_eq!(view.aliases_lossy(), case.expected_aliases, "{}", case.label);
        assert_eq!(layout.addr_count, case.expected_addrs.len());
        assert_eq!(layout.alias_count, case.expected_aliases.len());
    }
}

#[test]
fn misses_are_not_found() {
    let misses = [
        by_name("nope", AddressFamily::Inet),
        by_name("bar", AddressFamily::Inet),
        by_name("myhost", AddressFamily::Inet6),
        Query::ByAddress(v4("10.9.9.9")),
    ];
    for q in misses {
        let mut buf = vec![0u8; 1024];
        let err = resolve(SAMPLE, &q, &LookupConfig { multi: true }, &mut buf).unwrap_err();
        assert!(matches!(err, LookupError::NotFound), "{q:?}: {err}");
    }
}

#[test]
fn buffer_threshold_is_sharp() {
    let query = by_name("web", AddressFamily::Inet);
    let config = LookupConfig { multi: true };
    let mut storage = Vec::new();
    let window = aligned(&mut storage, 512);

    let reference = {
        let layout = resolve(SAMPLE, &query, &config, window).unwrap();
        HostentView::decode(window, &layout).unwrap()
    };

    let mut threshold = None;
    for n in 0..=512 {
        let buf = &mut window[..n];
        buf.fill(0);
        match resolve(SAMPLE, &query, &config, buf) {
            Ok(layout) => {
                let view = HostentView::decode(buf, &layout).unwrap();
                assert_eq!(view, reference, "buflen {n}");
                threshold.get_or_insert(n);
            }
            Err(LookupError::BufferTooSmall(_)) => {
                assert!(threshold.is_none(), "buflen {n} failed above threshold");
            }
            Err(other) => panic!("buflen {n}: unexpected {other}"),
        }
    }
    let t = threshold.expect("512 bytes should hold the answer");
    assert!(t > 0);
}

#[test]
fn reverse_buffer_threshold_is_sharp() {
    let query = Query::ByAddress(v4("192.168.1.10"));
    let config = LookupConfig::default();
    let mut storage = Vec::new();
    let window = aligned(&mut storage, 256);

    let reference = {
        let layout = resolve(SAMPLE, &query, &config, window).unwrap();
        HostentView::decode(window, &layout).unwrap()
    };
    assert_eq!(reference.name_lossy().as_deref(), Some("myhost"));

    let mut threshold = None;
    for n in 0..=256 {
        let buf = &mut window[..n];
        buf.fill(0);
        match resolve(SAMPLE, &query, &config, buf) {
            Ok(layout) => {
                let view = HostentView::decode(buf, &layout).unwrap();
                assert_eq!(view, reference, "buflen {n}");
                threshold.get_or_insert(n);
            }
            Err(LookupError::BufferTooSmall(full)) => {
                assert!(threshold.is_none(), "buflen {n} failed above threshold");
                assert!(full.needed > full.available, "buflen {n}: {full}");
            }
            Err(other) => panic!("buflen {n}: unexpected {other}"),
        }
    }
    let t = threshold.expect("256 bytes should hold the answer");
    assert!(t > "myhost".len() + "alias1".len() + "alias2".len());
}

#[test]
fn missing_home_is_soft() {
    for home in [None, Some(std::ffi::OsStr::new(""))] {
        let err = HostsFile::from_home_dir(home).unwrap_err();
        assert!(matches!(err, LookupError::HomeUnknown));
        assert!(err.is_soft());
        assert_eq!(err.errno(), 11);
    }
    let file = HostsFile::from_home_dir(Some(std::ffi::OsStr::new("/home/u"))).unwrap();
    assert_eq!(file.path(), std::path::Path::new("/home/u/.hosts"));
}

#[test]
fn pointers_stay_inside_buffer() {
    let mut storage = Vec::new();
    let window = aligned(&mut storage, 300);
    // Deliberately misaligned start.
    let buf = &mut window[5..];
    let base = buf.as_ptr() as usize;
    let len = buf.len();
    let layout = resolve(
        SAMPLE,
        &by_name("web", AddressFamily::Inet),
        &LookupConfig { multi: true },
        buf,
    )
    .unwrap();
    assert_eq!((base + layout.addr_list) % PTR_ALIGN, 0);
    assert_eq!((base + layout.aliases) % PTR_ALIGN, 0);
    let mut at = layout.addr_list;
    loop {
        let ptr = homehosts_core::arena::read_ptr(buf, at).unwrap();
        if ptr == 0 {
            break;
        }
        assert!(ptr >= base && ptr + 4 <= base + len);
        at += homehosts_core::arena::PTR_SIZE;
    }
}

#[test]
fn repeated_calls_are_byte_identical() {
    let query = by_name("myhost", AddressFamily::Inet);
    let mut storage = Vec::new();
    let window = aligned(&mut storage, 256);
    window.fill(0);
    let first = resolve(SAMPLE, &query, &LookupConfig::default(), window).unwrap();
    let snapshot = window.to_vec();
    window.fill(0);
    let second = resolve(SAMPLE, &query, &LookupConfig::default(), window).unwrap();
    assert_eq!(first, second);
    assert_eq!(snapshot, window.to_vec());
}

#[test]
fn any_family_falls_through_to_ipv4() {
    let file = temp_hosts(b"192.168.1.10 myhost alias1\n::1 six\n");
    let mut buf = vec![0u8; 256];
    let layout =
        lookup_by_name_any_family(&file, b"myhost", &LookupConfig::default(), &mut buf)
            .unwrap();
    assert_eq!(layout.family, AddressFamily::Inet);
    let view = HostentView::decode(&buf, &layout).unwrap();
    assert_eq!(view.addresses, vec![v4("192.168.1.10")]);

    let layout =
        lookup_by_name_any_family(&file, b"six", &LookupConfig::default(), &mut buf).unwrap();
    assert_eq!(layout.family, AddressFamily::Inet6);
    let _ = fs::remove_file(file.path());
}

#[test]
fn ipv6_wins_when_both_families_present() {
    let file = temp_hosts(b"10.1.1.1 both\nfe80::1 both\n");
    let mut buf = vec![0u8; 256];
    let layout =
        lookup_by_name_any_family(&file, b"both", &LookupConfig::default(), &mut buf).unwrap();
    assert_eq!(layout.family, AddressFamily::Inet6);
    assert_eq!(layout.h_length(), 16);
    let _ = fs::remove_file(file.path());
}

#[test]
fn file_backed_lookups() {
    let file = temp_hosts(SAMPLE);
    let mut buf = vec![0u8; 512];
    let layout = lookup_by_name(
        &file,
        b"localhost",
        AddressFamily::Inet,
        &LookupConfig::default(),
        &mut buf,
    )
    .unwrap();
    let view = HostentView::decode(&buf, &layout).unwrap();
    assert_eq!(view.addresses, vec![v4("127.0.0.1")]);

    let layout = lookup_by_address(
        &file,
        &v4("10.0.0.21"),
        &LookupConfig::default(),
        &mut buf,
    )
    .unwrap();
    let view = HostentView::decode(&buf, &layout).unwrap();
    assert_eq!(view.name_lossy().as_deref(), Some("db"));
    let _ = fs::remove_file(file.path());
}

#[test]
fn unreadable_file_is_soft_not_missing() {
    let file = HostsFile::at(std::env::temp_dir().join("homehosts-core-does-not-exist/.hosts"));
    let mut buf = vec![0u8; 64];
    let err = lookup_by_name_any_family(&file, b"x", &LookupConfig::default(), &mut buf)
        .unwrap_err();
    assert!(err.is_soft());
    assert!(!matches!(err, LookupError::NotFound));
}
