//! NSS `hosts` database entry points.
//!
//! Implements `_nss_homehosts_gethostbyname_r`, `_nss_homehosts_gethostbyname2_r`
//! and `_nss_homehosts_gethostbyaddr_r` over `$HOME/.hosts`.
//!
//! All three share the glibc NSS reentrant contract: the packed answer lives in the
//! caller's `buffer`, `result` is only written on success, and failures are reported
//! as an `nss_status` plus values stored through `errnop` and `h_errnop`.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::slice;

use homehosts_core::error::{EINVAL, NETDB_INTERNAL, NssStatus};
use homehosts_core::{
    AddressFamily, HostAddr, HostentLayout, HostsFile, LookupError, engine,
};

use crate::config;

/// `NSS_STATUS_*` values as returned across the boundary.
pub const NSS_STATUS_TRYAGAIN: c_int = NssStatus::TryAgain.as_raw();
pub const NSS_STATUS_UNAVAIL: c_int = NssStatus::Unavail.as_raw();
pub const NSS_STATUS_NOTFOUND: c_int = NssStatus::NotFound.as_raw();
pub const NSS_STATUS_SUCCESS: c_int = NssStatus::Success.as_raw();

/// Store `errno`/`h_errno` values through the optional out-pointers.
///
/// # Safety
///
/// Each pointer must be null or valid for a write of one `c_int`.
unsafe fn store_codes(errnop: *mut c_int, h_errnop: *mut c_int, errno: c_int, h_errno: c_int) {
    if !errnop.is_null() {
        // SAFETY: caller guarantees errnop is writable when non-null.
        unsafe { *errnop = errno };
    }
    if !h_errnop.is_null() {
        // SAFETY: caller guarantees h_errnop is writable when non-null.
        unsafe { *h_errnop = h_errno };
    }
}

/// Argument the engine cannot work with: UNAVAIL with `EINVAL`.
unsafe fn invalid_argument(errnop: *mut c_int, h_errnop: *mut c_int) -> c_int {
    // SAFETY: forwarded caller contract.
    unsafe { store_codes(errnop, h_errnop, EINVAL, NETDB_INTERNAL) };
    NSS_STATUS_UNAVAIL
}

/// Point `result` at a layout packed into `buffer`.
///
/// # Safety
///
/// `result` must be writable, and `layout` must have been produced over exactly the
/// `buffer` allocation so every offset lies inside it.
unsafe fn fill_hostent(layout: &HostentLayout, result: *mut libc::hostent, buffer: *mut c_char) {
    // SAFETY: offsets come from the builder over this buffer and are in bounds.
    unsafe {
        (*result).h_name = match layout.name {
            Some(off) => buffer.add(off),
            None => std::ptr::null_mut(),
        };
        (*result).h_aliases = buffer.add(layout.aliases).cast::<*mut c_char>();
        (*result).h_addrtype = layout.h_addrtype();
        (*result).h_length = layout.h_length();
        (*result).h_addr_list = buffer.add(layout.addr_list).cast::<*mut c_char>();
    }
}

/// Translate an engine outcome into NSS status and out-parameters.
///
/// # Safety
///
/// Same as [`fill_hostent`] for the success case, and `errnop`/`h_errnop` must be
/// null or writable.
unsafe fn complete(
    outcome: Result<HostentLayout, LookupError>,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> c_int {
    match outcome {
        Ok(layout) => {
            // SAFETY: layout was packed into `buffer` by the engine.
            unsafe { fill_hostent(&layout, result, buffer) };
            NSS_STATUS_SUCCESS
        }
        Err(err) => {
            // SAFETY: forwarded caller contract.
            unsafe { store_codes(errnop, h_errnop, err.errno(), err.h_errno()) };
            err.status().as_raw()
        }
    }
}

/// View the caller's scratch buffer as a byte slice.
///
/// # Safety
///
/// `buffer` must be non-null and valid for writes of `buflen` bytes for the
/// duration of the returned borrow.
unsafe fn scratch<'a>(buffer: *mut c_char, buflen: libc::size_t) -> &'a mut [u8] {
    // SAFETY: caller contract.
    unsafe { slice::from_raw_parts_mut(buffer.cast::<u8>(), buflen) }
}

/// `gethostbyname_r` backend: IPv6 first, IPv4 on miss.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_homehosts_gethostbyname_r(
    name: *const c_char,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: libc::size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> c_int {
    if name.is_null() || result.is_null() || buffer.is_null() {
        // SAFETY: errnop/h_errnop are checked for null inside.
        return unsafe { invalid_argument(errnop, h_errnop) };
    }

    // SAFETY: name is non-null and NUL-terminated per the NSS contract.
    let name = unsafe { CStr::from_ptr(name) }.to_bytes();
    // SAFETY: buffer is non-null with buflen writable bytes.
    let buf = unsafe { scratch(buffer, buflen) };

    let outcome = HostsFile::from_home().and_then(|file| {
        engine::lookup_by_name_any_family(&file, name, &config::lookup_config(), buf)
    });
    // SAFETY: forwarded caller contract.
    unsafe { complete(outcome, result, buffer, errnop, h_errnop) }
}

/// `gethostbyname2_r` backend for an explicit family.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_homehosts_gethostbyname2_r(
    name: *const c_char,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: libc::size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> c_int {
    if name.is_null() || result.is_null() || buffer.is_null() {
        // SAFETY: errnop/h_errnop are checked for null inside.
        return unsafe { invalid_argument(errnop, h_errnop) };
    }

    let family = match engine::family_from_raw(af) {
        Ok(f) => f,
        // SAFETY: forwarded caller contract.
        Err(err) => return unsafe { complete(Err(err), result, buffer, errnop, h_errnop) },
    };

    // SAFETY: name is non-null and NUL-terminated per the NSS contract.
    let name = unsafe { CStr::from_ptr(name) }.to_bytes();
    // SAFETY: buffer is non-null with buflen writable bytes.
    let buf = unsafe { scratch(buffer, buflen) };

    let outcome = HostsFile::from_home().and_then(|file| {
        engine::lookup_by_name(&file, name, family, &config::lookup_config(), buf)
    });
    // SAFETY: forwarded caller contract.
    unsafe { complete(outcome, result, buffer, errnop, h_errnop) }
}

/// `gethostbyaddr_r` backend. `addr` points at `len` bytes of `in_addr`/`in6_addr`.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn _nss_homehosts_gethostbyaddr_r(
    addr: *const c_void,
    len: libc::socklen_t,
    af: c_int,
    result: *mut libc::hostent,
    buffer: *mut c_char,
    buflen: libc::size_t,
    errnop: *mut c_int,
    h_errnop: *mut c_int,
) -> c_int {
    if addr.is_null() || result.is_null() || buffer.is_null() {
        // SAFETY: errnop/h_errnop are checked for null inside.
        return unsafe { invalid_argument(errnop, h_errnop) };
    }

    let family: AddressFamily = match engine::family_from_raw(af) {
        Ok(f) => f,
        // SAFETY: forwarded caller contract.
        Err(err) => return unsafe { complete(Err(err), result, buffer, errnop, h_errnop) },
    };
    if len as usize != family.width() {
        // SAFETY: errnop/h_errnop are checked for null inside.
        return unsafe { invalid_argument(errnop, h_errnop) };
    }

    // SAFETY: addr is non-null and points at `len` readable bytes.
    let raw = unsafe { slice::from_raw_parts(addr.cast::<u8>(), len as usize) };
    let Some(target) = HostAddr::from_raw_parts(family, raw) else {
        // SAFETY: errnop/h_errnop are checked for null inside.
        return unsafe { invalid_argument(errnop, h_errnop) };
    };
    // SAFETY: buffer is non-null with buflen writable bytes.
    let buf = unsafe { scratch(buffer, buflen) };

    let outcome = HostsFile::from_home().and_then(|file| {
        engine::lookup_by_address(&file, &target, &config::lookup_config(), buf)
    });
    // SAFETY: forwarded caller contract.
    unsafe { complete(outcome, result, buffer, errnop, h_errnop) }
}
