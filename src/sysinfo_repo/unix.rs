// Unix system calls sysinfo does not expose: uname(2) and statvfs(3).

use std::ffi::{CStr, CString};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use crate::error::ProbeError;
use crate::models::DiskUsage;

pub(super) struct Uname {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

pub(super) fn uname() -> io::Result<Uname> {
    // SAFETY: utsname is plain old data; uname fills it or fails without touching it.
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    if unsafe { libc::uname(&mut uts) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(Uname {
        sysname: c_field(&uts.sysname),
        nodename: c_field(&uts.nodename),
        release: c_field(&uts.release),
        version: c_field(&uts.version),
        machine: c_field(&uts.machine),
    })
}

fn c_field(buf: &[libc::c_char]) -> String {
    // SAFETY: uname NUL-terminates every field within its buffer, and the
    // zeroed initial buffer guarantees a terminator otherwise.
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

pub(super) fn statvfs(mount_point: &Path) -> Result<DiskUsage, ProbeError> {
    let path = CString::new(mount_point.as_os_str().as_bytes()).map_err(|_| {
        ProbeError::Unavailable(format!("mount point {} contains NUL", mount_point.display()))
    })?;
    // SAFETY: statvfs is plain old data filled by the call on success.
    let mut st: libc::statvfs = unsafe { std::mem::zeroed() };
    if unsafe { libc::statvfs(path.as_ptr(), &mut st) } != 0 {
        return Err(usage_error(mount_point, io::Error::last_os_error()));
    }
    Ok(DiskUsage::from_blocks(
        st.f_blocks as u64,
        st.f_bfree as u64,
        st.f_bavail as u64,
        st.f_frsize as u64,
    ))
}

/// EACCES and EPERM mean the mount exists but we may not look at it.
fn usage_error(mount_point: &Path, err: io::Error) -> ProbeError {
    match err.raw_os_error() {
        Some(libc::EACCES) | Some(libc::EPERM) => {
            ProbeError::PermissionDenied(mount_point.to_path_buf())
        }
        _ => ProbeError::io(format!("statvfs {}", mount_point.display()), err),
    }
}
