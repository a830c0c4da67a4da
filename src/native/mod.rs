//! Host primitive providers: "block while `*addr == comparand`" and
//! the matching wakes, when the platform has such a facility.
//!
//! Exactly one provider is selected at build time; whether it is
//! actually used is decided once at runtime by the capability probe.

use cfg_if::cfg_if;

cfg_if! {

if #[cfg(loom)] {
    // loom models the fallback engine only.
    mod unsupported;
    pub(crate) use unsupported::*;
}
else if #[cfg(any(target_os = "linux", target_os = "android"))] {
    mod linux;
    pub(crate) use linux::*;
}
else if #[cfg(windows)] {
    mod windows;
    pub(crate) use windows::*;
}
else {
    mod unsupported;
    pub(crate) use unsupported::*;
}

}
