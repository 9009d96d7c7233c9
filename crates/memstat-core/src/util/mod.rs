//! Platform helpers.

/// Clock ticks per second (USER_HZ) used when `sysconf` has no answer.
pub const DEFAULT_CLK_TCK: u64 = 100;

/// Returns the kernel's clock tick rate, as reported by `sysconf(_SC_CLK_TCK)`.
///
/// Falls back to [`DEFAULT_CLK_TCK`] if the call fails.
#[cfg(unix)]
pub fn clock_ticks_per_second() -> u64 {
    // SAFETY: sysconf has no preconditions and only reads a constant.
    let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if ticks > 0 {
        ticks as u64
    } else {
        DEFAULT_CLK_TCK
    }
}

#[cfg(not(unix))]
pub fn clock_ticks_per_second() -> u64 {
    DEFAULT_CLK_TCK
}
