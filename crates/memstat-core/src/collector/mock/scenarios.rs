//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;

/// Builds a `/proc/[pid]/stat` line with the given CPU tick counters.
pub fn stat_line(pid: u32, comm: &str, utime: u64, stime: u64) -> String {
    format!(
        "{pid} ({comm}) S 1 {pid} {pid} 0 -1 4194304 1000 0 0 0 {utime} {stime} 0 0 20 0 1 0 100 \
         25600000 2000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0\n"
    )
}

/// Builds a `/proc/[pid]/status` text. Sizes are in KiB.
pub fn status_text(name: &str, uid: u32, vm_rss: u64, vm_size: u64) -> String {
    format!(
        "Name:\t{name}\n\
         Umask:\t0022\n\
         State:\tS (sleeping)\n\
         Uid:\t{uid}\t{uid}\t{uid}\t{uid}\n\
         Gid:\t{uid}\t{uid}\t{uid}\t{uid}\n\
         VmPeak:\t{vm_size:>8} kB\n\
         VmSize:\t{vm_size:>8} kB\n\
         VmRSS:\t{vm_rss:>8} kB\n\
         Threads:\t1\n"
    )
}

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1), bash shell, and a web server daemon.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        // /etc/passwd for user name resolution
        fs.add_file(
            "/etc/passwd",
            "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
www-data:x:33:33:www-data:/var/www:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
user:x:1000:1000:User:/home/user:/bin/bash
",
        );

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Dirty:              1024 kB
Writeback:             0 kB
Slab:             512000 kB
SReclaimable:     256000 kB
HugePages_Total:       0
HugePages_Free:        0
Hugepagesize:       2048 kB
",
        );
        // Non-numeric entry, skipped by the enumerator
        fs.add_dir("/proc/sys");

        // PID 1 - init
        fs.add_process(
            1,
            &stat_line(1, "systemd", 500, 300),
            &status_text("systemd", 0, 12000, 170000),
        );

        // PID 1000 - bash shell
        fs.add_process(
            1000,
            &stat_line(1000, "bash", 150, 50),
            &status_text("bash", 1000, 8000, 25000),
        );

        // PID 1001 - nginx worker
        fs.add_process(
            1001,
            &stat_line(1001, "nginx", 2000, 1000),
            &status_text("nginx", 33, 6000, 56000),
        );

        fs
    }

    /// Creates a system whose process names contain spaces and parentheses,
    /// plus a kernel thread without memory lines.
    pub fn with_special_names() -> Self {
        let mut fs = Self::typical_system();

        fs.add_process(
            5000,
            &stat_line(5000, "Web Content", 42, 8),
            &status_text("Web Content", 1000, 300000, 2500000),
        );
        fs.add_process(
            5001,
            &stat_line(5001, "tmux: server (1)", 10, 10),
            &status_text("tmux: server (1)", 1000, 4000, 12000),
        );
        fs.add_process(
            2,
            &stat_line(2, "kthreadd", 0, 0),
            "Name:\tkthreadd\nState:\tS (sleeping)\nUid:\t0\t0\t0\t0\nThreads:\t1\n",
        );

        fs
    }
}
