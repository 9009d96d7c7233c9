//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string inputs.

use std::collections::HashMap;

use crate::model::MemTotals;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// Parses a base-10 counter. The empty string is 0.
fn parse_decimal(raw: &str) -> Result<u64, ParseError> {
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| ParseError::new(format!("invalid number {:?}", raw)))
}

/// Parses one `Key:   <digits> kB` line of `/proc/meminfo`.
///
/// The trailing `kB` unit is optional. All whitespace is removed before the
/// line is split on its first colon, so `"Key:     kB"` yields `("Key", 0)`.
pub fn parse_line(line: &str) -> Result<(String, u64), ParseError> {
    let line = line.trim_end();
    let line = line.strip_suffix("kB").unwrap_or(line);
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();

    let (key, raw) = compact
        .split_once(':')
        .ok_or_else(|| ParseError::new(format!("missing ':' in line {:?}", line)))?;

    Ok((key.to_string(), parse_decimal(raw)?))
}

/// Parses `/proc/meminfo` content, keeping MemTotal, MemFree and MemAvailable.
pub fn parse_meminfo(content: &str) -> Result<MemTotals, ParseError> {
    let mut totals = MemTotals::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = parse_line(line)?;
        match key.as_str() {
            "MemTotal" => totals.total = value,
            "MemFree" => totals.free = value,
            "MemAvailable" => totals.available = value,
            _ => {}
        }
    }

    Ok(totals)
}

/// Parsed data from `/proc/[pid]/status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStatus {
    pub name: String,
    /// Real UID, `None` if the line is missing.
    pub uid: Option<u32>,
    /// VmRSS in KiB. Zero for kernel threads.
    pub vm_rss: u64,
    /// VmSize in KiB. Zero for kernel threads.
    pub vm_size: u64,
}

/// Isolates the leading digits of a status value such as `"   8000 kB"`.
fn parse_kb_value(value: &str) -> Result<u64, ParseError> {
    let value = value.trim();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if end == 0 && !value.is_empty() {
        return Err(ParseError::new(format!("invalid size {:?}", value)));
    }
    parse_decimal(&value[..end])
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line.
pub fn parse_proc_status(content: &str) -> Result<ProcStatus, ParseError> {
    let mut status = ProcStatus::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "Name" => status.name = value.trim().to_string(),
            "VmRSS" => status.vm_rss = parse_kb_value(value)?,
            "VmSize" => status.vm_size = parse_kb_value(value)?,
            // Uid has format: real effective saved fs
            "Uid" => {
                status.uid = value
                    .split_whitespace()
                    .next()
                    .and_then(|uid| uid.parse().ok());
            }
            _ => {}
        }
    }

    Ok(status)
}

/// Parses `/proc/[pid]/stat` content and returns utime + stime in clock ticks.
///
/// The comm field can contain spaces and parentheses, so fields are counted
/// from the last `)`.
pub fn parse_cpu_ticks(content: &str) -> Result<u64, ParseError> {
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    // state ppid pgrp session tty_nr tpgid flags minflt cminflt majflt cmajflt utime stime
    let mut fields = content[close_paren + 1..].split_whitespace().skip(11);
    let mut next_field = |name: &str| -> Result<u64, ParseError> {
        fields
            .next()
            .ok_or_else(|| ParseError::new(format!("missing field {}", name)))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    let utime = next_field("utime")?;
    let stime = next_field("stime")?;
    Ok(utime + stime)
}

/// Parses `/etc/passwd` content and returns a map of UID -> username.
///
/// Format: username:password:uid:gid:gecos:home:shell
pub fn parse_passwd(content: &str) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        if parts.len() >= 3
            && let Ok(uid) = parts[2].parse::<u32>()
        {
            map.insert(uid, parts[0].to_string());
        }
    }
    map
}

/// Resolver for UID -> username mapping.
#[derive(Debug, Clone, Default)]
pub struct UserResolver {
    uid_to_name: HashMap<u32, String>,
}

impl UserResolver {
    /// Creates a new empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads user mappings from /etc/passwd content.
    pub fn load_from_content(&mut self, content: &str) {
        self.uid_to_name = parse_passwd(content);
    }

    /// Resolves UID to username, returns UID as string if not found.
    pub fn resolve(&self, uid: u32) -> String {
        self.uid_to_name
            .get(&uid)
            .cloned()
            .unwrap_or_else(|| uid.to_string())
    }

    /// Returns true if resolver has any mappings.
    pub fn is_loaded(&self) -> bool {
        !self.uid_to_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("MemTotal:    123 kB").unwrap(),
            ("MemTotal".to_string(), 123)
        );
        assert_eq!(
            parse_line("Key:     kB").unwrap(),
            ("Key".to_string(), 0)
        );
    }

    #[test]
    fn test_parse_line_trailing_newline_and_no_unit() {
        assert_eq!(
            parse_line("MemFree:         8192000 kB\n").unwrap(),
            ("MemFree".to_string(), 8192000)
        );
        assert_eq!(
            parse_line("HugePages_Total:       0").unwrap(),
            ("HugePages_Total".to_string(), 0)
        );
    }

    #[test]
    fn test_parse_line_malformed() {
        assert!(parse_line("MemTotal:   12x4 kB").is_err());
        assert!(parse_line("no colon here").is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
HugePages_Total:       0
";
        let totals = parse_meminfo(content).unwrap();

        assert_eq!(totals.total, 16384000);
        assert_eq!(totals.free, 8192000);
        assert_eq!(totals.available, 12000000);
    }

    #[test]
    fn test_parse_meminfo_missing_keys() {
        let totals = parse_meminfo("Buffers: 10 kB\n\n").unwrap();
        assert_eq!(totals, MemTotals::default());
    }

    #[test]
    fn test_parse_proc_status() {
        let content = "\
Name:\tbash
Umask:\t0022
State:\tS (sleeping)
Pid:\t1234
PPid:\t1233
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
VmData:\t    2000 kB
voluntary_ctxt_switches:\t500
";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.name, "bash");
        assert_eq!(status.uid, Some(1000));
        assert_eq!(status.vm_size, 25000);
        assert_eq!(status.vm_rss, 8000);
    }

    #[test]
    fn test_parse_proc_status_kernel_thread() {
        let content = "Name:\tkworker/0:1\nUid:\t0\t0\t0\t0\n";
        let status = parse_proc_status(content).unwrap();

        assert_eq!(status.name, "kworker/0:1");
        assert_eq!(status.vm_rss, 0);
        assert_eq!(status.vm_size, 0);
    }

    #[test]
    fn test_parse_proc_status_unit_without_space() {
        let status = parse_proc_status("VmRSS:\t512kB\n").unwrap();
        assert_eq!(status.vm_rss, 512);
    }

    #[test]
    fn test_parse_proc_status_bad_size() {
        assert!(parse_proc_status("VmRSS:\tlots kB\n").is_err());
    }

    #[test]
    fn test_parse_cpu_ticks() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1234 4194304 1000 0 0 0 150 50 0 0 20 0 1 0 100000 25600000 2000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0";
        assert_eq!(parse_cpu_ticks(content).unwrap(), 200);
    }

    #[test]
    fn test_parse_cpu_ticks_comm_with_spaces() {
        let content = "5000 (Web Content (x)) S 1 5000 5000 0 -1 4194304 10 0 0 0 7 3 0 0 20 0 1 0 100 1000 10";
        assert_eq!(parse_cpu_ticks(content).unwrap(), 10);
    }

    #[test]
    fn test_parse_cpu_ticks_truncated() {
        assert!(parse_cpu_ticks("1 (init) S 0 1 1").is_err());
        assert!(parse_cpu_ticks("garbage").is_err());
    }

    #[test]
    fn test_parse_passwd() {
        let content = "\
# comment
root:x:0:0:root:/root:/bin/bash
user:x:1000:1000:User:/home/user:/bin/bash
broken:x:notanumber:0::/:/bin/false
";
        let map = parse_passwd(content);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&0).map(String::as_str), Some("root"));
        assert_eq!(map.get(&1000).map(String::as_str), Some("user"));
    }

    #[test]
    fn test_user_resolver_fallback() {
        let mut resolver = UserResolver::new();
        assert!(!resolver.is_loaded());
        resolver.load_from_content("root:x:0:0:root:/root:/bin/bash\n");
        assert!(resolver.is_loaded());
        assert_eq!(resolver.resolve(0), "root");
        assert_eq!(resolver.resolve(4242), "4242");
    }
}
