//! Progress reporting for long searches.

use std::time::Instant;

use peg_core::SearchStats;

/// Resident set size of this process in bytes.
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_out_cnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;
        let status = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );
        (status == 0).then(|| info.assume_init().resident_size)
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `[hh:mm:ss]` for a number of seconds.
pub fn format_clock(secs: u64) -> String {
    format!("[{:02}:{:02}:{:02}]", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Periodic progress lines for one search.
#[derive(Debug)]
pub struct ProgressLog {
    start_time: Instant,
    last_log_time: Instant,
    last_log_attempts: u64,
    interval_secs: u64,
}

impl ProgressLog {
    pub fn new(interval_secs: u64) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_log_time: now,
            last_log_attempts: 0,
            interval_secs,
        }
    }

    /// Seconds since the search started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Check if a progress line is due
    pub fn should_log(&self) -> bool {
        self.interval_secs > 0 && self.last_log_time.elapsed().as_secs() >= self.interval_secs
    }

    /// Print a progress line and reset the log timer
    pub fn log_progress(&mut self, stats: &SearchStats) {
        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            (stats.attempts - self.last_log_attempts) as f64 / elapsed
        } else {
            0.0
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        println!(
            "{} nodes={} attempts={} rate={:.0}/s max_depth={} ticks={}{}",
            format_clock(self.start_time.elapsed().as_secs()),
            stats.nodes,
            stats.attempts,
            rate,
            stats.max_depth,
            stats.ticks,
            mem_str,
        );
        println!(
            "           wins={} dead_ends={}",
            stats.wins, stats.dead_ends
        );

        self.last_log_time = Instant::now();
        self.last_log_attempts = stats.attempts;
    }

    /// Print final summary
    pub fn print_summary(&self, stats: &SearchStats) {
        let elapsed = self.elapsed_secs();
        println!("Nodes: {}", stats.nodes);
        println!("Moves tried: {}", stats.attempts);
        println!("Winning positions reached: {}", stats.wins);
        println!("Dead ends: {}", stats.dead_ends);
        println!("Max depth: {}", stats.max_depth);
        println!("Ticks: {}", stats.ticks);
        println!("Time: {:.2}s", elapsed);
        if elapsed > 0.0 {
            println!("Average rate: {:.0} moves/sec", stats.attempts as f64 / elapsed);
        }
    }
}
