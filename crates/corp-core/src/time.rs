//! Human-readable durations for cooldown display.

/// Format a count of game cycles as elapsed time, e.g. `"1 hour 0 seconds"`.
///
/// Days, hours and minutes appear only when non-zero; seconds always appear.
/// Non-positive counts format as `"0 seconds"`.
pub fn format_game_cycles(cycles: i64, ms_per_cycle: u64) -> String {
    let ms = cycles.max(0) as u128 * ms_per_cycle as u128;
    let total_secs = ms / 1000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    for (n, unit) in [(days, "day"), (hours, "hour"), (minutes, "minute")] {
        if n > 0 {
            out.push_str(&plural(n, unit));
            out.push(' ');
        }
    }
    out.push_str(&plural(seconds, "second"));
    out
}

fn plural(n: u128, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit}")
    } else {
        format!("{n} {unit}s")
    }
}
