//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `clockdeck_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use clockdeck_core::{
    format_clock, format_stopwatch, format_timer, AlarmTime, FormatOptions, HourFormat,
};

fn main() {
    println!("clockdeck_core ping={}", clockdeck_core::ping());
    println!("clockdeck_core version={}", clockdeck_core::core_version());

    // Fixed inputs only; every run must print the same lines.
    let sample = match AlarmTime::parse("07:05") {
        Ok(time) => time,
        Err(err) => {
            eprintln!("clockdeck_core sample time rejected: {err}");
            std::process::exit(1);
        }
    };
    let h12 = FormatOptions::default();
    let h24 = FormatOptions {
        hour_format: HourFormat::H24,
        ..h12
    };
    let time = sample.to_naive_time();
    println!("format_clock h12={}", format_clock(&time, &h12));
    println!("format_clock h24={}", format_clock(&time, &h24));
    println!("format_timer 3661000={}", format_timer(3_661_000));
    println!("format_stopwatch 65000={}", format_stopwatch(65_000));
}
