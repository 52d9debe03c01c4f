use crate::page::Media;
use crate::{log_debug, log_info};

use super::state::OverrideRecord;

const ENABLE_LOGS: bool = true;

pub const MIN_RATE: f64 = 0.1;
pub const MAX_RATE: f64 = 16.0;
const RATE_EPSILON: f64 = 0.001;

pub fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(MIN_RATE, MAX_RATE)
}

fn rates_differ(a: f64, b: f64) -> bool {
    (a - b).abs() > RATE_EPSILON
}

/// Force the ad rate and mute. Safe to repeat every tick: a forced flag is
/// only raised by a write that went through, and never lowered here.
pub fn apply<M: Media + ?Sized>(media: &mut M, target_rate: f64, record: &mut OverrideRecord) {
    let desired = clamp_rate(target_rate);
    if rates_differ(media.playback_rate(), desired) {
        match media.set_playback_rate(desired) {
            Ok(()) => record.rate_was_forced = true,
            Err(err) => log_debug!("playback rate write skipped: {err}"),
        }
    }

    if !media.muted() {
        match media.set_muted(true) {
            Ok(()) => record.mute_was_forced = true,
            Err(err) => log_debug!("mute write skipped: {err}"),
        }
    }
}

/// Put back what [`apply`] changed, unless the viewer already did or the
/// current value is their own choice.
pub fn revert<M: Media + ?Sized>(media: &mut M, record: &OverrideRecord) {
    if record.rate_was_forced && rates_differ(media.playback_rate(), record.saved_rate) {
        match media.set_playback_rate(record.saved_rate) {
            Ok(()) => log_info!("restored playback rate {}", record.saved_rate),
            Err(err) => log_debug!("playback rate restore skipped: {err}"),
        }
    }

    if record.mute_was_forced && media.muted() && !record.saved_muted {
        match media.set_muted(false) {
            Ok(()) => log_info!("restored audio"),
            Err(err) => log_debug!("unmute skipped: {err}"),
        }
    }
}
