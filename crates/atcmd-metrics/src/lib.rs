//! Metrics recorded by the AT command engine.
//!
//! The engine calls the recording functions below at fixed points of a
//! command's life: resolution, dispatch, each emitted frame, and channel
//! allocation. They go through the `metrics` facade and do nothing until the
//! host installs a recorder.
//!
//! ```rust
//! use atcmd_metrics::{names, record_dispatch};
//!
//! // A failed exec of `SUM` bumps both dispatch counters.
//! record_dispatch("SUM", "exec", Some(2));
//! assert_eq!(names::COMMANDS_FAILED, "atcmd.commands.failed");
//! ```

pub use metrics;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metric names.
pub mod names {
    pub const COMMANDS_DISPATCHED: &str = "atcmd.commands.dispatched";
    pub const COMMANDS_FAILED: &str = "atcmd.commands.failed";
    pub const COMMANDS_UNKNOWN: &str = "atcmd.commands.unknown";
    pub const RESPONSE_BYTES: &str = "atcmd.responses.bytes";
    pub const RESPONSES_TRUNCATED: &str = "atcmd.responses.truncated";
    pub const CHANNELS_ALLOCATED: &str = "atcmd.channels.allocated";

    pub const ALL: &[&str] = &[
        COMMANDS_DISPATCHED,
        COMMANDS_FAILED,
        COMMANDS_UNKNOWN,
        RESPONSE_BYTES,
        RESPONSES_TRUNCATED,
        CHANNELS_ALLOCATED,
    ];
}

/// A command was resolved and its handler ran.
///
/// `kind` is the command type (`test`, `query`, `exec`). `failed_code` is the
/// wire status code when the command did not end with `OK`.
pub fn record_dispatch(command: &str, kind: &'static str, failed_code: Option<u8>) {
    counter!(
        names::COMMANDS_DISPATCHED,
        "command" => command.to_string(),
        "type" => kind
    )
    .increment(1);
    if let Some(code) = failed_code {
        counter!(
            names::COMMANDS_FAILED,
            "command" => command.to_string(),
            "code" => code.to_string()
        )
        .increment(1);
    }
}

/// Input carried a header but named no registered command.
pub fn record_unknown_command() {
    counter!(names::COMMANDS_UNKNOWN).increment(1);
}

/// One response frame of `len` bytes went out on `channel`.
pub fn record_frame(channel: u8, len: usize, truncated: bool) {
    let channel = channel.to_string();
    histogram!(names::RESPONSE_BYTES, "channel" => channel.clone()).record(len as f64);
    if truncated {
        counter!(names::RESPONSES_TRUNCATED, "channel" => channel).increment(1);
    }
}

/// Current number of allocated channels.
pub fn record_channels_allocated(count: usize) {
    gauge!(names::CHANNELS_ALLOCATED).set(count as f64);
}

/// Describe all engine metrics. Call once at startup, after installing a
/// recorder.
pub fn describe_metrics() {
    describe_counter!(
        names::COMMANDS_DISPATCHED,
        Unit::Count,
        "Commands resolved and dispatched, by command type"
    );
    describe_counter!(
        names::COMMANDS_FAILED,
        Unit::Count,
        "Dispatched commands that completed with an error status"
    );
    describe_counter!(
        names::COMMANDS_UNKNOWN,
        Unit::Count,
        "Inputs that did not resolve to a registered command"
    );
    describe_histogram!(
        names::RESPONSE_BYTES,
        Unit::Bytes,
        "Size of each emitted response frame"
    );
    describe_counter!(
        names::RESPONSES_TRUNCATED,
        Unit::Count,
        "Response frames clamped to the response buffer capacity"
    );
    describe_gauge!(
        names::CHANNELS_ALLOCATED,
        Unit::Count,
        "Channels allocated from the channel pool"
    );
}
