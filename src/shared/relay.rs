// This is free and unencumbered software released into the public domain.

use crate::shared::{Frame, FrameSink, PixelBuffer};
use std::{
    sync::OnceLock,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// How frame timestamps are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimestampMode {
    /// Nanoseconds on a monotonic clock, counted from the first read in this process.
    #[default]
    Monotonic,
    /// The nanosecond-of-second component of the wall clock (0..1_000_000_000).
    /// Wraps every second and may go backwards; kept for consumers that expect
    /// the legacy capturer's values.
    WallClockNanosOfSecond,
}

impl TimestampMode {
    pub fn now_ns(self) -> i64 {
        match self {
            Self::Monotonic => monotonic_ns(),
            Self::WallClockNanosOfSecond => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| i64::from(d.subsec_nanos()))
                .unwrap_or(0),
        }
    }
}

fn monotonic_ns() -> i64 {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let elapsed = EPOCH.get_or_init(Instant::now).elapsed();
    i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
}

/// Stamps decoded buffers and forwards them to the capturer sink.
///
/// Stateless apart from the sink: nothing is buffered and a missing sink
/// simply drops the frame.
#[derive(Clone)]
pub struct FrameRelay {
    sink: Option<FrameSink>,
    timestamp_mode: TimestampMode,
}

impl core::fmt::Debug for FrameRelay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameRelay")
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field("timestamp_mode", &self.timestamp_mode)
            .finish()
    }
}

impl FrameRelay {
    pub fn new(sink: Option<FrameSink>, timestamp_mode: TimestampMode) -> Self {
        Self {
            sink,
            timestamp_mode,
        }
    }

    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    pub fn on_decoded_buffer(&self, buffer: PixelBuffer) -> Frame {
        let frame = Frame::new(buffer, self.timestamp_mode.now_ns());
        match &self.sink {
            Some(sink) => sink(frame.clone()),
            None => debug!("no capturer sink, dropping frame {}", frame.timestamp_ns),
        }
        frame
    }
}
