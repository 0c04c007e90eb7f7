// This is free and unencumbered software released into the public domain.

use bytes::Bytes;
use derive_more::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Nv12,
    I420,
    Bgra8,
}

/// A decoded picture as handed over by the previewer's frame-processing hook.
///
/// The pixel data is reference counted; cloning a buffer never copies pixels.
#[derive(Clone, Debug)]
pub struct PixelBuffer {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pixel_format: PixelFormat,
}

impl PixelBuffer {
    pub fn new(
        data: impl Into<Bytes>,
        width: u32,
        height: u32,
        stride: u32,
        pixel_format: PixelFormat,
    ) -> Self {
        Self {
            data: data.into(),
            width,
            height,
            stride,
            pixel_format,
        }
    }

    pub fn new_nv12(data: impl Into<Bytes>, width: u32, height: u32) -> Self {
        Self::new(data, width, height, width, PixelFormat::Nv12)
    }
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum FrameRotation {
    #[default]
    #[display("0")]
    Deg0,
    #[display("90")]
    Deg90,
    #[display("180")]
    Deg180,
    #[display("270")]
    Deg270,
}

impl FrameRotation {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// A frame ready for the RTC capturer sink.
#[derive(Clone, Debug)]
pub struct Frame {
    pub buffer: PixelBuffer,
    pub timestamp_ns: i64,
    pub rotation: FrameRotation,
}

impl Frame {
    pub fn new(buffer: PixelBuffer, timestamp_ns: i64) -> Self {
        Self {
            buffer,
            timestamp_ns,
            rotation: FrameRotation::Deg0,
        }
    }

    pub fn with_rotation(mut self, rotation: FrameRotation) -> Self {
        self.rotation = rotation;
        self
    }
}
