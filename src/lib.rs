// This is free and unencumbered software released into the public domain.

//! Adapts a drone's vendor video pipeline into a WebRTC-style capturer.
//!
//! The vendor SDK pieces (product registry, video feeds, previewer/decoder,
//! air-link key-value store, calibration factory) are consumed through the
//! traits in [`shared`]; this crate owns only the decisions made on
//! top of them: which encoder profile and crop rectangle to configure, which
//! calibration data source to hand the decoder, which video feed to follow
//! on dual-link hardware, and how decoded buffers become timestamped frames.

#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod trace;

pub mod cli;
pub mod shared;
