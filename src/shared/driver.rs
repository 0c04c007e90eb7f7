// This is free and unencumbered software released into the public domain.

//! Interfaces of the vendor collaborators the capturer drives.
//!
//! Callbacks handed to a collaborator (feed listeners, key listeners, the frame
//! processor) must be invoked outside of the registering call, the way the
//! vendor SDK dispatches them; the adapter may hold its own locks while it
//! registers or unregisters them.

use crate::shared::{
    AirLinkKey, CameraMode, ContentRect, DataSourceKind, DroneError, DroneResult,
    EncoderProfile, FeedId, Frame, PhysicalSource, PixelBuffer, ProductInfo, StreamRotation,
    TelemetryValue,
};
use bytes::Bytes;
use std::{
    any::Any,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::SyncSender,
    },
};

/// Receives finished frames; this is the RTC capturer delegate.
pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync + 'static>;

/// Receives decoded buffers from the previewer's frame-processing hook.
pub type FrameProcessor = Arc<dyn Fn(PixelBuffer) + Send + Sync + 'static>;

pub type FeedListener = Arc<dyn Fn(FeedId, FeedEvent) + Send + Sync + 'static>;

pub type KeyListener = Arc<dyn Fn(Option<TelemetryValue>) + Send + Sync + 'static>;

#[derive(Clone, Debug)]
pub enum FeedEvent {
    VideoData(Bytes),
    PhysicalSourceChanged(PhysicalSource),
}

/// Identifies one registrant across `add`/`remove` and `subscribe`/`unsubscribe_all`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerToken(u64);

impl ListenerToken {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Opaque, reference counted vendor object.
#[derive(Clone)]
pub struct VendorHandle(Arc<dyn Any + Send + Sync>);

impl VendorHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl core::fmt::Debug for VendorHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("VendorHandle(<opaque>)")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodingAssistInfo {
    pub timestamp: u32,
    pub payload: Bytes,
}

pub trait ProductRegistry: Send + Sync {
    fn current_product(&self) -> Option<ProductInfo>;

    fn set_camera_mode(&self, _mode: CameraMode) -> DroneResult<()> {
        Err(DroneError::unsupported("camera mode switching"))
    }
}

pub trait VideoFeeder: Send + Sync {
    fn add_listener(&self, feed: FeedId, token: ListenerToken, listener: FeedListener);
    fn remove_listener(&self, feed: FeedId, token: ListenerToken);
    fn physical_source(&self, feed: FeedId) -> PhysicalSource;

    fn parse_decoding_assist_info(
        &self,
        _feed: FeedId,
        _data: &[u8],
    ) -> Option<DecodingAssistInfo> {
        None
    }
    fn decoding_did_succeed(&self, _feed: FeedId, _timestamp: u32) {}
    fn sync_decoder_status(&self, _feed: FeedId, _is_normal: bool) {}
    fn decoding_did_fail(&self, _feed: FeedId) {}
}

/// Decoder-side hooks the previewer calls on Mavic 2 streams.
pub trait FrameControl: Send + Sync {
    fn parse_decoding_assist_info(&self, data: &[u8]) -> Option<DecodingAssistInfo>;
    fn decoding_did_succeed(&self, timestamp: u32);
    fn needs_fit_frame_width(&self) -> bool;
    fn sync_decoder_status(&self, is_normal: bool);
    fn decoding_did_fail(&self);
}

/// What the previewer asks when it sets up image calibration.
pub trait CalibrationDelegate: Send + Sync {
    fn should_create_helper(&self) -> bool;
    fn helper_created(&self) -> Option<VendorHandle>;
    fn destroy_helper(&self);
    fn calibrate_data_source(&self) -> Option<VendorHandle>;
}

/// The hardware decoder/previewer. Configuration setters are applied to the
/// next decoded frame.
pub trait Previewer: Send + Sync {
    fn set_encoder_profile(&self, profile: EncoderProfile);
    fn set_rotation(&self, rotation: StreamRotation);
    fn content_clip_rect(&self) -> ContentRect;
    fn set_content_clip_rect(&self, rect: ContentRect);
    fn set_hardware_decode(&self, enabled: bool);
    fn set_fast_upload(&self, enabled: bool);
    fn register_frame_processor(&self, processor: Option<FrameProcessor>);
    fn set_calibration_delegate(&self, delegate: Option<Arc<dyn CalibrationDelegate>>);
    fn set_frame_control(&self, handler: Option<Arc<dyn FrameControl>>);
    fn push(&self, data: &[u8]);
    fn start(&self);
    fn pause(&self);
    fn resume(&self);
}

/// The air-link key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get_value(&self, key: AirLinkKey) -> Option<TelemetryValue>;
    fn subscribe(&self, token: ListenerToken, key: AirLinkKey, on_change: KeyListener);
    fn unsubscribe_all(&self, token: ListenerToken);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelperKind {
    Standard,
    /// The vendor helper spawns its own decode thread.
    StandAlone,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HelperOptions {
    pub calibrate_thread: bool,
    pub render_thread: bool,
}

pub trait CalibrationFactory: Send + Sync {
    fn create_helper(&self, kind: HelperKind, options: HelperOptions) -> VendorHandle;
    fn create_data_source(&self, kind: DataSourceKind, work_mode: CameraMode) -> VendorHandle;
}

/// Everything the capturer needs from the vendor SDK.
#[derive(Clone)]
pub struct DroneSdk {
    pub registry: Arc<dyn ProductRegistry>,
    pub feeder: Arc<dyn VideoFeeder>,
    pub previewer: Arc<dyn Previewer>,
    pub key_values: Arc<dyn KeyValueStore>,
    pub calibration: Arc<dyn CalibrationFactory>,
}

#[derive(Debug)]
pub enum DroneEvent {
    Started,
    Stopped,
    ProfileChanged {
        from: EncoderProfile,
        to: EncoderProfile,
    },
    ContentRectChanged(ContentRect),
    FeedSwapped {
        from: FeedId,
        to: FeedId,
    },
    FeedDisconnected(FeedId),
    FrameDropped,
    Warning(String),
}

pub fn report_event(events_tx: &SyncSender<DroneEvent>, event: DroneEvent) {
    let _ = events_tx.try_send(event);
}

pub fn report_drop(events_tx: &SyncSender<DroneEvent>) {
    report_event(events_tx, DroneEvent::FrameDropped);
}
