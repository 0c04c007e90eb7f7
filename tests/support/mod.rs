// This is free and unencumbered software released into the public domain.

//! In-memory stand-ins for the vendor SDK, recording what the adapter asks of them.

#![allow(dead_code)]

use asimov_drone_module::shared::{
    AirLinkKey, CalibrationDelegate, CalibrationFactory, CameraMode, ContentRect, DataSourceKind,
    DroneError, DroneEvent, DroneResult, DroneSdk, EncoderProfile, FeedEvent, FeedId,
    FeedListener, Frame, FrameControl, FrameProcessor, FrameSink, HelperKind, HelperOptions,
    KeyListener, KeyValueStore, ListenerToken, PhysicalSource, PixelBuffer, Previewer,
    ProductInfo, ProductRegistry, StreamRotation, TelemetryValue, VendorHandle, VideoFeeder,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
        mpsc::Receiver,
    },
    time::{Duration, Instant},
};

#[derive(Default)]
pub struct FakeRegistry {
    product: Mutex<Option<ProductInfo>>,
    modes: Mutex<Vec<CameraMode>>,
    reject_mode: bool,
}

impl FakeRegistry {
    pub fn rejecting_mode_changes() -> Self {
        Self {
            reject_mode: true,
            ..Self::default()
        }
    }

    pub fn set_product(&self, product: Option<ProductInfo>) {
        *self.product.lock().unwrap() = product;
    }

    pub fn modes(&self) -> Vec<CameraMode> {
        self.modes.lock().unwrap().clone()
    }
}

impl ProductRegistry for FakeRegistry {
    fn current_product(&self) -> Option<ProductInfo> {
        self.product.lock().unwrap().clone()
    }

    fn set_camera_mode(&self, mode: CameraMode) -> DroneResult<()> {
        if self.reject_mode {
            return Err(DroneError::unsupported("camera busy"));
        }
        self.modes.lock().unwrap().push(mode);
        Ok(())
    }
}

/// Ordered record of feeder and previewer calls, shared between the two fakes.
pub type Journal = Arc<Mutex<Vec<Call>>>;

#[derive(Default)]
pub struct FakeFeeder {
    journal: Journal,
    listeners: Mutex<HashMap<(FeedId, ListenerToken), FeedListener>>,
    sources: Mutex<HashMap<FeedId, PhysicalSource>>,
    failures: AtomicUsize,
}

impl FakeFeeder {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Self::default()
        }
    }

    pub fn set_source(&self, feed: FeedId, source: PhysicalSource) {
        self.sources.lock().unwrap().insert(feed, source);
    }

    pub fn listeners(&self, feed: FeedId) -> Vec<FeedListener> {
        self.listeners
            .lock()
            .unwrap()
            .iter()
            .filter(|((f, _), _)| *f == feed)
            .map(|(_, l)| Arc::clone(l))
            .collect()
    }

    pub fn listener_count(&self, feed: FeedId) -> usize {
        self.listeners(feed).len()
    }

    /// Dispatches `event` to everyone subscribed to `feed`, outside the lock.
    pub fn deliver(&self, feed: FeedId, event: FeedEvent) {
        for listener in self.listeners(feed) {
            listener(feed, event.clone());
        }
    }

    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

impl VideoFeeder for FakeFeeder {
    fn add_listener(&self, feed: FeedId, token: ListenerToken, listener: FeedListener) {
        self.journal.lock().unwrap().push(Call::AddListener(feed));
        self.listeners.lock().unwrap().insert((feed, token), listener);
    }

    fn remove_listener(&self, feed: FeedId, token: ListenerToken) {
        self.journal.lock().unwrap().push(Call::RemoveListener(feed));
        self.listeners.lock().unwrap().remove(&(feed, token));
    }

    fn physical_source(&self, feed: FeedId) -> PhysicalSource {
        self.sources
            .lock()
            .unwrap()
            .get(&feed)
            .copied()
            .unwrap_or(PhysicalSource::MainCamera)
    }

    fn decoding_did_fail(&self, _feed: FeedId) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Profile(EncoderProfile),
    Rotation(StreamRotation),
    ClipRect(ContentRect),
    HardwareDecode(bool),
    FastUpload(bool),
    Push(usize),
    Start,
    Pause,
    Resume,
    AddListener(FeedId),
    RemoveListener(FeedId),
}

type Hook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
pub struct FakePreviewer {
    calls: Journal,
    rect: Mutex<ContentRect>,
    processor: Mutex<Option<FrameProcessor>>,
    delegate: Mutex<Option<Arc<dyn CalibrationDelegate>>>,
    frame_control: Mutex<Option<Arc<dyn FrameControl>>>,
    on_pause: Mutex<Option<Hook>>,
}

impl FakePreviewer {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            calls: journal,
            ..Self::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Everything recorded so far, feeder calls included.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn last_profile(&self) -> Option<EncoderProfile> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::Profile(p) => Some(p),
            _ => None,
        })
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn clip_rect(&self) -> ContentRect {
        *self.rect.lock().unwrap()
    }

    pub fn has_processor(&self) -> bool {
        self.processor.lock().unwrap().is_some()
    }

    pub fn delegate(&self) -> Option<Arc<dyn CalibrationDelegate>> {
        self.delegate.lock().unwrap().clone()
    }

    pub fn frame_control(&self) -> Option<Arc<dyn FrameControl>> {
        self.frame_control.lock().unwrap().clone()
    }

    /// Runs `hook` every time the previewer is paused.
    pub fn on_pause(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_pause.lock().unwrap() = Some(Arc::new(hook));
    }

    /// Hands a decoded buffer to the registered frame processor, if any.
    pub fn decode(&self, buffer: PixelBuffer) -> bool {
        let processor = self.processor.lock().unwrap().clone();
        match processor {
            Some(p) => {
                p(buffer);
                true
            },
            None => false,
        }
    }
}

impl Previewer for FakePreviewer {
    fn set_encoder_profile(&self, profile: EncoderProfile) {
        self.record(Call::Profile(profile));
    }

    fn set_rotation(&self, rotation: StreamRotation) {
        self.record(Call::Rotation(rotation));
    }

    fn content_clip_rect(&self) -> ContentRect {
        self.clip_rect()
    }

    fn set_content_clip_rect(&self, rect: ContentRect) {
        *self.rect.lock().unwrap() = rect;
        self.record(Call::ClipRect(rect));
    }

    fn set_hardware_decode(&self, enabled: bool) {
        self.record(Call::HardwareDecode(enabled));
    }

    fn set_fast_upload(&self, enabled: bool) {
        self.record(Call::FastUpload(enabled));
    }

    fn register_frame_processor(&self, processor: Option<FrameProcessor>) {
        *self.processor.lock().unwrap() = processor;
    }

    fn set_calibration_delegate(&self, delegate: Option<Arc<dyn CalibrationDelegate>>) {
        *self.delegate.lock().unwrap() = delegate;
    }

    fn set_frame_control(&self, handler: Option<Arc<dyn FrameControl>>) {
        *self.frame_control.lock().unwrap() = handler;
    }

    fn push(&self, data: &[u8]) {
        self.record(Call::Push(data.len()));
    }

    fn start(&self) {
        self.record(Call::Start);
    }

    fn pause(&self) {
        self.record(Call::Pause);
        let hook = self.on_pause.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook();
        }
    }

    fn resume(&self) {
        self.record(Call::Resume);
    }
}

#[derive(Default)]
pub struct FakeStore {
    values: Mutex<HashMap<AirLinkKey, TelemetryValue>>,
    subscriptions: Mutex<Vec<(ListenerToken, AirLinkKey, KeyListener)>>,
}

impl FakeStore {
    /// Sets the value `get_value` reports, without notifying anyone.
    pub fn preset(&self, key: AirLinkKey, value: TelemetryValue) {
        self.values.lock().unwrap().insert(key, value);
    }

    /// Updates `key` and notifies its subscribers, outside the lock.
    pub fn push(&self, key: AirLinkKey, value: Option<TelemetryValue>) {
        {
            let mut values = self.values.lock().unwrap();
            match &value {
                Some(v) => values.insert(key, v.clone()),
                None => values.remove(&key),
            };
        }
        let listeners: Vec<KeyListener> = self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k, _)| *k == key)
            .map(|(_, _, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(value.clone());
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().unwrap().len()
    }
}

impl KeyValueStore for FakeStore {
    fn get_value(&self, key: AirLinkKey) -> Option<TelemetryValue> {
        self.values.lock().unwrap().get(&key).cloned()
    }

    fn subscribe(&self, token: ListenerToken, key: AirLinkKey, on_change: KeyListener) {
        self.subscriptions
            .lock()
            .unwrap()
            .push((token, key, on_change));
    }

    fn unsubscribe_all(&self, token: ListenerToken) {
        self.subscriptions
            .lock()
            .unwrap()
            .retain(|(t, _, _)| *t != token);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub helpers: AtomicUsize,
    pub data_sources: AtomicUsize,
}

impl CalibrationFactory for FakeFactory {
    fn create_helper(&self, kind: HelperKind, _options: HelperOptions) -> VendorHandle {
        self.helpers.fetch_add(1, Ordering::SeqCst);
        VendorHandle::new(kind)
    }

    fn create_data_source(&self, kind: DataSourceKind, work_mode: CameraMode) -> VendorHandle {
        self.data_sources.fetch_add(1, Ordering::SeqCst);
        VendorHandle::new((kind, work_mode))
    }
}

/// One set of fakes plus the [`DroneSdk`] bundling them. The feeder and the
/// previewer write to the same journal.
pub struct Rig {
    pub registry: Arc<FakeRegistry>,
    pub feeder: Arc<FakeFeeder>,
    pub previewer: Arc<FakePreviewer>,
    pub store: Arc<FakeStore>,
    pub factory: Arc<FakeFactory>,
}

impl Default for Rig {
    fn default() -> Self {
        let journal = Journal::default();
        Self {
            registry: Arc::default(),
            feeder: Arc::new(FakeFeeder::with_journal(Arc::clone(&journal))),
            previewer: Arc::new(FakePreviewer::with_journal(journal)),
            store: Arc::default(),
            factory: Arc::default(),
        }
    }
}

impl Rig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: FakeRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            ..Self::default()
        }
    }

    pub fn sdk(&self) -> DroneSdk {
        DroneSdk {
            registry: self.registry.clone(),
            feeder: self.feeder.clone(),
            previewer: self.previewer.clone(),
            key_values: self.store.clone(),
            calibration: self.factory.clone(),
        }
    }
}

/// A sink that keeps every frame it receives.
pub fn collecting_sink() -> (FrameSink, Arc<Mutex<Vec<Frame>>>) {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let frames2 = Arc::clone(&frames);
    let sink: FrameSink = Arc::new(move |frame: Frame| frames2.lock().unwrap().push(frame));
    (sink, frames)
}

pub fn test_buffer() -> PixelBuffer {
    PixelBuffer::new_nv12(vec![0u8; 6], 2, 2)
}

pub fn drain(events: &Receiver<DroneEvent>) -> Vec<DroneEvent> {
    events.try_iter().collect()
}

/// Polls `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    cond()
}
