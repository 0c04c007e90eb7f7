// This is free and unencumbered software released into the public domain.

use crate::shared::{
    AirLinkKey, CalibrationDelegate, CalibrationSelector, CameraMode, CapturerConfig,
    ContentRect, DecodingAssistInfo, DeviceIdentity, DroneError, DroneEvent, DroneResult,
    DroneSdk, EncoderProfile, FeedEvent, FeedId, FeedListener, Frame, FrameControl,
    FrameProcessor, FrameRelay, FrameSink, LinkBandwidthState, LinkSwapTracker, ListenerToken,
    PhotoAspectRatio, PhysicalSource, PixelBuffer, SharedCalibration, StreamRotation,
    TelemetryValue, content_rect, needs_fit_frame_width, report_drop, report_event,
    select_profile, stream_rotation, worker::Worker,
};
use core::ops::ControlFlow;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, TryLockError, Weak,
    atomic::{AtomicBool, Ordering},
    mpsc::SyncSender,
};

#[derive(Debug, Default)]
struct AdapterState {
    identity: Option<DeviceIdentity>,
    camera_mode: CameraMode,
    photo_ratio: PhotoAspectRatio,
    profile: EncoderProfile,
    link: LinkSwapTracker,
}

impl AdapterState {
    fn identity_or_default(&self) -> DeviceIdentity {
        self.identity.clone().unwrap_or_default()
    }
}

struct AdapterInner {
    weak_self: Weak<AdapterInner>,
    sdk: DroneSdk,
    config: CapturerConfig,
    token: ListenerToken,
    calibration: Arc<SharedCalibration>,
    relay: FrameRelay,
    state: Mutex<AdapterState>,
    /// Mirrors `state.link.active_feed()` for the lock-free data path.
    primary_active: AtomicBool,
    /// Held for writing across a feed swap; frame delivery holds it for reading.
    delivery_gate: RwLock<()>,
    running: AtomicBool,
    events_tx: SyncSender<DroneEvent>,
}

/// Glues the product registry, the active video feed and the previewer
/// together, and relays decoded frames to the capturer sink.
pub struct VideoPreviewerAdapter {
    inner: Arc<AdapterInner>,
    ticker: Option<Worker>,
}

impl core::fmt::Debug for VideoPreviewerAdapter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VideoPreviewerAdapter")
            .field("config", &self.inner.config)
            .field("token", &self.inner.token)
            .field("running", &self.is_running())
            .field("active_feed", &self.active_feed())
            .finish()
    }
}

impl VideoPreviewerAdapter {
    pub fn new(
        sdk: DroneSdk,
        config: CapturerConfig,
        sink: Option<FrameSink>,
        events_tx: SyncSender<DroneEvent>,
    ) -> Self {
        let calibration = Arc::new(SharedCalibration::new(CalibrationSelector::new(
            Arc::clone(&sdk.calibration),
        )));
        let relay = FrameRelay::new(sink, config.timestamp_mode);
        let inner = Arc::new_cyclic(|weak_self| AdapterInner {
            weak_self: weak_self.clone(),
            sdk,
            config,
            token: ListenerToken::next(),
            calibration,
            relay,
            state: Mutex::new(AdapterState::default()),
            primary_active: AtomicBool::new(true),
            delivery_gate: RwLock::new(()),
            running: AtomicBool::new(false),
            events_tx,
        });
        Self {
            inner,
            ticker: None,
        }
    }

    pub fn start(&mut self) -> DroneResult<()> {
        let inner = &self.inner;
        if inner.running.swap(true, Ordering::AcqRel) {
            return Err(DroneError::AlreadyStarted);
        }

        let weak = Arc::downgrade(inner);
        let ticker = Worker::spawn("drone-poll", inner.config.poll_interval, move || {
            match weak.upgrade() {
                Some(inner) => {
                    inner.update_info();
                    ControlFlow::Continue(())
                },
                None => ControlFlow::Break(()),
            }
        });
        match ticker {
            Ok(t) => self.ticker = Some(t),
            Err(err) => {
                inner.running.store(false, Ordering::Release);
                return Err(err);
            },
        }

        let previewer = &inner.sdk.previewer;
        let delegate: Arc<dyn CalibrationDelegate> = inner.calibration.clone();
        previewer.set_calibration_delegate(Some(delegate));

        inner
            .sdk
            .feeder
            .add_listener(inner.active_feed(), inner.token, inner.feed_listener());

        if inner.config.lightbridge2 {
            inner.listen_to_lightbridge2();
        }

        previewer.set_hardware_decode(inner.config.hardware_decode);
        previewer.set_fast_upload(inner.config.fast_upload);
        previewer.register_frame_processor(Some(self.frame_processor()));
        previewer.start();

        info!("video previewer adapter started");
        report_event(&inner.events_tx, DroneEvent::Started);
        Ok(())
    }

    /// Stops polling and drops every registration before returning.
    pub fn stop(&mut self) -> DroneResult<()> {
        let inner = &self.inner;
        if !inner.running.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }

        if inner.config.lightbridge2 {
            inner.sdk.key_values.unsubscribe_all(inner.token);
        }

        {
            let state = inner.lock_state();
            inner
                .sdk
                .feeder
                .remove_listener(state.link.active_feed(), inner.token);
        }

        let previewer = &inner.sdk.previewer;
        previewer.register_frame_processor(None);
        previewer.set_frame_control(None);
        previewer.set_calibration_delegate(None);

        info!("video previewer adapter stopped");
        report_event(&inner.events_tx, DroneEvent::Stopped);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    /// Runs one poll of the product state right away.
    pub fn refresh(&self) {
        self.inner.update_info();
    }

    /// Installs this adapter as the previewer's frame-control handler (Mavic 2).
    pub fn enable_frame_control(&self) {
        let handler: Arc<dyn FrameControl> = self.inner.clone();
        self.inner.sdk.previewer.set_frame_control(Some(handler));
    }

    pub fn frame_processor(&self) -> FrameProcessor {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move |buffer: PixelBuffer| {
            if let Some(inner) = weak.upgrade() {
                inner.process_frame(buffer);
            }
        })
    }

    pub fn process_frame(&self, buffer: PixelBuffer) -> Option<Frame> {
        self.inner.process_frame(buffer)
    }

    pub fn active_feed(&self) -> FeedId {
        self.inner.active_feed()
    }

    pub fn encoder_profile(&self) -> EncoderProfile {
        self.inner.lock_state().profile
    }

    pub fn link_state(&self) -> LinkBandwidthState {
        *self.inner.lock_state().link.state()
    }

    pub fn calibration(&self) -> &Arc<SharedCalibration> {
        &self.inner.calibration
    }
}

impl Drop for VideoPreviewerAdapter {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

impl AdapterInner {
    fn lock_state(&self) -> MutexGuard<'_, AdapterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active_feed(&self) -> FeedId {
        if self.primary_active.load(Ordering::Acquire) {
            FeedId::Primary
        } else {
            FeedId::Secondary
        }
    }

    fn feed_listener(&self) -> FeedListener {
        let weak = self.weak_self.clone();
        Arc::new(move |feed: FeedId, event: FeedEvent| {
            if let Some(inner) = weak.upgrade() {
                inner.on_feed_event(feed, event);
            }
        })
    }

    fn update_info(&self) {
        let Some(product) = self.sdk.registry.current_product() else {
            self.reset_previewer();
            return;
        };
        let Some(identity) = DeviceIdentity::from_product(&product) else {
            self.reset_previewer();
            return;
        };

        let source = self.sdk.feeder.physical_source(self.active_feed());
        let mut state = self.lock_state();
        state.identity = Some(identity);
        self.update_encoder_profile(&mut state, source);

        let Some(camera) = product.camera() else {
            return;
        };
        // a missing mode or ratio keeps the last known one
        if let Some(mode) = camera.mode {
            state.camera_mode = mode;
        }
        if let Some(ratio) = camera.photo_aspect_ratio {
            state.photo_ratio = ratio;
        }
        self.update_content_rect(&state, source);

        {
            let mut calibration = self.calibration.lock();
            calibration.set_work_mode(state.camera_mode);
            if calibration.set_camera_name(Some(camera.display_name.clone())) {
                debug!("calibration camera set to {}", camera.display_name);
            }
        }

        if let Some(rotation) = stream_rotation(&camera.display_name, camera.orientation) {
            self.sdk.previewer.set_rotation(rotation);
        }
    }

    fn reset_previewer(&self) {
        let mut state = self.lock_state();
        state.identity = None;
        let previewer = &self.sdk.previewer;
        previewer.set_encoder_profile(EncoderProfile::Unknown);
        previewer.set_rotation(StreamRotation::Default);
        previewer.set_content_clip_rect(ContentRect::FULL);
        self.note_profile(&mut state, EncoderProfile::Unknown);
    }

    fn update_encoder_profile(&self, state: &mut AdapterState, source: PhysicalSource) {
        let profile = select_profile(&state.identity_or_default(), source);
        self.sdk.previewer.set_encoder_profile(profile);
        self.note_profile(state, profile);
    }

    fn note_profile(&self, state: &mut AdapterState, profile: EncoderProfile) {
        if state.profile == profile {
            return;
        }
        info!("encoder profile changed from {} to {}", state.profile, profile);
        report_event(
            &self.events_tx,
            DroneEvent::ProfileChanged {
                from: state.profile,
                to: profile,
            },
        );
        state.profile = profile;
    }

    fn update_content_rect(&self, state: &AdapterState, source: PhysicalSource) {
        let identity = state.identity_or_default();
        let Some(rect) = content_rect(&identity, source, state.camera_mode, state.photo_ratio)
        else {
            return;
        };
        let previewer = &self.sdk.previewer;
        if previewer.content_clip_rect() != rect {
            debug!("content clip rect set to {:?}", rect);
            previewer.set_content_clip_rect(rect);
            report_event(&self.events_tx, DroneEvent::ContentRectChanged(rect));
        }
    }

    fn on_feed_event(&self, feed: FeedId, event: FeedEvent) {
        match event {
            FeedEvent::VideoData(data) => {
                let Some(_delivery) = self.enter_delivery() else {
                    debug!("feed swap in progress, dropping {} feed data", feed);
                    return;
                };
                if feed != self.active_feed() {
                    warn!("dropping video data from the inactive {} feed", feed);
                    return;
                }
                self.sdk.previewer.push(&data);
            },
            _ if feed != self.active_feed() => {},
            FeedEvent::PhysicalSourceChanged(PhysicalSource::Unknown) => {
                warn!("{} video feed disconnected", feed);
                report_event(&self.events_tx, DroneEvent::FeedDisconnected(feed));
            },
            FeedEvent::PhysicalSourceChanged(source) => {
                let mut state = self.lock_state();
                self.update_encoder_profile(&mut state, source);
                self.update_content_rect(&state, source);
            },
        }
    }

    fn listen_to_lightbridge2(&self) {
        let store = &self.sdk.key_values;
        let mut initial = Vec::with_capacity(AirLinkKey::ALL.len());
        for key in AirLinkKey::ALL {
            let weak = self.weak_self.clone();
            store.subscribe(
                self.token,
                key,
                Arc::new(move |value: Option<TelemetryValue>| {
                    if let Some(inner) = weak.upgrade() {
                        inner.on_link_value(key, value);
                    }
                }),
            );
            initial.push((key, store.get_value(key)));
        }

        let mut state = self.lock_state();
        for (key, value) in &initial {
            state.link.record(*key, value.as_ref());
        }
        if state.link.evaluate().is_some() {
            self.swap_video_feed(&mut state.link);
        }
    }

    fn on_link_value(&self, key: AirLinkKey, value: Option<TelemetryValue>) {
        let mut state = self.lock_state();
        if !self.running.load(Ordering::Acquire) {
            return;
        }
        if state.link.apply(key, value.as_ref()).is_some() {
            self.swap_video_feed(&mut state.link);
        }
    }

    /// Moves the subscription to the other feed with the previewer paused.
    /// Frame delivery is shut out for the whole swap.
    fn swap_video_feed(&self, link: &mut LinkSwapTracker) {
        let _gate = self
            .delivery_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let previewer = &self.sdk.previewer;
        previewer.pause();
        let _resume = scopeguard::guard((), |()| previewer.resume());

        let from = link.active_feed();
        let to = from.other();
        self.sdk.feeder.remove_listener(from, self.token);
        link.set_active_feed(to);
        self.primary_active
            .store(to == FeedId::Primary, Ordering::Release);
        self.sdk
            .feeder
            .add_listener(to, self.token, self.feed_listener());

        info!("video feed swapped from {} to {}", from, to);
        report_event(&self.events_tx, DroneEvent::FeedSwapped { from, to });
    }

    fn process_frame(&self, buffer: PixelBuffer) -> Option<Frame> {
        if !self.running.load(Ordering::Acquire) {
            report_drop(&self.events_tx);
            return None;
        }
        let Some(_delivery) = self.enter_delivery() else {
            debug!("feed swap in progress, dropping frame");
            report_drop(&self.events_tx);
            return None;
        };
        Some(self.relay.on_decoded_buffer(buffer))
    }

    /// `None` while a feed swap holds the gate.
    fn enter_delivery(&self) -> Option<RwLockReadGuard<'_, ()>> {
        match self.delivery_gate.try_read() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }
}

impl FrameControl for AdapterInner {
    fn parse_decoding_assist_info(&self, data: &[u8]) -> Option<DecodingAssistInfo> {
        self.sdk
            .feeder
            .parse_decoding_assist_info(self.active_feed(), data)
    }

    fn decoding_did_succeed(&self, timestamp: u32) {
        self.sdk
            .feeder
            .decoding_did_succeed(self.active_feed(), timestamp);
    }

    fn needs_fit_frame_width(&self) -> bool {
        let product = self.sdk.registry.current_product();
        let camera = product.as_ref().and_then(|p| p.camera());
        needs_fit_frame_width(camera.map(|c| c.display_name.as_str()))
    }

    fn sync_decoder_status(&self, is_normal: bool) {
        self.sdk
            .feeder
            .sync_decoder_status(self.active_feed(), is_normal);
    }

    fn decoding_did_fail(&self) {
        self.sdk.feeder.decoding_did_fail(self.active_feed());
    }
}
