// This is free and unencumbered software released into the public domain.

use crate::shared::{
    CameraMode, CapturerConfig, DroneError, DroneEvent, DroneResult, DroneSdk, Frame,
    FrameSink, PixelBuffer, VideoPreviewerAdapter, needs_fit_frame_width, report_event,
    worker::Worker,
};
use core::ops::ControlFlow;
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    mpsc::{Receiver, SyncSender, sync_channel},
};

type AdapterSlot = Arc<Mutex<Option<VideoPreviewerAdapter>>>;

fn lock(slot: &AdapterSlot) -> MutexGuard<'_, Option<VideoPreviewerAdapter>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything needed to bring an adapter up once a camera shows up.
#[derive(Clone)]
struct Attacher {
    sdk: DroneSdk,
    config: CapturerConfig,
    sink: Option<FrameSink>,
    events_tx: SyncSender<DroneEvent>,
    slot: AdapterSlot,
}

impl Attacher {
    /// `Ok(false)` while there is no camera to capture from.
    fn try_attach(&self) -> DroneResult<bool> {
        let Some(product) = self.sdk.registry.current_product() else {
            return Ok(false);
        };
        let Some(camera) = product.camera() else {
            return Ok(false);
        };

        if let Err(err) = self.sdk.registry.set_camera_mode(CameraMode::ShootPhoto) {
            warn!("could not switch {} to photo mode: {}", camera.display_name, err);
            report_event(&self.events_tx, DroneEvent::Warning(err.to_string()));
        }

        let mut adapter = VideoPreviewerAdapter::new(
            self.sdk.clone(),
            self.config.clone(),
            self.sink.clone(),
            self.events_tx.clone(),
        );
        adapter.start()?;
        if needs_fit_frame_width(Some(&camera.display_name)) {
            adapter.enable_frame_control();
        }

        info!("capturing from {}", camera.display_name);
        *lock(&self.slot) = Some(adapter);
        Ok(true)
    }
}

/// The RTC-facing video capturer for a drone camera.
pub struct DroneCapturer {
    attacher: Attacher,
    bootstrap: Option<Worker>,
    events_rx: Receiver<DroneEvent>,
}

impl core::fmt::Debug for DroneCapturer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DroneCapturer")
            .field("config", &self.attacher.config)
            .field("bootstrapping", &self.bootstrap.is_some())
            .field("capturing", &self.is_capturing())
            .finish()
    }
}

impl DroneCapturer {
    pub fn new(
        sdk: DroneSdk,
        config: CapturerConfig,
        sink: Option<FrameSink>,
    ) -> DroneResult<Self> {
        config.validate()?;
        let (events_tx, events_rx) = sync_channel(config.event_capacity);
        Ok(Self {
            attacher: Attacher {
                sdk,
                config,
                sink,
                events_tx,
                slot: Arc::new(Mutex::new(None)),
            },
            bootstrap: None,
            events_rx,
        })
    }

    pub fn config(&self) -> &CapturerConfig {
        &self.attacher.config
    }

    pub fn events(&self) -> &Receiver<DroneEvent> {
        &self.events_rx
    }

    /// Starts capturing, retrying every `bootstrap_interval` in the background
    /// until the product reports a camera.
    pub fn start_capture(&mut self) -> DroneResult<()> {
        if self.bootstrap.is_some() || self.is_capturing() {
            return Err(DroneError::AlreadyStarted);
        }
        info!("drone capturer starting");

        if self.attacher.try_attach()? {
            return Ok(());
        }

        debug!("no camera available yet, waiting");
        let attacher = self.attacher.clone();
        let worker = Worker::spawn(
            "drone-bootstrap",
            self.attacher.config.bootstrap_interval,
            move || match attacher.try_attach() {
                Ok(true) => ControlFlow::Break(()),
                Ok(false) => ControlFlow::Continue(()),
                Err(err) => {
                    warn!("could not start the video adapter: {}", err);
                    report_event(&attacher.events_tx, DroneEvent::Warning(err.to_string()));
                    ControlFlow::Continue(())
                },
            },
        )?;
        self.bootstrap = Some(worker);
        Ok(())
    }

    /// Cancels a pending bootstrap and tears the adapter down synchronously.
    pub fn stop_capture(&mut self) -> DroneResult<()> {
        if let Some(mut worker) = self.bootstrap.take() {
            worker.stop();
        }
        let adapter = lock(&self.attacher.slot).take();
        if let Some(mut adapter) = adapter {
            adapter.stop()?;
            info!("drone capturer stopped");
        }
        Ok(())
    }

    pub fn is_capturing(&self) -> bool {
        lock(&self.attacher.slot).is_some()
    }

    /// Runs `f` against the live adapter, if capture has started.
    pub fn with_adapter<R>(&self, f: impl FnOnce(&VideoPreviewerAdapter) -> R) -> Option<R> {
        lock(&self.attacher.slot).as_ref().map(f)
    }

    pub fn process_frame(&self, buffer: PixelBuffer) -> Option<Frame> {
        self.with_adapter(|adapter| adapter.process_frame(buffer))
            .flatten()
    }
}

impl Drop for DroneCapturer {
    fn drop(&mut self) {
        let _ = self.stop_capture();
    }
}
