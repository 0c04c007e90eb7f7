// This is free and unencumbered software released into the public domain.

//! Calibration helper and data-source selection for cameras that need
//! decode-time image correction.

use crate::shared::{
    CalibrationDelegate, CalibrationFactory, CameraMode, HelperKind, HelperOptions,
    VendorHandle, names,
};
use alloc::borrow::Cow;
use derive_more::Display;
use std::sync::{Arc, Mutex, MutexGuard};

/// Vendor data-source variant holding a camera's correction parameters.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    #[display("generic")]
    Generic,
    #[display("mavic2-zoom")]
    Mavic2Zoom,
    #[display("mavic2-pro")]
    Mavic2Pro,
}

impl dogma::Named for DataSourceKind {
    fn name(&self) -> Cow<'_, str> {
        self.to_string().into()
    }
}

const DATA_SOURCE_TABLE: &[(&str, DataSourceKind)] = &[
    (names::MAVIC_2_ZOOM, DataSourceKind::Mavic2Zoom),
    (names::MAVIC_2_PRO, DataSourceKind::Mavic2Pro),
];

impl DataSourceKind {
    /// Unmapped cameras fall back to the generic data source.
    pub fn for_camera(camera: &str) -> Self {
        DATA_SOURCE_TABLE
            .iter()
            .find(|(name, _)| *name == camera)
            .map_or(Self::Generic, |(_, kind)| *kind)
    }
}

pub fn requires_calibration(camera: Option<&str>) -> bool {
    camera.is_some_and(|c| DATA_SOURCE_TABLE.iter().any(|(name, _)| *name == c))
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct DataSourceKey {
    camera: String,
    kind: DataSourceKind,
    work_mode: CameraMode,
}

#[derive(Debug)]
struct CachedDataSource {
    key: DataSourceKey,
    handle: VendorHandle,
}

pub struct CalibrationSelector {
    factory: Arc<dyn CalibrationFactory>,
    camera_name: Option<String>,
    needed: bool,
    stand_alone: bool,
    work_mode: CameraMode,
    helper: Option<VendorHandle>,
    data_source: Option<CachedDataSource>,
}

impl core::fmt::Debug for CalibrationSelector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CalibrationSelector")
            .field("camera_name", &self.camera_name)
            .field("needed", &self.needed)
            .field("stand_alone", &self.stand_alone)
            .field("work_mode", &self.work_mode)
            .field("data_source", &self.data_source)
            .finish()
    }
}

impl CalibrationSelector {
    pub fn new(factory: Arc<dyn CalibrationFactory>) -> Self {
        Self {
            factory,
            camera_name: None,
            needed: false,
            stand_alone: false,
            work_mode: CameraMode::Unknown,
            helper: None,
            data_source: None,
        }
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera_name.as_deref()
    }

    /// Returns `false` without touching any state when the name is unchanged.
    pub fn set_camera_name(&mut self, name: Option<String>) -> bool {
        if name == self.camera_name {
            return false;
        }
        self.needed = requires_calibration(name.as_deref());
        self.stand_alone = false;
        self.camera_name = name;
        true
    }

    pub fn work_mode(&self) -> CameraMode {
        self.work_mode
    }

    pub fn set_work_mode(&mut self, mode: CameraMode) {
        self.work_mode = mode;
    }

    pub fn is_needed(&self) -> bool {
        self.needed
    }

    pub fn is_stand_alone(&self) -> bool {
        self.stand_alone
    }

    pub fn set_stand_alone(&mut self, stand_alone: bool) {
        self.stand_alone = stand_alone;
    }

    pub fn should_create_helper(&self) -> bool {
        self.needed
    }

    /// Builds a helper even when calibration is not needed, but only hands
    /// it out when it is.
    pub fn create_helper(&mut self) -> Option<VendorHandle> {
        let kind = if self.stand_alone {
            HelperKind::StandAlone
        } else {
            HelperKind::Standard
        };
        let helper = self.factory.create_helper(kind, HelperOptions::default());
        self.helper = Some(helper.clone());
        self.needed.then_some(helper)
    }

    pub fn destroy_helper(&mut self) {
        self.data_source = None;
        self.helper = None;
    }

    pub fn helper(&self) -> Option<&VendorHandle> {
        self.helper.as_ref()
    }

    pub fn data_source(&mut self) -> Option<VendorHandle> {
        let camera = self.camera_name.as_deref()?;
        let key = DataSourceKey {
            camera: camera.to_string(),
            kind: DataSourceKind::for_camera(camera),
            work_mode: self.work_mode,
        };

        if let Some(cached) = &self.data_source {
            if cached.key == key {
                return Some(cached.handle.clone());
            }
        }

        debug!(
            "creating {} calibration data source for {} in {} mode",
            key.kind, key.camera, key.work_mode
        );
        let handle = self.factory.create_data_source(key.kind, key.work_mode);
        self.data_source = Some(CachedDataSource {
            key,
            handle: handle.clone(),
        });
        Some(handle)
    }
}

/// A [`CalibrationSelector`] shared between the poll loop and the previewer.
#[derive(Debug)]
pub struct SharedCalibration(Mutex<CalibrationSelector>);

impl SharedCalibration {
    pub fn new(selector: CalibrationSelector) -> Self {
        Self(Mutex::new(selector))
    }

    pub fn lock(&self) -> MutexGuard<'_, CalibrationSelector> {
        self.0.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl CalibrationDelegate for SharedCalibration {
    fn should_create_helper(&self) -> bool {
        self.lock().should_create_helper()
    }

    fn helper_created(&self) -> Option<VendorHandle> {
        self.lock().create_helper()
    }

    fn destroy_helper(&self) {
        self.lock().destroy_helper()
    }

    fn calibrate_data_source(&self) -> Option<VendorHandle> {
        self.lock().data_source()
    }
}
