// This is free and unencumbered software released into the public domain.

use derive_more::Display;

/// Product and camera names as reported by the vendor SDK.
pub mod names {
    pub const A3: &str = "A3";
    pub const N3: &str = "N3";
    pub const MATRICE_100: &str = "Matrice 100";
    pub const MATRICE_600: &str = "Matrice 600";
    pub const MATRICE_600_PRO: &str = "Matrice 600 Pro";
    pub const UNKNOWN_AIRCRAFT: &str = "Unknown Aircraft";

    pub const X3: &str = "Zenmuse X3";
    pub const X4S: &str = "Zenmuse X4S";
    pub const X5: &str = "Zenmuse X5";
    pub const X5R: &str = "Zenmuse X5R";
    pub const X5S: &str = "Zenmuse X5S";
    pub const X7: &str = "Zenmuse X7";
    pub const XT: &str = "Zenmuse XT";
    pub const Z3: &str = "Zenmuse Z3";
    pub const Z30: &str = "Zenmuse Z30";
    pub const PAYLOAD: &str = "Payload";
    pub const PHANTOM_3_PROFESSIONAL: &str = "Phantom 3 Professional Camera";
    pub const PHANTOM_3_ADVANCED: &str = "Phantom 3 Advanced Camera";
    pub const PHANTOM_3_STANDARD: &str = "Phantom 3 Standard Camera";
    pub const PHANTOM_4: &str = "Phantom 4 Camera";
    pub const PHANTOM_4_PRO: &str = "Phantom 4 Pro Camera";
    pub const PHANTOM_4_ADVANCED: &str = "Phantom 4 Advanced Camera";
    pub const MAVIC_PRO: &str = "Mavic Pro Camera";
    pub const MAVIC_AIR: &str = "Mavic Air Camera";
    pub const MAVIC_2_ZOOM: &str = "Mavic 2 Zoom Camera";
    pub const MAVIC_2_PRO: &str = "Mavic 2 Pro Camera";
    pub const SPARK: &str = "Spark Camera";
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum CameraMode {
    #[default]
    #[display("unknown")]
    Unknown,
    #[display("shoot-photo")]
    ShootPhoto,
    #[display("record-video")]
    RecordVideo,
    #[display("playback")]
    Playback,
    #[display("media-download")]
    MediaDownload,
    #[display("broadcast")]
    Broadcast,
}

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum PhotoAspectRatio {
    #[default]
    #[display("unknown")]
    Unknown,
    #[display("4:3")]
    Ratio4x3,
    #[display("16:9")]
    Ratio16x9,
    #[display("3:2")]
    Ratio3x2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraOrientation {
    Landscape,
    Portrait,
}

/// Which hardware port or camera a video feed currently carries.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum PhysicalSource {
    #[default]
    Unknown,
    MainCamera,
    FpvCamera,
    LeftCamera,
    RightCamera,
    TopCamera,
    Lb,
    Ext,
    Hdmi,
    Av,
}

/// Rotation the previewer applies to the decoded stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamRotation {
    #[default]
    Default,
    Cw90,
    Cw180,
    Cw270,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductKind {
    Aircraft,
    Handheld,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraInfo {
    pub display_name: String,
    pub mode: Option<CameraMode>,
    pub photo_aspect_ratio: Option<PhotoAspectRatio>,
    pub orientation: Option<CameraOrientation>,
    pub digital_zoom_supported: bool,
}

impl CameraInfo {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            mode: None,
            photo_aspect_ratio: None,
            orientation: None,
            digital_zoom_supported: false,
        }
    }

    pub fn with_mode(mut self, mode: CameraMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_photo_aspect_ratio(mut self, ratio: PhotoAspectRatio) -> Self {
        self.photo_aspect_ratio = Some(ratio);
        self
    }

    pub fn with_orientation(mut self, orientation: CameraOrientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_digital_zoom(mut self, supported: bool) -> Self {
        self.digital_zoom_supported = supported;
        self
    }
}

/// What the product registry reports for the connected product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductInfo {
    pub model: Option<String>,
    pub kind: ProductKind,
    pub has_wifi_link: bool,
    pub camera: Option<CameraInfo>,
}

impl ProductInfo {
    pub fn aircraft(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            kind: ProductKind::Aircraft,
            has_wifi_link: false,
            camera: None,
        }
    }

    pub fn handheld(model: impl Into<String>) -> Self {
        Self {
            kind: ProductKind::Handheld,
            ..Self::aircraft(model)
        }
    }

    pub fn with_camera(mut self, camera: CameraInfo) -> Self {
        self.camera = Some(camera);
        self
    }

    pub fn with_wifi_link(mut self, present: bool) -> Self {
        self.has_wifi_link = present;
        self
    }

    pub fn is_aircraft(&self) -> bool {
        self.kind == ProductKind::Aircraft
    }

    /// The camera usable for video, if any. Only aircraft and handhelds expose one.
    pub fn camera(&self) -> Option<&CameraInfo> {
        match self.kind {
            ProductKind::Aircraft | ProductKind::Handheld => self.camera.as_ref(),
            ProductKind::Other => None,
        }
    }
}

/// Snapshot of the connected device, refreshed on every poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub product_model: String,
    /// `None` means no camera is attached.
    pub camera_name: Option<String>,
    pub is_aircraft: bool,
    pub digital_zoom_supported: bool,
    pub has_wifi_link: bool,
}

impl DeviceIdentity {
    pub fn new(product_model: impl Into<String>) -> Self {
        Self {
            product_model: product_model.into(),
            ..Default::default()
        }
    }

    /// Returns `None` when the registry does not know the product model yet.
    pub fn from_product(product: &ProductInfo) -> Option<Self> {
        let product_model = product.model.clone()?;
        let camera = product.camera();
        Some(Self {
            product_model,
            camera_name: camera.map(|c| c.display_name.clone()),
            is_aircraft: product.is_aircraft(),
            digital_zoom_supported: camera.is_some_and(|c| c.digital_zoom_supported),
            has_wifi_link: product.is_aircraft() && product.has_wifi_link,
        })
    }

    pub fn with_camera(mut self, name: impl Into<String>) -> Self {
        self.camera_name = Some(name.into());
        self
    }

    pub fn with_aircraft(mut self, is_aircraft: bool) -> Self {
        self.is_aircraft = is_aircraft;
        self
    }

    pub fn with_digital_zoom(mut self, supported: bool) -> Self {
        self.digital_zoom_supported = supported;
        self
    }

    pub fn with_wifi_link(mut self, present: bool) -> Self {
        self.has_wifi_link = present;
        self
    }

    pub fn camera_name(&self) -> Option<&str> {
        self.camera_name.as_deref()
    }
}
