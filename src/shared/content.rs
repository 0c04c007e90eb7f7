// This is free and unencumbered software released into the public domain.

//! Content clip rectangle and stream rotation rules.

use crate::shared::{
    CameraMode, CameraOrientation, DeviceIdentity, PhotoAspectRatio, PhysicalSource,
    StreamRotation, names,
};

/// Normalised sub-rectangle of the decoded frame, all components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ContentRect {
    fn default() -> Self {
        Self::FULL
    }
}

impl ContentRect {
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The largest `size`-shaped rectangle centred inside `frame`, normalised to it.
    pub fn aspect_fit(frame: (f64, f64), size: (f64, f64)) -> Self {
        let (fw, fh) = frame;
        let (sw, sh) = size;
        if fw <= 0.0 || fh <= 0.0 || sw <= 0.0 || sh <= 0.0 {
            return Self::FULL;
        }
        // the limiting axis spans the frame exactly
        if fw / sw <= fh / sh {
            let height = (sh * fw / sw / fh).min(1.0);
            Self::new(0.0, (1.0 - height) / 2.0, 1.0, height)
        } else {
            let width = (sw * fh / sh / fw).min(1.0);
            Self::new((1.0 - width) / 2.0, 0.0, width, 1.0)
        }
    }
}

/// Matrice 100 with an XT has 8 useless pixels on either side.
const M100_XT_RECT: ContentRect = ContentRect::new(0.010869565217391, 0.0, 0.978260869565217, 1.0);

/// Decoded stream shape all fit calculations are relative to.
const STREAM_SIZE: (f64, f64) = (16.0, 9.0);

const FIT_TO_RATIO_CAMERAS: &[&str] = &[
    names::X3,
    names::X5,
    names::X5R,
    names::PHANTOM_3_PROFESSIONAL,
    names::PHANTOM_4,
    names::MAVIC_PRO,
];

pub fn needs_fit_to_ratio(camera: Option<&str>) -> bool {
    camera.is_some_and(|c| FIT_TO_RATIO_CAMERAS.contains(&c))
}

/// Whether the decoder has to fit the frame width (Mavic 2 cameras).
pub fn needs_fit_frame_width(camera: Option<&str>) -> bool {
    matches!(camera, Some(names::MAVIC_2_ZOOM | names::MAVIC_2_PRO))
}

/// Computes the clip rect for the current state. `None` leaves whatever the
/// previewer has configured untouched.
pub fn content_rect(
    identity: &DeviceIdentity,
    source: PhysicalSource,
    mode: CameraMode,
    ratio: PhotoAspectRatio,
) -> Option<ContentRect> {
    if source == PhysicalSource::FpvCamera {
        return Some(ContentRect::FULL);
    }

    if identity.camera_name() == Some(names::XT) {
        return (identity.product_model == names::MATRICE_100).then_some(M100_XT_RECT);
    }

    if mode != CameraMode::ShootPhoto {
        return Some(ContentRect::FULL);
    }

    if !needs_fit_to_ratio(identity.camera_name()) || ratio == PhotoAspectRatio::Unknown {
        return Some(ContentRect::FULL);
    }

    let size = match ratio {
        PhotoAspectRatio::Ratio3x2 => (3.0, 2.0),
        PhotoAspectRatio::Ratio4x3 => (4.0, 3.0),
        _ => STREAM_SIZE,
    };
    Some(ContentRect::aspect_fit(STREAM_SIZE, size))
}

/// The Mavic Pro camera can be mounted in portrait; nothing else rotates.
pub fn stream_rotation(
    camera: &str,
    orientation: Option<CameraOrientation>,
) -> Option<StreamRotation> {
    if camera != names::MAVIC_PRO {
        return None;
    }
    orientation.map(|o| match o {
        CameraOrientation::Landscape => StreamRotation::Default,
        CameraOrientation::Portrait => StreamRotation::Cw90,
    })
}
