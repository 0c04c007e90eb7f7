// This is free and unencumbered software released into the public domain.

//! Camera model to encoder profile classification.

use crate::shared::{DeviceIdentity, PhysicalSource, names};
use alloc::borrow::Cow;
use derive_more::Display;

/// The hardware encoder variant that produced the incoming bitstream.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum EncoderProfile {
    #[default]
    #[display("unknown")]
    Unknown,
    #[display("GD600")]
    Gd600,
    #[display("A9_phantom3c")]
    A9Phantom3c,
    #[display("A9_phantom3s")]
    A9Phantom3s,
    #[display("DM365_phantom3x")]
    Dm365Phantom3x,
    #[display("DM368_inspire")]
    Dm368Inspire,
    #[display("A9_OSMO_NO_368")]
    A9OsmoNo368,
    #[display("LightBridge2")]
    LightBridge2,
    #[display("1860_phantom4x")]
    Phantom4x1860,
    #[display("1860_Inspire2_FPV")]
    Inspire2Fpv1860,
    #[display("H1_Inspire2")]
    H1Inspire2,
    #[display("MavicAir")]
    MavicAir,
}

impl dogma::Named for EncoderProfile {
    fn name(&self) -> Cow<'_, str> {
        self.to_string().into()
    }
}

/// Cameras whose profile depends only on their display name.
const ENCODER_TABLE: &[(&str, EncoderProfile)] = &[
    (names::Z3, EncoderProfile::A9OsmoNo368),
    (names::X5, EncoderProfile::Dm368Inspire),
    (names::X5R, EncoderProfile::Dm368Inspire),
    (names::PHANTOM_3_PROFESSIONAL, EncoderProfile::Dm365Phantom3x),
    (names::PHANTOM_3_ADVANCED, EncoderProfile::A9Phantom3s),
    (names::PHANTOM_3_STANDARD, EncoderProfile::A9Phantom3c),
    (names::PHANTOM_4, EncoderProfile::Phantom4x1860),
    (names::SPARK, EncoderProfile::Phantom4x1860),
    (names::Z30, EncoderProfile::Gd600),
    (names::PHANTOM_4_PRO, EncoderProfile::H1Inspire2),
    (names::PHANTOM_4_ADVANCED, EncoderProfile::H1Inspire2),
    (names::X5S, EncoderProfile::H1Inspire2),
    (names::X4S, EncoderProfile::H1Inspire2),
    (names::X7, EncoderProfile::H1Inspire2),
    (names::PAYLOAD, EncoderProfile::H1Inspire2),
    (names::MAVIC_AIR, EncoderProfile::MavicAir),
];

const LIGHTBRIDGE2_PRODUCTS: &[&str] = &[
    names::A3,
    names::N3,
    names::MATRICE_600,
    names::MATRICE_600_PRO,
];

/// Whether the video arrives over a legacy Lightbridge 2 link.
pub fn is_using_lightbridge2(identity: &DeviceIdentity) -> bool {
    if !identity.is_aircraft {
        return false;
    }
    let model = identity.product_model.as_str();
    if LIGHTBRIDGE2_PRODUCTS.contains(&model) {
        return true;
    }
    // a stand-alone Lightbridge 2 shows up as an unknown aircraft without camera
    model == names::UNKNOWN_AIRCRAFT && identity.camera_name.is_none()
}

/// Maps the device identity to its encoder profile. Total: anything not in
/// the table is [`EncoderProfile::Unknown`].
pub fn classify(identity: &DeviceIdentity) -> EncoderProfile {
    if is_using_lightbridge2(identity) {
        return EncoderProfile::LightBridge2;
    }

    let Some(camera) = identity.camera_name() else {
        return EncoderProfile::Unknown;
    };

    match camera {
        // Osmo firmware switched encoders in the same release that added
        // digital zoom to the X3.
        names::X3 if !identity.is_aircraft && identity.digital_zoom_supported => {
            EncoderProfile::A9OsmoNo368
        },
        names::X3 => EncoderProfile::Dm368Inspire,
        names::MAVIC_PRO if identity.has_wifi_link => EncoderProfile::Phantom4x1860,
        names::MAVIC_PRO => EncoderProfile::Unknown,
        _ => lookup(camera),
    }
}

/// Like [`classify`], but an FPV physical source wins over everything else.
pub fn select_profile(identity: &DeviceIdentity, source: PhysicalSource) -> EncoderProfile {
    if source == PhysicalSource::FpvCamera {
        return EncoderProfile::Inspire2Fpv1860;
    }
    classify(identity)
}

fn lookup(camera: &str) -> EncoderProfile {
    ENCODER_TABLE
        .iter()
        .find(|(name, _)| *name == camera)
        .map(|(_, profile)| *profile)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn aircraft(model: &str, camera: &str) -> DeviceIdentity {
        DeviceIdentity::new(model)
            .with_camera(camera)
            .with_aircraft(true)
    }

    #[test]
    fn table_entries_classify_as_documented() {
        for (camera, expected) in ENCODER_TABLE {
            assert_eq!(classify(&aircraft("Inspire 2", camera)), *expected, "{camera}");
        }
    }

    #[test]
    fn unmapped_camera_is_unknown() {
        let identity = aircraft("Inspire 2", "Totally New Camera");
        assert_eq!(classify(&identity), EncoderProfile::Unknown);
    }

    #[test]
    fn no_camera_is_unknown_off_lightbridge() {
        let identity = DeviceIdentity::new("Inspire 2").with_aircraft(true);
        assert_eq!(classify(&identity), EncoderProfile::Unknown);
    }

    #[test]
    fn lightbridge2_products_override_the_camera() {
        for model in LIGHTBRIDGE2_PRODUCTS {
            let identity = aircraft(model, names::X5S);
            assert_eq!(classify(&identity), EncoderProfile::LightBridge2);
        }
        let m600 = DeviceIdentity::new(names::MATRICE_600).with_aircraft(true);
        assert_eq!(classify(&m600), EncoderProfile::LightBridge2);
    }

    #[test]
    fn standalone_lightbridge2_needs_no_camera() {
        let bare = DeviceIdentity::new(names::UNKNOWN_AIRCRAFT).with_aircraft(true);
        assert!(is_using_lightbridge2(&bare));

        let with_camera = aircraft(names::UNKNOWN_AIRCRAFT, names::X3);
        assert!(!is_using_lightbridge2(&with_camera));
    }

    #[test]
    fn lightbridge2_is_aircraft_only() {
        let identity = DeviceIdentity::new(names::MATRICE_600).with_aircraft(false);
        assert!(!is_using_lightbridge2(&identity));
    }

    #[test]
    fn x3_depends_on_digital_zoom_and_aircraft() {
        let osmo = DeviceIdentity::new("Osmo")
            .with_camera(names::X3)
            .with_digital_zoom(true);
        assert_eq!(classify(&osmo), EncoderProfile::A9OsmoNo368);

        let old_osmo = osmo.clone().with_digital_zoom(false);
        assert_eq!(classify(&old_osmo), EncoderProfile::Dm368Inspire);

        let inspire = osmo.with_aircraft(true);
        assert_eq!(classify(&inspire), EncoderProfile::Dm368Inspire);
    }

    #[test]
    fn mavic_pro_needs_a_wifi_link() {
        let identity = aircraft("Mavic Pro", names::MAVIC_PRO);
        assert_eq!(classify(&identity), EncoderProfile::Unknown);
        assert_eq!(
            classify(&identity.with_wifi_link(true)),
            EncoderProfile::Phantom4x1860
        );
    }

    #[test]
    fn fpv_source_wins() {
        let identity = aircraft(names::MATRICE_600, names::X5S);
        assert_eq!(
            select_profile(&identity, PhysicalSource::FpvCamera),
            EncoderProfile::Inspire2Fpv1860
        );
        assert_eq!(
            select_profile(&identity, PhysicalSource::MainCamera),
            EncoderProfile::LightBridge2
        );
    }

    proptest! {
        #[test]
        fn classification_is_total_and_stable(
            model in ".{0,24}",
            camera in proptest::option::of(".{0,24}"),
            is_aircraft: bool,
            zoom: bool,
            wifi: bool,
        ) {
            let mut identity = DeviceIdentity::new(model)
                .with_aircraft(is_aircraft)
                .with_digital_zoom(zoom)
                .with_wifi_link(wifi);
            identity.camera_name = camera;
            prop_assert_eq!(classify(&identity), classify(&identity.clone()));
        }

        #[test]
        fn unmapped_cameras_are_unknown(
            model in "[A-Za-z0-9 ]{0,24}",
            camera in "[A-Za-z0-9 ]{0,24}",
            is_aircraft: bool,
            zoom: bool,
            wifi: bool,
        ) {
            let name = camera.as_str();
            prop_assume!(!ENCODER_TABLE.iter().any(|(known, _)| *known == name));
            prop_assume!(name != names::X3 && name != names::MAVIC_PRO);

            let identity = DeviceIdentity::new(model)
                .with_camera(camera.clone())
                .with_aircraft(is_aircraft)
                .with_digital_zoom(zoom)
                .with_wifi_link(wifi);
            prop_assume!(!is_using_lightbridge2(&identity));
            prop_assert_eq!(classify(&identity), EncoderProfile::Unknown);
        }

        #[test]
        fn table_cameras_ignore_the_flags(
            index in 0..ENCODER_TABLE.len(),
            model in "[a-z0-9 ]{1,24}",
            is_aircraft: bool,
            zoom: bool,
            wifi: bool,
        ) {
            let (camera, expected) = ENCODER_TABLE[index];
            let identity = DeviceIdentity::new(model)
                .with_camera(camera)
                .with_aircraft(is_aircraft)
                .with_digital_zoom(zoom)
                .with_wifi_link(wifi);
            prop_assert_eq!(classify(&identity), expected);
        }
    }
}
