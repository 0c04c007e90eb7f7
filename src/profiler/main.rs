// This is free and unencumbered software released into the public domain.

#[cfg(not(feature = "std"))]
compile_error!("asimov-drone-profiler requires the 'std' feature");

use asimov_drone_module::{
    cli,
    shared::{
        CameraMode, ContentRect, DeviceIdentity, DroneError, EncoderProfile, PhotoAspectRatio,
        PhysicalSource, content_rect, is_using_lightbridge2, needs_fit_frame_width,
        requires_calibration, select_profile,
    },
};
use asimov_module::SysexitsError::{self, *};
use clap::Parser;
use clientele::StandardOptions;
use serde_json::json;
use std::error::Error as StdError;

/// Shows the decoder configuration the capturer would select for a device.
#[derive(Debug, Parser)]
struct Options {
    #[clap(flatten)]
    flags: StandardOptions,

    /// Product model name, e.g. "Matrice 600"
    #[arg(long, default_value = "Unknown Aircraft")]
    product: String,

    /// Camera display name, e.g. "Zenmuse X3"; omit for no camera
    #[arg(long)]
    camera: Option<String>,

    /// The product is a handheld rather than an aircraft
    #[arg(long)]
    handheld: bool,

    #[arg(long)]
    digital_zoom: bool,

    #[arg(long)]
    wifi_link: bool,

    /// The active feed carries the FPV camera
    #[arg(long)]
    fpv: bool,

    #[arg(long, value_enum, default_value = "photo")]
    mode: ModeArg,

    #[arg(long, value_enum, default_value = "unknown")]
    ratio: RatioArg,

    #[arg(
        value_name = "FORMAT",
        short = 'o',
        long = "output",
        value_enum,
        default_value = "text"
    )]
    output: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum ModeArg {
    Photo,
    Video,
    Unknown,
}

impl From<ModeArg> for CameraMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Photo => CameraMode::ShootPhoto,
            ModeArg::Video => CameraMode::RecordVideo,
            ModeArg::Unknown => CameraMode::Unknown,
        }
    }
}

#[derive(Debug, Clone, clap::ValueEnum)]
enum RatioArg {
    #[value(name = "4:3")]
    FourThree,
    #[value(name = "16:9")]
    SixteenNine,
    #[value(name = "3:2")]
    ThreeTwo,
    Unknown,
}

impl From<RatioArg> for PhotoAspectRatio {
    fn from(ratio: RatioArg) -> Self {
        match ratio {
            RatioArg::FourThree => PhotoAspectRatio::Ratio4x3,
            RatioArg::SixteenNine => PhotoAspectRatio::Ratio16x9,
            RatioArg::ThreeTwo => PhotoAspectRatio::Ratio3x2,
            RatioArg::Unknown => PhotoAspectRatio::Unknown,
        }
    }
}

pub fn main() -> Result<SysexitsError, Box<dyn StdError>> {
    asimov_module::dotenv().ok();
    let args = asimov_module::args_os()?;
    let options = Options::parse_from(args);

    if options.flags.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(EX_OK);
    }

    if options.flags.license {
        print!("{}", include_str!("../../UNLICENSE"));
        return Ok(EX_OK);
    }

    #[cfg(feature = "tracing")]
    asimov_module::init_tracing_subscriber(&options.flags).expect("failed to initialize logging");

    let exit_code = match run_profiler(&options) {
        Ok(()) => EX_OK,
        Err(err) => cli::handle_error(&err, &options.flags),
    };

    Ok(exit_code)
}

/// What the capturer would configure for one device.
#[derive(Debug, Clone, PartialEq)]
struct Report {
    product: String,
    camera: Option<String>,
    profile: EncoderProfile,
    lightbridge2: bool,
    clip: Option<ContentRect>,
    fit_frame_width: bool,
    calibration: bool,
}

impl Report {
    fn to_json(&self) -> serde_json::Value {
        let clip = self.clip.map(|r| json!([r.x, r.y, r.width, r.height]));
        json!({
            "product": self.product,
            "camera": self.camera,
            "encoder": self.profile.to_string(),
            "lightbridge2": self.lightbridge2,
            "clip": clip,
            "fitFrameWidth": self.fit_frame_width,
            "calibration": self.calibration,
        })
    }

    fn print_text(&self) {
        println!("encoder: {}", self.profile);
        println!("lightbridge2: {}", self.lightbridge2);
        match &self.clip {
            Some(r) => println!("clip: {}", format_rect(r)),
            None => println!("clip: unchanged"),
        }
        println!("fit-frame-width: {}", self.fit_frame_width);
        println!("calibration: {}", self.calibration);
    }
}

fn build_report(options: &Options) -> Result<Report, DroneError> {
    let product = options.product.trim();
    if product.is_empty() {
        return Err(DroneError::invalid_config("product model must not be empty"));
    }

    let mut identity = DeviceIdentity::new(product)
        .with_aircraft(!options.handheld)
        .with_digital_zoom(options.digital_zoom)
        .with_wifi_link(options.wifi_link && !options.handheld);
    identity.camera_name = options.camera.clone();

    // only a Lightbridge 2 link has anything to decode without a camera
    let lightbridge2 = is_using_lightbridge2(&identity);
    if identity.camera_name.is_none() && !lightbridge2 {
        return Err(DroneError::NoCamera);
    }

    let source = if options.fpv {
        PhysicalSource::FpvCamera
    } else {
        PhysicalSource::MainCamera
    };
    let mode = CameraMode::from(options.mode.clone());
    let ratio = PhotoAspectRatio::from(options.ratio.clone());
    let camera = identity.camera_name();

    Ok(Report {
        product: product.to_string(),
        camera: camera.map(str::to_string),
        profile: select_profile(&identity, source),
        lightbridge2,
        clip: content_rect(&identity, source, mode, ratio),
        fit_frame_width: needs_fit_frame_width(camera),
        calibration: requires_calibration(camera),
    })
}

fn run_profiler(options: &Options) -> Result<(), DroneError> {
    let report = build_report(options)?;
    let camera = report.camera.as_deref();

    if report.profile == EncoderProfile::Unknown {
        cli::warn_user(
            &options.flags,
            &format!(
                "no encoder profile known for {}",
                camera.unwrap_or(report.product.as_str())
            ),
        );
    }

    cli::info_user(
        &options.flags,
        &format!("profiling {} with {}", report.product, camera.unwrap_or("no camera")),
    );

    match options.output {
        OutputFormat::Text => report.print_text(),
        OutputFormat::Jsonl => println!("{}", report.to_json()),
    }

    Ok(())
}

fn format_rect(r: &ContentRect) -> String {
    format!("{:.6},{:.6} {:.6}x{:.6}", r.x, r.y, r.width, r.height)
}
