// This is free and unencumbered software released into the public domain.

mod adapter;
pub use adapter::*;

mod calibration;
pub use calibration::*;

mod capturer;
pub use capturer::*;

mod config;
pub use config::*;

mod content;
pub use content::*;

mod driver;
pub use driver::*;

mod error;
pub use error::*;

mod frame;
pub use frame::*;

mod identity;
pub use identity::*;

mod link;
pub use link::*;

mod profile;
pub use profile::*;

mod relay;
pub use relay::*;

mod worker;
