// This is free and unencumbered software released into the public domain.

// Crate-internal logging macros. With the `tracing` feature they forward to
// `asimov_module::tracing`; without it the arguments are type-checked and
// discarded.

cfg_if::cfg_if! {
    if #[cfg(feature = "tracing")] {
        macro_rules! debug {
            ($($arg:tt)*) => {
                asimov_module::tracing::debug!(target: "asimov_drone_module", $($arg)*)
            };
        }

        macro_rules! info {
            ($($arg:tt)*) => {
                asimov_module::tracing::info!(target: "asimov_drone_module", $($arg)*)
            };
        }

        macro_rules! warn {
            ($($arg:tt)*) => {
                asimov_module::tracing::warn!(target: "asimov_drone_module", $($arg)*)
            };
        }
    } else {
        macro_rules! debug {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }

        macro_rules! info {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }

        macro_rules! warn {
            ($($arg:tt)*) => {{
                let _ = format_args!($($arg)*);
            }};
        }
    }
}
