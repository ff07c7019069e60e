// Stdout carries the encoded bytes, so everything here goes to stderr.

// PIPELINE LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_pipeline")]
macro_rules! pipeline_log {
    ($($arg:tt)*) => {
        colour::e_dark_yellow_ln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_pipeline"))]
macro_rules! pipeline_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// EXPORT LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_exports")]
macro_rules! export_log {
    ($($arg:tt)*) => {
        colour::e_magenta_ln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_exports"))]
macro_rules! export_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// MEMORY LOGGING MACROS
#[macro_export]
#[cfg(feature = "show_memory")]
macro_rules! memory_log {
    ($($arg:tt)*) => {
        colour::e_yellow_ln!($($arg)*);
    };
}

#[macro_export]
#[cfg(not(feature = "show_memory"))]
macro_rules! memory_log {
    ($($arg:tt)*) => {
        // Nothing
    };
}

// Extra timer logging
#[macro_export]
#[cfg(feature = "detailed_timers")]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        colour::e_dark_yellow_ln!("{}{:?}", $msg, $time.elapsed());
    };
}

#[macro_export]
#[cfg(not(feature = "detailed_timers"))]
macro_rules! timer_log {
    ($time:expr, $msg:expr) => {
        // Nothing
    };
}
