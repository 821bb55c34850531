//! Logging macros
//!
//! Forward to `defmt` when the `defmt` feature is enabled, otherwise to the
//! `log` facade when `log` is enabled. With neither, the macros expand to
//! nothing beyond borrowing their arguments.
//!
//! Format strings must stay within the subset both backends accept: `{}`
//! placeholders over integers, booleans and `&str`.

#[cfg(feature = "defmt")]
#[doc(hidden)]
#[macro_export]
macro_rules! __fcs_log {
    ($level:ident, $($arg:tt)+) => {
        $crate::__private::defmt::$level!($($arg)+)
    };
}

#[cfg(all(feature = "log", not(feature = "defmt")))]
#[doc(hidden)]
#[macro_export]
macro_rules! __fcs_log {
    ($level:ident, $($arg:tt)+) => {
        $crate::__private::log::$level!($($arg)+)
    };
}

#[cfg(not(any(feature = "defmt", feature = "log")))]
#[doc(hidden)]
#[macro_export]
macro_rules! __fcs_log {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        $( let _ = &$arg; )*
    }};
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__fcs_log!(error, $($arg)+) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__fcs_log!(warn, $($arg)+) };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__fcs_log!(info, $($arg)+) };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__fcs_log!(debug, $($arg)+) };
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__fcs_log!(trace, $($arg)+) };
}
