//! Diagnostic output.
//!
//! `diag!(level, ...)` forwards to the `log` facade when the `diagnostics`
//! feature is on. Without it the arguments are type-checked but never
//! evaluated, so timing is identical to a build with no tracing at all.

#[cfg(feature = "diagnostics")]
macro_rules! diag {
    ($lvl:ident, $($arg:tt)+) => {
        log::$lvl!($($arg)+)
    };
}

#[cfg(not(feature = "diagnostics"))]
macro_rules! diag {
    ($lvl:ident, $($arg:tt)+) => {
        if false {
            $crate::diag::sink(core::format_args!($($arg)+));
        }
    };
}

#[cfg(not(feature = "diagnostics"))]
#[doc(hidden)]
#[inline(always)]
pub fn sink(_args: core::fmt::Arguments<'_>) {}
