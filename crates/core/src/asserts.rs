//! Assertions which are enabled depending on the configured level. The level is raised when the
//! crate is compiled for tests or with the `debug-checks` feature.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const PROPCORE_ASSERT_LEVEL_DEFINITION: u8 = PROPCORE_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const PROPCORE_ASSERT_LEVEL_DEFINITION: u8 = PROPCORE_ASSERT_ADVANCED;

pub const PROPCORE_ASSERT_SIMPLE: u8 = 1;
pub const PROPCORE_ASSERT_MODERATE: u8 = 2;
pub const PROPCORE_ASSERT_ADVANCED: u8 = 3;
pub const PROPCORE_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! propcore_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PROPCORE_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PROPCORE_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! propcore_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PROPCORE_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PROPCORE_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! propcore_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::PROPCORE_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PROPCORE_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! propcore_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::PROPCORE_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PROPCORE_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! propcore_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::PROPCORE_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PROPCORE_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
