macro_rules! log {
    ($($tt:tt)*) => {
        {
            #[cfg(feature = "log")]
            log::error!($($tt)*);
            #[cfg(not(feature = "log"))]
            eprintln!($($tt)*);
        }
    };
}

macro_rules! debug {
    ($($tt:tt)*) => {
        {
            #[cfg(feature = "log")]
            log::debug!($($tt)*);
        }
    };
}

pub(crate) use {debug, log};
