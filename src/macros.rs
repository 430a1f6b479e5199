//===========================================================================//

macro_rules! invalid_data {
    ($e:expr) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidData,
            $e,
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidData,
            format!($fmt, $($arg)+),
        ))
    };
}

macro_rules! invalid_input {
    ($e:expr) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidInput,
            $e,
        ))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err(::std::io::Error::new(
            ::std::io::ErrorKind::InvalidInput,
            format!($fmt, $($arg)+),
        ))
    };
}

// Like `invalid_input!`, but for the size-list checks that run before any
// rasterization, which report through `IcoError` rather than `io::Error`.
macro_rules! invalid_sizes {
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::IcoError::InvalidInput(
            format!($fmt, $($arg)+),
        ))
    };
}

//===========================================================================//
