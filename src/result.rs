// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Result taxonomy.
//!
//! Every fallible operation returns [Result].  `Ok` is the `Success` code; [Error] carries
//! every other code, including the two informational ones ([Error::Timeout] and
//! [Error::NotReady]) that are not failures as such.

/// The result of an llri operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Every result code except `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, thiserror::Error)]
#[repr(u8)]
pub enum Error {
    /// A wait ran out of time before its condition was met.
    #[error("the operation timed out")]
    Timeout = 1,
    /// The queried object is not ready yet.
    #[error("the object is not ready")]
    NotReady = 2,
    /// An argument violated the operation's valid-usage rules.
    #[error("invalid usage")]
    InvalidUsage = 3,
    /// An object was in the wrong state for the operation.
    #[error("invalid state")]
    InvalidState = 4,
    /// A node mask was malformed or referenced a node the adapter does not have.
    #[error("invalid node mask")]
    InvalidNodeMask = 5,
    /// Objects created for different nodes were combined.
    #[error("incompatible node mask")]
    IncompatibleNodeMask = 6,
    /// A count exceeded a fixed limit.
    #[error("a limit was exceeded")]
    ExceededLimit = 7,
    /// The object is already in use by another operation.
    #[error("the object is occupied")]
    Occupied = 8,
    /// A fence was waited on without having been signaled.
    #[error("the fence is not signaled")]
    NotSignaled = 9,
    /// A fence was submitted while still signaled.
    #[error("the fence is already signaled")]
    AlreadySignaled = 10,
    /// The format does not support the requested use.
    #[error("invalid format")]
    InvalidFormat = 11,
    /// The operation requires an extension that was not enabled.
    #[error("the required extension is not enabled")]
    ExtensionNotEnabled = 12,
    /// The environment does not support the requested feature.
    #[error("feature not supported")]
    FeatureNotSupported = 13,
    /// The environment does not support the requested extension.
    #[error("extension not supported")]
    ExtensionNotSupported = 14,
    /// The installed driver is incompatible.
    #[error("incompatible driver")]
    IncompatibleDriver = 15,
    /// A host allocation failed.
    #[error("out of host memory")]
    OutOfHostMemory = 16,
    /// A device allocation failed.
    #[error("out of device memory")]
    OutOfDeviceMemory = 17,
    /// Backend initialization failed.
    #[error("initialization failed")]
    InitializationFailed = 18,
    /// The device stopped responding.
    #[error("the device hung")]
    DeviceHung = 19,
    /// The device was lost.  The device and every child object are unusable.
    #[error("the device was lost")]
    DeviceLost = 20,
    /// The device was physically removed.
    #[error("the device was removed")]
    DeviceRemoved = 21,
    /// The driver failed internally.
    #[error("driver failure")]
    DriverFailure = 22,
    /// A backend result with no translation.
    #[error("unknown error")]
    Unknown = 23,
}

/// The group an [Error] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Not a failure: [Error::Timeout], [Error::NotReady].
    Informational,
    /// The caller broke a valid-usage rule.  Produced by the validation layer.
    Validation,
    /// The environment lacks something the caller asked for.
    Environment,
    /// Resource exhaustion or failed initialization.  Retrying may succeed.
    Transient,
    /// The device and all its children are invalid.  Re-enumerate adapters and recreate.
    Fatal,
    /// [Error::Unknown].
    Unknown,
}

impl Error {
    /// Every code, in declaration order.
    pub const ALL: [Error; 23] = [
        Error::Timeout,
        Error::NotReady,
        Error::InvalidUsage,
        Error::InvalidState,
        Error::InvalidNodeMask,
        Error::IncompatibleNodeMask,
        Error::ExceededLimit,
        Error::Occupied,
        Error::NotSignaled,
        Error::AlreadySignaled,
        Error::InvalidFormat,
        Error::ExtensionNotEnabled,
        Error::FeatureNotSupported,
        Error::ExtensionNotSupported,
        Error::IncompatibleDriver,
        Error::OutOfHostMemory,
        Error::OutOfDeviceMemory,
        Error::InitializationFailed,
        Error::DeviceHung,
        Error::DeviceLost,
        Error::DeviceRemoved,
        Error::DriverFailure,
        Error::Unknown,
    ];
    /// The last legal code.
    pub const MAX_ENUM: Error = Error::Unknown;

    /// The canonical name of the code, e.g. `"ErrorInvalidUsage"`.
    pub const fn name(self) -> &'static str {
        match self {
            Error::Timeout => "Timeout",
            Error::NotReady => "NotReady",
            Error::InvalidUsage => "ErrorInvalidUsage",
            Error::InvalidState => "ErrorInvalidState",
            Error::InvalidNodeMask => "ErrorInvalidNodeMask",
            Error::IncompatibleNodeMask => "ErrorIncompatibleNodeMask",
            Error::ExceededLimit => "ErrorExceededLimit",
            Error::Occupied => "ErrorOccupied",
            Error::NotSignaled => "ErrorNotSignaled",
            Error::AlreadySignaled => "ErrorAlreadySignaled",
            Error::InvalidFormat => "ErrorInvalidFormat",
            Error::ExtensionNotEnabled => "ErrorExtensionNotEnabled",
            Error::FeatureNotSupported => "ErrorFeatureNotSupported",
            Error::ExtensionNotSupported => "ErrorExtensionNotSupported",
            Error::IncompatibleDriver => "ErrorIncompatibleDriver",
            Error::OutOfHostMemory => "ErrorOutOfHostMemory",
            Error::OutOfDeviceMemory => "ErrorOutOfDeviceMemory",
            Error::InitializationFailed => "ErrorInitializationFailed",
            Error::DeviceHung => "ErrorDeviceHung",
            Error::DeviceLost => "ErrorDeviceLost",
            Error::DeviceRemoved => "ErrorDeviceRemoved",
            Error::DriverFailure => "ErrorDriverFailure",
            Error::Unknown => "ErrorUnknown",
        }
    }

    pub const fn category(self) -> ErrorCategory {
        match self {
            Error::Timeout | Error::NotReady => ErrorCategory::Informational,
            Error::InvalidUsage
            | Error::InvalidState
            | Error::InvalidNodeMask
            | Error::IncompatibleNodeMask
            | Error::ExceededLimit
            | Error::Occupied
            | Error::NotSignaled
            | Error::AlreadySignaled
            | Error::InvalidFormat
            | Error::ExtensionNotEnabled => ErrorCategory::Validation,
            Error::FeatureNotSupported
            | Error::ExtensionNotSupported
            | Error::IncompatibleDriver => ErrorCategory::Environment,
            Error::OutOfHostMemory | Error::OutOfDeviceMemory | Error::InitializationFailed => {
                ErrorCategory::Transient
            }
            Error::DeviceHung | Error::DeviceLost | Error::DeviceRemoved | Error::DriverFailure => {
                ErrorCategory::Fatal
            }
            Error::Unknown => ErrorCategory::Unknown,
        }
    }

    /// True for codes after which the device must be recreated.
    pub const fn is_fatal(self) -> bool {
        matches!(self.category(), ErrorCategory::Fatal)
    }
}

impl TryFrom<u8> for Error {
    type Error = Error;

    /// Converts a raw code.  `0` (`Success`) and anything past [Error::MAX_ENUM] are rejected.
    fn try_from(value: u8) -> Result<Self> {
        Error::ALL
            .iter()
            .copied()
            .find(|e| *e as u8 == value)
            .ok_or(Error::InvalidUsage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_codes() {
        assert_eq!(Error::InvalidUsage.name(), "ErrorInvalidUsage");
        assert_eq!(Error::Timeout.name(), "Timeout");
        for e in Error::ALL {
            assert!(e.name().ends_with(&format!("{e:?}")));
        }
    }

    #[test]
    fn categories() {
        assert_eq!(Error::Timeout.category(), ErrorCategory::Informational);
        assert_eq!(Error::AlreadySignaled.category(), ErrorCategory::Validation);
        assert_eq!(Error::IncompatibleDriver.category(), ErrorCategory::Environment);
        assert!(Error::DeviceLost.is_fatal());
        assert!(!Error::OutOfDeviceMemory.is_fatal());
    }

    #[test]
    fn raw_codes() {
        assert_eq!(Error::try_from(3), Ok(Error::InvalidUsage));
        assert_eq!(Error::try_from(0), Err(Error::InvalidUsage));
        assert_eq!(Error::try_from(24), Err(Error::InvalidUsage));
        assert_eq!(Error::MAX_ENUM as u8, 23);
    }
}
