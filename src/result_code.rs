//! Storefront result codes and the transaction status derived from them.
//!
//! Checkout endpoints answer with a small integer in their `success` field.
//! [`ResultCode`] names the codes that are known; anything else is kept as a
//! raw number by the callers.
use serde::{Deserialize, Serialize};

macro_rules! result_codes {
    ($($name:ident = $code:literal),+ $(,)?) => {
        /// Named result codes reported by the storefront.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum ResultCode {
            $($name = $code),+
        }

        impl ResultCode {
            /// Looks up a numeric code. Returns `None` for unmapped codes.
            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($code => Some(ResultCode::$name),)+
                    _ => None,
                }
            }

            /// Human-readable name of the code.
            pub fn name(&self) -> &'static str {
                match self {
                    $(ResultCode::$name => stringify!($name),)+
                }
            }
        }
    };
}

result_codes! {
    Ok = 1,
    Fail = 2,
    NoConnection = 3,
    InvalidPassword = 5,
    LoggedInElsewhere = 6,
    InvalidProtocolVer = 7,
    InvalidParam = 8,
    FileNotFound = 9,
    Busy = 10,
    InvalidState = 11,
    InvalidName = 12,
    InvalidEmail = 13,
    DuplicateName = 14,
    AccessDenied = 15,
    Timeout = 16,
    Banned = 17,
    AccountNotFound = 18,
    InvalidSteamID = 19,
    ServiceUnavailable = 20,
    NotLoggedOn = 21,
    Pending = 22,
    EncryptionFailure = 23,
    InsufficientPrivilege = 24,
    LimitExceeded = 25,
    Revoked = 26,
    Expired = 27,
    AlreadyRedeemed = 28,
    DuplicateRequest = 29,
    AlreadyOwned = 30,
    IPNotFound = 31,
    PersistFailed = 32,
    LockingFailed = 33,
    LogonSessionReplaced = 34,
    ConnectFailed = 35,
    HandshakeFailed = 36,
    IOFailure = 37,
    RemoteDisconnect = 38,
    ShoppingCartNotFound = 39,
    Blocked = 40,
    Ignored = 41,
    NoMatch = 42,
    AccountDisabled = 43,
    ServiceReadOnly = 44,
    AccountNotFeatured = 45,
    AdministratorOK = 46,
    ContentVersion = 47,
    TryAnotherCM = 48,
    PasswordRequiredToKickSession = 49,
    AlreadyLoggedInElsewhere = 50,
    Suspended = 51,
    Cancelled = 52,
    DataCorruption = 53,
    DiskFull = 54,
    RemoteCallFailed = 55,
    RateLimitExceeded = 84,
}

impl ResultCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Verdict of a transaction status poll.
///
/// The numeric values are stable and may be persisted by callers.
/// `Invalid` is also what a failed poll degrades to, so it does not
/// necessarily mean the transaction is dead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransStatus {
    /// No problem detected
    None = 0,
    /// The purchase was declined
    Declined = 1,
    /// Unknown verdict, including every failed or unparsable poll
    Invalid = 2,
}

impl TransStatus {
    /// Maps the `success` field of a status poll to a verdict.
    pub fn from_result(code: Option<i32>) -> Self {
        match code.and_then(ResultCode::from_code) {
            Some(ResultCode::Ok) => TransStatus::None,
            Some(ResultCode::Fail) => TransStatus::Declined,
            _ => TransStatus::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_round_trip_through_the_table() {
        assert_eq!(ResultCode::from_code(1), Some(ResultCode::Ok));
        assert_eq!(ResultCode::from_code(22), Some(ResultCode::Pending));
        assert_eq!(ResultCode::Pending.code(), 22);
        assert_eq!(ResultCode::ShoppingCartNotFound.name(), "ShoppingCartNotFound");
    }

    #[test]
    fn unmapped_codes_are_none() {
        assert_eq!(ResultCode::from_code(0), None);
        assert_eq!(ResultCode::from_code(4), None);
        assert_eq!(ResultCode::from_code(9999), None);
    }

    #[test]
    fn status_mapping() {
        assert_eq!(TransStatus::from_result(Some(1)), TransStatus::None);
        assert_eq!(TransStatus::from_result(Some(2)), TransStatus::Declined);
        assert_eq!(TransStatus::from_result(Some(22)), TransStatus::Invalid);
        assert_eq!(TransStatus::from_result(None), TransStatus::Invalid);
    }

    #[test]
    fn status_numeric_values_are_stable() {
        assert_eq!(TransStatus::None as u8, 0);
        assert_eq!(TransStatus::Declined as u8, 1);
        assert_eq!(TransStatus::Invalid as u8, 2);
    }
}
