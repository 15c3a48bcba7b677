//! Error type shared by the engine, the admin layer and the contract messages.

/// Every rejection the fund can produce. Returning one from a message aborts
/// the whole call and reverts its storage changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode, thiserror::Error)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum Error {
    /// Amount argument is zero.
    #[error("amount must be non-zero")]
    ZeroAmount,
    /// Address argument is the zero account.
    #[error("address must be non-zero")]
    ZeroAddress,
    /// Unit price supplied at construction is zero.
    #[error("unit price must be positive")]
    InvalidPrice,
    /// Deposit is below the configured minimum.
    #[error("amount below minimum invest amount")]
    BelowMinimum,
    /// Conversion truncates to zero (dust).
    #[error("conversion yields zero")]
    ZeroConversion,
    /// An arithmetic operation overflowed or underflowed.
    #[error("arithmetic overflow")]
    Overflow,

    /// Fund does not hold enough base asset.
    #[error("insufficient base reserve")]
    InsufficientBaseReserve,
    /// Fund does not hold enough quote asset.
    #[error("insufficient quote reserve")]
    InsufficientQuoteReserve,
    /// Caller's recorded position is smaller than requested.
    #[error("insufficient investor position")]
    InsufficientPosition,
    /// Caller's wallet balance is smaller than requested.
    #[error("insufficient caller balance")]
    InsufficientBalance,
    /// A standard asset reported `false` for a transfer.
    #[error("asset rejected the transfer")]
    TransferRejected,
    /// The cross-contract call into an asset reverted.
    #[error("asset call failed")]
    AssetCallFailed,

    /// Caller is not the owner.
    #[error("caller is not the owner")]
    NotOwner,
    /// Investing is paused.
    #[error("contract is paused")]
    Paused,
    /// Insurance reserve is still time-locked.
    #[error("insurance reserve is locked")]
    InsuranceLocked,
    /// Nested call into a running engine operation.
    #[error("reentrant call")]
    Reentrancy,
}

/// Coarse classification of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape (zero amount, null address, out-of-range arithmetic).
    Validation,
    /// A balance, position or allowance is too small.
    InsufficientResource,
    /// Caller is not privileged, or the operation is currently gated.
    Authorization,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ZeroAmount
            | Error::ZeroAddress
            | Error::InvalidPrice
            | Error::BelowMinimum
            | Error::ZeroConversion
            | Error::Overflow => ErrorKind::Validation,
            Error::InsufficientBaseReserve
            | Error::InsufficientQuoteReserve
            | Error::InsufficientPosition
            | Error::InsufficientBalance
            | Error::TransferRejected
            | Error::AssetCallFailed => ErrorKind::InsufficientResource,
            Error::NotOwner | Error::Paused | Error::InsuranceLocked | Error::Reentrancy => {
                ErrorKind::Authorization
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
