use soroban_sdk::contracterror;

/// Custom error types for the RentFlow contract
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RentFlowError {
    // Request errors (1000-1099)
    RequestNotFound = 1000,
    InvalidRequest = 1001,
    RequestNotOpen = 1002,
    RequestAlreadyMatched = 1003,
    TooManyItems = 1004,
    InvalidQuantity = 1005,

    // Authorization errors (1100-1199)
    Unauthorized = 1100,
    NotAdmin = 1101,

    // Validation errors (1200-1299)
    InvalidAmount = 1200,
    InvalidPrice = 1201,
    InvalidCurrency = 1202,
    InvalidCategory = 1203,
    InvalidLocation = 1204,
    InvalidName = 1205,

    // Storage errors (1300-1399)
    StorageError = 1300,
    StorageKeyNotFound = 1301,

    // Provider errors (1400-1499)
    ProviderNotFound = 1400,
    ProviderAlreadyRegistered = 1401,
    ProviderNotVerified = 1402,
    VerificationAlreadyPending = 1403,
    VerificationNotFound = 1404,

    // Offer errors (1500-1599)
    OfferNotFound = 1500,

    // Negotiation errors (1600-1699)
    NegotiationNotFound = 1600,
    InvalidTransition = 1601,
    ConcurrentModification = 1602,

    // Order errors (1700-1799)
    NotAccepted = 1700,
    OrderNotFound = 1701,

    // Rating errors (1800-1899)
    InvalidRating = 1800,
    AlreadyRated = 1801,
    NotRater = 1802,

    // Lifecycle errors (1900-1999)
    OperationNotAllowed = 1900,
    ContractPaused = 1901,
}
