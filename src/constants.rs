//! # Protocol Constants
//!
//! Wire-level names and cache key namespaces shared by every resolution
//! strategy.

/// Request extension keys
pub mod extensions {
    /// Extension object carrying the persisted query metadata
    pub const PERSISTED_QUERY: &str = "persistedQuery";

    /// Field inside `persistedQuery` holding the client-claimed hash
    pub const SHA256_HASH: &str = "sha256Hash";
}

/// Client-facing error messages
pub mod messages {
    /// Hash-only request for a query that is not cached; clients resend the full text
    pub const NOT_FOUND: &str = "PersistedQueryNotFound";

    /// Claimed hash does not match the provided query text
    pub const HASH_MISMATCH: &str = "Wrong hash was passed";
}

/// Cache key namespaces
pub mod namespaces {
    /// Namespace for raw query text entries
    pub const TEXT: &str = "query";

    /// Prefix for parsed document entries, suffixed with the codec format version
    pub const DOCUMENT_PREFIX: &str = "document";

    /// Separator between namespace and hash
    pub const SEPARATOR: char = ':';
}

/// Built-in component names understood by the factories
pub mod names {
    pub const TEXT_RESOLVER: &str = "string";
    pub const TEXT_RESOLVER_ALIAS: &str = "text";
    pub const DOCUMENT_RESOLVER: &str = "document";

    pub const MEMORY_STORE: &str = "memory";
    pub const NOOP_STORE: &str = "noop";

    pub const SHA256: &str = "sha256";

    pub const DEFAULT_ERROR_HANDLER: &str = "default";
    pub const SILENT_ERROR_HANDLER: &str = "silent";
}

/// Configuration defaults
pub mod defaults {
    pub const MAX_CONCURRENT_RESOLUTIONS: usize = 16;
    pub const CONFIG_FILE: &str = "config/persisted_queries";
    pub const ENV_PREFIX: &str = "APQ";
}
