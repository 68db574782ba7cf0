//! Fixed policy values shared by the gateway and the CLI.

/// Largest payload a write credential admits (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Lifetime of a presigned POST credential, in seconds.
pub const WRITE_CREDENTIAL_TTL_SECS: u64 = 600;

/// Lifetime of a presigned GET credential, in seconds.
pub const READ_CREDENTIAL_TTL_SECS: u64 = 300;

/// Total polling budget after a successful upload.
pub const POLL_TIMEOUT_MS: u64 = 120_000;

/// Delay between two output checks.
pub const POLL_INTERVAL_MS: u64 = 5_000;

/// Multipart field name carrying the payload in a presigned POST.
pub const UPLOAD_FILE_FIELD: &str = "file";
