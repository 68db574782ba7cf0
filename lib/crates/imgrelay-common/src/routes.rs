//! Gateway route paths, shared so the CLI client and the server cannot drift.

pub const GET_UPLOAD_URL: &str = "/api/get-upload-url";
pub const CHECK_OUTPUT: &str = "/api/check-output";
pub const CLEAR_BUCKETS: &str = "/api/clear-buckets";
pub const EC2_STATUS: &str = "/api/ec2-status";
pub const HEALTHZ: &str = "/healthz";
