//! Shared helpers for unit tests.

use crate::types::AppIdentity;

/// Throwaway RSA key pair generated for the test suite. Never used
/// against a real upstream.
pub const TEST_RSA_PRIVATE_KEY: &str = include_str!("../tests/fixtures/test_key.pem");
pub const TEST_RSA_PUBLIC_KEY: &str = include_str!("../tests/fixtures/test_key.pub.pem");

/// App identity backed by the fixture key.
pub fn test_identity(installation_id: i64) -> AppIdentity {
    AppIdentity::new(
        "314159",
        TEST_RSA_PRIVATE_KEY.as_bytes().to_vec(),
        installation_id,
    )
}
