//! Shared constants for end-to-end tests
//!
//! When seeded users or test media change, update only this file.

// ============================================================================
// Seeded Users
// ============================================================================

/// First seeded user
pub const ALICE: &str = "alice";

/// Second seeded user
pub const BOB: &str = "bob";

/// Password shared by every seeded user
pub const TEST_PASS: &str = "testpass123";

/// Secret the test server signs session tokens with
pub const TEST_JWT_SECRET: &str = "e2e-test-secret-0123456789";

// ============================================================================
// Test Media
// ============================================================================

/// Smallest byte sequence recognised as a PNG
pub const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// Image size limit of the test server, kept small so oversize uploads are cheap
pub const TEST_MAX_IMAGE_BYTES: u64 = 64 * 1024;

/// Video size limit of the test server
pub const TEST_MAX_VIDEO_BYTES: u64 = 256 * 1024;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
