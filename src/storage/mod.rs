//! Object storage purge.
//!
//! [`BucketPurge`] empties a bucket; [`S3BucketPurger`] implements it with the
//! AWS SDK, leaving listing pagination to the SDK paginator.

pub mod purge;

pub use purge::{BucketPurge, PurgeError, PurgeSummary, S3BucketPurger};

#[cfg(any(test, feature = "testing"))]
pub use purge::MockBucketPurge;
