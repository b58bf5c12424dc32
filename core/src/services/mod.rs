//! Business services containing domain logic and use cases.

pub mod clock;
pub mod codec;
pub mod rotation;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{JwtTokenCodec, RefreshClaims, TokenCodec};
pub use rotation::{
    ContextMismatchPolicy, RetentionSweeper, RotationConfig, RotationEngine, SweeperConfig,
};
