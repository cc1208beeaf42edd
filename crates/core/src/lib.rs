#![forbid(unsafe_code)]

pub mod attempt;
pub mod model;
pub mod pool;
pub mod time;
pub mod verify;

pub use attempt::{AttemptError, AttemptMachine, AttemptState, RetryTimer, Verdict};
pub use pool::{ChallengePool, Draw};
pub use time::Clock;
pub use verify::{FieldAnswer, InvalidInput, Verifier};
