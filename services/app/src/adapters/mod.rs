pub mod clock;
pub mod generation;
pub mod mock;
pub mod storage;

pub use clock::{ManualClock, SystemClock, UuidIdProvider};
pub use generation::HttpGenerationAdapter;
pub use mock::MockStoryAdapter;
pub use storage::{FileStore, MemoryStore};
