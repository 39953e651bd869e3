//! Shared numeric constants referenced across the content processor, store
//! and sync pipeline.

/// Largest number of tokens a single content chunk may carry.
pub const MAX_TOKENS_PER_CHUNK: usize = 2000;

/// Largest total token budget across all chunks stored for one repository.
pub const MAX_TOTAL_TOKENS: usize = 50_000;

/// Content files larger than this are dropped before decoding.
pub const MAX_CONTENT_FILE_BYTES: u64 = 512 * 1024;

/// Default embedding dimension (`D` in the data model).
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;

/// Page size used by `ListRepositories` pagination and the relatedness
/// engine's candidate stream.
pub const BATCH_SIZE: usize = 100;

/// Upper bound on the relatedness engine's top-candidate buffer before a
/// final sort and truncation to the caller's `limit`.
pub const RELATED_BUFFER_SIZE: usize = 100;

/// Candidates scoring below this after the coverage discount are dropped.
pub const RELATED_MIN_SCORE: f32 = 0.25;

/// Default default wall-clock timeout for embedding/summarizer subprocess
/// calls.
pub const EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// Extended timeout allowed for a first-use model download.
pub const EMBEDDING_FIRST_USE_TIMEOUT_SECS: u64 = 120;

/// Below this character length, the embedding/summarizer adapter returns
/// its input unchanged instead of invoking the subprocess.
pub const PASSTHROUGH_TEXT_LEN: usize = 100;
