pub mod batch;
pub mod memory;
pub mod supabase;
pub mod traits;
pub mod types;

pub use batch::{BatchConfig, BatchOutcome, persist_in_batches};
pub use memory::MemoryBackend;
pub use supabase::SupabaseClient;
pub use traits::{AssetStore, Backend, IdentityProvider, RoleStore};
pub use types::{AppRole, AssetRecord, AssetStatus, GeoPoint, HttpClient, Principal};
