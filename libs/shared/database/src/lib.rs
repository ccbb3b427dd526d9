pub mod supabase;
pub mod store;
pub mod supabase_store;
pub mod memory;
pub mod state;

pub use memory::InMemoryStore;
pub use state::AppState;
pub use store::{SchedulingStore, StoreError, StoreResult};
pub use supabase_store::SupabaseStore;
