pub mod memory;
pub mod pool;
pub mod repos;
pub mod store;

// Re-export commonly used items
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations};
pub use repos::user::{NewUser, UserRepo, UserRow, UserUpdate};
pub use repos::weather::{NewWeatherRecord, TemperatureSummary, WeatherRecordRow, WeatherRepo};
pub use store::{PgStore, StoreError, StoreResult, UserStore, WeatherHistoryStore};
