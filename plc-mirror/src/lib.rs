pub mod error;
pub mod export;
pub mod handlers;
pub mod info;
pub mod mirror;
pub mod pacing;
pub mod resolve;
pub mod shutdown;
pub mod store;
pub mod tracker;

pub struct AppState {
    pub store: std::sync::Arc<dyn store::Store>,
    pub resolver: resolve::Resolver,
    pub shutdown: shutdown::Shutdown,
}
