mod config;
mod expeditions;
mod process;
mod status;
mod steam;

pub use config::{detect_steam, reset_config, set_platform, show_config, SetPlatformArgs};
pub use expeditions::{activate_expedition, list_expeditions, restore_original};
pub use process::{show_process, watch_process, WatchArgs};
pub use status::show_status;
pub use steam::show_steam_status;

use nms_expedition_core::{ConfigStore, ExpeditionCatalog, ExpeditionService};

/// Everything a command needs, resolved from the global arguments.
pub struct Context {
    pub store: ConfigStore,
    pub catalog: ExpeditionCatalog,
    pub json: bool,
}

impl Context {
    pub fn service(&self) -> ExpeditionService<ConfigStore> {
        ExpeditionService::new(self.store.clone(), self.catalog.clone())
    }
}
