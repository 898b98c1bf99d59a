// Template management: the known template set, its storage, and uploads.
// Handlers only talk to the `TemplateRepository` / `TemplateStore` traits held in `AppState`.

pub mod handlers;
pub mod repository;
pub mod store;
pub mod upload;
