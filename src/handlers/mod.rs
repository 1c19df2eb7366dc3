// handlers/mod.rs - one module per handler family
//
// Every handler takes the injected collaborators and the inbound request and
// returns an ApiResult; the dispatcher turns that into the response envelope.

pub mod history;
pub mod image;
pub mod music;
pub mod settings;
