pub mod auth;
pub mod id_codec;
