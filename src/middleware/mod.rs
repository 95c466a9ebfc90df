pub mod client_ctx;

pub use client_ctx::{extract_client_ip, ClientCtx, USER_UID_HEADER};
