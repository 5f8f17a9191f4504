mod client;
mod record;

pub use client::SupabaseClient;
