pub mod logger;
pub mod recon_pipeline;
