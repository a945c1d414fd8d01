mod config_seed;
mod request_flow;
mod thread_hubs;
