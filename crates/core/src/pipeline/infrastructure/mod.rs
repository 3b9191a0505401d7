pub mod worker_pool_executor;
