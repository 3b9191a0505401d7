pub mod generate_subtitles_use_case;
pub mod infrastructure;
pub mod job_record;
pub mod pipeline_logger;
pub mod recognition_executor;
