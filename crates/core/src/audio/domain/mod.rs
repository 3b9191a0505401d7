pub mod audio_buffer;
pub mod segment;
pub mod segmenter;
pub mod signal_conditioner;
