pub mod subtitle_cue;
pub mod subtitle_track;
pub mod subtitle_writer;
pub mod track_assembler;
