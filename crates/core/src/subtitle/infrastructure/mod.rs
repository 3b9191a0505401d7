pub mod fs_subtitle_writer;
