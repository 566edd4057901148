//! One module per container format backing an [`ArchiveReader`](crate::archive_reader::ArchiveReader).

pub mod rar;
pub mod sevenz;
pub mod tar;
pub mod zip;
