pub mod access_page;
pub mod gallery_page;
pub mod lightbox;
pub mod upload_page;
