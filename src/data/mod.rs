//! Fetching the ASCII element sources the catalogues are built from

mod downloader;

pub use downloader::{
    download_astorb, download_comet_elements, download_element_sources, ensure_source_list, ASTORB_URL,
    COMET_ELEMENTS_URL,
};
